//! Outcome shapes
//!
//! Structural definitions for mission outcome payloads. A shape is checked
//! against the raw JSON payload before it is decoded into a typed outcome,
//! so mismatches are reported with the offending path.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Structural definition of an outcome payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum OutcomeShape {
    /// JSON boolean
    Boolean,
    /// JSON number
    Number,
    /// JSON string
    Text,
    /// Reference to a product, given as a string or integer id
    ProductRef,
    /// Homogeneous list
    List {
        /// Shape of every item
        item: Box<OutcomeShape>,
    },
    /// Object with named fields; unknown fields are ignored
    Object {
        /// Declared fields
        fields: Vec<FieldShape>,
    },
}

/// A named field inside an [`OutcomeShape::Object`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldShape {
    /// Field name as it appears in the payload
    pub name: String,
    /// Field shape
    pub shape: OutcomeShape,
    /// Whether the field must be present and non-null
    pub required: bool,
}

impl FieldShape {
    /// Required field
    #[must_use]
    pub fn required(name: impl Into<String>, shape: OutcomeShape) -> Self {
        Self {
            name: name.into(),
            shape,
            required: true,
        }
    }

    /// Optional field
    #[must_use]
    pub fn optional(name: impl Into<String>, shape: OutcomeShape) -> Self {
        Self {
            name: name.into(),
            shape,
            required: false,
        }
    }
}

/// Primitive kind used in mismatch reports
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    Null,
    Boolean,
    Number,
    Text,
    List,
    Object,
    ProductRef,
}

impl ValueKind {
    fn of(value: &Value) -> Self {
        match value {
            Value::Null => Self::Null,
            Value::Bool(_) => Self::Boolean,
            Value::Number(_) => Self::Number,
            Value::String(_) => Self::Text,
            Value::Array(_) => Self::List,
            Value::Object(_) => Self::Object,
        }
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Null => "null",
            Self::Boolean => "boolean",
            Self::Number => "number",
            Self::Text => "string",
            Self::List => "list",
            Self::Object => "object",
            Self::ProductRef => "product reference",
        };
        f.write_str(name)
    }
}

/// Structural mismatch between a payload and its shape
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ShapeError {
    /// A required field is absent or null
    #[error("missing required field at {path}")]
    MissingField { path: String },

    /// A value has the wrong primitive kind
    #[error("expected {expected} at {path}, found {found}")]
    WrongKind {
        path: String,
        expected: ValueKind,
        found: ValueKind,
    },
}

/// What a successful structural check collected from the payload
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ShapeCheck {
    /// Product ids referenced by the payload, in payload order
    pub product_refs: Vec<String>,
}

impl OutcomeShape {
    /// List of `item`
    #[must_use]
    pub fn list(item: OutcomeShape) -> Self {
        Self::List {
            item: Box::new(item),
        }
    }

    /// Object with `fields`
    #[must_use]
    pub fn object(fields: Vec<FieldShape>) -> Self {
        Self::Object { fields }
    }

    /// Check `value` against this shape.
    ///
    /// Stops at the first mismatch. Product references are collected but
    /// not resolved; resolving them needs the product catalog.
    pub fn check(&self, value: &Value) -> Result<ShapeCheck, ShapeError> {
        let mut check = ShapeCheck::default();
        self.check_at(value, "$", &mut check)?;
        Ok(check)
    }

    fn check_at(&self, value: &Value, path: &str, check: &mut ShapeCheck) -> Result<(), ShapeError> {
        let mismatch = |expected: ValueKind| ShapeError::WrongKind {
            path: path.to_string(),
            expected,
            found: ValueKind::of(value),
        };

        match (self, value) {
            (Self::Boolean, Value::Bool(_))
            | (Self::Number, Value::Number(_))
            | (Self::Text, Value::String(_)) => Ok(()),
            (Self::Boolean, _) => Err(mismatch(ValueKind::Boolean)),
            (Self::Number, _) => Err(mismatch(ValueKind::Number)),
            (Self::Text, _) => Err(mismatch(ValueKind::Text)),

            (Self::ProductRef, Value::String(id)) if !id.is_empty() => {
                check.product_refs.push(id.clone());
                Ok(())
            }
            (Self::ProductRef, Value::Number(n)) if n.is_u64() => {
                check.product_refs.push(n.to_string());
                Ok(())
            }
            (Self::ProductRef, _) => Err(mismatch(ValueKind::ProductRef)),

            (Self::List { item }, Value::Array(items)) => {
                for (i, v) in items.iter().enumerate() {
                    item.check_at(v, &format!("{path}[{i}]"), check)?;
                }
                Ok(())
            }
            (Self::List { .. }, _) => Err(mismatch(ValueKind::List)),

            (Self::Object { fields }, Value::Object(map)) => {
                for field in fields {
                    let field_path = format!("{path}.{}", field.name);
                    match map.get(&field.name) {
                        None | Some(Value::Null) if field.required => {
                            return Err(ShapeError::MissingField { path: field_path });
                        }
                        None | Some(Value::Null) => {}
                        Some(v) => field.shape.check_at(v, &field_path, check)?,
                    }
                }
                Ok(())
            }
            (Self::Object { .. }, _) => Err(mismatch(ValueKind::Object)),
        }
    }
}
