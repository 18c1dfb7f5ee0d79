//! Mission outcomes
//!
//! [`MissionOutcome`] is the tagged union over mission variants: one arm per
//! [`MissionKind`], each carrying that variant's payload. Raw payloads are
//! first checked against the registered [`OutcomeShape`] and then decoded
//! into the matching arm.

use crate::types::ProductId;
use mission_registry::{MissionKind, OutcomeShape, ShapeError};
use serde::{Deserialize, Serialize, Serializer};
use serde_json::Value;

/// Outcome validation errors
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum OutcomeError {
    /// Payload does not match the registered shape
    #[error(transparent)]
    Shape(#[from] ShapeError),

    /// Payload matched the shape but not the variant's payload type
    #[error("cannot decode {kind} outcome: {message}")]
    Decode { kind: MissionKind, message: String },

    /// A referenced product does not exist
    #[error("unknown product: {0}")]
    UnknownProduct(ProductId),
}

/// Wishes collected by a [`MissionKind::WantVegan`] mission
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VeganWishes {
    pub expressions: Vec<String>,
    pub others: Vec<String>,
}

/// Free-text note about a product
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductNote {
    pub product: ProductId,
    pub info: String,
}

/// Numeric rating of a product
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductRating {
    pub product: ProductId,
    pub info: f64,
}

/// Feedback left for the location
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Feedback {
    pub feedback: String,
    #[serde(rename = "didNotDoIt")]
    pub did_not_do_it: bool,
}

/// Variant-specific mission payload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "outcome")]
pub enum MissionOutcome {
    #[serde(rename = "AddLocationMission")]
    AddLocation(bool),
    #[serde(rename = "VisitBonusMission")]
    VisitBonus(bool),
    #[serde(rename = "HasOptionsMission")]
    HasOptions(bool),
    #[serde(rename = "WantVeganMission")]
    WantVegan(VeganWishes),
    #[serde(rename = "WhatOptionsMission")]
    WhatOptions(Vec<ProductNote>),
    #[serde(rename = "BuyOptionsMission")]
    BuyOptions(Vec<ProductNote>),
    #[serde(rename = "RateOptionsMission")]
    RateOptions(Vec<ProductRating>),
    #[serde(rename = "GiveFeedbackMission")]
    GiveFeedback(Feedback),
    #[serde(rename = "OfferQualityMission")]
    OfferQuality(f64),
    #[serde(rename = "EffortValueMission")]
    EffortValue(f64),
}

impl MissionOutcome {
    /// Discriminant of this outcome
    #[must_use]
    pub fn kind(&self) -> MissionKind {
        match self {
            Self::AddLocation(_) => MissionKind::AddLocation,
            Self::VisitBonus(_) => MissionKind::VisitBonus,
            Self::HasOptions(_) => MissionKind::HasOptions,
            Self::WantVegan(_) => MissionKind::WantVegan,
            Self::WhatOptions(_) => MissionKind::WhatOptions,
            Self::BuyOptions(_) => MissionKind::BuyOptions,
            Self::RateOptions(_) => MissionKind::RateOptions,
            Self::GiveFeedback(_) => MissionKind::GiveFeedback,
            Self::OfferQuality(_) => MissionKind::OfferQuality,
            Self::EffortValue(_) => MissionKind::EffortValue,
        }
    }

    /// Check `payload` against `shape`, then decode it as a `kind` outcome
    ///
    /// Product references are not resolved here.
    ///
    /// # Errors
    /// - `OutcomeError::Shape` on a structural mismatch
    /// - `OutcomeError::Decode` if the payload does not fit the variant
    pub fn parse(kind: MissionKind, shape: &OutcomeShape, payload: &Value) -> Result<Self, OutcomeError> {
        shape.check(payload)?;
        Self::decode(kind, payload)
    }

    /// Decode `payload` as a `kind` outcome without a shape check
    ///
    /// # Errors
    /// - `OutcomeError::Decode` if the payload does not fit the variant
    pub fn decode(kind: MissionKind, payload: &Value) -> Result<Self, OutcomeError> {
        let decoded = match kind {
            MissionKind::AddLocation => bool::deserialize(payload).map(Self::AddLocation),
            MissionKind::VisitBonus => bool::deserialize(payload).map(Self::VisitBonus),
            MissionKind::HasOptions => bool::deserialize(payload).map(Self::HasOptions),
            MissionKind::WantVegan => VeganWishes::deserialize(payload).map(Self::WantVegan),
            MissionKind::WhatOptions => Vec::deserialize(payload).map(Self::WhatOptions),
            MissionKind::BuyOptions => Vec::deserialize(payload).map(Self::BuyOptions),
            MissionKind::RateOptions => Vec::deserialize(payload).map(Self::RateOptions),
            MissionKind::GiveFeedback => Feedback::deserialize(payload).map(Self::GiveFeedback),
            MissionKind::OfferQuality => f64::deserialize(payload).map(Self::OfferQuality),
            MissionKind::EffortValue => f64::deserialize(payload).map(Self::EffortValue),
        };
        decoded.map_err(|e| OutcomeError::Decode {
            kind,
            message: e.to_string(),
        })
    }

    /// Products referenced by this outcome, in payload order
    #[must_use]
    pub fn product_refs(&self) -> Vec<&ProductId> {
        match self {
            Self::WhatOptions(notes) | Self::BuyOptions(notes) => {
                notes.iter().map(|n| &n.product).collect()
            }
            Self::RateOptions(ratings) => ratings.iter().map(|r| &r.product).collect(),
            Self::AddLocation(_)
            | Self::VisitBonus(_)
            | Self::HasOptions(_)
            | Self::WantVegan(_)
            | Self::GiveFeedback(_)
            | Self::OfferQuality(_)
            | Self::EffortValue(_) => Vec::new(),
        }
    }

    /// Serialize only the payload, without the discriminant
    ///
    /// # Errors
    /// Propagates serializer errors
    pub fn serialize_payload<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::AddLocation(v) | Self::VisitBonus(v) | Self::HasOptions(v) => v.serialize(serializer),
            Self::WantVegan(v) => v.serialize(serializer),
            Self::WhatOptions(v) | Self::BuyOptions(v) => v.serialize(serializer),
            Self::RateOptions(v) => v.serialize(serializer),
            Self::GiveFeedback(v) => v.serialize(serializer),
            Self::OfferQuality(v) | Self::EffortValue(v) => v.serialize(serializer),
        }
    }
}
