//! Mission kinds
//!
//! The closed set of mission variants and their built-in point ceilings
//! and outcome shapes.

use crate::shape::{FieldShape, OutcomeShape};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Suffix carried by every internal mission type name
pub const TYPE_SUFFIX: &str = "Mission";

/// One of the supported mission variants
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum MissionKind {
    /// The participant added the location
    #[serde(rename = "AddLocationMission")]
    AddLocation,
    /// Bonus for visiting the location
    #[serde(rename = "VisitBonusMission")]
    VisitBonus,
    /// Whether the location has options at all
    #[serde(rename = "HasOptionsMission")]
    HasOptions,
    /// Expressions of wanting vegan options
    #[serde(rename = "WantVeganMission")]
    WantVegan,
    /// Which products are offered
    #[serde(rename = "WhatOptionsMission")]
    WhatOptions,
    /// Which products were bought
    #[serde(rename = "BuyOptionsMission")]
    BuyOptions,
    /// Ratings for products
    #[serde(rename = "RateOptionsMission")]
    RateOptions,
    /// Free-text feedback to the location
    #[serde(rename = "GiveFeedbackMission")]
    GiveFeedback,
    /// Overall quality of the offer
    #[serde(rename = "OfferQualityMission")]
    OfferQuality,
    /// Effort/value judgement
    #[serde(rename = "EffortValueMission")]
    EffortValue,
}

impl MissionKind {
    /// All kinds in table order
    pub const ALL: [MissionKind; 10] = [
        MissionKind::AddLocation,
        MissionKind::VisitBonus,
        MissionKind::HasOptions,
        MissionKind::WantVegan,
        MissionKind::WhatOptions,
        MissionKind::BuyOptions,
        MissionKind::RateOptions,
        MissionKind::GiveFeedback,
        MissionKind::OfferQuality,
        MissionKind::EffortValue,
    ];

    /// Internal type name, e.g. `AddLocationMission`
    #[must_use]
    pub const fn type_name(self) -> &'static str {
        match self {
            Self::AddLocation => "AddLocationMission",
            Self::VisitBonus => "VisitBonusMission",
            Self::HasOptions => "HasOptionsMission",
            Self::WantVegan => "WantVeganMission",
            Self::WhatOptions => "WhatOptionsMission",
            Self::BuyOptions => "BuyOptionsMission",
            Self::RateOptions => "RateOptionsMission",
            Self::GiveFeedback => "GiveFeedbackMission",
            Self::OfferQuality => "OfferQualityMission",
            Self::EffortValue => "EffortValueMission",
        }
    }

    /// Built-in point ceiling
    #[must_use]
    pub const fn default_max_points(self) -> u32 {
        match self {
            Self::VisitBonus => 100,
            Self::BuyOptions | Self::GiveFeedback => 20,
            Self::AddLocation
            | Self::HasOptions
            | Self::WantVegan
            | Self::WhatOptions
            | Self::RateOptions
            | Self::OfferQuality
            | Self::EffortValue => 10,
        }
    }

    /// Built-in outcome shape
    #[must_use]
    pub fn default_outcome_shape(self) -> OutcomeShape {
        match self {
            Self::AddLocation | Self::VisitBonus | Self::HasOptions => OutcomeShape::Boolean,
            Self::OfferQuality | Self::EffortValue => OutcomeShape::Number,
            Self::WantVegan => OutcomeShape::object(vec![
                FieldShape::required("expressions", OutcomeShape::list(OutcomeShape::Text)),
                FieldShape::required("others", OutcomeShape::list(OutcomeShape::Text)),
            ]),
            Self::WhatOptions | Self::BuyOptions => OutcomeShape::list(OutcomeShape::object(vec![
                FieldShape::required("product", OutcomeShape::ProductRef),
                FieldShape::required("info", OutcomeShape::Text),
            ])),
            Self::RateOptions => OutcomeShape::list(OutcomeShape::object(vec![
                FieldShape::required("product", OutcomeShape::ProductRef),
                FieldShape::required("info", OutcomeShape::Number),
            ])),
            Self::GiveFeedback => OutcomeShape::object(vec![
                FieldShape::required("feedback", OutcomeShape::Text),
                FieldShape::required("didNotDoIt", OutcomeShape::Boolean),
            ]),
        }
    }
}

impl fmt::Display for MissionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.type_name())
    }
}

/// Error for type names outside the closed set
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown mission type: {0}")]
pub struct UnknownKind(pub String);

impl FromStr for MissionKind {
    type Err = UnknownKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|k| k.type_name() == s)
            .ok_or_else(|| UnknownKind(s.to_string()))
    }
}

/// Derive the external short identifier from an internal type name.
///
/// The first character is lowercased and a trailing `Mission` is removed:
/// `AddLocationMission` becomes `addLocation`.
#[must_use]
pub fn short_identifier(type_name: &str) -> String {
    let stem = type_name.strip_suffix(TYPE_SUFFIX).unwrap_or(type_name);
    let mut chars = stem.chars();
    match chars.next() {
        Some(first) => first.to_lowercase().chain(chars).collect(),
        None => String::new(),
    }
}
