//! Mission Points
//!
//! Points allocation for missions: defaults the allocation to full credit
//! for the completing person's team, or verifies a caller-supplied one.
//!
//! Validation is pure. Callers resolve the completing person's team first
//! and pass it in, so the validator can be tested without any store.
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//! use mission_points::PointsValidator;
//! use mission_registry::{TeamId, TeamRegistry, VariantRegistry};
//!
//! let validator = PointsValidator::new(
//!     Arc::new(VariantRegistry::with_defaults()),
//!     Arc::new(TeamRegistry::with_defaults()),
//! );
//!
//! let points = validator
//!     .validate("AddLocationMission", None, &TeamId::from("team1"))
//!     .unwrap();
//! assert_eq!(points.get("team1"), Some(10));
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

pub mod points;
pub mod validation;

pub use points::{Points, ProposedPoints};
pub use validation::{validate_allocation, PointsError, PointsValidator};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
