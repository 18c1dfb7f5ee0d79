//! Mission Registry
//!
//! Static lookup tables consulted by every other part of the mission
//! subsystem.
//!
//! # Core Concepts
//!
//! - [`TeamRegistry`]: ordered set of teams points can be attributed to
//! - [`MissionKind`]: the closed set of mission variants
//! - [`VariantRegistry`]: per-variant point ceiling and [`OutcomeShape`]
//! - [`short_identifier`]: the type name ↔ external identifier transform
//!
//! # Example
//!
//! ```rust
//! use mission_registry::{TeamRegistry, VariantRegistry};
//!
//! let teams = TeamRegistry::with_defaults();
//! let variants = VariantRegistry::with_defaults();
//!
//! assert!(teams.is_valid_team("team1"));
//! assert_eq!(variants.identifier_for("AddLocationMission").unwrap(), "addLocation");
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

pub mod kind;
pub mod shape;
pub mod team;
pub mod variant;

pub use kind::{short_identifier, MissionKind, UnknownKind, TYPE_SUFFIX};
pub use shape::{FieldShape, OutcomeShape, ShapeCheck, ShapeError, ValueKind};
pub use team::{default_teams, TeamEntry, TeamId, TeamRegistry, OBSERVER_TEAM};
pub use variant::{RegistryError, VariantDefinition, VariantRegistry};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
