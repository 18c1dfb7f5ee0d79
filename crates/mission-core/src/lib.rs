//! Mission Core - mission lifecycle
//!
//! Turns a creation request into a persisted mission:
//! - Resolves the mission variant and checks its outcome payload
//! - Looks up the completing person's team
//! - Validates or defaults the points allocation
//! - Persists the mission and notifies its location exactly once
//!
//! Storage, people, products and locations are external; they are reached
//! through the traits in [`collaborators`].
//!
//! # Example
//!
//! ```rust,ignore
//! use mission_core::{MissionLifecycle, MissionRequest};
//! use serde_json::json;
//!
//! # async fn example(lifecycle: MissionLifecycle) -> Result<(), mission_core::MissionError> {
//! let request = MissionRequest::new("AddLocationMission", "person-1", "location-1", json!(true));
//! let mission = lifecycle.create_mission(request).await?;
//!
//! let view = mission.to_view();
//! assert_eq!(view.mission_type, "addLocation");
//! # Ok(())
//! # }
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

pub mod collaborators;
pub mod config;
pub mod error;
pub mod lifecycle;
pub mod mission;
pub mod outcome;
pub mod types;

pub use collaborators::{
    CollaboratorError, Collaborators, LocationNotifier, MissionStore, PersonDirectory,
    ProductCatalog, SaveOutcome,
};
pub use config::{ConfigError, MissionConfig};
pub use error::MissionError;
pub use lifecycle::MissionLifecycle;
pub use mission::{Mission, MissionRequest, MissionView, PendingMission};
pub use outcome::{Feedback, MissionOutcome, OutcomeError, ProductNote, ProductRating, VeganWishes};
pub use types::{Entity, EntityRef, Location, LocationId, MissionId, Person, PersonId, ProductId};

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for working with missions
    pub use crate::{
        Collaborators, Mission, MissionError, MissionLifecycle, MissionOutcome, MissionRequest,
        MissionView, SaveOutcome,
    };
    pub use mission_points::{Points, ProposedPoints};
    pub use mission_registry::{MissionKind, TeamId, TeamRegistry, VariantRegistry};
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
