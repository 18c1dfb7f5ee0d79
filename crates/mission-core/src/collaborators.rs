//! External collaborators
//!
//! The mission core owns no storage. People, locations, products and
//! mission records live behind these traits; the lifecycle controller only
//! sequences calls to them.

use crate::mission::Mission;
use crate::types::{MissionId, Person, PersonId, ProductId};
use async_trait::async_trait;
use std::fmt;
use std::sync::Arc;

/// Failure reported by a collaborator
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CollaboratorError {
    /// Collaborator could not be reached or timed out
    #[error("{collaborator} unavailable: {message}")]
    Unavailable {
        collaborator: &'static str,
        message: String,
    },

    /// Collaborator refused the call
    #[error("{collaborator} rejected the call: {message}")]
    Rejected {
        collaborator: &'static str,
        message: String,
    },
}

impl CollaboratorError {
    /// Create unavailable error
    #[inline]
    pub fn unavailable(collaborator: &'static str, message: impl Into<String>) -> Self {
        Self::Unavailable {
            collaborator,
            message: message.into(),
        }
    }

    /// Create rejected error
    #[inline]
    pub fn rejected(collaborator: &'static str, message: impl Into<String>) -> Self {
        Self::Rejected {
            collaborator,
            message: message.into(),
        }
    }
}

/// Result of persisting a mission
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveOutcome {
    /// First persistence of this mission
    Inserted,
    /// The record already existed
    Updated,
}

/// Person lookup
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PersonDirectory: Send + Sync {
    /// Find a person; `Ok(None)` when the id is dangling
    async fn find_person_by_id(&self, id: &PersonId) -> Result<Option<Person>, CollaboratorError>;
}

/// Completion hook of the location a mission was performed at.
///
/// Called at most once per mission by the lifecycle controller.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LocationNotifier: Send + Sync {
    /// Record a completed mission against its location
    async fn notify_mission_completed(&self, mission: &Mission) -> Result<(), CollaboratorError>;
}

/// Product reference resolution
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ProductCatalog: Send + Sync {
    /// Check whether a product exists
    async fn product_exists(&self, id: &ProductId) -> Result<bool, CollaboratorError>;
}

/// Mission persistence
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MissionStore: Send + Sync {
    /// Insert or update a mission record
    async fn save(&self, mission: &Mission) -> Result<SaveOutcome, CollaboratorError>;

    /// Remove a record inserted by a creation that did not complete
    async fn discard(&self, id: &MissionId) -> Result<(), CollaboratorError>;
}

/// Handles to every collaborator the lifecycle controller needs
#[derive(Clone)]
pub struct Collaborators {
    pub people: Arc<dyn PersonDirectory>,
    pub locations: Arc<dyn LocationNotifier>,
    pub products: Arc<dyn ProductCatalog>,
    pub store: Arc<dyn MissionStore>,
}

impl Collaborators {
    /// Bundle collaborator handles
    #[must_use]
    pub fn new(
        people: Arc<dyn PersonDirectory>,
        locations: Arc<dyn LocationNotifier>,
        products: Arc<dyn ProductCatalog>,
        store: Arc<dyn MissionStore>,
    ) -> Self {
        Self {
            people,
            locations,
            products,
            store,
        }
    }
}

impl fmt::Debug for Collaborators {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Collaborators").finish_non_exhaustive()
    }
}
