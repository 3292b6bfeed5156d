//! Shared error type for the engine crates

use thiserror::Error;

/// Errors surfaced by the protocol engine.
///
/// All variants are recoverable by the caller (resubmit the command);
/// none are fatal to the engine.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum RlvError {
    /// Malformed command string or option grammar mismatch
    #[error("Parse failure: {reason}")]
    Parse { reason: String },

    /// Referenced folder, item, attachment point, or id does not exist
    #[error("Resolution failure: {target}")]
    Resolution { target: String },

    /// An active restriction blocks the requested action
    #[error("Blocked by restriction: {behavior}")]
    PermissionDenied { behavior: String },

    /// The behavior is on the engine blacklist
    #[error("Behavior is blacklisted: {behavior}")]
    Blacklisted { behavior: String },

    /// Inventory or world-state provider returned failure
    #[error("Collaborator failure: {collaborator}")]
    Collaborator { collaborator: String },
}

impl RlvError {
    pub fn parse(reason: impl Into<String>) -> Self {
        Self::Parse {
            reason: reason.into(),
        }
    }

    pub fn resolution(target: impl Into<String>) -> Self {
        Self::Resolution {
            target: target.into(),
        }
    }

    pub fn collaborator(collaborator: impl Into<String>) -> Self {
        Self::Collaborator {
            collaborator: collaborator.into(),
        }
    }
}

/// Result alias for engine operations
pub type RlvResult<T> = Result<T, RlvError>;
