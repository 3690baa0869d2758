use thiserror::Error;

use crate::platform::types::GitProvider;

/// Reason code for a failed launch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailureKind {
    DirectoryUnavailable,
    RepositoryNotFound,
    CreationError,
}

/// Why a launch attempt failed. Always recovered into [`LaunchState::Failed`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LaunchError {
    #[error("Could not load your repositories: {detail}")]
    DirectoryUnavailable { detail: String },

    #[error("Repository {repo} ({provider}) was not found among your repositories")]
    RepositoryNotFound { repo: String, provider: GitProvider },

    #[error("Could not start a conversation: {detail}")]
    CreationError { detail: String },
}

impl LaunchError {
    pub fn kind(&self) -> FailureKind {
        match self {
            LaunchError::DirectoryUnavailable { .. } => FailureKind::DirectoryUnavailable,
            LaunchError::RepositoryNotFound { .. } => FailureKind::RepositoryNotFound,
            LaunchError::CreationError { .. } => FailureKind::CreationError,
        }
    }
}

/// Lifecycle of a task card's launch action.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum LaunchState {
    #[default]
    Idle,
    Resolving,
    Launching,
    Succeeded { conversation_id: String },
    Failed(LaunchError),
}

impl LaunchState {
    /// True while a launch is in flight.
    pub fn is_pending(&self) -> bool {
        matches!(self, LaunchState::Resolving | LaunchState::Launching)
    }

    pub fn name(&self) -> &'static str {
        match self {
            LaunchState::Idle => "idle",
            LaunchState::Resolving => "resolving",
            LaunchState::Launching => "launching",
            LaunchState::Succeeded { .. } => "succeeded",
            LaunchState::Failed(_) => "failed",
        }
    }

    /// Whether `next` is a legal edge from this state.
    pub fn can_transition_to(&self, next: &LaunchState) -> bool {
        use LaunchState::*;

        match (self, next) {
            (Idle | Succeeded { .. } | Failed(_), Resolving) => true,
            (Resolving, Launching | Failed(_)) => true,
            (Launching, Succeeded { .. } | Failed(_)) => true,
            (Succeeded { .. } | Failed(_), Idle) => true,
            _ => false,
        }
    }
}
