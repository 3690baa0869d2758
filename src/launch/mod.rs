//! The launch workflow: repository resolution plus the state machine that
//! turns a suggested task into a running conversation.

pub mod controller;
pub mod resolver;
pub mod state;

pub use controller::{LaunchController, LaunchOutcome};
pub use resolver::{resolve, ResolvedTarget};
pub use state::{FailureKind, LaunchError, LaunchState};
