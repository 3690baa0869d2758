//! Suggested-task cards and the workflow that launches a conversation from
//! one: resolve the task's repository, create the conversation, navigate to it.

pub mod card;
pub mod config;
pub mod error;
pub mod launch;
pub mod platform;
pub mod shutdown;
pub mod task;

#[cfg(test)]
mod test_support;
