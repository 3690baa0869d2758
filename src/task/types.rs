use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::platform::types::GitProvider;

/// Kind of work a suggested task asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TaskType {
    MergeConflicts,
    FailingChecks,
    UnresolvedComments,
    OpenIssue,
    OpenPr,
}

impl TaskType {
    /// Wire representation, e.g. `MERGE_CONFLICTS`.
    pub fn as_str(self) -> &'static str {
        match self {
            TaskType::MergeConflicts => "MERGE_CONFLICTS",
            TaskType::FailingChecks => "FAILING_CHECKS",
            TaskType::UnresolvedComments => "UNRESOLVED_COMMENTS",
            TaskType::OpenIssue => "OPEN_ISSUE",
            TaskType::OpenPr => "OPEN_PR",
        }
    }

    /// Human-readable label shown on a task card.
    pub fn label(self) -> &'static str {
        match self {
            TaskType::MergeConflicts => "Merge Conflicts",
            TaskType::FailingChecks => "Failing Checks",
            TaskType::UnresolvedComments => "Unresolved Comments",
            TaskType::OpenIssue => "Open Issue",
            TaskType::OpenPr => "Open Pull Request",
        }
    }
}

impl fmt::Display for TaskType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TaskType {
    type Err = ParseValueError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().replace('-', "_").as_str() {
            "MERGE_CONFLICTS" => Ok(TaskType::MergeConflicts),
            "FAILING_CHECKS" => Ok(TaskType::FailingChecks),
            "UNRESOLVED_COMMENTS" => Ok(TaskType::UnresolvedComments),
            "OPEN_ISSUE" => Ok(TaskType::OpenIssue),
            "OPEN_PR" => Ok(TaskType::OpenPr),
            _ => Err(ParseValueError::new("task type", s)),
        }
    }
}

/// A value that could not be parsed from user or config input.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown {kind}: {value}")]
pub struct ParseValueError {
    kind: &'static str,
    value: String,
}

impl ParseValueError {
    pub fn new(kind: &'static str, value: &str) -> Self {
        Self {
            kind,
            value: value.to_string(),
        }
    }
}

/// A suggested unit of work surfaced to the user.
///
/// Created by the suggestion feed and never mutated afterwards; the launch
/// workflow only ever borrows it or passes a copy through as launch context.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskDescriptor {
    pub git_provider: GitProvider,
    pub issue_number: u64,
    /// Full name of the repository, e.g. `owner/name`.
    #[serde(rename = "repo")]
    pub repo_full_name: String,
    pub task_type: TaskType,
    pub title: String,
}

impl TaskDescriptor {
    /// Issue reference as displayed on a card: `#<issue_number>`.
    pub fn issue_id(&self) -> String {
        format!("#{}", self.issue_number)
    }

    pub fn description(&self) -> String {
        format!(
            "{} {} on {} ({})",
            self.task_type.label(),
            self.issue_id(),
            self.repo_full_name,
            self.git_provider
        )
    }
}
