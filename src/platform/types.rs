use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::task::{ParseValueError, TaskDescriptor};

/// Hosting service a repository lives on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GitProvider {
    Github,
    Gitlab,
    Bitbucket,
}

impl GitProvider {
    pub fn as_str(self) -> &'static str {
        match self {
            GitProvider::Github => "github",
            GitProvider::Gitlab => "gitlab",
            GitProvider::Bitbucket => "bitbucket",
        }
    }
}

impl fmt::Display for GitProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for GitProvider {
    type Err = ParseValueError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "github" => Ok(GitProvider::Github),
            "gitlab" => Ok(GitProvider::Gitlab),
            "bitbucket" => Ok(GitProvider::Bitbucket),
            _ => Err(ParseValueError::new("git provider", s)),
        }
    }
}

/// A repository the current user can access.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Repository {
    pub id: String,
    pub full_name: String,
    pub git_provider: GitProvider,
    pub is_public: bool,
}

/// Arguments for creating a conversation.
///
/// Serialized as the request body of the backend's create endpoint; absent
/// fields are omitted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CreateConversation {
    pub repository: String,
    pub git_provider: GitProvider,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub selected_branch: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggested_task: Option<TaskDescriptor>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub initial_user_msg: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_urls: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub replay_json: Option<String>,
}

impl CreateConversation {
    /// Request for launching a suggested task: no branch, the task as launch
    /// context, and none of the message/replay parameters.
    pub fn for_suggested_task(
        repository: &str,
        git_provider: GitProvider,
        task: &TaskDescriptor,
    ) -> Self {
        Self {
            repository: repository.to_string(),
            git_provider,
            selected_branch: None,
            suggested_task: Some(task.clone()),
            initial_user_msg: None,
            image_urls: None,
            replay_json: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ConversationStatus {
    Starting,
    Running,
    Stopped,
    Error,
    #[serde(other)]
    Unknown,
}

/// A conversation (work session) created by the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Conversation {
    pub conversation_id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub selected_repository: Option<String>,
    #[serde(default)]
    pub selected_branch: Option<String>,
    #[serde(default)]
    pub git_provider: Option<GitProvider>,
    pub last_updated_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub status: ConversationStatus,
    #[serde(default)]
    pub runtime_status: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub session_api_key: Option<String>,
}
