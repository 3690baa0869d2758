pub mod backend;
pub mod github;
pub mod types;

use async_trait::async_trait;

use crate::error::Result;
use crate::task::TaskDescriptor;
use types::*;

/// Source of the repositories the current user can access.
#[async_trait]
pub trait RepositoryDirectory: Send + Sync {
    /// Fetch every repository visible to the current user.
    ///
    /// Order is preserved from the provider; the resolver uses it as its
    /// last-resort tie-break.
    async fn retrieve_user_repositories(&self) -> Result<Vec<Repository>>;
}

/// Backend that starts new conversations.
#[async_trait]
pub trait ConversationCreator: Send + Sync {
    async fn create_conversation(&self, request: &CreateConversation) -> Result<Conversation>;
}

/// Feed of tasks recommended to the current user.
#[async_trait]
pub trait SuggestedTaskSource: Send + Sync {
    async fn suggested_tasks(&self) -> Result<Vec<TaskDescriptor>>;
}
