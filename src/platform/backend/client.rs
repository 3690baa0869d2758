use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;

use crate::config::BackendConfig;
use crate::error::{AppError, Result};
use crate::platform::types::*;
use crate::platform::{ConversationCreator, RepositoryDirectory, SuggestedTaskSource};
use crate::task::TaskDescriptor;

use super::mapper::{self, ApiRepository};

const REPOSITORIES_PATH: &str = "/api/user/repositories";
const CONVERSATIONS_PATH: &str = "/api/conversations";
const SUGGESTED_TASKS_PATH: &str = "/api/user/suggested-tasks";

/// HTTP client for the conversation backend.
pub struct BackendClient {
    client: Client,
    base_url: String,
    api_key: Option<String>,
}

impl BackendClient {
    pub fn new(config: &BackendConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.api_key {
            Some(key) => request.bearer_auth(key),
            None => request,
        }
    }

    async fn read_json<T: DeserializeOwned>(response: Response) -> Result<T> {
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::Backend(format!("API returned {status}: {body}")));
        }

        Ok(response.json::<T>().await?)
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let response = self
            .authorize(self.client.get(self.url(path)))
            .send()
            .await?;
        Self::read_json(response).await
    }
}

#[async_trait]
impl RepositoryDirectory for BackendClient {
    async fn retrieve_user_repositories(&self) -> Result<Vec<Repository>> {
        let raw: Vec<ApiRepository> = self.get_json(REPOSITORIES_PATH).await?;
        let fetched = raw.len();
        let repositories = mapper::map_repositories(raw);

        tracing::debug!(
            fetched = fetched,
            valid = repositories.len(),
            "Retrieved user repositories"
        );

        Ok(repositories)
    }
}

#[async_trait]
impl ConversationCreator for BackendClient {
    async fn create_conversation(&self, request: &CreateConversation) -> Result<Conversation> {
        tracing::info!(
            repo = %request.repository,
            provider = %request.git_provider,
            "Creating conversation"
        );

        let response = self
            .authorize(self.client.post(self.url(CONVERSATIONS_PATH)))
            .json(request)
            .send()
            .await?;

        let conversation: Conversation = Self::read_json(response).await?;
        mapper::validate_conversation(conversation)
    }
}

#[async_trait]
impl SuggestedTaskSource for BackendClient {
    async fn suggested_tasks(&self) -> Result<Vec<TaskDescriptor>> {
        self.get_json(SUGGESTED_TASKS_PATH).await
    }
}
