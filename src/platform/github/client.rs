use async_trait::async_trait;
use octocrab::Octocrab;

use crate::config::GitHubConfig;
use crate::error::{AppError, Result};
use crate::platform::types::Repository;
use crate::platform::RepositoryDirectory;

use super::mapper;

const PER_PAGE: u8 = 100;

/// Repository directory backed by the GitHub REST API.
///
/// Lists every repository the configured token's user can access.
pub struct GitHubDirectory {
    client: Octocrab,
}

impl GitHubDirectory {
    pub fn new(config: &GitHubConfig) -> Result<Self> {
        if config.token.trim().is_empty() {
            return Err(AppError::Config("GitHub token is empty".to_string()));
        }

        let client = Octocrab::builder()
            .personal_token(config.token.clone())
            .build()
            .map_err(|e| AppError::GitHubApi(format!("Failed to build octocrab client: {e}")))?;

        Ok(Self { client })
    }
}

#[async_trait]
impl RepositoryDirectory for GitHubDirectory {
    async fn retrieve_user_repositories(&self) -> Result<Vec<Repository>> {
        let first_page = self
            .client
            .current()
            .list_repos_for_authenticated_user()
            .per_page(PER_PAGE)
            .send()
            .await?;

        let all = self.client.all_pages(first_page).await?;
        let fetched = all.len();

        let repositories: Vec<Repository> =
            all.into_iter().filter_map(mapper::map_repository).collect();

        tracing::debug!(
            fetched = fetched,
            valid = repositories.len(),
            "Retrieved GitHub repositories"
        );

        Ok(repositories)
    }
}
