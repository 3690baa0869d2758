use serde::Deserialize;

use crate::error::{AppError, Result};
use crate::platform::types::{Conversation, GitProvider, Repository};

/// Repository as returned by the backend, before validation.
///
/// Ids arrive as numbers from some providers and as strings from others.
/// Every field tolerates being missing or null so that one malformed row is
/// rejected by [`map_repository`] instead of failing the whole list.
#[derive(Debug, Deserialize)]
pub struct ApiRepository {
    #[serde(default)]
    pub id: serde_json::Value,
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default)]
    pub git_provider: Option<String>,
    #[serde(default)]
    pub is_public: Option<bool>,
}

/// Validate a backend repository record.
pub fn map_repository(raw: ApiRepository) -> Result<Repository> {
    let id = match raw.id {
        serde_json::Value::String(s) if !s.is_empty() => s,
        serde_json::Value::Number(n) => n.to_string(),
        other => {
            return Err(AppError::InvalidPayload(format!(
                "Repository id must be a string or number, got {other}"
            )))
        }
    };

    let full_name = raw.full_name.unwrap_or_default();
    if full_name.is_empty() {
        return Err(AppError::InvalidPayload(format!(
            "Repository {id} has no full_name"
        )));
    }

    let git_provider = raw
        .git_provider
        .as_deref()
        .ok_or_else(|| AppError::InvalidPayload(format!("Repository {id} has no git_provider")))?
        .parse::<GitProvider>()
        .map_err(|e| AppError::InvalidPayload(format!("Repository {id}: {e}")))?;

    Ok(Repository {
        id,
        full_name,
        git_provider,
        is_public: raw.is_public.unwrap_or_default(),
    })
}

/// Map a list of backend repositories, skipping records that fail validation.
pub fn map_repositories(raw: Vec<ApiRepository>) -> Vec<Repository> {
    raw.into_iter()
        .filter_map(|repo| match map_repository(repo) {
            Ok(repo) => Some(repo),
            Err(e) => {
                tracing::warn!(error = %e, "Skipping invalid repository record");
                None
            }
        })
        .collect()
}

pub fn validate_conversation(conversation: Conversation) -> Result<Conversation> {
    if conversation.conversation_id.trim().is_empty() {
        return Err(AppError::InvalidPayload(
            "Conversation response has an empty conversation_id".to_string(),
        ));
    }
    Ok(conversation)
}
