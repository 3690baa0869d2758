use crate::platform::types::{GitProvider, Repository};

/// Map an octocrab repository to a directory record.
///
/// Returns `None` for repositories without a full name, which GitHub only
/// omits for partial payloads.
pub fn map_repository(repo: octocrab::models::Repository) -> Option<Repository> {
    to_record(repo.id.into_inner(), repo.full_name, repo.private)
}

fn to_record(id: u64, full_name: Option<String>, private: Option<bool>) -> Option<Repository> {
    let full_name = full_name.filter(|name| !name.is_empty())?;
    Some(Repository {
        id: id.to_string(),
        full_name,
        git_provider: GitProvider::Github,
        is_public: !private.unwrap_or(false),
    })
}
