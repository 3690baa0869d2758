use crate::platform::types::{GitProvider, Repository};
use crate::task::TaskDescriptor;

/// Repository a launch is aimed at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedTarget {
    pub repo_full_name: String,
    pub git_provider: GitProvider,
}

impl From<&Repository> for ResolvedTarget {
    fn from(repo: &Repository) -> Self {
        Self {
            repo_full_name: repo.full_name.clone(),
            git_provider: repo.git_provider,
        }
    }
}

/// Pick the repository a task refers to.
///
/// Candidates are the records whose `full_name` equals the task's repository
/// exactly (case-sensitive). Among several candidates the one on the task's
/// provider wins; if none or several are on that provider, the first in the
/// order supplied by the caller is used. Returns `None` when nothing matches.
pub fn resolve(task: &TaskDescriptor, repositories: &[Repository]) -> Option<ResolvedTarget> {
    let mut candidates = repositories
        .iter()
        .filter(|repo| repo.full_name == task.repo_full_name);

    let first = candidates.next()?;
    let chosen = std::iter::once(first)
        .chain(candidates)
        .find(|repo| repo.git_provider == task.git_provider)
        .unwrap_or(first);

    Some(ResolvedTarget::from(chosen))
}
