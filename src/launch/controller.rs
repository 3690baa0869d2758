use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio::sync::watch;

use crate::platform::types::CreateConversation;
use crate::platform::{ConversationCreator, RepositoryDirectory};
use crate::task::TaskDescriptor;

use super::resolver;
use super::state::{LaunchError, LaunchState};

/// Result of one call to [`LaunchController::launch`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LaunchOutcome {
    /// Another launch was already in flight; nothing was done.
    Ignored,
    /// The owning view detached before the attempt settled.
    Discarded,
    Succeeded { conversation_id: String },
    Failed(LaunchError),
}

/// Drives one task card's launch action through its state machine.
///
/// Every write to the state goes through [`LaunchController::transition`],
/// which rejects edges the state machine does not allow and drops all writes
/// once the owning view has detached.
pub struct LaunchController {
    directory: Arc<dyn RepositoryDirectory>,
    creator: Arc<dyn ConversationCreator>,
    state: watch::Sender<LaunchState>,
    detached: AtomicBool,
}

impl LaunchController {
    pub fn new(
        directory: Arc<dyn RepositoryDirectory>,
        creator: Arc<dyn ConversationCreator>,
    ) -> Self {
        let (state, _) = watch::channel(LaunchState::Idle);
        Self {
            directory,
            creator,
            state,
            detached: AtomicBool::new(false),
        }
    }

    pub fn state(&self) -> LaunchState {
        self.state.borrow().clone()
    }

    /// Receiver that observes every published transition.
    pub fn subscribe(&self) -> watch::Receiver<LaunchState> {
        self.state.subscribe()
    }

    /// Called when the owning view goes away. Later transitions are dropped.
    ///
    /// Taken under the channel's lock, so it orders strictly before or after
    /// any in-progress transition.
    pub fn detach(&self) {
        self.state.send_if_modified(|_| {
            self.detached.store(true, Ordering::Release);
            false
        });
    }

    pub fn is_detached(&self) -> bool {
        self.detached.load(Ordering::Acquire)
    }

    /// Return a settled controller to `Idle`. No-op while a launch is pending.
    pub fn reset(&self) -> bool {
        self.transition(LaunchState::Idle)
    }

    /// Launch a conversation for `task`.
    ///
    /// Fetches the user's repositories, resolves the task's repository, and
    /// asks the backend for a new conversation. Failures never escape: they
    /// end in [`LaunchState::Failed`] and are returned as
    /// [`LaunchOutcome::Failed`].
    pub async fn launch(&self, task: &TaskDescriptor) -> LaunchOutcome {
        if let Err(outcome) = self.begin(task) {
            return outcome;
        }
        self.run(task).await
    }

    /// Synchronously claim the launch: moves to `Resolving`.
    ///
    /// Fails with [`LaunchOutcome::Ignored`] while another launch is in
    /// flight and with [`LaunchOutcome::Discarded`] once detached. On success
    /// the caller must follow up with [`LaunchController::run`].
    pub fn begin(&self, task: &TaskDescriptor) -> Result<(), LaunchOutcome> {
        if self.is_detached() {
            return Err(LaunchOutcome::Discarded);
        }

        if !self.transition(LaunchState::Resolving) {
            if self.is_detached() {
                return Err(LaunchOutcome::Discarded);
            }
            tracing::debug!(task = %task.description(), "Launch already in flight, ignoring");
            return Err(LaunchOutcome::Ignored);
        }

        tracing::info!(task = %task.description(), "Launching suggested task");
        Ok(())
    }

    /// Finish a launch claimed by [`LaunchController::begin`].
    pub async fn run(&self, task: &TaskDescriptor) -> LaunchOutcome {
        let repositories = match self.directory.retrieve_user_repositories().await {
            Ok(repositories) => repositories,
            Err(e) => {
                return self.fail(LaunchError::DirectoryUnavailable {
                    detail: e.to_string(),
                })
            }
        };

        let Some(target) = resolver::resolve(task, &repositories) else {
            return self.fail(LaunchError::RepositoryNotFound {
                repo: task.repo_full_name.clone(),
                provider: task.git_provider,
            });
        };

        if !self.transition(LaunchState::Launching) {
            return LaunchOutcome::Discarded;
        }

        let request =
            CreateConversation::for_suggested_task(&target.repo_full_name, target.git_provider, task);

        match self.creator.create_conversation(&request).await {
            Ok(conversation) => {
                let conversation_id = conversation.conversation_id;
                if self.transition(LaunchState::Succeeded {
                    conversation_id: conversation_id.clone(),
                }) {
                    tracing::info!(
                        repo = %target.repo_full_name,
                        conversation = %conversation_id,
                        "Conversation created"
                    );
                    LaunchOutcome::Succeeded { conversation_id }
                } else {
                    LaunchOutcome::Discarded
                }
            }
            Err(e) => self.fail(LaunchError::CreationError {
                detail: e.to_string(),
            }),
        }
    }

    fn fail(&self, error: LaunchError) -> LaunchOutcome {
        if !self.transition(LaunchState::Failed(error.clone())) {
            return LaunchOutcome::Discarded;
        }
        tracing::warn!(kind = ?error.kind(), error = %error, "Launch failed");
        LaunchOutcome::Failed(error)
    }

    /// Apply `next` if the current state allows it and the view is attached.
    ///
    /// The detached flag, the edge check, and the write all happen under the
    /// channel's lock, so two concurrent launches cannot both leave a settled
    /// state and nothing is written after [`LaunchController::detach`].
    fn transition(&self, next: LaunchState) -> bool {
        self.state.send_if_modified(|current| {
            if self.is_detached() {
                tracing::debug!(to = next.name(), "View detached, discarding transition");
                return false;
            }

            if !current.can_transition_to(&next) {
                tracing::debug!(
                    from = current.name(),
                    to = next.name(),
                    "Rejected launch state transition"
                );
                return false;
            }

            tracing::debug!(from = current.name(), to = next.name(), "Launch state transition");
            *current = next;
            true
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::launch::state::FailureKind;
    use crate::platform::types::GitProvider;
    use crate::test_support::*;
    use pretty_assertions::assert_eq;

    fn controller(directory: &Arc<FakeDirectory>, creator: &Arc<FakeCreator>) -> LaunchController {
        LaunchController::new(directory.clone(), creator.clone())
    }

    #[tokio::test]
    async fn test_happy_path() {
        let directory = Arc::new(FakeDirectory::with(default_repositories()));
        let creator = Arc::new(FakeCreator::returning("test-conversation-id"));
        let controller = controller(&directory, &creator);

        let outcome = controller.launch(&default_task()).await;

        assert_eq!(
            outcome,
            LaunchOutcome::Succeeded {
                conversation_id: "test-conversation-id".to_string()
            }
        );
        assert_eq!(
            controller.state(),
            LaunchState::Succeeded {
                conversation_id: "test-conversation-id".to_string()
            }
        );
        assert_eq!(directory.calls(), 1);
        assert_eq!(creator.requests().len(), 1);
    }

    #[tokio::test]
    async fn test_creation_arguments() {
        let directory = Arc::new(FakeDirectory::with(default_repositories()));
        let creator = Arc::new(FakeCreator::returning("c1"));
        let controller = controller(&directory, &creator);

        controller.launch(&default_task()).await;

        assert_eq!(
            creator.requests(),
            vec![CreateConversation {
                repository: "repo1".to_string(),
                git_provider: GitProvider::Github,
                selected_branch: None,
                suggested_task: Some(default_task()),
                initial_user_msg: None,
                image_urls: None,
                replay_json: None,
            }]
        );
    }

    #[tokio::test]
    async fn test_uses_resolved_provider() {
        let directory = Arc::new(FakeDirectory::with(vec![repo(
            "9",
            "repo1",
            GitProvider::Gitlab,
        )]));
        let creator = Arc::new(FakeCreator::returning("c1"));
        let controller = controller(&directory, &creator);

        controller.launch(&default_task()).await;

        let requests = creator.requests();
        assert_eq!(requests[0].git_provider, GitProvider::Gitlab);
        assert_eq!(
            requests[0].suggested_task.as_ref().map(|t| t.git_provider),
            Some(GitProvider::Github)
        );
    }

    #[tokio::test]
    async fn test_directory_failure() {
        let directory = Arc::new(FakeDirectory::failing("network down"));
        let creator = Arc::new(FakeCreator::returning("c1"));
        let controller = controller(&directory, &creator);

        let outcome = controller.launch(&default_task()).await;

        let LaunchOutcome::Failed(error) = outcome else {
            panic!("expected failure, got {outcome:?}");
        };
        assert_eq!(error.kind(), FailureKind::DirectoryUnavailable);
        assert!(error.to_string().contains("network down"));
        assert!(creator.requests().is_empty());
        assert_eq!(controller.state(), LaunchState::Failed(error));
    }

    #[tokio::test]
    async fn test_repository_not_found() {
        let directory = Arc::new(FakeDirectory::with(vec![repo(
            "2",
            "repo2",
            GitProvider::Github,
        )]));
        let creator = Arc::new(FakeCreator::returning("c1"));
        let controller = controller(&directory, &creator);

        let outcome = controller.launch(&default_task()).await;

        assert_eq!(
            outcome,
            LaunchOutcome::Failed(LaunchError::RepositoryNotFound {
                repo: "repo1".to_string(),
                provider: GitProvider::Github,
            })
        );
        assert!(creator.requests().is_empty());
    }

    #[tokio::test]
    async fn test_creation_failure_keeps_detail() {
        let directory = Arc::new(FakeDirectory::with(default_repositories()));
        let creator = Arc::new(FakeCreator::failing("quota exceeded"));
        let controller = controller(&directory, &creator);

        controller.launch(&default_task()).await;

        let LaunchState::Failed(error) = controller.state() else {
            panic!("expected failed state");
        };
        assert_eq!(error.kind(), FailureKind::CreationError);
        assert!(error.to_string().contains("quota exceeded"));
    }

    #[tokio::test]
    async fn test_reentrant_launch_is_ignored_while_resolving() {
        let gate = Gate::new();
        let directory = Arc::new(FakeDirectory::with(default_repositories()).gated(&gate));
        let creator = Arc::new(FakeCreator::returning("c1"));
        let controller = controller(&directory, &creator);
        let task = default_task();
        let mut states = controller.subscribe();

        let (first, second) = tokio::join!(controller.launch(&task), async {
            states.wait_for(|s| *s == LaunchState::Resolving).await.unwrap();
            let second = controller.launch(&task).await;
            gate.release();
            second
        });

        assert_eq!(second, LaunchOutcome::Ignored);
        assert!(matches!(first, LaunchOutcome::Succeeded { .. }));
        assert_eq!(directory.calls(), 1);
        assert_eq!(creator.requests().len(), 1);
    }

    #[tokio::test]
    async fn test_reentrant_launch_is_ignored_while_launching() {
        let gate = Gate::new();
        let directory = Arc::new(FakeDirectory::with(default_repositories()));
        let creator = Arc::new(FakeCreator::returning("c1").gated(&gate));
        let controller = controller(&directory, &creator);
        let task = default_task();
        let mut states = controller.subscribe();

        let (first, second) = tokio::join!(controller.launch(&task), async {
            states.wait_for(|s| *s == LaunchState::Launching).await.unwrap();
            let second = controller.launch(&task).await;
            gate.release();
            second
        });

        assert_eq!(second, LaunchOutcome::Ignored);
        assert!(matches!(first, LaunchOutcome::Succeeded { .. }));
        assert_eq!(creator.requests().len(), 1);
    }

    #[tokio::test]
    async fn test_retry_after_failure() {
        let directory = Arc::new(FakeDirectory::with(vec![]));
        let creator = Arc::new(FakeCreator::returning("c1"));
        let controller = controller(&directory, &creator);

        let first = controller.launch(&default_task()).await;
        let second = controller.launch(&default_task()).await;

        assert!(matches!(first, LaunchOutcome::Failed(_)));
        assert!(matches!(second, LaunchOutcome::Failed(_)));
        assert_eq!(directory.calls(), 2);
    }

    #[tokio::test]
    async fn test_detach_discards_in_flight_attempt() {
        let gate = Gate::new();
        let directory = Arc::new(FakeDirectory::with(default_repositories()).gated(&gate));
        let creator = Arc::new(FakeCreator::returning("c1"));
        let controller = controller(&directory, &creator);
        let task = default_task();
        let mut states = controller.subscribe();

        let (outcome, _) = tokio::join!(controller.launch(&task), async {
            states.wait_for(|s| *s == LaunchState::Resolving).await.unwrap();
            controller.detach();
            gate.release();
        });

        assert_eq!(outcome, LaunchOutcome::Discarded);
        assert_eq!(controller.state(), LaunchState::Resolving);
        assert!(creator.requests().is_empty());
    }

    #[test]
    fn test_begin_claims_launch_synchronously() {
        let directory = Arc::new(FakeDirectory::with(default_repositories()));
        let creator = Arc::new(FakeCreator::returning("c1"));
        let controller = controller(&directory, &creator);

        assert_eq!(controller.begin(&default_task()), Ok(()));
        assert_eq!(controller.state(), LaunchState::Resolving);
        assert_eq!(controller.begin(&default_task()), Err(LaunchOutcome::Ignored));
        assert_eq!(directory.calls(), 0);
    }

    #[test]
    fn test_begin_after_detach_is_discarded() {
        let directory = Arc::new(FakeDirectory::with(default_repositories()));
        let creator = Arc::new(FakeCreator::returning("c1"));
        let controller = controller(&directory, &creator);

        controller.detach();

        assert_eq!(controller.begin(&default_task()), Err(LaunchOutcome::Discarded));
        assert_eq!(controller.state(), LaunchState::Idle);
    }

    #[tokio::test]
    async fn test_failure_after_detach_is_discarded() {
        let gate = Gate::new();
        let directory = Arc::new(FakeDirectory::failing("network down").gated(&gate));
        let creator = Arc::new(FakeCreator::returning("c1"));
        let controller = controller(&directory, &creator);
        let task = default_task();
        let mut states = controller.subscribe();

        let (outcome, _) = tokio::join!(controller.launch(&task), async {
            states.wait_for(|s| *s == LaunchState::Resolving).await.unwrap();
            controller.detach();
            gate.release();
        });

        assert_eq!(outcome, LaunchOutcome::Discarded);
        assert_eq!(controller.state(), LaunchState::Resolving);
    }

    #[tokio::test]
    async fn test_launch_after_detach_does_nothing() {
        let directory = Arc::new(FakeDirectory::with(default_repositories()));
        let creator = Arc::new(FakeCreator::returning("c1"));
        let controller = controller(&directory, &creator);

        controller.detach();

        assert_eq!(controller.launch(&default_task()).await, LaunchOutcome::Discarded);
        assert_eq!(directory.calls(), 0);
    }

    #[tokio::test]
    async fn test_reset() {
        let directory = Arc::new(FakeDirectory::failing("down"));
        let creator = Arc::new(FakeCreator::returning("c1"));
        let controller = controller(&directory, &creator);

        assert!(!controller.reset());
        controller.launch(&default_task()).await;
        assert!(controller.reset());
        assert_eq!(controller.state(), LaunchState::Idle);
    }
}
