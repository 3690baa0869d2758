pub mod router;

use std::fmt;
use std::sync::Arc;

use tokio::task::JoinHandle;

use crate::launch::{LaunchController, LaunchOutcome, LaunchState};
use crate::platform::{ConversationCreator, RepositoryDirectory};
use crate::task::TaskDescriptor;

use router::{conversation_path, Router};

pub const LAUNCH_LABEL: &str = "Launch";
pub const LOADING_LABEL: &str = "Loading...";

/// What a task card shows for a given launch state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskCardView {
    /// `#<issue_number>`
    pub task_id: String,
    pub title: String,
    pub repo: String,
    pub task_type: &'static str,
    pub launch_label: &'static str,
    pub launch_disabled: bool,
    pub failure: Option<String>,
}

impl TaskCardView {
    pub fn new(task: &TaskDescriptor, state: &LaunchState) -> Self {
        let pending = state.is_pending();
        let failure = match state {
            LaunchState::Failed(error) => Some(error.to_string()),
            _ => None,
        };

        Self {
            task_id: task.issue_id(),
            title: task.title.clone(),
            repo: task.repo_full_name.clone(),
            task_type: task.task_type.label(),
            launch_label: if pending { LOADING_LABEL } else { LAUNCH_LABEL },
            launch_disabled: pending,
            failure,
        }
    }
}

impl fmt::Display for TaskCardView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} [{}] {} ({})",
            self.task_id, self.title, self.task_type, self.repo, self.launch_label
        )?;
        if let Some(failure) = &self.failure {
            write!(f, " ! {failure}")?;
        }
        Ok(())
    }
}

/// A suggested task with a launch control bound to its own controller.
///
/// Dropping the card detaches the controller, so a launch still in flight
/// neither updates state nor navigates.
pub struct TaskCard {
    task: TaskDescriptor,
    controller: Arc<LaunchController>,
    router: Arc<dyn Router>,
}

impl TaskCard {
    pub fn new(
        task: TaskDescriptor,
        directory: Arc<dyn RepositoryDirectory>,
        creator: Arc<dyn ConversationCreator>,
        router: Arc<dyn Router>,
    ) -> Self {
        Self {
            task,
            controller: Arc::new(LaunchController::new(directory, creator)),
            router,
        }
    }

    pub fn task(&self) -> &TaskDescriptor {
        &self.task
    }

    pub fn controller(&self) -> &LaunchController {
        &self.controller
    }

    pub fn render(&self) -> TaskCardView {
        TaskCardView::new(&self.task, &self.controller.state())
    }

    /// Handle a click on the launch control.
    ///
    /// Returns `None` when the control is disabled. Otherwise the card is
    /// already showing its loading state when this returns; the rest of the
    /// workflow runs in the background and navigates to the new conversation
    /// on success.
    pub fn click_launch(&self) -> Option<JoinHandle<LaunchOutcome>> {
        if self.render().launch_disabled {
            tracing::debug!(task = %self.task.description(), "Launch control disabled");
            return None;
        }

        if let Err(outcome) = self.controller.begin(&self.task) {
            tracing::debug!(task = %self.task.description(), outcome = ?outcome, "Launch not started");
            return None;
        }

        let controller = Arc::clone(&self.controller);
        let router = Arc::clone(&self.router);
        let task = self.task.clone();

        Some(tokio::spawn(async move {
            let outcome = controller.run(&task).await;
            if let LaunchOutcome::Succeeded { conversation_id } = &outcome {
                router.navigate_to(&conversation_path(conversation_id));
            }
            outcome
        }))
    }
}

impl Drop for TaskCard {
    fn drop(&mut self) {
        self.controller.detach();
    }
}
