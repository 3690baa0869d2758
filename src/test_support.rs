//! Hand-written collaborator fakes shared by the unit tests.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use tokio::sync::Semaphore;

use crate::card::router::Router;
use crate::error::{AppError, Result};
use crate::platform::types::*;
use crate::platform::{ConversationCreator, RepositoryDirectory};
use crate::task::{TaskDescriptor, TaskType};

pub fn default_task() -> TaskDescriptor {
    TaskDescriptor {
        git_provider: GitProvider::Github,
        issue_number: 123,
        repo_full_name: "repo1".to_string(),
        task_type: TaskType::MergeConflicts,
        title: "Task 1".to_string(),
    }
}

pub fn repo(id: &str, full_name: &str, git_provider: GitProvider) -> Repository {
    Repository {
        id: id.to_string(),
        full_name: full_name.to_string(),
        git_provider,
        is_public: true,
    }
}

pub fn default_repositories() -> Vec<Repository> {
    vec![
        repo("1", "repo1", GitProvider::Github),
        repo("2", "repo2", GitProvider::Github),
        repo("3", "repo3", GitProvider::Gitlab),
        repo("4", "repo4", GitProvider::Gitlab),
    ]
}

pub fn conversation(id: &str) -> Conversation {
    let at = Utc.with_ymd_and_hms(2023, 1, 1, 0, 0, 0).unwrap();
    Conversation {
        conversation_id: id.to_string(),
        title: "Test Conversation".to_string(),
        selected_repository: Some("repo1".to_string()),
        selected_branch: Some("main".to_string()),
        git_provider: Some(GitProvider::Github),
        last_updated_at: at,
        created_at: at,
        status: ConversationStatus::Running,
        runtime_status: Some("STATUS$READY".to_string()),
        url: None,
        session_api_key: None,
    }
}

/// Holds a fake's call open until the test releases it.
#[derive(Clone)]
pub struct Gate(Arc<Semaphore>);

impl Gate {
    pub fn new() -> Self {
        Self(Arc::new(Semaphore::new(0)))
    }

    pub fn release(&self) {
        self.0.add_permits(1);
    }

    async fn pass(&self) {
        self.0.acquire().await.unwrap().forget();
    }
}

pub struct FakeDirectory {
    response: std::result::Result<Vec<Repository>, String>,
    gate: Option<Gate>,
    calls: AtomicUsize,
}

impl FakeDirectory {
    pub fn with(repositories: Vec<Repository>) -> Self {
        Self {
            response: Ok(repositories),
            gate: None,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn failing(detail: &str) -> Self {
        Self {
            response: Err(detail.to_string()),
            gate: None,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn gated(mut self, gate: &Gate) -> Self {
        self.gate = Some(gate.clone());
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl RepositoryDirectory for FakeDirectory {
    async fn retrieve_user_repositories(&self) -> Result<Vec<Repository>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(gate) = &self.gate {
            gate.pass().await;
        }
        self.response.clone().map_err(AppError::Backend)
    }
}

pub struct FakeCreator {
    response: std::result::Result<Conversation, String>,
    gate: Option<Gate>,
    requests: Mutex<Vec<CreateConversation>>,
}

impl FakeCreator {
    pub fn returning(conversation_id: &str) -> Self {
        Self {
            response: Ok(conversation(conversation_id)),
            gate: None,
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn failing(detail: &str) -> Self {
        Self {
            response: Err(detail.to_string()),
            gate: None,
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn gated(mut self, gate: &Gate) -> Self {
        self.gate = Some(gate.clone());
        self
    }

    pub fn requests(&self) -> Vec<CreateConversation> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl ConversationCreator for FakeCreator {
    async fn create_conversation(&self, request: &CreateConversation) -> Result<Conversation> {
        self.requests.lock().unwrap().push(request.clone());
        if let Some(gate) = &self.gate {
            gate.pass().await;
        }
        self.response.clone().map_err(AppError::Backend)
    }
}

#[derive(Default)]
pub struct RecordingRouter {
    paths: Mutex<Vec<String>>,
}

impl RecordingRouter {
    pub fn paths(&self) -> Vec<String> {
        self.paths.lock().unwrap().clone()
    }
}

impl Router for RecordingRouter {
    fn navigate_to(&self, path: &str) {
        self.paths.lock().unwrap().push(path.to_string());
    }
}
