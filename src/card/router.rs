/// Page navigation, owned by whatever hosts the task cards.
pub trait Router: Send + Sync {
    fn navigate_to(&self, path: &str);
}

/// Path of the view that shows a conversation.
pub fn conversation_path(conversation_id: &str) -> String {
    format!("/conversations/{}", urlencoding::encode(conversation_id))
}

/// Router for terminal hosts: reports the full URL of the destination.
pub struct ConsoleRouter {
    base_url: String,
}

impl ConsoleRouter {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn url_for(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }
}

impl Router for ConsoleRouter {
    fn navigate_to(&self, path: &str) {
        let url = self.url_for(path);
        tracing::info!(url = %url, "Opening conversation");
        println!("{url}");
    }
}
