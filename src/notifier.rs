use async_trait::async_trait;
use std::sync::{Arc, Mutex};

use crate::models::User;

/// Notifier
///
/// Abstract contract for out-of-band confirmation-code delivery (email in
/// production). Delivery is fire-and-forget: failures are logged by the
/// implementation and never surfaced to the signup caller.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn deliver_confirmation_code(&self, user: &User, code: &str);
}

/// The concrete type used to share the notifier across the application state.
pub type NotifierState = Arc<dyn Notifier>;

/// LogNotifier
///
/// Writes the delivery to the structured log instead of sending mail — the
/// development stand-in for a real mail backend.
#[derive(Clone, Default)]
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn deliver_confirmation_code(&self, user: &User, code: &str) {
        tracing::info!(
            username = %user.username,
            email = %user.email,
            code = %code,
            "confirmation code issued"
        );
    }
}

/// MockNotifier
///
/// Captures deliveries for test assertions, keyed by username.
#[derive(Default)]
pub struct MockNotifier {
    pub sent: Mutex<Vec<(String, String)>>,
}

impl MockNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Last code delivered to the given username, if any.
    pub fn last_code_for(&self, username: &str) -> Option<String> {
        self.sent
            .lock()
            .unwrap()
            .iter()
            .rev()
            .find(|(u, _)| u == username)
            .map(|(_, c)| c.clone())
    }
}

#[async_trait]
impl Notifier for MockNotifier {
    async fn deliver_confirmation_code(&self, user: &User, code: &str) {
        self.sent
            .lock()
            .unwrap()
            .push((user.username.clone(), code.to_string()));
    }
}
