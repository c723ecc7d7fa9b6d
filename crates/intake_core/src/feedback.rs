//! Transient notifications: one visible at a time, self-dismissing.

use std::{sync::Arc, time::Duration};

use shared::domain::NotificationId;
use tokio::{sync::Mutex, time::sleep};
use tracing::debug;

use crate::host::IntakeHost;

pub const DISPLAY_WINDOW: Duration = Duration::from_secs(5);
pub const DISMISS_ANIMATION: Duration = Duration::from_millis(300);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Severity {
    #[default]
    Error,
    Success,
}

impl Severity {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Error => "error",
            Self::Success => "success",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub id: NotificationId,
    pub message: String,
    pub severity: Severity,
}

#[derive(Debug, Default)]
struct FeedbackState {
    next_id: u64,
    visible: Option<NotificationId>,
}

pub struct NotificationCenter {
    host: Arc<dyn IntakeHost>,
    state: Arc<Mutex<FeedbackState>>,
}

impl NotificationCenter {
    pub fn new(host: Arc<dyn IntakeHost>) -> Self {
        Self {
            host,
            state: Arc::new(Mutex::new(FeedbackState::default())),
        }
    }

    /// Replaces whatever notification is visible and schedules the dismissal
    /// of the new one.
    pub async fn show(&self, message: impl Into<String>, severity: Severity) -> NotificationId {
        let notification = {
            let mut state = self.state.lock().await;
            if let Some(previous) = state.visible.take() {
                self.host.remove_notification(previous);
            }
            state.next_id += 1;
            let notification = Notification {
                id: NotificationId(state.next_id),
                message: message.into(),
                severity,
            };
            state.visible = Some(notification.id);
            self.host.show_notification(&notification);
            notification
        };
        debug!(
            id = notification.id.0,
            severity = notification.severity.as_str(),
            "notification shown"
        );

        self.schedule_dismiss(notification.id);
        notification.id
    }

    #[cfg(test)]
    pub(crate) async fn visible(&self) -> Option<NotificationId> {
        self.state.lock().await.visible
    }

    fn schedule_dismiss(&self, id: NotificationId) {
        let state = Arc::clone(&self.state);
        let host = Arc::clone(&self.host);

        tokio::spawn(async move {
            sleep(DISPLAY_WINDOW).await;
            if state.lock().await.visible != Some(id) {
                return;
            }
            host.begin_dismiss(id);

            sleep(DISMISS_ANIMATION).await;
            let mut guard = state.lock().await;
            // A newer notification may have replaced this one mid-animation.
            if guard.visible == Some(id) {
                guard.visible = None;
                host.remove_notification(id);
            }
        });
    }
}

#[cfg(test)]
#[path = "tests/feedback_tests.rs"]
mod tests;
