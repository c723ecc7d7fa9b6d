use shared::domain::NotificationId;

use crate::{feedback::Notification, file_list::FileEntry};

/// Presentation surface the controller renders into.
///
/// Calls arrive on the controller's event loop and must not block.
pub trait IntakeHost: Send + Sync {
    fn show_notification(&self, notification: &Notification);

    /// Start the reverse entrance animation; removal follows separately.
    fn begin_dismiss(&self, _id: NotificationId) {}

    fn remove_notification(&self, id: NotificationId);

    fn render_file_list(&self, entries: &[FileEntry]);

    fn set_compute_enabled(&self, enabled: bool);

    fn set_drop_highlight(&self, _active: bool) {}

    /// Replace the current view with server-rendered content.
    fn render_document(&self, html: &str);
}
