use std::{fs, path::PathBuf};

use intake_core::{FileEntry, IntakeHost, Notification};
use shared::domain::NotificationId;
use tracing::{debug, error, info};

/// Renders intake feedback on the terminal. The computed document goes to
/// `output` when set, otherwise to stdout.
pub struct TerminalHost {
    output: Option<PathBuf>,
}

impl TerminalHost {
    pub fn new(output: Option<PathBuf>) -> Self {
        Self { output }
    }
}

impl IntakeHost for TerminalHost {
    fn show_notification(&self, notification: &Notification) {
        eprintln!("{}", format_notification(notification));
    }

    fn remove_notification(&self, id: NotificationId) {
        debug!(notification = id.0, "notification dismissed");
    }

    fn render_file_list(&self, entries: &[FileEntry]) {
        eprintln!("{}", format_file_list(entries));
    }

    fn set_compute_enabled(&self, enabled: bool) {
        debug!(enabled, "compute trigger");
    }

    fn render_document(&self, html: &str) {
        match &self.output {
            Some(path) => match fs::write(path, html) {
                Ok(()) => info!(path = %path.display(), bytes = html.len(), "results written"),
                Err(err) => error!(path = %path.display(), %err, "failed to write results"),
            },
            None => println!("{html}"),
        }
    }
}

fn format_notification(notification: &Notification) -> String {
    format!("[{}] {}", notification.severity.as_str(), notification.message)
}

fn format_file_list(entries: &[FileEntry]) -> String {
    if entries.is_empty() {
        return "files: (none)".to_string();
    }
    let mut out = String::from("files:");
    for entry in entries {
        out.push_str(&format!("\n  #{} {} ({})", entry.id.0, entry.name, entry.display_size()));
    }
    out
}

#[cfg(test)]
mod tests {
    use intake_core::Severity;
    use shared::domain::FileEntryId;

    use super::*;

    #[test]
    fn notifications_are_tagged_with_severity() {
        let notification = Notification {
            id: NotificationId(1),
            message: "Sadece PDF dosyaları yükleyebilirsiniz.".into(),
            severity: Severity::Error,
        };
        assert_eq!(
            format_notification(&notification),
            "[error] Sadece PDF dosyaları yükleyebilirsiniz."
        );
    }

    #[test]
    fn file_list_shows_megabyte_sizes() {
        let entries = vec![
            FileEntry {
                id: FileEntryId(0),
                name: "ocak.pdf".into(),
                size_bytes: 1_048_576,
            },
            FileEntry {
                id: FileEntryId(2),
                name: "subat.pdf".into(),
                size_bytes: 524_288,
            },
        ];
        assert_eq!(
            format_file_list(&entries),
            "files:\n  #0 ocak.pdf (1.00 MB)\n  #2 subat.pdf (0.50 MB)"
        );
        assert_eq!(format_file_list(&[]), "files: (none)");
    }

    #[test]
    fn document_is_written_to_the_output_file() {
        let path = std::env::temp_dir().join(format!("intake_cli_doc_{}.html", std::process::id()));
        let host = TerminalHost::new(Some(path.clone()));
        host.render_document("<p>ok</p>");
        assert_eq!(fs::read_to_string(&path).expect("read"), "<p>ok</p>");
        fs::remove_file(path).expect("cleanup");
    }
}
