//! Upload session controller for the PDF intake form.
//!
//! Candidate files flow through the validator, accepted ones are listed and
//! uploaded concurrently, and every upload completion writes the server-issued
//! `calculator_id` through [`SessionState`]. A separate compute trigger sends
//! the held identifier and renders whatever document the server returns.

use std::{
    fmt,
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
};

use anyhow::anyhow;
use futures::future::join_all;
use shared::domain::{CalculatorId, FileEntryId};
use tokio::{sync::Mutex, task::JoinHandle};
use tracing::{debug, info, warn};

pub mod error;
pub mod feedback;
pub mod file_list;
pub mod host;
pub mod intake;
pub mod session;
pub mod transport;
pub mod validator;

pub use error::{ErrorKind, IntakeError, RejectReason};
pub use feedback::{Notification, NotificationCenter, Severity};
pub use file_list::{FileEntry, FileList};
pub use host::IntakeHost;
pub use intake::IntakeEvent;
pub use session::SessionState;
pub use transport::{HttpIntakeTransport, IntakeEndpoints, IntakeTransport, UploadRequest};
pub use validator::{validate, CandidateFile};

pub const BATCH_ACCEPTED_MESSAGE: &str = "Dosyalar başarıyla yüklendi.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UploadOutcome {
    Uploaded(CalculatorId),
    Failed(IntakeError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComputeOutcome {
    Rendered,
    /// The trigger is disabled because the file list is empty.
    Disabled,
    /// A previous compute request has not completed yet.
    AlreadyInFlight,
}

pub struct PendingUpload {
    pub entry_id: FileEntryId,
    pub file_name: String,
    handle: JoinHandle<UploadOutcome>,
    controller: Arc<UploadSessionController>,
}

impl fmt::Debug for PendingUpload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PendingUpload")
            .field("entry_id", &self.entry_id)
            .field("file_name", &self.file_name)
            .finish_non_exhaustive()
    }
}

impl PendingUpload {
    /// A task that panicked or was aborted is reported like any other failed
    /// upload.
    pub async fn outcome(self) -> UploadOutcome {
        match self.handle.await {
            Ok(outcome) => outcome,
            Err(err) => {
                let error = IntakeError::UploadFailed {
                    file: self.file_name,
                    cause: format!("upload task ended abnormally: {err}"),
                };
                UploadOutcome::Failed(self.controller.report(error).await)
            }
        }
    }
}

#[derive(Debug, Default)]
pub struct IntakeReport {
    pub suppress_default: bool,
    pub rejected: Vec<IntakeError>,
    pub uploads: Vec<PendingUpload>,
}

impl IntakeReport {
    pub fn accepted(&self) -> Vec<FileEntryId> {
        self.uploads.iter().map(|upload| upload.entry_id).collect()
    }

    /// Waits for every upload of the batch, in issue order.
    pub async fn join_uploads(self) -> Vec<UploadOutcome> {
        join_all(self.uploads.into_iter().map(PendingUpload::outcome)).await
    }
}

#[derive(Default)]
struct ControllerState {
    session: SessionState,
    files: FileList,
}

/// Marks a compute request as pending. Dropping it, also when the `compute`
/// future is cancelled mid-request, clears the mark.
struct ComputeInFlight<'a>(&'a AtomicBool);

impl<'a> ComputeInFlight<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self(flag))
    }
}

impl Drop for ComputeInFlight<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

pub struct UploadSessionController {
    transport: Arc<dyn IntakeTransport>,
    host: Arc<dyn IntakeHost>,
    feedback: NotificationCenter,
    inner: Mutex<ControllerState>,
    compute_in_flight: AtomicBool,
}

impl UploadSessionController {
    pub fn new(transport: Arc<dyn IntakeTransport>, host: Arc<dyn IntakeHost>) -> Arc<Self> {
        let controller = Arc::new(Self {
            transport,
            feedback: NotificationCenter::new(Arc::clone(&host)),
            host,
            inner: Mutex::new(ControllerState::default()),
            compute_in_flight: AtomicBool::new(false),
        });
        controller.host.set_compute_enabled(false);
        controller
    }

    pub async fn session_id(&self) -> Option<CalculatorId> {
        self.inner.lock().await.session.current().cloned()
    }

    pub async fn files(&self) -> Vec<FileEntry> {
        self.inner.lock().await.files.entries().to_vec()
    }

    pub async fn compute_enabled(&self) -> bool {
        self.inner.lock().await.files.has_files()
    }

    pub async fn handle_event(self: &Arc<Self>, event: IntakeEvent) -> IntakeReport {
        let suppress_default = event.suppresses_default();
        if let Some(active) = event.drop_highlight() {
            self.host.set_drop_highlight(active);
        }

        let candidates = event.into_candidates();
        let mut report = if candidates.is_empty() {
            IntakeReport::default()
        } else {
            self.handle_files(candidates).await
        };
        report.suppress_default = suppress_default;
        report
    }

    /// Validates the whole batch, then lists and uploads the accepted files
    /// back to back without waiting for earlier uploads to complete.
    pub async fn handle_files(self: &Arc<Self>, candidates: Vec<CandidateFile>) -> IntakeReport {
        let mut report = IntakeReport::default();
        let mut accepted = Vec::with_capacity(candidates.len());

        for file in candidates {
            match validate(&file) {
                Ok(()) => accepted.push(file),
                Err(reason) => {
                    let error = IntakeError::Rejected {
                        file: file.name,
                        reason,
                    };
                    report.rejected.push(self.report(error).await);
                }
            }
        }

        for file in accepted {
            let (entry_id, calculator_id) = {
                let mut inner = self.inner.lock().await;
                let entry_id = inner.files.push(file.name.clone(), file.size_bytes());
                self.host.render_file_list(inner.files.entries());
                (entry_id, inner.session.current().cloned())
            };

            let file_name = file.name.clone();
            let controller = Arc::clone(self);
            let handle = tokio::spawn(async move {
                controller
                    .upload(UploadRequest {
                        file,
                        calculator_id,
                    })
                    .await
            });
            report.uploads.push(PendingUpload {
                entry_id,
                file_name,
                handle,
                controller: Arc::clone(self),
            });
        }

        if !report.uploads.is_empty() {
            self.feedback
                .show(BATCH_ACCEPTED_MESSAGE, Severity::Success)
                .await;
        }
        self.refresh_compute_enabled().await;
        report
    }

    /// Removes one list entry. Its upload, in flight or finished, is left
    /// alone and the session is not rolled back.
    pub async fn remove_file(&self, id: FileEntryId) -> bool {
        let mut inner = self.inner.lock().await;
        let removed = inner.files.remove(id);
        if let Some(entry) = &removed {
            debug!(file = %entry.name, "removed file from list");
            self.host.render_file_list(inner.files.entries());
        }
        self.host.set_compute_enabled(inner.files.has_files());
        removed.is_some()
    }

    pub async fn compute(&self) -> Result<ComputeOutcome, IntakeError> {
        let (calculator_id, in_flight) = {
            let inner = self.inner.lock().await;
            if !inner.files.has_files() {
                return Ok(ComputeOutcome::Disabled);
            }
            let Some(in_flight) = ComputeInFlight::acquire(&self.compute_in_flight) else {
                debug!("compute already in flight; ignoring trigger");
                return Ok(ComputeOutcome::AlreadyInFlight);
            };
            match inner.session.current().cloned() {
                Some(calculator_id) => (calculator_id, in_flight),
                None => {
                    drop(in_flight);
                    drop(inner);
                    return Err(self.report(IntakeError::NoSession).await);
                }
            }
        };

        info!(%calculator_id, "requesting computation");
        let result = self.transport.compute(&calculator_id).await;
        drop(in_flight);

        match result {
            Ok(document) => {
                self.host.render_document(&document);
                Ok(ComputeOutcome::Rendered)
            }
            Err(err) => Err(self.report(IntakeError::ComputeFailed(format!("{err:#}"))).await),
        }
    }

    async fn upload(&self, request: UploadRequest) -> UploadOutcome {
        let file = request.file.name.clone();
        info!(
            file = %file,
            calculator_id = ?request.calculator_id.as_ref().map(CalculatorId::as_str),
            "uploading pdf"
        );

        let result = self.transport.upload_pdf(request).await.and_then(|response| {
            response
                .calculator_id
                .filter(|calculator_id| !calculator_id.is_blank())
                .ok_or_else(|| anyhow!("upload response did not carry a calculator_id"))
        });

        match result {
            Ok(calculator_id) => {
                self.record_upload(calculator_id.clone()).await;
                UploadOutcome::Uploaded(calculator_id)
            }
            Err(err) => {
                let error = IntakeError::UploadFailed {
                    file,
                    cause: format!("{err:#}"),
                };
                UploadOutcome::Failed(self.report(error).await)
            }
        }
    }

    async fn record_upload(&self, calculator_id: CalculatorId) {
        let (previous, writes) = {
            let mut inner = self.inner.lock().await;
            let previous = inner.session.record_upload(calculator_id.clone());
            (previous, inner.session.writes())
        };
        if previous.as_ref() != Some(&calculator_id) {
            info!(
                %calculator_id,
                previous = ?previous.as_ref().map(CalculatorId::as_str),
                writes,
                "calculator session updated"
            );
        } else {
            debug!(%calculator_id, writes, "calculator session confirmed");
        }
    }

    async fn refresh_compute_enabled(&self) {
        let enabled = self.inner.lock().await.files.has_files();
        self.host.set_compute_enabled(enabled);
    }

    async fn report(&self, error: IntakeError) -> IntakeError {
        warn!(kind = error.kind().as_str(), %error, "intake operation failed");
        self.feedback
            .show(error.user_message(), Severity::Error)
            .await;
        error
    }
}

#[cfg(test)]
#[path = "tests/support.rs"]
pub(crate) mod test_support;

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
