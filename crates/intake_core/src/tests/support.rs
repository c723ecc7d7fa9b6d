use std::{
    collections::HashMap,
    sync::{Arc, Mutex as StdMutex},
};

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use shared::{
    domain::{CalculatorId, NotificationId},
    protocol::UploadPdfResponse,
};
use tokio::sync::{oneshot, Mutex};

use crate::{
    feedback::Notification,
    file_list::FileEntry,
    host::IntakeHost,
    transport::{IntakeTransport, UploadRequest},
    validator::CandidateFile,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum HostEvent {
    Shown(Notification),
    Dismissing(NotificationId),
    Removed(NotificationId),
    FileList(Vec<String>),
    ComputeEnabled(bool),
    DropHighlight(bool),
    Document(String),
}

#[derive(Default)]
pub(crate) struct RecordingHost {
    events: StdMutex<Vec<HostEvent>>,
}

impl RecordingHost {
    fn push(&self, event: HostEvent) {
        self.events.lock().expect("host events").push(event);
    }

    pub(crate) fn events(&self) -> Vec<HostEvent> {
        self.events.lock().expect("host events").clone()
    }

    pub(crate) fn visible_notifications(&self) -> Vec<Notification> {
        let mut visible: Vec<Notification> = Vec::new();
        for event in self.events() {
            match event {
                HostEvent::Shown(notification) => visible.push(notification),
                HostEvent::Removed(id) => visible.retain(|n| n.id != id),
                _ => {}
            }
        }
        visible
    }

    pub(crate) fn removals_of(&self, id: NotificationId) -> usize {
        self.events()
            .iter()
            .filter(|event| **event == HostEvent::Removed(id))
            .count()
    }

    pub(crate) fn compute_enabled(&self) -> Option<bool> {
        self.events().into_iter().rev().find_map(|event| match event {
            HostEvent::ComputeEnabled(enabled) => Some(enabled),
            _ => None,
        })
    }

    pub(crate) fn last_file_list(&self) -> Option<Vec<String>> {
        self.events().into_iter().rev().find_map(|event| match event {
            HostEvent::FileList(names) => Some(names),
            _ => None,
        })
    }

    pub(crate) fn documents(&self) -> Vec<String> {
        self.events()
            .into_iter()
            .filter_map(|event| match event {
                HostEvent::Document(html) => Some(html),
                _ => None,
            })
            .collect()
    }
}

impl IntakeHost for RecordingHost {
    fn show_notification(&self, notification: &Notification) {
        self.push(HostEvent::Shown(notification.clone()));
    }

    fn begin_dismiss(&self, id: NotificationId) {
        self.push(HostEvent::Dismissing(id));
    }

    fn remove_notification(&self, id: NotificationId) {
        self.push(HostEvent::Removed(id));
    }

    fn render_file_list(&self, entries: &[FileEntry]) {
        self.push(HostEvent::FileList(
            entries.iter().map(|entry| entry.name.clone()).collect(),
        ));
    }

    fn set_compute_enabled(&self, enabled: bool) {
        self.push(HostEvent::ComputeEnabled(enabled));
    }

    fn set_drop_highlight(&self, active: bool) {
        self.push(HostEvent::DropHighlight(active));
    }

    fn render_document(&self, html: &str) {
        self.push(HostEvent::Document(html.to_string()));
    }
}

pub(crate) type ScriptedReply<T> = std::result::Result<T, String>;

/// Transport whose replies are released by the test, keyed by file name, so
/// completion order is under the test's control.
#[derive(Default)]
pub(crate) struct ScriptedTransport {
    pub(crate) uploads: Mutex<Vec<(String, Option<CalculatorId>)>>,
    upload_gates: Mutex<HashMap<String, oneshot::Receiver<ScriptedReply<UploadPdfResponse>>>>,
    pub(crate) computes: Mutex<Vec<CalculatorId>>,
    compute_gate: Mutex<Option<oneshot::Receiver<ScriptedReply<String>>>>,
}

impl ScriptedTransport {
    pub(crate) fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub(crate) async fn gate_upload(
        &self,
        file_name: &str,
    ) -> oneshot::Sender<ScriptedReply<UploadPdfResponse>> {
        let (tx, rx) = oneshot::channel();
        self.upload_gates
            .lock()
            .await
            .insert(file_name.to_string(), rx);
        tx
    }

    pub(crate) async fn gate_compute(&self) -> oneshot::Sender<ScriptedReply<String>> {
        let (tx, rx) = oneshot::channel();
        *self.compute_gate.lock().await = Some(rx);
        tx
    }
}

#[async_trait]
impl IntakeTransport for ScriptedTransport {
    async fn upload_pdf(&self, request: UploadRequest) -> Result<UploadPdfResponse> {
        self.uploads
            .lock()
            .await
            .push((request.file.name.clone(), request.calculator_id.clone()));
        let gate = self
            .upload_gates
            .lock()
            .await
            .remove(&request.file.name)
            .ok_or_else(|| anyhow!("no scripted reply for {}", request.file.name))?;
        gate.await
            .map_err(|_| anyhow!("scripted reply dropped"))?
            .map_err(|err| anyhow!(err))
    }

    async fn compute(&self, calculator_id: &CalculatorId) -> Result<String> {
        self.computes.lock().await.push(calculator_id.clone());
        let gate = self
            .compute_gate
            .lock()
            .await
            .take()
            .ok_or_else(|| anyhow!("no scripted compute reply"))?;
        gate.await
            .map_err(|_| anyhow!("scripted reply dropped"))?
            .map_err(|err| anyhow!(err))
    }
}

pub(crate) fn issued(calculator_id: &str) -> ScriptedReply<UploadPdfResponse> {
    Ok(UploadPdfResponse {
        message: Some("PDF uploaded successfully".to_string()),
        calculator_id: Some(CalculatorId::new(calculator_id)),
    })
}

pub(crate) fn pdf(name: &str, size_bytes: usize) -> CandidateFile {
    CandidateFile::new(name, "application/pdf", vec![b'%'; size_bytes])
}
