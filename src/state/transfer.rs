//! Transfer-related application state
//!
//! Uploads and downloads run one at a time on the tokio runtime and are
//! polled each frame, the same way listings are. A finished download also
//! asks the app to refresh the local list, since the directory contents
//! just changed.

use eframe::egui;
use std::path::PathBuf;
use tokio::task::JoinHandle;

use crate::service::{ServiceClient, ServiceError};
use crate::state::StateEvent;
use crate::task::{poll_task, PollResult};

/// Transfer state; at most one upload or download in flight
pub struct TransferState {
    /// Async task for the running transfer
    task: Option<JoinHandle<Result<String, ServiceError>>>,
    /// Description of the running transfer, for the status bar
    pub active: Option<String>,
    /// Whether the finished transfer changed the local directory
    refresh_after: bool,
}

impl Default for TransferState {
    fn default() -> Self {
        Self {
            task: None,
            active: None,
            refresh_after: false,
        }
    }
}

impl TransferState {
    pub fn busy(&self) -> bool {
        self.task.is_some()
    }

    /// Start uploading a local savegame to the service
    pub fn start_upload(
        &mut self,
        client: &ServiceClient,
        path: PathBuf,
        name: String,
    ) -> Option<StateEvent> {
        if self.busy() {
            return Some(StateEvent::StatusMessage(
                "A transfer is already running".to_string(),
            ));
        }

        let message = format!("Uploading {}...", name);
        self.active = Some(message.clone());
        self.refresh_after = false;

        let client = client.clone();
        self.task = Some(tokio::spawn(async move {
            client.upload(&path).await?;
            Ok(format!("Uploaded {}", name))
        }));

        Some(StateEvent::StatusMessage(message))
    }

    /// Start downloading a remote savegame into `dest_dir`
    pub fn start_download(
        &mut self,
        client: &ServiceClient,
        name: String,
        dest_dir: PathBuf,
    ) -> Option<StateEvent> {
        if self.busy() {
            return Some(StateEvent::StatusMessage(
                "A transfer is already running".to_string(),
            ));
        }

        let message = format!("Downloading {}...", name);
        self.active = Some(message.clone());
        self.refresh_after = true;

        let client = client.clone();
        self.task = Some(tokio::spawn(async move {
            let path = client.download(&name, &dest_dir).await?;
            Ok(format!("Downloaded {} to {}", name, path.display()))
        }));

        Some(StateEvent::StatusMessage(message))
    }

    /// Poll the running transfer for completion
    pub fn poll(&mut self, ctx: &egui::Context) -> Vec<StateEvent> {
        let mut events = Vec::new();

        match poll_task(&mut self.task) {
            PollResult::Complete(Ok(Ok(message))) => {
                self.active = None;
                events.push(StateEvent::StatusMessage(message));
                if self.refresh_after {
                    events.push(StateEvent::RefreshLocal);
                }
            }
            PollResult::Complete(Ok(Err(e))) => {
                self.active = None;
                let msg = e.to_string();
                events.push(StateEvent::LogError(format!("Transfer failed: {}", msg)));
                events.push(StateEvent::StatusMessage(format!("Error: {}", msg)));
            }
            PollResult::Complete(Err(e)) => {
                self.active = None;
                events.push(StateEvent::LogError(format!("Task panicked: {}", e)));
            }
            PollResult::Pending => ctx.request_repaint(),
            PollResult::NoTask => {}
        }

        events
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::service::ServiceEndpoint;

    fn test_client() -> ServiceClient {
        let endpoint = ServiceEndpoint::from_candidates(&["127.0.0.1".to_string()], 1).unwrap();
        ServiceClient::new(endpoint).unwrap()
    }

    async fn drain(state: &mut TransferState, ctx: &egui::Context) -> Vec<StateEvent> {
        loop {
            let events = state.poll(ctx);
            if !events.is_empty() {
                return events;
            }
            if !state.busy() {
                return Vec::new();
            }
            tokio::task::yield_now().await;
        }
    }

    #[tokio::test]
    async fn test_failed_upload_reports_error() {
        let ctx = egui::Context::default();
        let mut state = TransferState::default();

        // Fails the allow-list check inside the task, no network involved
        state.start_upload(
            &test_client(),
            PathBuf::from("/tmp/notes.txt"),
            "notes.txt".to_string(),
        );
        assert!(state.busy());

        let events = drain(&mut state, &ctx).await;
        assert!(events
            .iter()
            .any(|e| matches!(e, StateEvent::LogError(m) if m.starts_with("Transfer failed"))));
        assert!(!state.busy());
        assert!(state.active.is_none());
    }

    #[tokio::test]
    async fn test_second_transfer_rejected_while_busy() {
        let ctx = egui::Context::default();
        let mut state = TransferState::default();
        let client = test_client();

        state.start_upload(&client, PathBuf::from("/tmp/a.txt"), "a.txt".to_string());
        let first_active = state.active.clone();

        let event = state.start_download(&client, "GTASAsf1.b".to_string(), PathBuf::from("/tmp"));
        assert!(matches!(
            event,
            Some(StateEvent::StatusMessage(m)) if m.contains("already running")
        ));
        assert_eq!(state.active, first_active);

        drain(&mut state, &ctx).await;
    }
}
