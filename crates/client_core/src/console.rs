//! Console session: the command input and result view surfaces, each
//! backed by its own request tracker.

use std::sync::Arc;

use shared::{
    domain::{LineStyle, ResultEntry},
    error::ProtocolError,
    protocol::{decode_chamber_entries, CHAMBER_PATH, MESSAGE_PATH},
};
use thiserror::Error;
use tracing::{debug, info};

use crate::{
    config::ClientConfig,
    history::CommandHistory,
    probe::TransportProbe,
    status::RenderMode,
    tracker::{RequestTracker, SendOutcome, TrackerError},
    transport::{HttpTransport, Request, Transport},
};

#[derive(Debug, Error)]
pub enum ConsoleError {
    #[error("failed to build http client: {0}")]
    Client(#[from] reqwest::Error),
    #[error(transparent)]
    Request(#[from] TrackerError),
    #[error(transparent)]
    Protocol(#[from] ProtocolError),
}

pub struct ConsoleSession {
    message: RequestTracker,
    chamber: RequestTracker,
    history: CommandHistory,
    results: Vec<ResultEntry>,
}

impl ConsoleSession {
    pub fn connect(config: ClientConfig) -> Result<Self, ConsoleError> {
        info!(base_url = %config.base_url, "starting console session");
        let transport: Arc<dyn Transport> = Arc::new(HttpTransport::new(config)?);
        Ok(Self::with_transport(transport))
    }

    pub fn with_transport(transport: Arc<dyn Transport>) -> Self {
        let probe = Arc::new(TransportProbe::new(transport.clone()));
        Self::with_trackers(
            RequestTracker::new(transport.clone(), probe.clone()),
            RequestTracker::new(transport, probe),
        )
    }

    pub fn with_trackers(message: RequestTracker, chamber: RequestTracker) -> Self {
        Self {
            message,
            chamber,
            history: CommandHistory::new(),
            results: Vec::new(),
        }
    }

    /// Submits a command. Empty input is ignored; anything else lands in the
    /// history as soon as it is sent, whatever the outcome.
    pub async fn execute(&mut self, input: &str) -> Result<Option<SendOutcome>, ConsoleError> {
        if input.is_empty() {
            return Ok(None);
        }
        let pending = self.message.send(Request::post(MESSAGE_PATH, input));
        self.history.submit(input);
        debug!(command = input, "command submitted");
        Ok(Some(pending.await?))
    }

    pub fn recall_last(&self) -> Option<&str> {
        self.history.last_or_none()
    }

    /// Polls for new result entries, appends them and returns the new ones.
    pub async fn update(&mut self) -> Result<Vec<ResultEntry>, ConsoleError> {
        let outcome = self.chamber.send(Request::get(CHAMBER_PATH)).await?;
        let SendOutcome::Completed(payload) = outcome else {
            return Ok(Vec::new());
        };
        let entries = decode_chamber_entries(payload)?;
        if !entries.is_empty() {
            debug!(count = entries.len(), "received result entries");
        }
        self.results.extend(entries.iter().cloned());
        Ok(entries)
    }

    pub fn clear(&mut self) {
        self.results.clear();
    }

    pub fn results(&self) -> &[ResultEntry] {
        &self.results
    }

    pub fn rendered_lines(&self) -> impl Iterator<Item = (LineStyle, &str)> {
        rendered_lines(&self.results)
    }

    pub fn history(&self) -> &CommandHistory {
        &self.history
    }

    pub fn message_mode(&self) -> RenderMode {
        self.message.render_mode()
    }

    pub fn chamber_mode(&self) -> RenderMode {
        self.chamber.render_mode()
    }
}

pub fn rendered_lines(entries: &[ResultEntry]) -> impl Iterator<Item = (LineStyle, &str)> {
    entries
        .iter()
        .filter(|entry| entry.tag.is_rendered())
        .map(|entry| (entry.tag.line_style(), entry.value.as_str()))
}

#[cfg(test)]
#[path = "tests/console_tests.rs"]
mod tests;
