//! Shared request lifecycle: issue a call, classify the outcome, and on
//! failure probe the server before settling on an error classification.

use std::{future::Future, sync::Arc};

use serde_json::Value;
use thiserror::Error;
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::{
    probe::{Reachability, ReachabilityProbe},
    status::{RenderMode, ResponseRecord, StatusCode},
    transport::{Request, Transport, TransportOutcome},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RequestId(u64);

/// Result of a caller-supplied response transform.
#[derive(Debug, Clone, PartialEq)]
pub enum TransformOutcome {
    Apply(Value),
    /// The caller has issued a superseding request; leave state untouched.
    Abandon,
}

pub type ResponseTransform = Box<dyn FnOnce(Value) -> TransformOutcome + Send>;

/// Which completion is allowed to write the shared state when requests overlap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OverlapPolicy {
    /// Only the most recently issued request may update state.
    #[default]
    LastIssuedWins,
    /// Every completion writes state, so the one that finishes last wins.
    LastCompletedWins,
}

impl OverlapPolicy {
    fn admits(self, state: &TrackerState, id: RequestId) -> bool {
        match self {
            Self::LastIssuedWins => state.latest == Some(id),
            Self::LastCompletedWins => true,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SendOutcome {
    Completed(Value),
    Abandoned,
    /// A newer request was issued before this one completed.
    Superseded,
}

#[derive(Debug, Error)]
pub enum TrackerError {
    #[error("server is unreachable")]
    Unreachable,
    #[error("server returned HTTP {status}")]
    ServerError { status: u16 },
    #[error("server returned HTTP {status} with a body that is not JSON: {source}")]
    MalformedResponse {
        status: u16,
        source: serde_json::Error,
    },
}

impl TrackerError {
    /// Value recorded in [`ResponseRecord::error_info`] for this error.
    pub fn error_info(&self) -> Option<u16> {
        match self {
            Self::Unreachable => None,
            Self::ServerError { status } | Self::MalformedResponse { status, .. } => Some(*status),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct TrackerState {
    status: StatusCode,
    record: ResponseRecord,
    issued: u64,
    latest: Option<RequestId>,
}

impl TrackerState {
    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn record(&self) -> &ResponseRecord {
        &self.record
    }

    pub fn latest_request(&self) -> Option<RequestId> {
        self.latest
    }

    pub fn render_mode(&self) -> RenderMode {
        RenderMode::from_state(self.status, &self.record)
    }
}

#[derive(Clone)]
pub struct RequestTracker {
    transport: Arc<dyn Transport>,
    probe: Arc<dyn ReachabilityProbe>,
    policy: OverlapPolicy,
    state: Arc<watch::Sender<TrackerState>>,
}

impl RequestTracker {
    pub fn new(transport: Arc<dyn Transport>, probe: Arc<dyn ReachabilityProbe>) -> Self {
        let (state, _) = watch::channel(TrackerState::default());
        Self {
            transport,
            probe,
            policy: OverlapPolicy::default(),
            state: Arc::new(state),
        }
    }

    pub fn with_overlap_policy(mut self, policy: OverlapPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn overlap_policy(&self) -> OverlapPolicy {
        self.policy
    }

    pub fn snapshot(&self) -> TrackerState {
        self.state.borrow().clone()
    }

    pub fn status(&self) -> StatusCode {
        self.state.borrow().status
    }

    pub fn record(&self) -> ResponseRecord {
        self.state.borrow().record.clone()
    }

    pub fn render_mode(&self) -> RenderMode {
        self.state.borrow().render_mode()
    }

    /// Observes every state transition of this tracker.
    pub fn subscribe(&self) -> watch::Receiver<TrackerState> {
        self.state.subscribe()
    }

    /// Marks the tracker `Loading` immediately and returns the future that
    /// performs the request. Awaiting or spawning it is up to the caller.
    pub fn send(
        &self,
        request: Request,
    ) -> impl Future<Output = Result<SendOutcome, TrackerError>> + Send + 'static {
        self.send_with(request, Box::new(TransformOutcome::Apply))
    }

    pub fn send_with(
        &self,
        request: Request,
        transform: ResponseTransform,
    ) -> impl Future<Output = Result<SendOutcome, TrackerError>> + Send + 'static {
        let id = self.begin();
        let tracker = self.clone();
        async move { tracker.drive(id, request, transform).await }
    }

    fn begin(&self) -> RequestId {
        let mut id = RequestId(0);
        self.state.send_modify(|state| {
            state.issued += 1;
            id = RequestId(state.issued);
            state.latest = Some(id);
            state.status = StatusCode::Loading;
        });
        debug!(request_id = id.0, "request issued");
        id
    }

    fn apply(&self, id: RequestId, update: impl FnOnce(&mut TrackerState)) -> bool {
        let policy = self.policy;
        self.state.send_if_modified(|state| {
            if !policy.admits(state, id) {
                return false;
            }
            update(state);
            true
        })
    }

    fn is_current(&self, id: RequestId) -> bool {
        self.policy.admits(&self.state.borrow(), id)
    }

    async fn drive(
        self,
        id: RequestId,
        request: Request,
        transform: ResponseTransform,
    ) -> Result<SendOutcome, TrackerError> {
        match self.transport.send(&request).await {
            TransportOutcome::Success { status, body } => self.complete(id, status, &body, transform),
            TransportOutcome::Failure { status } => self.fail(id, status).await,
        }
    }

    fn complete(
        &self,
        id: RequestId,
        status: u16,
        body: &str,
        transform: ResponseTransform,
    ) -> Result<SendOutcome, TrackerError> {
        let payload = if body.is_empty() {
            Value::Object(Default::default())
        } else {
            match serde_json::from_str(body) {
                Ok(payload) => payload,
                Err(source) => {
                    // The server answered, so there is nothing to probe.
                    let applied = self.apply(id, |state| {
                        state.status = StatusCode::Failed;
                        state.record = ResponseRecord::failure(Some(status));
                    });
                    if !applied {
                        return Ok(SendOutcome::Superseded);
                    }
                    warn!(request_id = id.0, status, %source, "response body is not valid JSON");
                    return Err(TrackerError::MalformedResponse { status, source });
                }
            }
        };

        if !self.is_current(id) {
            debug!(request_id = id.0, "dropping superseded response");
            return Ok(SendOutcome::Superseded);
        }

        let value = match transform(payload) {
            TransformOutcome::Apply(value) => value,
            TransformOutcome::Abandon => {
                debug!(request_id = id.0, "response transform abandoned the update");
                return Ok(SendOutcome::Abandoned);
            }
        };

        let applied = self.apply(id, |state| {
            state.status = StatusCode::Idle;
            state.record = ResponseRecord::success(value.clone());
        });
        if applied {
            Ok(SendOutcome::Completed(value))
        } else {
            Ok(SendOutcome::Superseded)
        }
    }

    async fn fail(&self, id: RequestId, status: Option<u16>) -> Result<SendOutcome, TrackerError> {
        let applied = self.apply(id, |state| {
            state.status = StatusCode::Failed;
            state.record = ResponseRecord::failure(None);
        });
        if !applied {
            debug!(request_id = id.0, ?status, "dropping superseded failure");
            return Ok(SendOutcome::Superseded);
        }
        info!(request_id = id.0, ?status, "request failed, probing server");

        let reachability = self.probe.probe().await;
        match (reachability, status) {
            (Reachability::Reachable, Some(status)) => {
                let applied = self.apply(id, |state| {
                    state.status = StatusCode::Failed;
                    state.record = ResponseRecord::failure(Some(status));
                });
                if !applied {
                    return Ok(SendOutcome::Superseded);
                }
                warn!(request_id = id.0, status, "server reachable but request failed");
                Err(TrackerError::ServerError { status })
            }
            _ => {
                if !self.is_current(id) {
                    return Ok(SendOutcome::Superseded);
                }
                warn!(request_id = id.0, ?reachability, "server unreachable");
                Err(TrackerError::Unreachable)
            }
        }
    }
}

#[cfg(test)]
#[path = "tests/tracker_tests.rs"]
mod tests;
