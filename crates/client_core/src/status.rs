//! Lifecycle state of the most recent request on one tracker.

use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StatusCode {
    /// Nothing in flight; the last request (if any) succeeded.
    #[default]
    Idle,
    Loading,
    Failed,
}

/// Outcome of the most recently completed request. A newer completion
/// replaces the whole record.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ResponseRecord {
    /// Parsed body of a successful response.
    pub payload: Option<Value>,
    /// `None` while reachability is unknown or the server could not be
    /// reached, otherwise the HTTP status the server failed with.
    pub error_info: Option<u16>,
}

impl ResponseRecord {
    pub fn success(payload: Value) -> Self {
        Self {
            payload: Some(payload),
            error_info: None,
        }
    }

    pub fn failure(error_info: Option<u16>) -> Self {
        Self {
            payload: None,
            error_info,
        }
    }
}

/// The mutually exclusive views a UI surface picks between.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderMode {
    Ready,
    Loading,
    Unreachable,
    ServerError { status: u16 },
}

impl RenderMode {
    pub fn from_state(status: StatusCode, record: &ResponseRecord) -> Self {
        match status {
            StatusCode::Idle => Self::Ready,
            StatusCode::Loading => Self::Loading,
            StatusCode::Failed => match record.error_info {
                None => Self::Unreachable,
                Some(status) => Self::ServerError { status },
            },
        }
    }

    pub fn banner(&self) -> Option<String> {
        match self {
            Self::Ready => None,
            Self::Loading => Some("loading...".to_string()),
            Self::Unreachable => Some("cannot reach the server".to_string()),
            Self::ServerError { status } => Some(format!(
                "the server reported an error (HTTP {status}); check the server logs"
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn error_info_only_matters_when_failed() {
        let stale = ResponseRecord::failure(Some(500));
        assert_eq!(RenderMode::from_state(StatusCode::Idle, &stale), RenderMode::Ready);
        assert_eq!(
            RenderMode::from_state(StatusCode::Loading, &stale),
            RenderMode::Loading
        );
        assert_eq!(
            RenderMode::from_state(StatusCode::Failed, &stale),
            RenderMode::ServerError { status: 500 }
        );
        assert_eq!(
            RenderMode::from_state(StatusCode::Failed, &ResponseRecord::failure(None)),
            RenderMode::Unreachable
        );
    }

    #[test]
    fn ready_mode_has_no_banner() {
        let record = ResponseRecord::success(json!({}));
        assert_eq!(RenderMode::from_state(StatusCode::Idle, &record).banner(), None);
        assert!(RenderMode::ServerError { status: 503 }
            .banner()
            .expect("banner")
            .contains("503"));
    }
}
