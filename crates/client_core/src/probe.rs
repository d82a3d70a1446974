use std::sync::Arc;

use async_trait::async_trait;
use shared::protocol::HELLO_PATH;
use tracing::debug;

use crate::transport::{Request, Transport};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reachability {
    Reachable,
    Unreachable,
}

/// Secondary check run after a failed request to tell a dead link from a
/// server that answered with an error.
#[async_trait]
pub trait ReachabilityProbe: Send + Sync {
    async fn probe(&self) -> Reachability;
}

/// Single-shot `GET /v1/hello` through the same transport as the failed call.
pub struct TransportProbe {
    transport: Arc<dyn Transport>,
}

impl TransportProbe {
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self { transport }
    }
}

#[async_trait]
impl ReachabilityProbe for TransportProbe {
    async fn probe(&self) -> Reachability {
        let outcome = self.transport.send(&Request::get(HELLO_PATH)).await;
        let reachability = if outcome.is_success() {
            Reachability::Reachable
        } else {
            Reachability::Unreachable
        };
        debug!(?reachability, "reachability probe finished");
        reachability
    }
}
