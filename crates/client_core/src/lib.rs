pub mod config;
pub mod console;
pub mod history;
pub mod probe;
pub mod status;
pub mod tracker;
pub mod transport;

pub use config::{load_settings, ClientConfig, ConfigError};
pub use console::{ConsoleError, ConsoleSession};
pub use history::CommandHistory;
pub use probe::{Reachability, ReachabilityProbe, TransportProbe};
pub use status::{RenderMode, ResponseRecord, StatusCode};
pub use tracker::{
    OverlapPolicy, RequestId, RequestTracker, ResponseTransform, SendOutcome, TrackerError,
    TrackerState, TransformOutcome,
};
pub use transport::{HttpTransport, Method, Request, Transport, TransportOutcome};
