use thiserror::Error;

#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("chamber payload is not a list of result entries: {0}")]
    MalformedChamberPayload(#[from] serde_json::Error),
}
