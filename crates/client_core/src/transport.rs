use async_trait::async_trait;
use reqwest::{header::CONTENT_TYPE, redirect, Client};
use shared::protocol::RequestBody;
use tracing::{debug, warn};

use crate::config::ClientConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Request {
    pub method: Method,
    pub path: String,
    /// Query params, each already formatted as `key=value`.
    pub params: Vec<String>,
    pub body: Option<RequestBody>,
}

impl Request {
    pub fn get(path: impl Into<String>) -> Self {
        Self {
            method: Method::Get,
            path: path.into(),
            params: Vec::new(),
            body: None,
        }
    }

    pub fn post(path: impl Into<String>, body: impl Into<RequestBody>) -> Self {
        Self {
            method: Method::Post,
            path: path.into(),
            params: Vec::new(),
            body: Some(body.into()),
        }
    }

    pub fn with_params<I, S>(mut self, params: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.params.extend(params.into_iter().map(Into::into));
        self
    }
}

/// Result of exactly one outbound call. There are no retries and no timeout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportOutcome {
    Success { status: u16, body: String },
    /// `status` is `None` when no response arrived at all.
    Failure { status: Option<u16> },
}

pub fn is_success_status(status: u16) -> bool {
    (200..400).contains(&status)
}

impl TransportOutcome {
    pub fn from_response(status: u16, body: impl Into<String>) -> Self {
        if is_success_status(status) {
            Self::Success {
                status,
                body: body.into(),
            }
        } else {
            Self::Failure {
                status: Some(status),
            }
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }
}

#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: &Request) -> TransportOutcome;
}

pub struct HttpTransport {
    http: Client,
    config: ClientConfig,
}

impl HttpTransport {
    pub fn new(config: ClientConfig) -> Result<Self, reqwest::Error> {
        // 3xx answers are successes in their own right and must not be chased.
        let http = Client::builder().redirect(redirect::Policy::none()).build()?;
        Ok(Self { http, config })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&self, request: &Request) -> TransportOutcome {
        let url = self.config.endpoint(&request.path, &request.params);
        let mut builder = match request.method {
            Method::Get => self.http.get(url.clone()),
            Method::Post => self.http.post(url.clone()),
        };
        if let Some(body) = &request.body {
            builder = builder
                .header(CONTENT_TYPE, body.content_type())
                .body(body.encode());
        }

        let response = match builder.send().await {
            Ok(response) => response,
            Err(error) => {
                warn!(method = ?request.method, %url, %error, "request got no response");
                return TransportOutcome::Failure { status: None };
            }
        };

        let status = response.status().as_u16();
        debug!(method = ?request.method, %url, status, "request completed");
        if !is_success_status(status) {
            return TransportOutcome::Failure {
                status: Some(status),
            };
        }

        match response.text().await {
            Ok(body) => TransportOutcome::Success { status, body },
            Err(error) => {
                // The server answered, so keep its status for classification.
                warn!(%url, status, %error, "response body could not be read");
                TransportOutcome::Failure {
                    status: Some(status),
                }
            }
        }
    }
}
