//! Cloudflare v4 API access

use std::fmt::Write as _;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Method;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use thiserror::Error;
use tracing::debug;

use crate::credentials::Credentials;
use crate::types::Dns01Error;

const USER_AGENT: &str = concat!("cfsolver/", env!("CARGO_PKG_VERSION"));

/// One entry of the `errors` array of a v4 response
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CloudflareError {
    pub code: u32,
    pub message: String,
    #[serde(default)]
    pub error_chain: Vec<CloudflareError>,
}

#[derive(Debug, Deserialize)]
struct CloudflareResponse {
    #[serde(default)]
    success: bool,
    #[serde(default)]
    errors: Vec<CloudflareError>,
    #[serde(default)]
    result: Option<Value>,
}

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("while querying the Cloudflare API for {method} {uri:?}: {source}")]
    Transport {
        method: Method,
        uri: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("while querying the Cloudflare API for {method} {uri:?}{}", render_errors(.errors))]
    Provider {
        method: Method,
        uri: String,
        errors: Vec<CloudflareError>,
    },

    #[error("while querying the Cloudflare API for {method} {uri:?}: unexpected HTTP status {status}")]
    Status {
        method: Method,
        uri: String,
        status: u16,
    },

    #[error("while decoding the Cloudflare API response for {method} {uri:?}: {source}")]
    Decode {
        method: Method,
        uri: String,
        #[source]
        source: serde_json::Error,
    },
}

impl ApiError {
    /// A provider-side error carrying a single code and message
    pub fn provider(method: Method, uri: &str, code: u32, message: &str) -> Self {
        Self::Provider {
            method,
            uri: uri.to_string(),
            errors: vec![CloudflareError {
                code,
                message: message.to_string(),
                error_chain: Vec::new(),
            }],
        }
    }
}

fn render_errors(errors: &[CloudflareError]) -> String {
    let mut out = String::new();
    for err in errors {
        let _ = write!(out, "\n\t Error: {}: {}", err.code, err.message);
        for chained in &err.error_chain {
            let _ = write!(out, "<- {}: {}", chained.code, chained.message);
        }
    }
    out
}

/// Decodes the `result` member of a response into `T`
pub fn decode_result<T: DeserializeOwned>(
    method: &Method,
    uri: &str,
    result: Value,
) -> Result<T, ApiError> {
    serde_json::from_value(result).map_err(|source| ApiError::Decode {
        method: method.clone(),
        uri: uri.to_string(),
        source,
    })
}

/// Authenticated access to the Cloudflare API.
///
/// `uri` is relative to the API base (e.g. `/zones?name=example.com`). On success the
/// `result` member of the response envelope is returned, `Value::Null` when absent.
#[async_trait]
pub trait CloudflareApi: Send + Sync {
    async fn make_request(
        &self,
        method: Method,
        uri: &str,
        body: Option<Value>,
    ) -> Result<Value, ApiError>;
}

/// reqwest-backed [`CloudflareApi`]
#[derive(Debug, Clone)]
pub struct CloudflareClient {
    http: reqwest::Client,
    base_url: String,
    credentials: Credentials,
}

impl CloudflareClient {
    pub fn new(
        credentials: Credentials,
        base_url: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, Dns01Error> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| Dns01Error::Config(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            credentials,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[async_trait]
impl CloudflareApi for CloudflareClient {
    async fn make_request(
        &self,
        method: Method,
        uri: &str,
        body: Option<Value>,
    ) -> Result<Value, ApiError> {
        let url = format!("{}{}", self.base_url, uri);
        debug!(method = %method, uri, "Querying Cloudflare API");

        let mut request = self.credentials.apply(self.http.request(method.clone(), &url));
        if let Some(body) = body {
            request = request.json(&body);
        }

        let transport = |source| ApiError::Transport {
            method: method.clone(),
            uri: uri.to_string(),
            source,
        };

        let resp = request.send().await.map_err(transport)?;
        let status = resp.status();
        let bytes = resp.bytes().await.map_err(transport)?;

        let envelope: CloudflareResponse = match serde_json::from_slice(&bytes) {
            Ok(envelope) => envelope,
            Err(_) if !status.is_success() => {
                return Err(ApiError::Status {
                    method,
                    uri: uri.to_string(),
                    status: status.as_u16(),
                });
            }
            Err(source) => {
                return Err(ApiError::Decode {
                    method,
                    uri: uri.to_string(),
                    source,
                });
            }
        };

        if !envelope.success {
            debug!(method = %method, uri, status = %status, "Cloudflare API reported failure");
            if envelope.errors.is_empty() && !status.is_success() {
                return Err(ApiError::Status {
                    method,
                    uri: uri.to_string(),
                    status: status.as_u16(),
                });
            }
            return Err(ApiError::Provider {
                method,
                uri: uri.to_string(),
                errors: envelope.errors,
            });
        }

        Ok(envelope.result.unwrap_or(Value::Null))
    }
}
