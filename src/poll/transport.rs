//! Fetching snapshots from the dataweb service.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use thiserror::Error;
use url::Url;

use crate::logging::ts_epoch_ms;

/// Callback name the service has always been asked to wrap its JSON in.
pub const DEFAULT_CALLBACK: &str = "display_data";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    #[error("request timed out")]
    Timeout,
    #[error("network error: {0}")]
    Network(String),
    #[error("unexpected HTTP status {0}")]
    Status(u16),
    #[error("undecodable body: {0}")]
    Decode(String),
}

impl TransportError {
    pub fn kind(&self) -> &'static str {
        match self {
            TransportError::Timeout => "timeout",
            TransportError::Network(_) => "network",
            TransportError::Status(_) => "status",
            TransportError::Decode(_) => "decode",
        }
    }

    fn from_reqwest(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            TransportError::Timeout
        } else if err.is_decode() {
            TransportError::Decode(err.to_string())
        } else {
            TransportError::Network(err.to_string())
        }
    }
}

/// Source of raw snapshot payloads. `instrument` is the query value, `all`
/// for the fleet.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn fetch(&self, instrument: &str) -> Result<Value, TransportError>;
}

pub struct HttpTransport {
    client: Client,
    base_url: String,
    callback: Option<String>,
}

impl HttpTransport {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> anyhow::Result<Self> {
        Ok(Self {
            client: Client::builder().timeout(timeout).build()?,
            base_url: base_url.into(),
            callback: Some(DEFAULT_CALLBACK.to_string()),
        })
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn fetch(&self, instrument: &str) -> Result<Value, TransportError> {
        let url = request_url(&self.base_url, instrument, self.callback.as_deref(), ts_epoch_ms())?;
        let resp = self
            .client
            .get(url)
            .send()
            .await
            .map_err(TransportError::from_reqwest)?;

        let status = resp.status();
        if !status.is_success() {
            return Err(TransportError::Status(status.as_u16()));
        }

        let body = resp.text().await.map_err(TransportError::from_reqwest)?;
        decode_body(&body, self.callback.as_deref())
    }
}

/// `<base>/?Instrument=<id>[&callback=<cb>]&_=<cache buster>`
pub fn request_url(
    base_url: &str,
    instrument: &str,
    callback: Option<&str>,
    cache_buster: u64,
) -> Result<Url, TransportError> {
    let mut url = Url::parse(base_url).map_err(|e| TransportError::Network(format!("{base_url}: {e}")))?;
    {
        let mut query = url.query_pairs_mut();
        query.append_pair("Instrument", instrument);
        if let Some(cb) = callback {
            query.append_pair("callback", cb);
        }
        query.append_pair("_", &cache_buster.to_string());
    }
    Ok(url)
}

/// Accepts a bare JSON document or one wrapped as `callback(...)`.
pub fn decode_body(body: &str, callback: Option<&str>) -> Result<Value, TransportError> {
    let trimmed = body.trim();
    let json = if trimmed.starts_with('{') || trimmed.starts_with('[') {
        trimmed
    } else {
        unwrap_jsonp(trimmed, callback)?
    };
    serde_json::from_str(json).map_err(|e| TransportError::Decode(e.to_string()))
}

fn unwrap_jsonp<'a>(body: &'a str, callback: Option<&str>) -> Result<&'a str, TransportError> {
    let body = body.strip_suffix(';').unwrap_or(body).trim_end();
    let open = body
        .find('(')
        .ok_or_else(|| TransportError::Decode("neither JSON nor a JSONP call".to_string()))?;
    let name = body[..open].trim();
    if let Some(expected) = callback {
        if name != expected {
            return Err(TransportError::Decode(format!(
                "expected callback {expected}, got {name}"
            )));
        }
    }
    if !name.chars().all(|c| c.is_alphanumeric() || c == '_' || c == '$' || c == '.') {
        return Err(TransportError::Decode(format!("bad callback name {name}")));
    }
    let inner = body[open + 1..]
        .strip_suffix(')')
        .ok_or_else(|| TransportError::Decode("unterminated JSONP call".to_string()))?;
    Ok(inner)
}
