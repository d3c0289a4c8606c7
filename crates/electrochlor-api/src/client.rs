// Electrochlor HTTP client
//
// Wraps `reqwest::Client` with the device's two operations: fetching the
// status document and posting a single-field multipart command. Envelope
// unwrapping and device-error detection happen here so callers only ever
// see a normalized `Payload` or a typed `Error`.

use std::time::Duration;

use reqwest::StatusCode;
use serde_json::Value;
use tracing::{debug, trace};

use crate::endpoint::DeviceEndpoint;
use crate::error::Error;
use crate::payload::{Payload, coerce_bool};
use crate::transport::TransportConfig;

/// Longest body excerpt carried in error messages.
const BODY_PREVIEW_LEN: usize = 200;

/// Top-level fields carried over when the `result` envelope is unwrapped.
const METADATA_KEYS: [&str; 2] = ["model", "version"];

/// Raw HTTP client for an Electrochlor controller.
///
/// Stateless with respect to the device address: every call takes the
/// [`DeviceEndpoint`] so the owner can re-point it without rebuilding the
/// connection pool.
#[derive(Debug, Clone)]
pub struct ElectrochlorClient {
    http: reqwest::Client,
    timeout: Duration,
}

impl ElectrochlorClient {
    /// Create a new client from a `TransportConfig`.
    pub fn new(transport: &TransportConfig) -> Result<Self, Error> {
        Ok(Self {
            http: transport.build_client()?,
            timeout: transport.timeout,
        })
    }

    /// Create a client with a pre-built `reqwest::Client`.
    ///
    /// `timeout` is only used to label timeout errors; the client's own
    /// configuration decides when a request is abandoned.
    pub fn with_client(http: reqwest::Client, timeout: Duration) -> Self {
        Self { http, timeout }
    }

    /// The per-request timeout this client was built with.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    // ── Status ───────────────────────────────────────────────────────

    /// Fetch and normalize the device's status document.
    ///
    /// Returns the `result` object when present, otherwise the whole body.
    /// A truthy top-level `error` flag is reported as
    /// [`Error::DeviceReported`] rather than a payload.
    pub async fn fetch_status(&self, endpoint: &DeviceEndpoint) -> Result<Payload, Error> {
        let url = endpoint.status_url()?;
        debug!("GET {}", url);

        let resp = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(Error::Http {
                status: status.as_u16(),
                body: preview(&body).to_owned(),
            });
        }

        let body = resp.text().await.map_err(|e| self.transport_error(e))?;
        trace!(bytes = body.len(), "status body received");

        parse_status(&body)
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Post `value=true|false` as `multipart/form-data` to a command path.
    ///
    /// Only HTTP 200 counts as accepted.
    pub async fn send_command(
        &self,
        endpoint: &DeviceEndpoint,
        command: &str,
        value: bool,
    ) -> Result<(), Error> {
        let url = endpoint.command_url(command)?;
        debug!(value, "POST {}", url);

        let form = reqwest::multipart::Form::new().text("value", value.to_string());
        let resp = self
            .http
            .post(url)
            .multipart(form)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        let status = resp.status();
        if status != StatusCode::OK {
            let body = resp.text().await.unwrap_or_default();
            return Err(Error::Http {
                status: status.as_u16(),
                body: preview(body.trim()).to_owned(),
            });
        }
        Ok(())
    }

    fn transport_error(&self, err: reqwest::Error) -> Error {
        if err.is_timeout() {
            Error::Timeout {
                timeout_secs: self.timeout.as_secs(),
            }
        } else {
            Error::Transport(err)
        }
    }
}

/// Parse a status body into a normalized payload.
///
/// Device metadata (`model`, `version`) sent beside `result` is merged into
/// the unwrapped payload; a same-named field inside `result` wins.
///
/// Exposed for callers that obtain the document some other way (saved
/// captures, fixtures).
pub fn parse_status(body: &str) -> Result<Payload, Error> {
    let value: Value = serde_json::from_str(body).map_err(|e| Error::Deserialization {
        message: format!("{e} (body preview: {:?})", preview(body)),
        body: body.to_owned(),
    })?;

    let Value::Object(mut root) = value else {
        return Err(Error::Deserialization {
            message: "expected a JSON object".into(),
            body: body.to_owned(),
        });
    };

    if root.get("error").is_some_and(coerce_bool) {
        let message = root
            .get("message")
            .and_then(Value::as_str)
            .unwrap_or("error flag set")
            .to_owned();
        return Err(Error::DeviceReported { message });
    }

    if let Some(Value::Object(result)) = root.get_mut("result") {
        let mut payload = std::mem::take(result);
        for key in METADATA_KEYS {
            if let Some(value) = root.remove(key) {
                payload.entry(key).or_insert(value);
            }
        }
        return Ok(payload);
    }
    Ok(root)
}

fn preview(body: &str) -> &str {
    match body.char_indices().nth(BODY_PREVIEW_LEN) {
        Some((idx, _)) => &body[..idx],
        None => body,
    }
}
