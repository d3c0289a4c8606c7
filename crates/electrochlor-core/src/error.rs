// ── Core error types ──
//
// Two layers. `PollError` is the cloneable failure taxonomy the coordinator
// stores next to its cached payload and hands to every reader. `CoreError`
// is what fallible public operations return; consumers never see reqwest
// or JSON errors directly.

use serde::Serialize;
use thiserror::Error;

/// Why the most recent poll did not produce a payload.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PollError {
    #[error("Timed out after {timeout_secs}s waiting for the device")]
    Timeout { timeout_secs: u64 },

    #[error("Cannot reach device at {url}: {message}")]
    Connection { url: String, message: String },

    #[error("Device answered with HTTP {status}")]
    Http { status: u16 },

    #[error("Device sent an unreadable status document: {message}")]
    InvalidBody { message: String },

    #[error("Device reported an error: {message}")]
    DeviceError { message: String },

    #[error("Invalid device endpoint: {message}")]
    InvalidEndpoint { message: String },

    #[error("No poll has completed yet")]
    NotPolled,

    #[error("Coordinator has been shut down")]
    ShutDown,
}

impl PollError {
    /// The device is reachable but flagged its own reading as faulty.
    pub fn is_device_error(&self) -> bool {
        matches!(self, Self::DeviceError { .. })
    }
}

impl From<electrochlor_api::Error> for PollError {
    fn from(err: electrochlor_api::Error) -> Self {
        use electrochlor_api::Error as ApiError;
        let url = request_url(&err);
        match err {
            ApiError::Timeout { timeout_secs } => Self::Timeout { timeout_secs },
            ApiError::Transport(e) => {
                if e.is_timeout() {
                    Self::Timeout { timeout_secs: 0 }
                } else {
                    Self::Connection {
                        url,
                        message: e.to_string(),
                    }
                }
            }
            ApiError::ClientBuild(message) => Self::Connection { url, message },
            ApiError::InvalidUrl(e) => Self::InvalidEndpoint {
                message: e.to_string(),
            },
            ApiError::Http { status, .. } => Self::Http { status },
            ApiError::Deserialization { message, .. } => Self::InvalidBody { message },
            ApiError::DeviceReported { message } => Self::DeviceError { message },
        }
    }
}

const UNKNOWN_URL: &str = "<unknown>";

fn request_url(err: &electrochlor_api::Error) -> String {
    err.url()
        .map_or_else(|| UNKNOWN_URL.into(), ToString::to_string)
}

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Device errors ────────────────────────────────────────────────
    #[error("Cannot connect to device at {url}: {reason}")]
    ConnectionFailed { url: String, reason: String },

    #[error("Device did not answer within {timeout_secs}s")]
    Timeout { timeout_secs: u64 },

    #[error("Device error: {message}")]
    Device {
        message: String,
        /// HTTP status code (if applicable).
        status: Option<u16>,
    },

    #[error("Device sent an invalid response: {message}")]
    InvalidResponse { message: String },

    // ── Entity errors ────────────────────────────────────────────────
    #[error("Unknown {kind} '{key}'")]
    UnknownEntity { kind: &'static str, key: String },

    // ── Lifecycle errors ─────────────────────────────────────────────
    #[error("Coordinator has been shut down")]
    ShutDown,

    // ── Configuration errors ─────────────────────────────────────────
    #[error("Configuration error: {message}")]
    Config { message: String },
}

// ── Conversion from transport-layer errors ───────────────────────────

impl From<electrochlor_api::Error> for CoreError {
    fn from(err: electrochlor_api::Error) -> Self {
        use electrochlor_api::Error as ApiError;
        let url = request_url(&err);
        match err {
            ApiError::Transport(e) => {
                if e.is_timeout() {
                    CoreError::Timeout { timeout_secs: 0 }
                } else {
                    CoreError::ConnectionFailed {
                        url,
                        reason: e.to_string(),
                    }
                }
            }
            ApiError::Timeout { timeout_secs } => CoreError::Timeout { timeout_secs },
            ApiError::InvalidUrl(e) => CoreError::Config {
                message: format!("Invalid URL: {e}"),
            },
            ApiError::ClientBuild(message) => CoreError::Config { message },
            ApiError::Http { status, body } => CoreError::Device {
                message: if body.is_empty() {
                    format!("HTTP {status}")
                } else {
                    format!("HTTP {status}: {body}")
                },
                status: Some(status),
            },
            ApiError::Deserialization { message, body: _ } => {
                CoreError::InvalidResponse { message }
            }
            ApiError::DeviceReported { message } => CoreError::Device {
                message,
                status: None,
            },
        }
    }
}

impl From<PollError> for CoreError {
    fn from(err: PollError) -> Self {
        match err {
            PollError::Timeout { timeout_secs } => CoreError::Timeout { timeout_secs },
            PollError::Connection { url, message } => CoreError::ConnectionFailed {
                url,
                reason: message,
            },
            PollError::Http { status } => CoreError::Device {
                message: format!("HTTP {status}"),
                status: Some(status),
            },
            PollError::InvalidBody { message } => CoreError::InvalidResponse { message },
            PollError::DeviceError { message } => CoreError::Device {
                message,
                status: None,
            },
            PollError::InvalidEndpoint { message } => CoreError::Config { message },
            PollError::NotPolled => CoreError::Device {
                message: "no status received yet".into(),
                status: None,
            },
            PollError::ShutDown => CoreError::ShutDown,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn connection_failure_keeps_endpoint_url() {
        let poll = PollError::Connection {
            url: "http://pool.local:90/electrochlor".into(),
            message: "connection refused".into(),
        };
        let err = CoreError::from(poll);
        assert_eq!(
            err.to_string(),
            "Cannot connect to device at http://pool.local:90/electrochlor: connection refused"
        );
    }

    #[test]
    fn device_error_is_not_a_connection_failure() {
        let poll = PollError::DeviceError {
            message: "error flag set".into(),
        };
        assert!(poll.is_device_error());
        assert!(matches!(CoreError::from(poll), CoreError::Device { status: None, .. }));
    }
}
