use thiserror::Error;

/// Top-level error type for the `electrochlor-api` crate.
///
/// Covers every failure mode of the device's two HTTP surfaces (status GET
/// and command POST). `electrochlor-core` maps these into the poll failure
/// taxonomy and user-facing diagnostics.
#[derive(Debug, Error)]
pub enum Error {
    // ── Transport ───────────────────────────────────────────────────
    /// HTTP transport error (connection refused, DNS failure, etc.)
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// Request timed out.
    #[error("Request timed out after {timeout_secs}s")]
    Timeout { timeout_secs: u64 },

    /// The HTTP client could not be constructed.
    #[error("Failed to build HTTP client: {0}")]
    ClientBuild(String),

    // ── Device responses ────────────────────────────────────────────
    /// Non-success HTTP status from the device.
    #[error("HTTP {status}: {body}")]
    Http { status: u16, body: String },

    /// Body was not a JSON object, with the raw body for debugging.
    #[error("Deserialization error: {message}")]
    Deserialization { message: String, body: String },

    /// The device answered, but flagged the reading as an error.
    #[error("Device reported an error: {message}")]
    DeviceReported { message: String },
}

impl Error {
    /// Returns `true` if this is a transient error worth retrying.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Transport(e) => e.is_timeout() || e.is_connect(),
            Self::Timeout { .. } => true,
            Self::Http { status, .. } => *status >= 500,
            _ => false,
        }
    }

    /// The HTTP status carried by this error, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Http { status, .. } => Some(*status),
            Self::Transport(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// The request URL a transport failure was raised for.
    pub fn url(&self) -> Option<&url::Url> {
        match self {
            Self::Transport(e) => e.url(),
            _ => None,
        }
    }
}
