//! CLI error types with miette diagnostics.
//!
//! Maps `CoreError` and `ConfigError` variants into user-facing errors with
//! actionable help text.

use miette::Diagnostic;
use thiserror::Error;

use electrochlor_config::ConfigError;
use electrochlor_core::CoreError;

/// Process exit codes.
pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const NOT_FOUND: i32 = 4;
    pub const CONNECTION: i32 = 7;
    pub const TIMEOUT: i32 = 8;
    pub const UNCONFIRMED: i32 = 9;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Connection ───────────────────────────────────────────────────
    #[error("Could not connect to device at {url}")]
    #[diagnostic(
        code(electrochlor::connection_failed),
        help(
            "Check that the controller is powered and on the same network.\n\
             The local API listens on port 90 by default; override with --port."
        )
    )]
    ConnectionFailed {
        url: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("Device did not answer within {seconds}s")]
    #[diagnostic(
        code(electrochlor::timeout),
        help("Increase timeout with --timeout or check the device's Wi-Fi signal.")
    )]
    Timeout { seconds: u64 },

    // ── Device ───────────────────────────────────────────────────────
    #[error("Device error: {message}")]
    #[diagnostic(code(electrochlor::device_error))]
    Device { message: String },

    #[error("Device sent an invalid response: {message}")]
    #[diagnostic(
        code(electrochlor::invalid_response),
        help("Run with -vv to log the request, or `electrochlor raw` to inspect the document.")
    )]
    InvalidResponse { message: String },

    #[error("{switch} did not report {desired} within {seconds}s")]
    #[diagnostic(
        code(electrochlor::unconfirmed),
        help(
            "The command was sent but the device still reports the old state.\n\
             Check the controller, or allow longer with --verify-timeout."
        )
    )]
    Unconfirmed {
        switch: String,
        desired: String,
        seconds: u64,
    },

    #[error("Operation abandoned: {reason}")]
    #[diagnostic(code(electrochlor::cancelled))]
    Cancelled { reason: String },

    // ── Resources ────────────────────────────────────────────────────
    #[error("{resource_type} '{identifier}' not found")]
    #[diagnostic(code(electrochlor::not_found), help("Known values: {available}"))]
    NotFound {
        resource_type: String,
        identifier: String,
        available: String,
    },

    // ── Validation ───────────────────────────────────────────────────
    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(electrochlor::validation))]
    Validation { field: String, reason: String },

    // ── Configuration ────────────────────────────────────────────────
    #[error("Device profile '{name}' not found in configuration")]
    #[diagnostic(
        code(electrochlor::profile_not_found),
        help(
            "Available profiles: {available}\n\
             Create one with: electrochlor config add <name> --host <address>"
        )
    )]
    ProfileNotFound { name: String, available: String },

    #[error("No device configured")]
    #[diagnostic(
        code(electrochlor::no_config),
        help(
            "Pass --host <address>, or create a profile with:\n  \
             electrochlor config add pool --host <address> --default\n\
             Config file: {path}"
        )
    )]
    NoConfig { path: String },

    #[error(transparent)]
    #[diagnostic(code(electrochlor::config))]
    Config(Box<ConfigError>),

    // ── IO / Serialization ───────────────────────────────────────────
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ConnectionFailed { .. } => exit_code::CONNECTION,
            Self::Timeout { .. } => exit_code::TIMEOUT,
            Self::Unconfirmed { .. } => exit_code::UNCONFIRMED,
            Self::NotFound { .. } | Self::ProfileNotFound { .. } => exit_code::NOT_FOUND,
            Self::Validation { .. } | Self::NoConfig { .. } => exit_code::USAGE,
            _ => exit_code::GENERAL,
        }
    }
}

// ── CoreError → CliError mapping ─────────────────────────────────────

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::ConnectionFailed { url, reason } => CliError::ConnectionFailed {
                url,
                source: reason.into(),
            },

            CoreError::Timeout { timeout_secs } => CliError::Timeout {
                seconds: timeout_secs,
            },

            CoreError::Device { message, status: _ } => CliError::Device { message },

            CoreError::InvalidResponse { message } => CliError::InvalidResponse { message },

            CoreError::UnknownEntity { kind, key } => CliError::NotFound {
                resource_type: kind.into(),
                identifier: key,
                available: "pump, light, valve, aux2".into(),
            },

            CoreError::ShutDown => CliError::Cancelled {
                reason: "device connection closed".into(),
            },

            CoreError::Config { message } => CliError::Validation {
                field: "device".into(),
                reason: message,
            },
        }
    }
}

// ── ConfigError → CliError mapping ───────────────────────────────────

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::NoDevice => CliError::NoConfig {
                path: electrochlor_config::config_path().display().to_string(),
            },
            ConfigError::Validation { field, reason } => CliError::Validation { field, reason },
            other => CliError::Config(Box::new(other)),
        }
    }
}
