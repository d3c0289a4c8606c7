// Device endpoint addressing
//
// The device serves its status document at `/electrochlor` and accepts
// commands on sub-paths of it (`/electrochlor/state`, `/electrochlor/light`).

use url::Url;

use crate::error::Error;

/// Where a single Electrochlor device lives on the local network.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceEndpoint {
    host: String,
    port: u16,
    path: String,
}

impl DeviceEndpoint {
    /// Port the controller's web server listens on out of the box.
    pub const DEFAULT_PORT: u16 = 90;
    /// Path of the status document.
    pub const STATUS_PATH: &'static str = "/electrochlor";

    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
            path: Self::STATUS_PATH.to_owned(),
        }
    }

    /// Replace the status path (firmware variants or reverse proxies).
    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        let path = path.into();
        self.path = if path.starts_with('/') {
            path
        } else {
            format!("/{path}")
        };
        self
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    /// `http://{host}:{port}`, bracketing IPv6 literals.
    pub fn base(&self) -> String {
        if self.host.contains(':') && !self.host.starts_with('[') {
            format!("http://[{}]:{}", self.host, self.port)
        } else {
            format!("http://{}:{}", self.host, self.port)
        }
    }

    /// URL of the status document: `http://{host}:{port}{path}`.
    pub fn status_url(&self) -> Result<Url, Error> {
        Ok(Url::parse(&format!("{}{}", self.base(), self.path))?)
    }

    /// URL of a command sub-path: `http://{host}:{port}{path}/{command}`.
    pub fn command_url(&self, command: &str) -> Result<Url, Error> {
        let path = self.path.trim_end_matches('/');
        let command = command.trim_start_matches('/');
        Ok(Url::parse(&format!("{}{path}/{command}", self.base()))?)
    }

    /// The device's own web UI, without port (served on 80).
    pub fn configuration_url(&self) -> String {
        if self.host.contains(':') && !self.host.starts_with('[') {
            format!("http://[{}]", self.host)
        } else {
            format!("http://{}", self.host)
        }
    }
}

impl std::fmt::Display for DeviceEndpoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}{}", self.base(), self.path)
    }
}
