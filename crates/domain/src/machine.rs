use chrono::{DateTime, Utc};
use flowdash_core::{AppError, AppResult, NonEmptyString};
use serde::{Deserialize, Serialize};

use crate::version::ClientVersion;

/// One client agent instance that reported a heartbeat.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MachineInfo {
    app: NonEmptyString,
    ip: NonEmptyString,
    port: u16,
    hostname: Option<String>,
    app_type: i32,
    version: Option<String>,
    last_heartbeat: DateTime<Utc>,
}

impl MachineInfo {
    /// Creates a validated machine record.
    pub fn new(
        app: impl Into<String>,
        ip: impl Into<String>,
        port: i32,
        hostname: Option<String>,
        app_type: i32,
        version: Option<String>,
        last_heartbeat: DateTime<Utc>,
    ) -> AppResult<Self> {
        let port = u16::try_from(port)
            .ok()
            .filter(|port| *port > 0)
            .ok_or_else(|| AppError::Validation(format!("invalid machine port '{port}'")))?;

        Ok(Self {
            app: NonEmptyString::new(app)?,
            ip: NonEmptyString::new(ip)?,
            port,
            hostname: hostname.filter(|value| !value.trim().is_empty()),
            app_type,
            version: version.filter(|value| !value.trim().is_empty()),
            last_heartbeat,
        })
    }

    /// Returns the application name.
    #[must_use]
    pub fn app(&self) -> &NonEmptyString {
        &self.app
    }

    /// Returns the machine address.
    #[must_use]
    pub fn ip(&self) -> &NonEmptyString {
        &self.ip
    }

    /// Returns the command port.
    #[must_use]
    pub fn port(&self) -> u16 {
        self.port
    }

    /// Returns the reported host name.
    #[must_use]
    pub fn hostname(&self) -> Option<&str> {
        self.hostname.as_deref()
    }

    /// Returns the reported application type.
    #[must_use]
    pub fn app_type(&self) -> i32 {
        self.app_type
    }

    /// Returns the raw client version string.
    #[must_use]
    pub fn version(&self) -> Option<&str> {
        self.version.as_deref()
    }

    /// Returns the parsed client version, if the raw value is well formed.
    #[must_use]
    pub fn client_version(&self) -> Option<ClientVersion> {
        self.version.as_deref().and_then(ClientVersion::parse)
    }

    /// Returns the time of the latest heartbeat.
    #[must_use]
    pub fn last_heartbeat(&self) -> DateTime<Utc> {
        self.last_heartbeat
    }
}
