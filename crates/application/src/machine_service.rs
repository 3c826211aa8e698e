//! Machine directory port and heartbeat registration.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use flowdash_core::{AppResult, is_blank};
use flowdash_domain::{MachineInfo, RuleValidationError};

/// Directory of client agents known to the dashboard.
#[async_trait]
pub trait MachineDirectory: Send + Sync {
    /// Inserts or refreshes one machine.
    async fn register_machine(&self, machine: MachineInfo) -> AppResult<()>;

    /// Returns the machine listening on `ip:port` for `app`.
    async fn find_machine(&self, app: &str, ip: &str, port: u16)
    -> AppResult<Option<MachineInfo>>;

    /// Returns every machine of `app`.
    async fn list_machines(&self, app: &str) -> AppResult<Vec<MachineInfo>>;
}

/// Heartbeat reported by a client agent.
#[derive(Debug, Clone, Default)]
pub struct MachineHeartbeat {
    /// Application name.
    pub app: Option<String>,
    /// Application type code.
    pub app_type: Option<i32>,
    /// Client version.
    pub version: Option<String>,
    /// Host name.
    pub hostname: Option<String>,
    /// Machine address.
    pub ip: Option<String>,
    /// Command port.
    pub port: Option<i32>,
}

/// Application service for machine registration.
#[derive(Clone)]
pub struct MachineService {
    directory: Arc<dyn MachineDirectory>,
}

impl MachineService {
    /// Creates a new machine service.
    #[must_use]
    pub fn new(directory: Arc<dyn MachineDirectory>) -> Self {
        Self { directory }
    }

    /// Records a heartbeat, registering the machine on first contact.
    pub async fn register_heartbeat(&self, heartbeat: MachineHeartbeat) -> AppResult<MachineInfo> {
        if is_blank(heartbeat.app.as_deref()) {
            return Err(RuleValidationError::BlankApp.into());
        }
        if is_blank(heartbeat.ip.as_deref()) {
            return Err(RuleValidationError::BlankIp.into());
        }
        let port = heartbeat
            .port
            .filter(|port| *port > 0)
            .ok_or(RuleValidationError::InvalidPort)?;

        let machine = MachineInfo::new(
            heartbeat.app.unwrap_or_default(),
            heartbeat.ip.unwrap_or_default(),
            port,
            heartbeat.hostname,
            heartbeat.app_type.unwrap_or(0),
            heartbeat.version,
            Utc::now(),
        )?;
        self.directory.register_machine(machine.clone()).await?;

        Ok(machine)
    }

    /// Lists machines of one app.
    pub async fn list_machines(&self, app: &str) -> AppResult<Vec<MachineInfo>> {
        self.directory.list_machines(app).await
    }
}
