//! Client version gating for rule categories newer agents understand.

use std::sync::Arc;

use flowdash_domain::ClientVersion;

use crate::MachineDirectory;

/// Outcome of comparing a machine's client version against a minimum.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VersionSupport {
    /// Reported version is at least the minimum.
    Supported,
    /// Reported version is older than the minimum.
    Unsupported,
    /// Machine or version could not be determined.
    Unknown,
}

impl VersionSupport {
    /// Fail-open policy: only a known, too-old version blocks the request.
    #[must_use]
    pub fn allows(self) -> bool {
        !matches!(self, Self::Unsupported)
    }
}

/// Checks machines against a minimum client version.
#[derive(Clone)]
pub struct VersionGate {
    directory: Arc<dyn MachineDirectory>,
    minimum: ClientVersion,
}

impl VersionGate {
    /// Creates a gate requiring at least `minimum`.
    #[must_use]
    pub fn new(directory: Arc<dyn MachineDirectory>, minimum: ClientVersion) -> Self {
        Self { directory, minimum }
    }

    /// Classifies the machine at `ip:port` of `app`. Never fails.
    pub async fn check(&self, app: &str, ip: &str, port: i32) -> VersionSupport {
        let Ok(port) = u16::try_from(port) else {
            return VersionSupport::Unknown;
        };

        match self.directory.find_machine(app, ip, port).await {
            Ok(Some(machine)) => match machine.client_version() {
                Some(version) if version.is_at_least(&self.minimum) => VersionSupport::Supported,
                Some(_) => VersionSupport::Unsupported,
                None => VersionSupport::Unknown,
            },
            Ok(None) | Err(_) => VersionSupport::Unknown,
        }
    }

    /// Collapses [`VersionGate::check`] with the fail-open policy.
    ///
    /// Missing coordinates count as an unknown machine.
    pub async fn is_supported(&self, app: Option<&str>, ip: Option<&str>, port: Option<i32>) -> bool {
        match (app, ip, port) {
            (Some(app), Some(ip), Some(port)) => self.check(app, ip, port).await.allows(),
            _ => true,
        }
    }
}
