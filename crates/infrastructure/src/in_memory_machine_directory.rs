use std::collections::HashMap;

use async_trait::async_trait;
use flowdash_application::MachineDirectory;
use flowdash_core::AppResult;
use flowdash_domain::MachineInfo;
use tokio::sync::RwLock;

type MachineKey = (String, String, u16);

/// In-memory machine directory keyed by app, address and port.
#[derive(Debug, Default)]
pub struct InMemoryMachineDirectory {
    machines: RwLock<HashMap<MachineKey, MachineInfo>>,
}

impl InMemoryMachineDirectory {
    /// Creates an empty machine directory.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl MachineDirectory for InMemoryMachineDirectory {
    async fn register_machine(&self, machine: MachineInfo) -> AppResult<()> {
        let key = (
            machine.app().as_str().to_owned(),
            machine.ip().as_str().to_owned(),
            machine.port(),
        );
        self.machines.write().await.insert(key, machine);
        Ok(())
    }

    async fn find_machine(
        &self,
        app: &str,
        ip: &str,
        port: u16,
    ) -> AppResult<Option<MachineInfo>> {
        let key = (app.to_owned(), ip.to_owned(), port);
        Ok(self.machines.read().await.get(&key).cloned())
    }

    async fn list_machines(&self, app: &str) -> AppResult<Vec<MachineInfo>> {
        let mut machines: Vec<MachineInfo> = self
            .machines
            .read()
            .await
            .values()
            .filter(|machine| machine.app().as_str() == app)
            .cloned()
            .collect();
        machines.sort_by(|left, right| {
            left.ip()
                .as_str()
                .cmp(right.ip().as_str())
                .then(left.port().cmp(&right.port()))
        });

        Ok(machines)
    }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};
    use flowdash_application::MachineDirectory;
    use flowdash_domain::MachineInfo;

    use super::InMemoryMachineDirectory;

    fn machine(app: &str, ip: &str, port: i32, version: &str, second: u32) -> MachineInfo {
        MachineInfo::new(
            app,
            ip,
            port,
            None,
            0,
            Some(version.to_owned()),
            Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, second)
                .single()
                .unwrap_or_else(|| unreachable!()),
        )
        .unwrap_or_else(|_| unreachable!())
    }

    #[tokio::test]
    async fn heartbeat_replaces_previous_record() {
        let directory = InMemoryMachineDirectory::new();
        directory
            .register_machine(machine("checkout", "10.0.0.5", 8719, "0.1.1", 0))
            .await
            .unwrap_or_else(|_| unreachable!());
        directory
            .register_machine(machine("checkout", "10.0.0.5", 8719, "1.8.6", 5))
            .await
            .unwrap_or_else(|_| unreachable!());

        let found = directory
            .find_machine("checkout", "10.0.0.5", 8719)
            .await
            .unwrap_or_else(|_| unreachable!())
            .unwrap_or_else(|| unreachable!());
        assert_eq!(found.version(), Some("1.8.6"));

        let missing = directory
            .find_machine("checkout", "10.0.0.5", 8720)
            .await
            .unwrap_or_else(|_| unreachable!());
        assert!(missing.is_none());
    }

    #[tokio::test]
    async fn list_is_scoped_to_app_and_sorted() {
        let directory = InMemoryMachineDirectory::new();
        for machine in [
            machine("checkout", "10.0.0.9", 8719, "1.8.6", 0),
            machine("checkout", "10.0.0.1", 8720, "1.8.6", 0),
            machine("checkout", "10.0.0.1", 8719, "1.8.6", 0),
            machine("billing", "10.0.0.2", 8719, "1.8.6", 0),
        ] {
            directory
                .register_machine(machine)
                .await
                .unwrap_or_else(|_| unreachable!());
        }

        let listed = directory
            .list_machines("checkout")
            .await
            .unwrap_or_else(|_| unreachable!());
        let addresses: Vec<(String, u16)> = listed
            .iter()
            .map(|machine| (machine.ip().as_str().to_owned(), machine.port()))
            .collect();

        assert_eq!(
            addresses,
            vec![
                ("10.0.0.1".to_owned(), 8719),
                ("10.0.0.1".to_owned(), 8720),
                ("10.0.0.9".to_owned(), 8719),
            ]
        );
    }
}
