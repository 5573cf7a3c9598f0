// Container discovery: classify the runtime's container list for one cycle

use crate::docker_repo::RuntimeGateway;
use crate::error::CollectError;
use crate::models::{ContainerInfo, ContainerRecord};
use std::time::Duration;

/// Working set of one cycle plus the host-level counts.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Discovery {
    /// Running containers in the order the runtime listed them.
    pub containers: Vec<ContainerInfo>,
    pub running: usize,
    pub stopped: usize,
}

impl Discovery {
    /// Anything not exactly `running` is counted as stopped and left out of the working set.
    pub fn from_records(records: Vec<ContainerRecord>) -> Self {
        let mut discovery = Discovery::default();
        for record in records {
            let info = ContainerInfo::from_record(record);
            if info.is_running() {
                discovery.running += 1;
                discovery.containers.push(info);
            } else {
                discovery.stopped += 1;
            }
        }
        discovery
    }

    pub fn ids(&self) -> Vec<String> {
        self.containers.iter().map(|c| c.id.clone()).collect()
    }
}

/// Lists containers. Any failure here fails the whole cycle.
pub(crate) async fn discover<G: RuntimeGateway>(
    gateway: &G,
    include_stopped: bool,
    deadline: Duration,
) -> Result<Discovery, CollectError> {
    let records = tokio::time::timeout(deadline, gateway.list_containers(include_stopped))
        .await
        .map_err(|_| CollectError::Timeout(deadline))?
        .map_err(CollectError::Discovery)?;
    Ok(Discovery::from_records(records))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(id: &str, name: &str, state: &str) -> ContainerRecord {
        ContainerRecord {
            id: id.into(),
            names: vec![format!("/{}", name)],
            state: state.into(),
            status: String::new(),
        }
    }

    #[test]
    fn only_running_containers_enter_the_working_set() {
        let d = Discovery::from_records(vec![
            record("a", "web", "running"),
            record("b", "db", "exited"),
            record("c", "cache", "running"),
            record("d", "job", "paused"),
        ]);
        assert_eq!(d.running, 2);
        assert_eq!(d.stopped, 2);
        assert_eq!(d.ids(), vec!["a".to_string(), "c".to_string()]);
        assert_eq!(d.containers[0].name, "web");
    }

    #[test]
    fn empty_list_is_an_empty_working_set() {
        let d = Discovery::from_records(vec![]);
        assert_eq!(d, Discovery::default());
    }
}
