// Docker container models

/// State string the runtime reports for a running container (compared case-sensitively).
pub const RUNNING_STATE: &str = "running";

/// One entry of the runtime's container list, as the gateway returns it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContainerRecord {
    pub id: String,
    pub names: Vec<String>,
    pub state: String,
    pub status: String,
}

/// A discovered container; created fresh each cycle and never mutated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContainerInfo {
    pub id: String,
    /// First runtime name with the leading `/` stripped; falls back to the id.
    pub name: String,
    pub state: String,
    pub status: String,
}

impl ContainerInfo {
    pub fn from_record(record: ContainerRecord) -> Self {
        let name = record
            .names
            .first()
            .map(|n| n.strip_prefix('/').unwrap_or(n).to_string())
            .unwrap_or_else(|| record.id.clone());
        Self {
            id: record.id,
            name,
            state: record.state,
            status: record.status,
        }
    }

    pub fn is_running(&self) -> bool {
        self.state == RUNNING_STATE
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(names: &[&str], state: &str) -> ContainerRecord {
        ContainerRecord {
            id: "abc".into(),
            names: names.iter().map(|n| n.to_string()).collect(),
            state: state.into(),
            status: "Up 2 minutes".into(),
        }
    }

    #[test]
    fn strips_only_the_leading_separator() {
        let info = ContainerInfo::from_record(record(&["/web/api", "/alias"], "running"));
        assert_eq!(info.name, "web/api");
    }

    #[test]
    fn falls_back_to_id_without_names() {
        let info = ContainerInfo::from_record(record(&[], "running"));
        assert_eq!(info.name, "abc");
    }

    #[test]
    fn running_detection_is_case_sensitive() {
        assert!(ContainerInfo::from_record(record(&["/a"], "running")).is_running());
        assert!(!ContainerInfo::from_record(record(&["/a"], "Running")).is_running());
        assert!(!ContainerInfo::from_record(record(&["/a"], "exited")).is_running());
    }
}
