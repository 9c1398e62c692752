use std::{collections::BTreeMap, time::Duration};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One focus session: how long each application was in the foreground while it ran.
///
/// Created by the activity monitor on `start` and handed to the session log when the focus
/// countdown finishes. Stored on disk as one JSON line per record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PomodoroRecord {
    pub id: Uuid,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_id: Option<String>,
    /// Application name to accumulated hours.
    #[serde(default)]
    pub apps: BTreeMap<String, f64>,
    pub started_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub finished_at: Option<DateTime<Utc>>,
}

impl PomodoroRecord {
    pub fn new(started_at: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            project_id: None,
            apps: BTreeMap::new(),
            started_at,
            finished_at: None,
        }
    }

    pub fn add_usage(&mut self, app_name: &str, spent: Duration) {
        *self.apps.entry(app_name.to_string()).or_insert(0.) += spent.as_secs_f64() / 3600.;
    }

    pub fn total_hours(&self) -> f64 {
        self.apps.values().sum()
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use chrono::Utc;

    use super::PomodoroRecord;

    #[test]
    fn usage_accumulates_per_app() {
        let mut record = PomodoroRecord::new(Utc::now());
        record.add_usage("nvim", Duration::from_secs(1800));
        record.add_usage("firefox", Duration::from_secs(900));
        record.add_usage("nvim", Duration::from_secs(1800));

        assert_eq!(record.apps["nvim"], 1.);
        assert_eq!(record.apps["firefox"], 0.25);
        assert_eq!(record.total_hours(), 1.25);
    }

    #[test]
    fn missing_optional_fields_deserialize() {
        let line = r#"{"id":"67e55044-10b1-426f-9247-bb680e5fe0c8","started_at":"2018-07-04T00:00:00Z"}"#;
        let record: PomodoroRecord = serde_json::from_str(line).unwrap();
        assert!(record.apps.is_empty());
        assert_eq!(record.project_id, None);
        assert_eq!(record.finished_at, None);
    }
}
