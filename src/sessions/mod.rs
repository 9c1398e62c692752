//! Daily session aggregator.
//!
//! Completed focus sessions are stored through [SessionLog]. The main realization,
//! [json_log::JsonSessionLog], keeps one file per UTC day with one [PomodoroRecord] per line.

pub mod json_log;

use std::{cmp::Ordering, collections::BTreeMap};

use anyhow::Result;
use async_trait::async_trait;

use crate::monitor::record::PomodoroRecord;

/// Directory under the application directory that holds the daily session files.
pub const SESSIONS_DIR: &str = "sessions";

/// Interface for the store of completed sessions.
#[async_trait]
pub trait SessionLog: Send + Sync {
    /// Sessions completed so far today, in completion order.
    async fn load_today(&self) -> Result<Vec<PomodoroRecord>>;

    /// Persists a completed session at the end of today's list.
    async fn append(&self, record: &PomodoroRecord) -> Result<()>;
}

#[derive(Debug, Clone, PartialEq)]
pub struct AppTotal {
    pub app_name: String,
    pub hours: f64,
}

/// Sums application hours across sessions. The result is sorted by time spent, longest first.
pub fn app_totals(records: &[PomodoroRecord]) -> Vec<AppTotal> {
    let mut totals = BTreeMap::<&str, f64>::new();
    for record in records {
        for (app_name, hours) in &record.apps {
            *totals.entry(app_name).or_insert(0.) += hours;
        }
    }

    let mut totals = totals
        .into_iter()
        .map(|(app_name, hours)| AppTotal {
            app_name: app_name.to_string(),
            hours,
        })
        .collect::<Vec<_>>();
    totals.sort_by(|a, b| b.hours.partial_cmp(&a.hours).unwrap_or(Ordering::Equal));
    totals
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use crate::monitor::record::PomodoroRecord;

    use super::app_totals;

    fn record(apps: &[(&str, f64)]) -> PomodoroRecord {
        let mut record = PomodoroRecord::new(Utc::now());
        for (app, hours) in apps {
            record.apps.insert(app.to_string(), *hours);
        }
        record
    }

    #[test]
    fn totals_sum_across_sessions() {
        let records = vec![
            record(&[("nvim", 0.25), ("firefox", 0.125)]),
            record(&[("firefox", 0.25)]),
            record(&[("slack", 0.0625), ("nvim", 0.125)]),
        ];

        let totals = app_totals(&records)
            .into_iter()
            .map(|v| (v.app_name, v.hours))
            .collect::<Vec<_>>();
        assert_eq!(
            totals,
            vec![
                ("firefox".to_string(), 0.375),
                ("nvim".to_string(), 0.375),
                ("slack".to_string(), 0.0625),
            ]
        );
    }

    #[test]
    fn no_sessions_no_totals() {
        assert!(app_totals(&[]).is_empty());
    }
}
