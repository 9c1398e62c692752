use std::{
    io::ErrorKind,
    path::{Path, PathBuf},
    sync::Arc,
};

use anyhow::Result;
use async_trait::async_trait;
use chrono::NaiveDate;
use fs4::tokio::AsyncFileExt;
use tokio::{
    fs::File,
    io::{AsyncBufReadExt, AsyncWriteExt, BufReader},
};
use tracing::{debug, warn};

use crate::{
    monitor::record::PomodoroRecord,
    utils::{clock::Clock, time::date_to_record_name},
};

use super::SessionLog;

/// The main realization of [SessionLog]. Every UTC day gets its own file in `session_dir`,
/// named after the date, holding one JSON encoded [PomodoroRecord] per line.
pub struct JsonSessionLog {
    session_dir: PathBuf,
    clock: Arc<dyn Clock>,
}

impl JsonSessionLog {
    pub fn new(session_dir: PathBuf, clock: Arc<dyn Clock>) -> Result<Self, std::io::Error> {
        std::fs::create_dir_all(&session_dir)?;

        Ok(Self { session_dir, clock })
    }

    fn path_for(&self, date: NaiveDate) -> PathBuf {
        self.session_dir.join(date_to_record_name(date))
    }

    /// Retrieves sessions completed on `date`. A day without a file has no sessions.
    pub async fn load_for(&self, date: NaiveDate) -> Result<Vec<PomodoroRecord>> {
        async fn extract(path: &Path) -> Result<Vec<PomodoroRecord>, std::io::Error> {
            debug!("Extracting {path:?}");
            let file = File::open(path).await?;
            file.lock_shared()?;
            let mut lines = BufReader::new(file).lines();
            let mut records = vec![];
            loop {
                let line = match lines.next_line().await {
                    Ok(Some(line)) => line,
                    Ok(None) => break,
                    // The broken line is consumed, the ones after it are still readable.
                    Err(e) if e.kind() == ErrorKind::InvalidData => {
                        warn!("Skipping unreadable line in {path:?}: {e}");
                        continue;
                    }
                    Err(e) => {
                        warn!("Stopped reading {path:?} early, later sessions are missing: {e}");
                        break;
                    }
                };
                if line.trim().is_empty() {
                    continue;
                }
                match serde_json::from_str::<PomodoroRecord>(&line) {
                    Ok(v) => records.push(v),
                    Err(e) => {
                        // A write cut short by a shutdown leaves a broken last line.
                        warn!("During parsing in path {path:?} found illegal json string {line}: {e}")
                    }
                }
            }

            lines.into_inner().into_inner().unlock_async().await?;

            Ok(records)
        }

        let path = self.path_for(date);
        match extract(&path).await {
            Ok(records) => Ok(records),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(vec![]),
            Err(e) => Err(e)?,
        }
    }

    async fn append_for(&self, date: NaiveDate, record: &PomodoroRecord) -> Result<()> {
        let mut buffer = serde_json::to_vec(record)?;
        buffer.push(b'\n');

        let mut file = File::options()
            .create(true)
            .append(true)
            .open(self.path_for(date))
            .await?;

        // Semi-safe acquire-release for a file
        file.lock_exclusive()?;
        let result = async {
            file.write_all(&buffer).await?;
            file.flush().await
        }
        .await;
        file.unlock_async().await?;
        Ok(result?)
    }
}

#[async_trait]
impl SessionLog for JsonSessionLog {
    async fn load_today(&self) -> Result<Vec<PomodoroRecord>> {
        self.load_for(self.clock.time().date_naive()).await
    }

    async fn append(&self, record: &PomodoroRecord) -> Result<()> {
        let date = record
            .finished_at
            .unwrap_or_else(|| self.clock.time())
            .date_naive();
        self.append_for(date, record).await
    }
}
