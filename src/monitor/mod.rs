//! Activity monitor: samples the foreground application while a focus session runs and
//! accumulates per-application time into a [PomodoroRecord].
//!
//! The timer owns at most one monitor at a time and is the only caller of its lifecycle:
//! `start` allocates a fresh record, `stop`/`resume` suspend and continue sampling into that
//! record, `clear` drops it.

pub mod activity;
pub mod record;
pub mod snapshot;

use anyhow::Result;
#[cfg(test)]
use mockall::automock;
use thiserror::Error;

use record::PomodoroRecord;
use snapshot::ImageRef;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum MonitorError {
    #[error("monitor already holds an accumulation record, clear it before starting again")]
    AlreadyStarted,
}

/// Receives every successful sample.
pub trait MonitorListener: Send + Sync {
    fn on_sample(&self, app_name: &str, record: &PomodoroRecord, image: Option<&ImageRef>);
}

#[cfg_attr(test, automock)]
pub trait SessionMonitor: Send {
    fn start(&mut self) -> Result<(), MonitorError>;

    /// Suspends sampling. The record is kept as is.
    fn stop(&mut self);

    /// Continues sampling into the record allocated by `start`.
    fn resume(&mut self);

    /// Drops the record. The monitor returns to its pre-`start` state.
    fn clear(&mut self);

    /// Whether the monitor holds a record, sampling or not.
    fn is_active(&self) -> bool;

    /// Snapshot of the current record, reflecting every sample taken so far.
    fn session_data(&self) -> Option<PomodoroRecord>;
}

/// Builds fresh monitors. A monitor that was cleared at the end of a focus session is never
/// reused, the next one comes from here.
pub trait MonitorFactory: Send {
    fn create(&self) -> Result<Box<dyn SessionMonitor>>;
}

impl<F> MonitorFactory for F
where
    F: Fn() -> Result<Box<dyn SessionMonitor>> + Send,
{
    fn create(&self) -> Result<Box<dyn SessionMonitor>> {
        self()
    }
}
