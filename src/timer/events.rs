use tokio::sync::mpsc::UnboundedSender;
use tracing::trace;

use crate::monitor::{record::PomodoroRecord, snapshot::ImageRef, MonitorListener};

/// One-shot notifications for the front end.
#[derive(Debug, Clone, PartialEq)]
pub enum TimerEvent {
    /// A countdown ran out. `record` is set only for a focus session that produced one.
    SessionCompleted {
        count: usize,
        record: Option<PomodoroRecord>,
    },
    /// `switch_mode` was called with progress on the clock.
    ModeSwitchRejected,
    /// Latest monitor sample.
    Activity {
        app_name: String,
        image: Option<ImageRef>,
    },
}

/// Forwards monitor samples to the event channel. The record passed with each sample is
/// ignored, the timer reads the authoritative one when the session finishes.
pub struct EventListener {
    events: UnboundedSender<TimerEvent>,
}

impl EventListener {
    pub fn new(events: UnboundedSender<TimerEvent>) -> Self {
        Self { events }
    }
}

impl MonitorListener for EventListener {
    fn on_sample(&self, app_name: &str, _record: &PomodoroRecord, image: Option<&ImageRef>) {
        if self
            .events
            .send(TimerEvent::Activity {
                app_name: app_name.to_string(),
                image: image.cloned(),
            })
            .is_err()
        {
            trace!("No one is listening for activity");
        }
    }
}
