use chrono::{DateTime, Duration, Utc};
use serde::Serialize;

/// Countdown status. The deadline exists exactly while a countdown is active, running or paused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Countdown {
    #[default]
    Idle,
    Running {
        target: DateTime<Utc>,
    },
    /// `remaining` is frozen at the moment of pausing and becomes the new countdown on resume.
    Paused {
        target: DateTime<Utc>,
        remaining: Duration,
    },
}

impl Countdown {
    pub fn is_running(&self) -> bool {
        matches!(self, Countdown::Running { .. })
    }
}

/// What the front end shows. Published on every tick and after every transition.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimerSnapshot {
    pub left_time: String,
    pub percent: f64,
    pub is_running: bool,
    pub is_focusing: bool,
    pub pomodoros_today: usize,
}
