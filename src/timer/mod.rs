//! Focus/rest countdown state machine.
//!
//! [PomodoroTimer] owns the mode, the countdown deadline and the activity monitor. Remaining
//! time and progress are always derived from the absolute deadline, so missed or late ticks
//! correct themselves on the next one. Monitor lifecycle calls are issued in lockstep with the
//! countdown: start with start, pause with stop, resume with resume, clear with clear.

pub mod command;
pub mod events;
pub mod notifier;
pub mod service;
pub mod state;

use std::{future::Future, sync::Arc};

use chrono::Duration;
use thiserror::Error;
use tokio::sync::{mpsc::UnboundedSender, watch};
use tracing::{debug, info, instrument, warn};

use crate::{
    config::TimerConfig,
    monitor::{record::PomodoroRecord, MonitorFactory, SessionMonitor},
    projects::ProjectResolver,
    sessions::SessionLog,
    utils::{clock::Clock, time::format_left_time},
};

use command::TimerCommand;
use events::TimerEvent;
use notifier::{Completion, Notifier};
use state::{Countdown, TimerSnapshot};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TimerError {
    #[error("cannot switch mode while the timer is running or has progress")]
    ModeSwitchRejected,
}

/// External collaborators of the timer.
pub struct Collaborators {
    pub sessions: Arc<dyn SessionLog>,
    pub projects: Arc<dyn ProjectResolver>,
    pub notifier: Arc<dyn Notifier>,
    pub monitors: Box<dyn MonitorFactory>,
}

pub struct PomodoroTimer {
    config: TimerConfig,
    clock: Arc<dyn Clock>,
    countdown: Countdown,
    is_focusing: bool,
    project: Option<String>,
    /// Display cache, rewritten on every tick.
    shown_seconds: i64,
    percent: f64,
    pomodoros_today: Vec<PomodoroRecord>,
    /// Empty until mounted, or when no monitor could be built. Every monitor call is skipped
    /// while it is empty.
    monitor: Option<Box<dyn SessionMonitor>>,
    collaborators: Collaborators,
    snapshots: watch::Sender<TimerSnapshot>,
    events: UnboundedSender<TimerEvent>,
}

impl PomodoroTimer {
    pub fn new(
        config: TimerConfig,
        clock: Arc<dyn Clock>,
        collaborators: Collaborators,
        events: UnboundedSender<TimerEvent>,
    ) -> (Self, watch::Receiver<TimerSnapshot>) {
        let shown_seconds = i64::from(config.focus_duration);
        let (snapshots, receiver) = watch::channel(TimerSnapshot {
            left_time: format_left_time(shown_seconds),
            percent: 0.,
            is_running: false,
            is_focusing: true,
            pomodoros_today: 0,
        });
        let timer = Self {
            config,
            clock,
            countdown: Countdown::Idle,
            is_focusing: true,
            project: None,
            shown_seconds,
            percent: 0.,
            pomodoros_today: vec![],
            monitor: None,
            collaborators,
            snapshots,
            events,
        };
        (timer, receiver)
    }

    pub fn snapshot(&self) -> TimerSnapshot {
        TimerSnapshot {
            left_time: format_left_time(self.shown_seconds),
            percent: self.percent,
            is_running: self.countdown.is_running(),
            is_focusing: self.is_focusing,
            pomodoros_today: self.pomodoros_today.len(),
        }
    }

    pub fn countdown(&self) -> Countdown {
        self.countdown
    }

    pub fn is_focusing(&self) -> bool {
        self.is_focusing
    }

    pub fn pomodoros_today(&self) -> &[PomodoroRecord] {
        &self.pomodoros_today
    }

    /// Project the next finished focus session is filed under.
    pub fn select_project(&mut self, project: Option<String>) {
        self.project = project;
    }

    /// Builds the first monitor and loads today's sessions. Failures leave the timer usable.
    pub async fn mount(&mut self) {
        self.monitor = self.create_monitor();
        match self
            .bounded("loading today's sessions", self.collaborators.sessions.load_today())
            .await
        {
            Some(sessions) => self.pomodoros_today = sessions,
            None => warn!("Starting without today's sessions"),
        }
        self.reset_to_idle(self.is_focusing);
    }

    pub async fn dispatch(&mut self, command: TimerCommand) {
        debug!(?command, "Dispatching");
        match command {
            TimerCommand::Start => {
                if self.countdown == Countdown::Idle {
                    self.start();
                }
            }
            TimerCommand::StopResumeOrStart => self.stop_resume_or_start(),
            TimerCommand::Clear => self.clear(),
            // A rejection was already surfaced as an event.
            TimerCommand::SwitchMode => {
                let _ = self.switch_mode();
            }
            TimerCommand::StartFocusing => self.start_in_mode(true),
            TimerCommand::StartResting => self.start_in_mode(false),
            TimerCommand::Stop => {
                if self.countdown.is_running() {
                    self.stop_resume_or_start();
                }
            }
        }
    }

    fn start_in_mode(&mut self, focusing: bool) {
        if self.is_focusing != focusing && self.switch_mode().is_err() {
            return;
        }
        if self.countdown == Countdown::Idle {
            self.start();
        }
    }

    fn duration_secs(&self) -> u32 {
        self.config.duration_for(self.is_focusing)
    }

    /// Begins a full-length countdown in the current mode.
    pub fn start(&mut self) {
        let target = self.clock.time() + Duration::seconds(i64::from(self.duration_secs()));
        self.countdown = Countdown::Running { target };
        debug!(%target, focusing = self.is_focusing, "Countdown started");

        if let Some(monitor) = self.monitor.as_mut() {
            // A rest that just finished already started a fresh monitor.
            if monitor.is_active() {
                debug!("Discarding activity sampled before the countdown started");
                monitor.clear();
            }
            if let Err(e) = monitor.start() {
                warn!("Failed to start monitor {e}");
            }
        }

        // The deadline is a full duration away, so this cannot expire.
        self.refresh();
        self.publish();
    }

    pub fn stop_resume_or_start(&mut self) {
        if self.percent == 0. {
            return self.start();
        }

        match self.countdown {
            Countdown::Running { target } => {
                let remaining = target - self.clock.time();
                self.countdown = Countdown::Paused { target, remaining };
                debug!(%remaining, "Countdown paused");
                if let Some(monitor) = self.monitor.as_mut() {
                    monitor.stop();
                }
            }
            Countdown::Paused { remaining, .. } => {
                let target = self.clock.time() + remaining;
                self.countdown = Countdown::Running { target };
                debug!(%target, "Countdown resumed");
                if let Some(monitor) = self.monitor.as_mut() {
                    monitor.resume();
                }
            }
            Countdown::Idle => return self.start(),
        }
        self.publish();
    }

    /// Drops the countdown and the monitor's record. Safe to call any number of times.
    pub fn clear(&mut self) {
        if let Some(monitor) = self.monitor.as_mut() {
            monitor.stop();
            monitor.clear();
        }
        self.reset_to_idle(self.is_focusing);
    }

    /// Flips between focus and rest. Only allowed with nothing on the clock.
    pub fn switch_mode(&mut self) -> Result<(), TimerError> {
        if self.countdown.is_running() || self.percent != 0. {
            warn!("Cannot switch mode when timer is running");
            let _ = self.events.send(TimerEvent::ModeSwitchRejected);
            return Err(TimerError::ModeSwitchRejected);
        }
        self.reset_to_idle(!self.is_focusing);
        Ok(())
    }

    /// Recomputes the display from the deadline and runs the completion protocol once the
    /// deadline has passed.
    pub async fn tick(&mut self) {
        if self.refresh() {
            self.finish().await;
        }
        self.publish();
    }

    /// Returns whether the countdown expired.
    fn refresh(&mut self) -> bool {
        let Countdown::Running { target } = self.countdown else {
            return false;
        };

        let time_span = (target - self.clock.time()).num_milliseconds();
        let seconds_left = (time_span as f64 / 1000. + 0.5).floor() as i64;
        if seconds_left < 0 {
            return true;
        }

        let percent = 100. - time_span as f64 / 10. / f64::from(self.duration_secs());
        let minutes = seconds_left / 60;
        if minutes != self.shown_seconds / 60 {
            self.collaborators.notifier.minute_changed(Some(minutes));
        }

        self.shown_seconds = seconds_left;
        self.percent = percent;
        false
    }

    #[instrument(skip(self), fields(focusing = self.is_focusing))]
    async fn finish(&mut self) {
        // Any tick arriving before the reset below completes finds nothing to do.
        self.countdown = Countdown::Idle;

        if self.is_focusing {
            self.finish_focus().await;
            self.reset_to_idle(false);
        } else {
            self.finish_rest();
            self.reset_to_idle(true);
        }
    }

    async fn finish_focus(&mut self) {
        if self.monitor.is_none() {
            warn!("Focus session finished without a monitor");
            self.announce(None, self.pomodoros_today.len());
            return;
        }

        let mut finished_sessions = match self
            .bounded("loading today's sessions", self.collaborators.sessions.load_today())
            .await
        {
            Some(sessions) => sessions,
            None => self.pomodoros_today.clone(),
        };

        let Some(mut record) = self.monitor.as_ref().and_then(|m| m.session_data()) else {
            warn!("Focus session finished without an activity record");
            self.announce(None, self.pomodoros_today.len());
            return;
        };

        record.finished_at = Some(self.clock.time());
        if let Some(project) = self.project.as_deref() {
            record.project_id = self
                .bounded("resolving project", async {
                    self.collaborators
                        .projects
                        .resolve(project)
                        .await
                        .map_err(anyhow::Error::from)
                })
                .await;
        }

        if self
            .bounded("saving session", self.collaborators.sessions.append(&record))
            .await
            .is_none()
        {
            warn!("Session {} is only kept in memory", record.id);
        }

        finished_sessions.push(record.clone());
        let count = finished_sessions.len();
        info!(id = %record.id, count, "Focus session finished");
        self.announce(Some(record), count);

        if let Some(monitor) = self.monitor.as_mut() {
            monitor.stop();
            monitor.clear();
        }
        self.pomodoros_today = finished_sessions;
    }

    fn finish_rest(&mut self) {
        let count = self.pomodoros_today.len();
        info!(count, "Rest finished");
        self.collaborators
            .notifier
            .session_completed(&Completion {
                focus_finished: false,
                count,
            });

        // The previous monitor was cleared when focus ended, it is not reused.
        self.monitor = self.create_monitor();
        if let Some(monitor) = self.monitor.as_mut() {
            if let Err(e) = monitor.start() {
                warn!("Failed to start monitor {e}");
            }
        }
        let _ = self.events.send(TimerEvent::SessionCompleted {
            count,
            record: None,
        });
    }

    fn announce(&self, record: Option<PomodoroRecord>, count: usize) {
        self.collaborators
            .notifier
            .session_completed(&Completion {
                focus_finished: true,
                count,
            });
        let _ = self
            .events
            .send(TimerEvent::SessionCompleted { count, record });
    }

    /// Single place that puts the timer back to an empty clock in the given mode.
    fn reset_to_idle(&mut self, focusing: bool) {
        self.countdown = Countdown::Idle;
        self.is_focusing = focusing;
        self.shown_seconds = i64::from(self.duration_secs());
        self.percent = 0.;
        self.collaborators.notifier.minute_changed(None);
        self.publish();
    }

    fn create_monitor(&self) -> Option<Box<dyn SessionMonitor>> {
        self.collaborators
            .monitors
            .create()
            .inspect_err(|e| warn!("Running without activity monitor {e:?}"))
            .ok()
    }

    /// Receivers are only woken when the displayed values changed.
    fn publish(&self) {
        let snapshot = self.snapshot();
        self.snapshots.send_if_modified(|current| {
            if *current == snapshot {
                return false;
            }
            *current = snapshot;
            true
        });
    }

    /// Awaits a collaborator for at most the configured timeout. Failures are logged and
    /// turned into `None`.
    async fn bounded<T>(
        &self,
        what: &str,
        future: impl Future<Output = anyhow::Result<T>>,
    ) -> Option<T> {
        match tokio::time::timeout(self.config.collaborator_timeout(), future).await {
            Ok(Ok(value)) => Some(value),
            Ok(Err(e)) => {
                warn!("Failed {what} {e:?}");
                None
            }
            Err(_) => {
                warn!("Timed out {what}");
                None
            }
        }
    }
}
