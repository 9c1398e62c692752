use std::time::Duration;

use anyhow::Result;
use tokio::{sync::mpsc, time::MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use super::{command::TimerCommand, PomodoroTimer};

/// Drives a [PomodoroTimer]: the periodic tick, inbound commands and shutdown are handled one
/// at a time, so a finishing session never interleaves with another tick or command.
pub struct TimerService {
    timer: PomodoroTimer,
    commands: mpsc::Receiver<TimerCommand>,
    shutdown: CancellationToken,
    tick_interval: Duration,
}

impl TimerService {
    pub fn new(
        timer: PomodoroTimer,
        commands: mpsc::Receiver<TimerCommand>,
        shutdown: CancellationToken,
        tick_interval: Duration,
    ) -> Self {
        Self {
            timer,
            commands,
            shutdown,
            tick_interval,
        }
    }

    /// Executes the timer event loop until shutdown is requested or every command sender is
    /// dropped. The timer is always cleared on the way out.
    pub async fn run(mut self) -> Result<()> {
        self.timer.mount().await;

        let mut ticker = tokio::time::interval(self.tick_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                biased;
                _ = self.shutdown.cancelled() => {
                    break
                }
                command = self.commands.recv() => match command {
                    Some(command) => self.timer.dispatch(command).await,
                    None => {
                        debug!("Command channel closed");
                        break
                    }
                },
                _ = ticker.tick() => self.timer.tick().await,
            }
        }

        self.timer.clear();
        info!("Timer stopped");
        Ok(())
    }
}
