use std::{
    sync::{Arc, Mutex, PoisonError},
    time::Duration,
};

use tokio_util::sync::CancellationToken;
use tracing::{debug, error, trace, warn};

use crate::{utils::clock::Clock, window_api::SharedWindowManager};

use super::{
    record::PomodoroRecord,
    snapshot::{NoSnapshots, Snapshotter},
    MonitorError, MonitorListener, SessionMonitor,
};

#[derive(Default)]
struct Accumulation {
    record: Option<PomodoroRecord>,
    samples: u32,
}

/// Everything the sampling task needs. Cloned into each spawned task so that `stop`/`resume`
/// keep writing into the same [Accumulation].
#[derive(Clone)]
struct Sampler {
    listener: Arc<dyn MonitorListener>,
    probe: SharedWindowManager,
    snapshotter: Arc<dyn Snapshotter>,
    clock: Arc<dyn Clock>,
    sample_interval: Duration,
    screenshot_every: u32,
    accumulation: Arc<Mutex<Accumulation>>,
}

impl Sampler {
    async fn run(self, cancellation: CancellationToken) {
        let mut sample_point = self.clock.instant();
        loop {
            sample_point += self.sample_interval;

            tokio::select! {
                _ = cancellation.cancelled() => {
                    return
                }
                _ = self.clock.sleep_until(sample_point) => ()
            }

            self.sample(&cancellation);
        }
    }

    fn sample(&self, cancellation: &CancellationToken) {
        let window = match self
            .probe
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get_active_window_data()
        {
            Ok(window) => window,
            Err(e) => {
                warn!("Failed to sample foreground application {e:?}");
                return;
            }
        };
        let app_name = window.app_name();

        let (record, take_snapshot) = {
            let mut accumulation = self
                .accumulation
                .lock()
                .unwrap_or_else(PoisonError::into_inner);
            if cancellation.is_cancelled() {
                return;
            }
            let Some(record) = accumulation.record.as_mut() else {
                return;
            };
            record.add_usage(&app_name, self.sample_interval);
            let record = record.clone();
            accumulation.samples += 1;
            let take_snapshot =
                self.screenshot_every > 0 && accumulation.samples % self.screenshot_every == 0;
            (record, take_snapshot)
        };

        let image = if take_snapshot {
            self.snapshotter
                .capture(&app_name)
                .inspect_err(|e| error!("Failed to capture snapshot {e:?}"))
                .ok()
                .flatten()
        } else {
            None
        };

        trace!("Sampled {app_name}");
        self.listener.on_sample(&app_name, &record, image.as_ref());
    }
}

/// The production [SessionMonitor]. Sampling runs as a task on the current tokio runtime and is
/// scheduled against absolute instants, so a slow probe does not shift later samples.
pub struct ActivityMonitor {
    sampler: Sampler,
    sampling: Option<CancellationToken>,
}

impl ActivityMonitor {
    /// Nothing is sampled until [SessionMonitor::start].
    pub fn new(
        listener: Arc<dyn MonitorListener>,
        probe: SharedWindowManager,
        clock: Arc<dyn Clock>,
        sample_interval: Duration,
        screenshot_every: u32,
    ) -> Self {
        Self {
            sampler: Sampler {
                listener,
                probe,
                snapshotter: Arc::new(NoSnapshots),
                clock,
                sample_interval,
                screenshot_every,
                accumulation: Arc::default(),
            },
            sampling: None,
        }
    }

    pub fn with_snapshotter(mut self, snapshotter: Arc<dyn Snapshotter>) -> Self {
        self.sampler.snapshotter = snapshotter;
        self
    }

    fn accumulation(&self) -> std::sync::MutexGuard<'_, Accumulation> {
        self.sampler
            .accumulation
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn spawn_sampling(&mut self) {
        let cancellation = CancellationToken::new();
        tokio::spawn(self.sampler.clone().run(cancellation.clone()));
        self.sampling = Some(cancellation);
    }
}

impl SessionMonitor for ActivityMonitor {
    fn start(&mut self) -> Result<(), MonitorError> {
        {
            let mut accumulation = self.accumulation();
            if accumulation.record.is_some() {
                return Err(MonitorError::AlreadyStarted);
            }
            accumulation.record = Some(PomodoroRecord::new(self.sampler.clock.time()));
            accumulation.samples = 0;
        }
        debug!("Monitor started");
        self.spawn_sampling();
        Ok(())
    }

    fn stop(&mut self) {
        if let Some(cancellation) = self.sampling.take() {
            cancellation.cancel();
            debug!("Monitor stopped");
        }
    }

    fn resume(&mut self) {
        if self.sampling.is_some() {
            return;
        }
        if self.accumulation().record.is_none() {
            warn!("Resume requested on a monitor that was never started");
            return;
        }
        debug!("Monitor resumed");
        self.spawn_sampling();
    }

    fn clear(&mut self) {
        self.stop();
        *self.accumulation() = Accumulation::default();
    }

    fn is_active(&self) -> bool {
        self.accumulation().record.is_some()
    }

    fn session_data(&self) -> Option<PomodoroRecord> {
        self.accumulation().record.clone()
    }
}

impl Drop for ActivityMonitor {
    fn drop(&mut self) {
        self.stop();
    }
}
