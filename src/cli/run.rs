use std::{io::Write, path::PathBuf, sync::Arc};

use ansi_term::Colour;
use anyhow::{bail, Context, Result};
use clap::Parser;
use tokio::{
    io::{AsyncBufReadExt, BufReader},
    sync::{mpsc, watch},
};
use tokio_stream::{wrappers::LinesStream, StreamExt};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::{
    config::{load_config, TimerConfig},
    monitor::{activity::ActivityMonitor, MonitorFactory, MonitorListener, SessionMonitor},
    sessions::{json_log::JsonSessionLog, SESSIONS_DIR},
    timer::{
        command::{TimerCommand, MENU},
        events::{EventListener, TimerEvent},
        notifier::{Completion, Notifier},
        service::TimerService,
        state::TimerSnapshot,
        Collaborators, PomodoroTimer,
    },
    utils::{
        clock::{Clock, DefaultClock},
        time::{format_duration, hours_to_duration},
    },
    window_api::GenericWindowManager,
};

use super::{project::project_directory, shutdown::detect_shutdown};

const QUIT_KEYWORDS: &[&str] = &["quit", "q", "exit"];

#[derive(Debug, Parser)]
pub struct RunCommand {
    #[arg(long, help = "Focus duration in minutes. Overrides config.json")]
    focus: Option<u32>,
    #[arg(long, help = "Rest duration in minutes. Overrides config.json")]
    rest: Option<u32>,
    #[arg(
        long = "screenshot-every",
        help = "Capture a snapshot every N activity samples, 0 disables. Overrides config.json"
    )]
    screenshot_every: Option<u32>,
    #[arg(long, short, help = "Project finished focus sessions are filed under")]
    project: Option<String>,
}

impl RunCommand {
    fn apply(&self, mut config: TimerConfig) -> Result<TimerConfig> {
        if let Some(focus) = self.focus {
            config.focus_duration = focus.checked_mul(60).context("Focus duration is too long")?;
        }
        if let Some(rest) = self.rest {
            config.rest_duration = rest.checked_mul(60).context("Rest duration is too long")?;
        }
        if let Some(screenshot_every) = self.screenshot_every {
            config.screenshot_interval = screenshot_every;
        }
        config.validate()
    }
}

/// Runs the timer in the foreground until `quit`, ctrl-c or the end of stdin.
pub async fn process_run_command(command: RunCommand, dir: PathBuf) -> Result<()> {
    let config = command.apply(load_config(&dir)?)?;
    info!(?config, "Starting timer");

    let clock: Arc<dyn Clock> = Arc::new(DefaultClock);
    let (events_sender, events) = mpsc::unbounded_channel();
    let collaborators = Collaborators {
        sessions: Arc::new(JsonSessionLog::new(dir.join(SESSIONS_DIR), clock.clone())?),
        projects: Arc::new(project_directory(&dir)),
        notifier: Arc::new(TerminalNotifier),
        monitors: monitor_factory(&config, clock.clone(), events_sender.clone()),
    };
    let (mut timer, snapshots) =
        PomodoroTimer::new(config.clone(), clock, collaborators, events_sender);
    timer.select_project(command.project);

    let (commands_sender, commands) = mpsc::channel(8);
    let shutdown = CancellationToken::new();
    let service = TimerService::new(timer, commands, shutdown.clone(), config.tick_interval());

    print_menu();
    let (_, result, _, _) = tokio::join!(
        detect_shutdown(shutdown.clone()),
        async {
            let result = service.run().await;
            shutdown.cancel();
            result
        },
        read_commands(commands_sender, shutdown.clone()),
        render(snapshots, events, shutdown.clone()),
    );
    println!();
    result
}

fn monitor_factory(
    config: &TimerConfig,
    clock: Arc<dyn Clock>,
    events: mpsc::UnboundedSender<TimerEvent>,
) -> Box<dyn MonitorFactory> {
    let probe = GenericWindowManager::new()
        .inspect_err(|e| warn!("Activity will not be recorded {e:?}"))
        .ok()
        .map(GenericWindowManager::shared);
    let listener: Arc<dyn MonitorListener> = Arc::new(EventListener::new(events));
    let sample_interval = config.sample_interval();
    let screenshot_every = config.screenshot_interval;

    Box::new(move || -> Result<Box<dyn SessionMonitor>> {
        let Some(probe) = probe.clone() else {
            bail!("No foreground window probe is available");
        };
        Ok(Box::new(ActivityMonitor::new(
            listener.clone(),
            probe,
            clock.clone(),
            sample_interval,
            screenshot_every,
        )))
    })
}

/// Turns stdin lines into commands. Returns, dropping the sender, on `quit` or end of input.
async fn read_commands(commands: mpsc::Sender<TimerCommand>, shutdown: CancellationToken) {
    let mut lines = LinesStream::new(BufReader::new(tokio::io::stdin()).lines());
    loop {
        let line = tokio::select! {
            _ = shutdown.cancelled() => return,
            line = lines.next() => line,
        };
        let line = match line {
            Some(Ok(line)) => line,
            Some(Err(e)) => {
                warn!("Failed to read command {e:?}");
                return;
            }
            None => {
                debug!("Input closed");
                return;
            }
        };

        let keyword = line.trim();
        if keyword.is_empty() {
            continue;
        }
        if QUIT_KEYWORDS.contains(&keyword) {
            shutdown.cancel();
            return;
        }
        match TimerCommand::from_keyword(keyword) {
            Some(command) => {
                if commands.send(command).await.is_err() {
                    return;
                }
            }
            None => {
                println!();
                println!("Unknown command {keyword:?}");
                print_menu();
            }
        }
    }
}

fn print_menu() {
    for entry in MENU {
        println!("{:<24}{}", entry.label, entry.keywords.join(", "));
    }
    println!("{:<24}{}", "Quit", QUIT_KEYWORDS.join(", "));
}

/// Redraws the status line on every snapshot and prints events above it.
async fn render(
    mut snapshots: watch::Receiver<TimerSnapshot>,
    mut events: mpsc::UnboundedReceiver<TimerEvent>,
    shutdown: CancellationToken,
) {
    let mut app_name = None::<String>;
    loop {
        tokio::select! {
            _ = shutdown.cancelled() => return,
            changed = snapshots.changed() => {
                if changed.is_err() {
                    return;
                }
            }
            Some(event) = events.recv() => match event {
                TimerEvent::Activity { app_name: name, .. } => app_name = Some(name),
                TimerEvent::ModeSwitchRejected => {
                    println!();
                    println!("Can't switch mode while the timer has progress. Clear it first.");
                }
                TimerEvent::SessionCompleted { count, record } => {
                    app_name = None;
                    println!();
                    match record {
                        Some(record) => println!(
                            "Session {count} done, {} recorded",
                            format_duration(hours_to_duration(record.total_hours()))
                        ),
                        None => println!("Session over, {count} completed today"),
                    }
                }
            },
        }
        let line = status_line(&snapshots.borrow_and_update(), app_name.as_deref());
        print!("\r{line}\x1b[K");
        let _ = std::io::stdout().flush();
    }
}

fn status_line(snapshot: &TimerSnapshot, app_name: Option<&str>) -> String {
    let mode = if snapshot.is_focusing {
        Colour::Red.bold().paint("Focus")
    } else {
        Colour::Green.bold().paint("Rest")
    };
    let state = if snapshot.is_running {
        ""
    } else if snapshot.percent > 0. {
        " (paused)"
    } else {
        " (idle)"
    };
    let mut line = format!(
        "{mode} {}{state} {:>3}% | {} today",
        snapshot.left_time, snapshot.percent as i32, snapshot.pomodoros_today
    );
    if let Some(app_name) = app_name {
        line.push_str(" | ");
        line.push_str(app_name);
    }
    line
}

/// Shows the minutes left in the terminal title, which stands in for a tray indicator, and
/// rings the bell when a countdown ends.
struct TerminalNotifier;

impl Notifier for TerminalNotifier {
    fn minute_changed(&self, minutes: Option<i64>) {
        match minutes {
            Some(minutes) => print!("\x1b]0;focuslog {minutes}m\x07"),
            None => print!("\x1b]0;focuslog\x07"),
        }
    }

    fn session_completed(&self, completion: &Completion) {
        info!("{} {}", completion.title(), completion.body());
        println!();
        println!("\x07{} {}", completion.title(), completion.body());
    }
}

#[cfg(test)]
mod tests {
    use crate::{config::TimerConfig, timer::state::TimerSnapshot};

    use super::{status_line, RunCommand};

    #[test]
    fn flags_override_config_in_minutes() {
        let command = RunCommand {
            focus: Some(50),
            rest: None,
            screenshot_every: Some(30),
            project: None,
        };
        let config = command.apply(TimerConfig::default()).unwrap();
        assert_eq!(config.focus_duration, 3000);
        assert_eq!(config.rest_duration, 300);
        assert_eq!(config.screenshot_interval, 30);
    }

    #[test]
    fn zero_minutes_are_rejected() {
        let command = RunCommand {
            focus: Some(0),
            rest: None,
            screenshot_every: None,
            project: None,
        };
        assert!(command.apply(TimerConfig::default()).is_err());
    }

    #[test]
    fn oversized_minutes_are_rejected() {
        let focus = RunCommand {
            focus: Some(100_000_000),
            rest: None,
            screenshot_every: None,
            project: None,
        };
        assert!(focus.apply(TimerConfig::default()).is_err());

        let rest = RunCommand {
            focus: None,
            rest: Some(u32::MAX),
            screenshot_every: None,
            project: None,
        };
        assert!(rest.apply(TimerConfig::default()).is_err());
    }

    #[test]
    fn status_line_shows_pause_and_app() {
        let snapshot = TimerSnapshot {
            left_time: "12:30".into(),
            percent: 50.,
            is_running: false,
            is_focusing: true,
            pomodoros_today: 2,
        };
        let line = status_line(&snapshot, Some("nvim"));
        assert!(line.contains("12:30 (paused)"));
        assert!(line.contains(" 50% | 2 today | nvim"));
    }
}
