pub mod project;
pub mod run;
pub mod shutdown;
pub mod today;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use project::{process_project_command, ProjectCommand};
use run::{process_run_command, RunCommand};
use today::{process_today_command, TodayCommand};
use tracing::level_filters::LevelFilter;

use crate::utils::{
    dir::create_application_default_path,
    logging::{enable_logging, CLI_PREFIX, TIMER_PREFIX},
};

#[derive(Parser, Debug)]
#[command(name = "Focuslog", version, long_about = None)]
#[command(about = "Focus/rest timer that keeps track of the applications used while focusing", long_about = None)]
struct Args {
    #[command(subcommand)]
    commands: Commands,
    #[arg(
        long,
        global = true,
        help = "Application directory. By default tries to save into $XDG_STATE_HOME or $HOME/.local/state"
    )]
    dir: Option<PathBuf>,
    #[arg(long, global = true, help = "Enable verbose logging")]
    log: bool,
    #[arg(long = "log-filter", global = true, help = "Overrides the logging level")]
    log_filter: Option<LevelFilter>,
    /// This option is for debugging purposes only.
    #[arg(long = "log-console", global = true)]
    log_console: bool,
}

#[derive(Subcommand, Debug)]
#[command(version, about, long_about = None)]
enum Commands {
    #[command(about = "Run the timer in the current console. Type a command and press enter")]
    Run {
        #[command(flatten)]
        command: RunCommand,
    },
    #[command(about = "Show focus sessions completed today and where the time went")]
    Today {
        #[command(flatten)]
        command: TodayCommand,
    },
    #[command(about = "Manage projects sessions can be filed under")]
    Project {
        #[command(subcommand)]
        command: ProjectCommand,
    },
}

pub async fn run_cli() -> Result<()> {
    let args = Args::parse();

    let dir = args.dir.map_or_else(create_application_default_path, Ok)?;

    let logging_level = args
        .log_filter
        .or_else(|| args.log.then_some(LevelFilter::TRACE));
    let prefix = match args.commands {
        Commands::Run { .. } => TIMER_PREFIX,
        _ => CLI_PREFIX,
    };
    enable_logging(prefix, &dir, logging_level, args.log_console)?;

    match args.commands {
        Commands::Run { command } => process_run_command(command, dir).await,
        Commands::Today { command } => process_today_command(command, dir).await,
        Commands::Project { command } => process_project_command(command, dir).await,
    }
}
