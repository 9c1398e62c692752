use std::{collections::BTreeMap, path::PathBuf, sync::Arc};

use anyhow::Result;
use chrono::{Local, NaiveDate, Utc};
use clap::Parser;

use crate::{
    monitor::record::PomodoroRecord,
    sessions::{app_totals, json_log::JsonSessionLog, AppTotal, SESSIONS_DIR},
    utils::{
        clock::DefaultClock,
        percentage::{duration_percentage, Percentage},
        time::{format_duration, hours_to_duration},
    },
};

use super::project::project_directory;

#[derive(Debug, Parser)]
pub struct TodayCommand {
    #[arg(long, short, help = "UTC day to show, for example 2025-03-15. Defaults to today")]
    date: Option<NaiveDate>,
    #[arg(short = 'p', long = "percentage", help = "Filter apps to have at least specified percentage", default_value_t = Percentage::default())]
    min_percentage: Percentage,
}

/// Prints the sessions completed on a day, followed by per-application totals across them.
pub async fn process_today_command(
    TodayCommand {
        date,
        min_percentage,
    }: TodayCommand,
    dir: PathBuf,
) -> Result<()> {
    let date = date.unwrap_or_else(|| Utc::now().date_naive());
    let log = JsonSessionLog::new(dir.join(SESSIONS_DIR), Arc::new(DefaultClock))?;
    let sessions = log.load_for(date).await?;

    // Sessions keep project identifiers, names may have changed since.
    let project_names = project_directory(&dir)
        .list()
        .await?
        .into_iter()
        .map(|(name, id)| (id, name))
        .collect::<BTreeMap<_, _>>();

    println!("{date}\t{} sessions", sessions.len());
    for session in &sessions {
        print_session(session, &project_names);
    }

    let totals = app_totals(&sessions);
    if !totals.is_empty() {
        println!();
        print_totals(&totals, min_percentage);
    }
    Ok(())
}

fn print_session(session: &PomodoroRecord, project_names: &BTreeMap<String, String>) {
    let project = match &session.project_id {
        Some(id) => project_names.get(id).map_or(id.as_str(), String::as_str),
        None => "-",
    };
    let finished = session
        .finished_at
        .map(|v| v.with_timezone(&Local).format("%H:%M").to_string())
        .unwrap_or_else(|| "?".into());
    println!(
        "{}-{}\t{}\t{}",
        session.started_at.with_timezone(&Local).format("%H:%M"),
        finished,
        format_duration(hours_to_duration(session.total_hours())),
        project
    );
}

fn print_totals(totals: &[AppTotal], min_percentage: Percentage) {
    let whole = hours_to_duration(totals.iter().map(|v| v.hours).sum());
    for total in totals {
        let spent = hours_to_duration(total.hours);
        let share = duration_percentage(spent, whole);
        if share < min_percentage {
            continue;
        }
        println!(
            "{}%\t{}\t{}",
            *share as i32,
            format_duration(spent),
            total.app_name
        );
    }
}
