use std::path::{Path, PathBuf};

use anyhow::Result;
use clap::Subcommand;

use crate::projects::JsonProjectDirectory;

pub const PROJECTS_FILE: &str = "projects.json";

#[derive(Debug, Subcommand)]
pub enum ProjectCommand {
    #[command(about = "Register a project. Adding an existing name prints its identifier")]
    Add { name: String },
    #[command(about = "List known projects")]
    List,
}

pub fn project_directory(dir: &Path) -> JsonProjectDirectory {
    JsonProjectDirectory::new(dir.join(PROJECTS_FILE))
}

pub async fn process_project_command(command: ProjectCommand, dir: PathBuf) -> Result<()> {
    let projects = project_directory(&dir);
    match command {
        ProjectCommand::Add { name } => {
            let id = projects.add(&name).await?;
            println!("{name}\t{id}");
        }
        ProjectCommand::List => {
            for (name, id) in projects.list().await? {
                println!("{name}\t{id}");
            }
        }
    }
    Ok(())
}
