use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use mixtape_lib::{AppState, commands, init_tracing};
use mixtape_library::suggested_music_folder;
use mixtape_paths::MixtapePaths;
use serde::Serialize;
use tracing::warn;

#[derive(Parser, Debug)]
#[command(name = "mixtape", version, about = "Pick music folders, find their tracks, hand them to the player")]
struct Cli {
    /// Print machine-readable JSON instead of plain lines.
    #[arg(long, global = true)]
    json: bool,

    /// Default log level when RUST_LOG is not set.
    #[arg(long, global = true, default_value = "warn")]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Show the stored music folders.
    Folders,
    /// Replace the stored music folders.
    SetFolders { folders: Vec<PathBuf> },
    /// Add one folder to the stored set.
    AddFolder { folder: PathBuf },
    /// Remove one folder from the stored set.
    RemoveFolder { folder: PathBuf },
    /// List audio files below the given folders, or below the stored ones.
    Scan { folders: Vec<PathBuf> },
    /// Print a file as a base64 `data:` URL.
    DataUrl { file: PathBuf },
    /// Show where settings live.
    Paths,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let paths = MixtapePaths::new().context("resolving storage folders")?;

    let log_file = paths.open_log();
    let log_error = log_file.as_ref().err().map(ToString::to_string);
    init_tracing(&cli.log_level, log_file.ok());
    if let Some(error) = log_error {
        warn!(%error, log_file = %paths.log_file.display(), "file logging disabled");
    }

    let _lock = paths.try_lock()?;
    let state = AppState::from_paths(&paths)?;

    match cli.command {
        Command::Folders => {
            let folders = commands::get_selected_folders(&state)?;
            if folders.is_empty() && !cli.json {
                match suggested_music_folder() {
                    Some(dir) => eprintln!(
                        "No folders selected yet. Try `mixtape add-folder {}`.",
                        dir.display()
                    ),
                    None => eprintln!("No folders selected yet."),
                }
            }
            print_paths(cli.json, &folders)?;
        }
        Command::SetFolders { folders } => {
            let folders = absolute_all(folders)?;
            commands::update_selected_folders(&state, folders.clone())?;
            print_paths(cli.json, &folders)?;
        }
        Command::AddFolder { folder } => {
            let folder = std::path::absolute(&folder)?;
            print_paths(cli.json, &commands::add_selected_folder(&state, folder)?)?;
        }
        Command::RemoveFolder { folder } => {
            let folder = std::path::absolute(&folder)?;
            print_paths(cli.json, &commands::remove_selected_folder(&state, folder)?)?;
        }
        Command::Scan { folders } => {
            let response = if folders.is_empty() {
                commands::scan_selected_folders(&state).await?
            } else {
                commands::deep_search_music_files(&state, absolute_all(folders)?).await?
            };

            if cli.json {
                print_json(&response)?;
            } else {
                for file in &response.files {
                    println!("{file}");
                }
                for failure in &response.failures {
                    eprintln!("skipped {}: {}", failure.root, failure.message);
                }
                if response.skipped_entries > 0 {
                    eprintln!("{} unreadable entries skipped", response.skipped_entries);
                }
            }
        }
        Command::DataUrl { file } => {
            let url = commands::read_file_as_data_url(file).await?;
            if cli.json {
                print_json(&url)?;
            } else {
                println!("{url}");
            }
        }
        Command::Paths => {
            if cli.json {
                print_json(&serde_json::json!({
                    "config": paths.config_dir,
                    "store": paths.store_file,
                    "settings": paths.settings_file,
                    "data": paths.data_dir,
                    "log": paths.log_file,
                }))?;
            } else {
                println!("config:   {}", paths.config_dir.display());
                println!("store:    {}", paths.store_file.display());
                println!("settings: {}", paths.settings_file.display());
                println!("data:     {}", paths.data_dir.display());
                println!("log:      {}", paths.log_file.display());
            }
        }
    }

    Ok(())
}

fn absolute_all(folders: Vec<PathBuf>) -> Result<Vec<PathBuf>> {
    folders
        .iter()
        .map(|f| std::path::absolute(f).with_context(|| format!("resolving {}", f.display())))
        .collect()
}

fn print_paths(json: bool, paths: &[PathBuf]) -> Result<()> {
    if json {
        return print_json(&paths);
    }
    for path in paths {
        println!("{}", path.display());
    }
    Ok(())
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
