mod analyzer;
mod history;
mod models;
mod prompt;
mod report;
mod source;
mod tracker;

use anyhow::{Context, Result};
use clap::{Arg, ArgAction, Command};
use history::{JsonSnapshotStore, MemorySnapshotStore, SnapshotStore};
use models::{Config, StudentId};
use source::SourceReader;
use std::io;
use std::path::{Path, PathBuf};
use tracker::{RankTracker, RunSummary};
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();
    prompt::install_interrupt_handler().context("Failed to install Ctrl-C handler")?;

    let matches = Command::new("rank-tracker")
        .version("0.1")
        .about("Tracks a participant's rank in admission lists between runs")
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .value_name("FILE")
                .help("Configuration file path")
                .default_value("config.toml"),
        )
        .arg(
            Arg::new("data-dir")
                .short('d')
                .long("data-dir")
                .value_name("DIR")
                .help("Directory holding the admission lists"),
        )
        .arg(
            Arg::new("history")
                .long("history")
                .value_name("FILE")
                .help("History file with the previous run's ranks"),
        )
        .arg(
            Arg::new("id")
                .long("id")
                .value_name("ID")
                .help("Participant ID for this run only (not saved)"),
        )
        .arg(
            Arg::new("reset-id")
                .long("reset-id")
                .action(ArgAction::SetTrue)
                .help("Ignore the saved participant ID and ask again"),
        )
        .arg(
            Arg::new("dry-run")
                .long("dry-run")
                .action(ArgAction::SetTrue)
                .help("Compare against history without updating it"),
        )
        .get_matches();

    let config_file = matches
        .get_one::<String>("config")
        .map(String::as_str)
        .unwrap_or("config.toml");

    let mut config = if Path::new(config_file).exists() {
        println!("📋 Loading configuration from: {}", config_file);
        Config::load_from_file(config_file)
            .with_context(|| format!("Failed to load configuration: {}", config_file))?
    } else {
        Config::default()
    };

    let student_id = match matches.get_one::<String>("id") {
        Some(raw) => StudentId::parse(raw).with_context(|| format!("Invalid --id value: {}", raw))?,
        None => {
            let stdin = io::stdin();
            let mut input = stdin.lock();
            let mut out = io::stdout();
            let resolved = prompt::resolve_id(
                &mut config,
                config_file,
                matches.get_flag("reset-id"),
                &mut input,
                &mut out,
            )?;
            match resolved {
                Some(id) => id,
                None => {
                    println!("❌ No participant ID given; nothing to do");
                    return Ok(());
                }
            }
        }
    };

    let data_dir = matches
        .get_one::<String>("data-dir")
        .map(String::as_str)
        .or(config.data_directory.as_deref())
        .unwrap_or(".");
    let history_file = matches
        .get_one::<String>("history")
        .map(String::as_str)
        .or(config.history_file.as_deref())
        .unwrap_or("history.json");
    let extension = config.file_extension.as_deref().unwrap_or("csv");

    println!("🔍 Tracking participant ID: {}", student_id);
    println!("📂 Reading .{} lists from: {}", extension.trim_start_matches('.'), data_dir);
    println!("🕘 History file: {}\n", history_file);

    let reader = SourceReader::new(extension);
    let files = reader.discover(Path::new(data_dir));

    let disk_store = JsonSnapshotStore::new(history_file);
    let summary = if matches.get_flag("dry-run") {
        println!("🧪 Dry run: history will not be updated\n");
        let store = MemorySnapshotStore::new(disk_store.load());
        track(&student_id, &reader, &files, &store)?
    } else {
        track(&student_id, &reader, &files, &disk_store)?
    };

    if summary.processed > 0 {
        println!("\n✅ Processed {} list(s)", summary.processed);
    }
    if summary.saved == Some(true) && !matches.get_flag("dry-run") {
        println!("💾 History updated: {}", history_file);
    }
    Ok(())
}

fn track<S: SnapshotStore>(
    student_id: &StudentId,
    reader: &SourceReader,
    files: &[PathBuf],
    store: &S,
) -> Result<RunSummary> {
    let sources = files.iter().map(|path| reader.read_file(path));
    RankTracker::new(student_id.as_str(), store).run(sources, &mut io::stdout())
}
