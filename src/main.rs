use std::{path::PathBuf, process::ExitCode};

use ::tracing::{error, info_span};
use anyhow::{Context, Result};
use chrono::{DateTime, SecondsFormat, Utc};
use clap::{Parser, Subcommand};
use state_store::{open_database, MigrationRunner, Options, RocksDBDriver};

mod config;
mod migrations;
mod tracing;
use tracing::setup_tracing;

#[derive(Parser)]
#[command(version, about, long_about = None)]
struct Cli {
    #[arg(short, long, value_name = "config file", help = "Path to config file")]
    config: Option<PathBuf>,

    #[arg(long, value_name = "path", help = "State store path, overrides the config")]
    db: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print migrations that have not been applied yet, in execution order.
    Pending,
    /// Apply every pending migration.
    Apply,
    /// Print applied migrations with the time they were applied.
    Status,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let config = match &cli.config {
        Some(path) => config::MigratorConfig::from_path(&path.to_string_lossy()),
        None => config::MigratorConfig::from_env(),
    };
    let mut config = match config {
        Ok(config) => config,
        Err(err) => {
            eprintln!("Error loading config: {err:?}");
            return ExitCode::FAILURE;
        }
    };
    if let Some(db) = cli.db {
        config.state_store_path = db;
    }

    setup_tracing(&config);

    let root_span = info_span!(
        "kv-migrate",
        state_store = %config.state_store_path.display()
    );
    let _guard = root_span.enter();

    if let Err(err) = run(&config, &cli.command) {
        error!("Error running {}: {:?}", command_name(&cli.command), err);
        return ExitCode::FAILURE;
    }
    ExitCode::SUCCESS
}

fn run(config: &config::MigratorConfig, command: &Command) -> Result<()> {
    std::fs::create_dir_all(&config.state_store_path)
        .with_context(|| format!("creating {}", config.state_store_path.display()))?;

    let db = open_database(Options {
        path: config.state_store_path.clone(),
        column_families: Vec::new(),
    })
    .context("opening state store")?;

    let mut runner = MigrationRunner::new();
    migrations::register(&mut runner);

    match command {
        Command::Pending => {
            for name in runner.pending_names(&db).context("listing pending migrations")? {
                println!("{name}");
            }
        }
        Command::Apply => {
            for name in runner.apply(&db).context("applying migrations")? {
                println!("applied {name}");
            }
            report_event_kinds(&db)?;
        }
        Command::Status => {
            for record in runner.applied_records(&db).context("listing applied migrations")? {
                let applied_at: DateTime<Utc> = record.applied_at.into();
                println!(
                    "{}\t{}",
                    record.name,
                    applied_at.to_rfc3339_opts(SecondsFormat::Millis, true)
                );
            }
        }
    }

    Ok(())
}

fn report_event_kinds(db: &RocksDBDriver) -> Result<()> {
    use state_store::Reader;

    if db.has_cf(migrations::EVENTS_CF) {
        ::tracing::info!(
            event_kinds = migrations::count_event_kinds(db)?,
            "event kinds available"
        );
    }
    Ok(())
}

fn command_name(command: &Command) -> &'static str {
    match command {
        Command::Pending => "pending",
        Command::Apply => "apply",
        Command::Status => "status",
    }
}
