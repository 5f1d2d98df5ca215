use std::io;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use clinic_records_cli::{App, Args, AssumeYes, Confirm, Notification, StdioConfirm};
use clinic_records_core::{Database, ImportPolicy, PatientStore, StoreConfig};
use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    let args = Args::parse();
    init_tracing(args.verbose);

    match run(args) {
        Ok(notification) => {
            eprintln!("{}", notification);
            ExitCode::SUCCESS
        }
        Err(err) => {
            tracing::debug!(error = ?err, "command failed");
            eprintln!("{}", Notification::from_error(&err));
            ExitCode::FAILURE
        }
    }
}

/// Log to stderr. `RUST_LOG` wins unless `--verbose` is given.
fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

/// Defaults, then config file, then environment, then flags.
fn load_config(args: &Args) -> Result<StoreConfig> {
    let base = match &args.config {
        Some(path) => StoreConfig::from_file(path)?,
        None => StoreConfig::default(),
    };
    let mut config = base.with_env_overrides()?;

    if let Some(db) = &args.db {
        config.database_path = db.clone();
    }
    if args.strict_import {
        config.import_policy = ImportPolicy::Strict;
    }
    Ok(config)
}

fn run(args: Args) -> Result<Notification> {
    let config = load_config(&args)?;
    tracing::debug!(?config, "resolved configuration");

    // Opened without loading so that clear still works on unreadable data
    let db = Database::open(&config.database_path)
        .with_context(|| format!("opening {}", config.database_path.display()))?;
    let store = PatientStore::new(db, &config);

    let confirm: Box<dyn Confirm> = if args.yes {
        Box::new(AssumeYes)
    } else {
        Box::new(StdioConfirm)
    };

    let stdout = io::stdout();
    let mut app = App::new(store, confirm, stdout.lock());
    app.execute(args.command)
}
