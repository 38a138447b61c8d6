//! falcon-migrate - schema diff to migration generator
//!
//! Reads Sequelize model files, compares two versions of a model and writes
//! the `up`/`down` migration between them.

mod commands;

use clap::{Parser, Subcommand};
use falcon_migrate::config::Settings;
use falcon_migrate::error::AppError;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::debug;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser)]
#[command(name = "falcon-migrate")]
#[command(version)]
#[command(about = "Generate Sequelize migrations from model schema changes")]
#[command(subcommand_required = true, arg_required_else_help = true)]
struct Cli {
    /// Directory migrations are written to (overrides `migrations_dir`)
    #[arg(long, global = true, env = "FALCON_MIGRATIONS_DIR")]
    migrations_dir: Option<PathBuf>,

    /// Directory holding model JSON files (overrides `models_dir`)
    #[arg(long, global = true, env = "FALCON_MODELS_DIR")]
    models_dir: Option<PathBuf>,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Classify every column of two model files
    Diff {
        old: PathBuf,
        new: PathBuf,
        /// Print the classification as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show the migration between two model files without writing it
    Plan {
        old: PathBuf,
        new: PathBuf,
        /// Replay the migration in memory and check both directions
        #[arg(long)]
        verify: bool,
    },
    /// Write the alter migration between two model files
    Alter { old: PathBuf, new: PathBuf },
    /// Replace a stored model with an edited version and write the migration
    Edit {
        /// Name of the stored model
        model: String,
        /// Model file with the edited definition
        #[arg(long)]
        from: PathBuf,
    },
    /// Write the create-table migration for a stored model
    Create { model: String },
    /// List migrations in the order they apply
    List,
    /// List the stored models
    Models,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let mut settings = match Settings::load() {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("{}", e);
            return ExitCode::from(1);
        }
    };
    if let Some(dir) = cli.migrations_dir.clone() {
        settings.migrations_dir = dir;
    }
    if let Some(dir) = cli.models_dir.clone() {
        settings.models_dir = dir;
    }

    init_tracing(&settings.log_filter, cli.json_logs);
    debug!("Settings: {:?}", settings);

    match run(cli.command, &settings) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => match e.downcast_ref::<AppError>() {
            Some(app_error) => ExitCode::from(app_error.report() as u8),
            None => {
                tracing::error!("{:#}", e);
                ExitCode::FAILURE
            }
        },
    }
}

fn run(command: Command, settings: &Settings) -> anyhow::Result<()> {
    match command {
        Command::Diff { old, new, json } => commands::diff(&old, &new, json)?,
        Command::Plan { old, new, verify } => commands::plan(&old, &new, verify)?,
        Command::Alter { old, new } => commands::alter(&old, &new, settings)?,
        Command::Edit { model, from } => commands::edit(&model, &from, settings)?,
        Command::Create { model } => commands::create(&model, settings)?,
        Command::List => commands::list(settings)?,
        Command::Models => commands::models(settings)?,
    }
    Ok(())
}

/// Initialize tracing with structured logging
fn init_tracing(fallback_filter: &str, json: bool) {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback_filter));

    let registry = tracing_subscriber::registry().with(env_filter);
    if json {
        registry
            .with(fmt::layer().json().with_target(true).with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_level(true)
                    .with_writer(std::io::stderr)
                    .compact(),
            )
            .init();
    }
}
