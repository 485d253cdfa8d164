use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use ward_config::{Config, ConfigLoader};
use ward_store::{AuditLogger, MemoryAuditLogger};

mod commands;
mod mount;

/// Inspect and modify permission-gated ward stores.
///
/// A store is loaded from a JSON document and governed by the policy in
/// ward.toml. Every read and write is checked against that policy; nothing
/// is written back to the data file.
///
/// EXAMPLES:
///     ward read profile.name --data user.json       Read one value
///     ward write profile:nickname '"ada"' -d u.json  Write and print entries
///     ward entries --data user.json                 Print readable entries
///     ward check secret.key                         Show effective access
///
/// ENVIRONMENT VARIABLES:
///     WARD_CONFIG          Path to ward.toml
///     WARD_DEFAULT_POLICY  Override the root default policy (r, w, rw, none)
///     WARD_AUDIT           Set to '1' to print the access audit trail
///     RUST_LOG             Log filter (overrides --verbose)
#[derive(Parser)]
#[command(name = "ward")]
#[command(version)]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to ward.toml (discovered from the current directory when omitted)
    #[arg(long, short = 'c', global = true, env = "WARD_CONFIG")]
    config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long, short = 'v', global = true)]
    verbose: bool,

    /// Print the access audit trail to stderr
    #[arg(long, global = true)]
    audit: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Read the value at a path
    ///
    /// Prints the value as JSON, or `undefined` when nothing is stored there.
    ///
    /// EXAMPLES:
    ///     ward read profile.name --data user.json
    ///     ward read settings:theme --data user.json
    #[command(visible_alias = "r")]
    Read {
        /// Dotted or colon-separated path
        path: String,
        /// JSON document holding the store's fields
        #[arg(long, short = 'd')]
        data: Option<PathBuf>,
    },

    /// Write a value at a path
    ///
    /// The value is parsed as JSON; anything that is not valid JSON is
    /// written as a string. Prints the readable entries after the write.
    ///
    /// EXAMPLES:
    ///     ward write profile.age 37 --data user.json
    ///     ward write tags.0 '"admin"' --data user.json
    #[command(visible_alias = "w")]
    Write {
        /// Dotted or colon-separated path
        path: String,
        /// Value to write (JSON)
        value: String,
        /// JSON document holding the store's fields
        #[arg(long, short = 'd')]
        data: Option<PathBuf>,
    },

    /// Print every readable entry
    ///
    /// EXAMPLES:
    ///     ward entries --data user.json
    #[command(visible_alias = "e")]
    Entries {
        /// JSON document holding the store's fields
        #[arg(long, short = 'd')]
        data: Option<PathBuf>,
    },

    /// Show the effective permission of a path
    ///
    /// Paths under a mounted nested store report both the outer and the
    /// nested store's levels; access requires both.
    ///
    /// EXAMPLES:
    ///     ward check profile.email
    #[command(visible_alias = "c")]
    Check {
        /// Dotted or colon-separated path
        path: String,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = load_config(cli.config.as_deref())?;

    let audit: Option<Arc<dyn AuditLogger>> = if cli.audit || config.audit_enabled() {
        Some(Arc::new(MemoryAuditLogger::new()))
    } else {
        None
    };

    let result = match cli.command {
        Commands::Read { path, data } => {
            commands::read::run(&config, data.as_deref(), audit.clone(), &path)
        }
        Commands::Write { path, value, data } => {
            commands::write::run(&config, data.as_deref(), audit.clone(), &path, &value)
        }
        Commands::Entries { data } => {
            commands::entries::run(&config, data.as_deref(), audit.clone())
        }
        Commands::Check { path } => commands::check::run(&config, &path),
    };

    if let Some(logger) = &audit {
        commands::print_audit_trail(logger.as_ref());
    }

    result
}

/// Install the stderr log subscriber
///
/// `RUST_LOG` wins over `--verbose` when set.
fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "warn" };

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("ward_store={},ward_cli={}", level, level))
        }))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn load_config(explicit: Option<&std::path::Path>) -> Result<Config> {
    let mut loader = ConfigLoader::new();

    let config = match explicit {
        Some(path) => loader
            .load_from_file(path)
            .with_context(|| format!("Failed to load config: {}", path.display()))?,
        None => {
            let cwd = std::env::current_dir().context("Failed to read current directory")?;
            loader
                .load_from_directory(&cwd)
                .context("Failed to load ward.toml")?
        }
    };

    match config.project_root() {
        Some(root) => tracing::debug!(root = %root.display(), "loaded project config"),
        None => tracing::debug!("no ward.toml found, using defaults"),
    }

    Ok(config)
}
