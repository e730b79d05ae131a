use anyhow::Result;
use camino::{Utf8Path, Utf8PathBuf};
use cfgchain_cli::commands::{self, DiffLayout};
use cfgchain_cli::settings::{Settings, DEFAULT_SETTINGS_FILE};
use clap::{Parser, Subcommand};
use std::env;
use tracing_subscriber::EnvFilter;

/// Tamper-evident configuration history for network devices.
#[derive(Parser, Debug)]
#[command(name = "cfgchain", version)]
struct Cli {
    /// Settings file [default: cfgchain.toml, skipped when absent]
    #[arg(long, global = true)]
    settings: Option<Utf8PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Start a new chain from a device's baseline configuration
    Init {
        /// Chain file to create
        chain: Utf8PathBuf,
        /// Device identifier, e.g. RTR01-NYC
        #[arg(long)]
        device: String,
        /// File holding the baseline configuration
        #[arg(long)]
        config: Utf8PathBuf,
        #[arg(long, default_value = "system")]
        operator: String,
    },
    /// Record a new configuration version
    Commit {
        chain: Utf8PathBuf,
        /// File holding the new configuration
        #[arg(long)]
        config: Utf8PathBuf,
        #[arg(long)]
        operator: String,
    },
    /// Re-apply an earlier version as a new block
    Rollback {
        chain: Utf8PathBuf,
        #[arg(long = "to-version")]
        to_version: u64,
        #[arg(long)]
        operator: String,
    },
    /// Display a chain in human-readable format
    Log { chain: Utf8PathBuf },
    /// Verify the integrity of a chain block by block
    Verify {
        chain: Utf8PathBuf,
        /// Pause between blocks, overriding `[verify] delay_ms`
        #[arg(long = "delay-ms")]
        delay_ms: Option<u64>,
    },
    /// Show the line diff between two versions
    Diff {
        chain: Utf8PathBuf,
        from: u64,
        to: u64,
        /// Two-column layout with per-side line numbers
        #[arg(long)]
        side_by_side: bool,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    if env::var_os("NO_COLOR").is_some() {
        colored::control::set_override(false);
    }

    let cli = Cli::parse();
    let settings = match &cli.settings {
        Some(path) => Settings::load(path)?,
        None => Settings::load_optional(Utf8Path::new(DEFAULT_SETTINGS_FILE))?,
    };

    match cli.command {
        Commands::Init {
            chain,
            device,
            config,
            operator,
        } => commands::cmd_init(&settings, &chain, &device, &config, &operator),
        Commands::Commit {
            chain,
            config,
            operator,
        } => commands::cmd_commit(&settings, &chain, &config, &operator),
        Commands::Rollback {
            chain,
            to_version,
            operator,
        } => commands::cmd_rollback(&settings, &chain, to_version, &operator),
        Commands::Log { chain } => commands::cmd_log(&chain),
        Commands::Verify { chain, delay_ms } => {
            let delay_ms = delay_ms.unwrap_or(settings.verify.delay_ms);
            commands::cmd_verify(&settings, &chain, delay_ms)
        }
        Commands::Diff {
            chain,
            from,
            to,
            side_by_side,
        } => {
            let layout = if side_by_side {
                DiffLayout::SideBySide
            } else {
                DiffLayout::Unified
            };
            commands::cmd_diff(&chain, from, to, layout)
        }
    }
}
