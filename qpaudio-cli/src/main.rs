//! QPAudioEraser CLI: terminal front end for the audio-unlearning demo.
//!
//! Loads the simulated speaker model, renders confidence distributions, and
//! plays an unlearning run either instantly or paced in real time.

mod commands;
mod render;

use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

/// QPAudioEraser: quantum-inspired audio unlearning, simulated.
#[derive(Parser, Debug)]
#[command(name = "qpaudio", version, about, long_about = None)]
pub(crate) struct Cli {
    /// Seed for reproducible runs (random if omitted)
    #[arg(short, long, global = true)]
    seed: Option<u64>,

    /// Additional configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Workspace directory (reads .qpaudio/config.toml)
    #[arg(short, long, default_value = ".", global = true)]
    workspace: PathBuf,

    /// Print JSON instead of text
    #[arg(long, global = true)]
    json: bool,

    /// Playback speed for timed steps: 0 = instant, 1 = real time
    #[arg(long, default_value_t = 0.0, global = true)]
    pace: f64,

    /// Increase verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Print only results: no load script, speaker card or phase log
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Subcommand, Debug)]
pub(crate) enum Commands {
    /// List the speaker catalog
    Speakers,
    /// Load the model and show per-speaker metrics
    Load,
    /// Load the model and classify one speaker's audio
    Predict {
        /// Speaker id
        speaker: String,
    },
    /// Load the model and unlearn one speaker
    Unlearn {
        /// Speaker id
        speaker: String,
    },
    /// Full walkthrough: load, classify, unlearn, classify again
    Demo {
        /// Speaker to forget (random if omitted)
        #[arg(long)]
        speaker: Option<String>,
    },
    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(clap::Subcommand, Debug)]
pub(crate) enum ConfigAction {
    /// Write the default configuration to .qpaudio/config.toml
    Init,
    /// Show the effective configuration
    Show,
}

/// Output and pacing options shared by every command.
#[derive(Debug, Clone, Copy)]
pub(crate) struct OutputOptions {
    pub json: bool,
    pub pace: f64,
    pub quiet: bool,
}

impl OutputOptions {
    /// Whether the load script, speaker card and phase log are printed.
    pub fn shows_progress(&self) -> bool {
        !self.json && !self.quiet
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file if present
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    // Set up tracing: human-readable stderr + JSON file logging
    let filter = match cli.verbose {
        0 if cli.quiet => "error",
        0 => "warn",
        1 => "info",
        _ => "debug",
    };

    let stderr_layer = tracing_subscriber::fmt::layer()
        .with_target(false)
        .with_writer(std::io::stderr)
        .with_filter(EnvFilter::new(filter));

    let log_dir = directories::ProjectDirs::from("dev", "qpaudio", "qpaudio")
        .map(|d| d.data_dir().join("logs"))
        .unwrap_or_else(|| PathBuf::from("."));
    let _ = std::fs::create_dir_all(&log_dir);
    let file_appender = tracing_appender::rolling::daily(&log_dir, "qpaudio.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);
    let json_layer = tracing_subscriber::fmt::layer()
        .json()
        .with_writer(non_blocking)
        .with_filter(EnvFilter::new("debug"));

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(json_layer)
        .init();

    if !cli.pace.is_finite() || cli.pace < 0.0 {
        anyhow::bail!("--pace must be a non-negative number, got {}", cli.pace);
    }

    let workspace = cli
        .workspace
        .canonicalize()
        .unwrap_or_else(|_| std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")));

    let options = OutputOptions {
        json: cli.json,
        pace: cli.pace,
        quiet: cli.quiet,
    };

    commands::handle_command(
        cli.command,
        &workspace,
        cli.config.as_deref(),
        cli.seed,
        options,
    )
    .await
}
