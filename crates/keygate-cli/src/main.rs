use clap::{Parser, Subcommand};
use keygate_core::KeygateConfig;
use std::path::PathBuf;

mod commands;

#[derive(Parser, Debug)]
#[command(name = "keygate", version, about = "Keygate CLI")]
struct Cli {
    /// Path to a YAML config file. Without it, configuration comes from the
    /// KEYGATE_* environment variables.
    #[arg(long, global = true, env = "KEYGATE_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Issue tokens for a user against the configured store.
    Issue {
        /// User id to issue tokens for.
        #[arg(long)]
        user: String,

        /// Partition-key value the tokens are scoped to. Defaults to the
        /// user id.
        #[arg(long = "partition-key")]
        partition_key: Option<String>,
    },

    /// Validate the configuration and report findings.
    Check,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt().with_env_filter("info").init();

    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => KeygateConfig::from_file(path)?,
        None => KeygateConfig::load()?,
    };

    match cli.cmd {
        Command::Issue { user, partition_key } => {
            commands::issue::run(config, &user, partition_key.as_deref()).await
        }
        Command::Check => commands::check::run(&config),
    }
}
