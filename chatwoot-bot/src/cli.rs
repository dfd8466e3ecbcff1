//! CLI parser for the `cwbot` binary.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "cwbot")]
#[command(about = "Chatwoot webhook bot with Gemini AI", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the webhook server with the given config file.
    Run {
        #[arg(short, long, default_value = "bot.config")]
        config: PathBuf,
    },
    /// Write a sample config file and exit.
    InitConfig {
        #[arg(short, long, default_value = "bot.config")]
        path: PathBuf,
    },
}
