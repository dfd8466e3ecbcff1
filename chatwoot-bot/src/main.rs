//! Binary for the Chatwoot-Gemini webhook bot.

use anyhow::Result;
use clap::Parser;

use chatwoot_bot::core::logger::init_tracing;
use chatwoot_bot::{run_server, BotConfig, Cli, Commands};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run { config } => {
            let config = BotConfig::load(&config)?;
            init_tracing(config.service.log_file.as_deref())?;
            run_server(config).await
        }
        Commands::InitConfig { path } => {
            if BotConfig::write_sample(&path)? {
                println!("Created config file: {}", path.display());
                println!("Edit it with your Chatwoot and Gemini credentials before running.");
            } else {
                println!("Config file already exists: {}", path.display());
            }
            Ok(())
        }
    }
}
