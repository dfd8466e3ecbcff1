//! Wires the config into a running webhook server.

use std::sync::Arc;

use chrono::Duration;
use tracing::info;

use chatwoot_client::ChatwootClient;
use context_cache::{ContextAssembler, ConversationCache};
use gemini_client::{mask_token, GeminiClient};

use crate::config::BotConfig;
use crate::processor::MessageProcessor;
use crate::webhook::{router, AppState};

/// Builds the processor from config. Split out so integration tests can
/// exercise the same wiring without binding a socket.
pub fn build_processor(config: &BotConfig) -> MessageProcessor {
    let cache = ConversationCache::with_ttl(Duration::seconds(config.cache.ttl_secs));

    let chatwoot = Arc::new(ChatwootClient::new(
        config.chatwoot.url.clone(),
        config.chatwoot.access_key.clone(),
    ));

    let mut gemini = GeminiClient::new(config.gemini.api_key.clone(), config.gemini.model.clone())
        .with_max_tokens(config.gemini.max_tokens)
        .with_temperature(config.gemini.temperature);
    if let Some(prompt) = &config.gemini.system_prompt {
        gemini = gemini.with_system_prompt(prompt.clone());
    }

    let assembler = ContextAssembler::new(cache.clone(), chatwoot.clone());
    MessageProcessor::new(
        cache,
        assembler,
        Arc::new(gemini),
        chatwoot,
        config.chatwoot.account_id,
    )
}

/// Starts the webhook server and serves until the process is stopped.
pub async fn run_server(config: BotConfig) -> anyhow::Result<()> {
    let processor = build_processor(&config);
    let state = Arc::new(AppState { processor });
    let app = router(state);

    let addr = format!("{}:{}", config.service.host, config.service.port);
    info!(
        addr = %addr,
        model = %config.gemini.model,
        gemini_key = %mask_token(&config.gemini.api_key),
        "starting Chatwoot-Gemini agent bot"
    );

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
