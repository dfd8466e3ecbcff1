//! Chatwoot webhook bot with Gemini AI replies.
//!
//! Receives Chatwoot webhook deliveries, keeps short-term conversation
//! context in an in-memory cache, asks Gemini for a reply with that context,
//! and posts the reply back into the conversation.
//!
//! ## Modules
//!
//! - [`core`] - Error type and tracing setup
//! - [`config`] - TOML config file loading and validation
//! - [`webhook`] - Webhook payload model and axum routes
//! - [`processor`] - The per-delivery message pipeline
//! - [`runner`] - Wires config into a running server
//! - [`cli`] - Command-line interface for the `cwbot` binary

pub mod cli;
pub mod config;
pub mod core;
pub mod processor;
pub mod runner;
pub mod webhook;

pub use cli::{Cli, Commands};
pub use config::BotConfig;
pub use crate::core::error::{BotError, Result};
pub use processor::MessageProcessor;
pub use runner::run_server;
