//! Server module for MCP protocol handling.
//!
//! This module provides:
//! - MCP server implementation over stdio
//! - Tool call handlers and routing
//! - Shared application state management

mod handlers;
mod mcp;

pub use handlers::*;
pub use mcp::*;

use std::sync::Arc;

use crate::assistant::AssistantApi;
use crate::config::Config;
use crate::engine::GoalEngine;
use crate::history::HistoryStore;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    /// Application configuration.
    pub config: Config,
    /// Goal engine bound to the remote assistant.
    pub engine: GoalEngine,
    /// Successful runs, most recent first.
    pub history: Arc<HistoryStore>,
}

impl AppState {
    /// Create new application state
    pub fn new(config: Config, api: Arc<dyn AssistantApi>) -> Self {
        tracing::info!(
            default_space = ?config.run.default_space,
            "AppState initialized"
        );
        Self {
            config,
            engine: GoalEngine::new(api),
            history: Arc::new(HistoryStore::new()),
        }
    }
}

/// Shared application state handle
pub type SharedState = Arc<AppState>;
