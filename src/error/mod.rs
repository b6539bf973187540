use thiserror::Error;

/// Application-level errors
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("{0}")]
    Validation(#[from] ValidationError),

    #[error("Goal run failed: {0}")]
    Assistant(#[from] AssistantError),

    #[error("History entry not found: {id}")]
    HistoryNotFound { id: String },
}

/// Input problems detected before any remote call is made
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Validation failed: a goal is required")]
    MissingGoal,

    #[error("Validation failed: a space is required")]
    MissingSpace,

    #[error("Validation failed: select at least one page")]
    NoPagesSelected,

    #[error("Validation failed: {field} - {reason}")]
    Field { field: String, reason: String },
}

/// Remote assistant API errors
#[derive(Debug, Error)]
pub enum AssistantError {
    #[error("API error on {endpoint}: {status} - {message}")]
    Api {
        endpoint: String,
        status: u16,
        message: String,
    },

    #[error("Invalid response from {endpoint}: {message}")]
    InvalidResponse { endpoint: String, message: String },

    #[error("Request timeout after {timeout_ms}ms")]
    Timeout { timeout_ms: u64 },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

/// MCP protocol errors
#[derive(Debug, Error)]
pub enum McpError {
    #[error("Unknown tool: {tool_name}")]
    UnknownTool { tool_name: String },

    #[error("Invalid parameters for {tool_name}: {message}")]
    InvalidParameters { tool_name: String, message: String },

    #[error("{0}")]
    Validation(#[from] ValidationError),

    #[error("Tool execution failed: {message}")]
    ExecutionFailed { message: String },

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

impl From<AppError> for McpError {
    fn from(err: AppError) -> Self {
        match err {
            AppError::Validation(err) => McpError::Validation(err),
            other => McpError::ExecutionFailed {
                message: other.to_string(),
            },
        }
    }
}

/// Result type alias for application errors
pub type AppResult<T> = Result<T, AppError>;

/// Result type alias for assistant API operations
pub type AssistantResult<T> = Result<T, AssistantError>;

/// Result type alias for MCP operations
pub type McpResult<T> = Result<T, McpError>;
