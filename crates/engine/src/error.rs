use thiserror::Error;

/// Errors raised by the map core.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum EngineError {
    #[error("invalid config: {0}")]
    InvalidConfig(String),

    #[error("invalid agent {id}: {reason}")]
    InvalidAgent { id: String, reason: String },

    #[error("duplicate agent id: {0}")]
    DuplicateAgent(String),

    #[error("invalid canvas size {width}x{height}")]
    InvalidCanvas { width: f64, height: f64 },

    #[error("background image: {0}")]
    Background(String),

    #[error("encode frame: {0}")]
    Encode(String),
}

impl EngineError {
    pub fn config(msg: impl Into<String>) -> Self {
        Self::InvalidConfig(msg.into())
    }
}

pub type Result<T> = std::result::Result<T, EngineError>;
