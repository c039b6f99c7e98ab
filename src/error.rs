use std::path::PathBuf;

/// A move or action index outside the codec's domain.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CodecError {
    #[error("square {0} is outside 0..64")]
    SquareOutOfRange(u8),

    #[error("{0:?} is not a valid promotion piece")]
    InvalidPromotion(chess::Piece),

    #[error("action index {0} is outside the action space")]
    IndexOutOfRange(usize),
}

/// Errors raised by the board rules adapter.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RulesError {
    #[error("illegal move {0}")]
    IllegalMove(String),

    #[error("invalid FEN '{0}'")]
    InvalidFen(String),

    #[error("invalid UCI move '{0}'")]
    InvalidUci(String),
}

/// Errors that can occur while saving or loading network parameters.
#[derive(Debug, thiserror::Error)]
pub enum ModelError {
    #[error("model file not found: {0}")]
    NotFound(PathBuf),

    #[error("{path} is not a model file")]
    BadMagic { path: PathBuf },

    #[error("unsupported model format version {found} (expected {expected})")]
    UnsupportedVersion { found: u32, expected: u32 },

    #[error("failed to parse model metadata: {0}")]
    Metadata(#[from] serde_json::Error),

    #[error("failed to decode network parameters: {0}")]
    Decode(String),

    #[error("failed to encode network parameters: {0}")]
    Encode(String),

    #[error("parameter shape mismatch for {name}: expected {expected:?}, found {found:?}")]
    ShapeMismatch {
        name: String,
        expected: Vec<usize>,
        found: Vec<usize>,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors that can occur during a policy-gradient update.
#[derive(Debug, thiserror::Error)]
pub enum AgentError {
    #[error(
        "episode buffer out of sync: {log_probs} log-probs, {values} values, {rewards} rewards"
    )]
    BufferMismatch {
        log_probs: usize,
        values: usize,
        rewards: usize,
    },

    #[error("loss is not finite ({0}), update skipped")]
    NonFiniteLoss(f32),
}

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    FileRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse TOML: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("config validation error: {0}")]
    Validation(String),
}
