use std::io;
use thiserror::Error;

/// Rejected tree shapes. Returned before any worker is spawned.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("tree height must be at least 1, got {0}")]
    InvalidHeight(usize),

    #[error("branching factor must be at least 2, got {0}")]
    InvalidBranching(usize),

    #[error("data block size must be at least 1 byte")]
    InvalidBlockSize,
}

/// Failure reported by a hash primitive while absorbing input.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("hash primitive failed: {message}")]
pub struct PrimitiveError {
    message: String,
}

impl PrimitiveError {
    pub fn new(message: impl Into<String>) -> Self {
        PrimitiveError {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

/// Errors surfaced by [`MerkleTree`](crate::MerkleTree) and the pipeline behind it.
#[derive(Debug, Error)]
pub enum TreeError {
    #[error("invalid tree configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("tree is closed")]
    Closed,

    #[error("tree was finalized by sum, reset it before writing again")]
    Finalized,

    #[error("writing {attempted} bytes in total exceeds tree capacity of {capacity} bytes")]
    CapacityExceeded { attempted: u64, capacity: u64 },

    #[error(transparent)]
    Primitive(#[from] PrimitiveError),

    #[error("pipeline worker at level {level} panicked")]
    WorkerPanicked { level: usize },

    #[error("pipeline disconnected")]
    PipelineDisconnected,

    #[error("unexpected {0} token at the tree root")]
    UnexpectedToken(&'static str),

    #[error("failed to spawn pipeline worker: {0}")]
    Spawn(#[source] io::Error),
}

pub type Result<T> = std::result::Result<T, TreeError>;

impl From<TreeError> for io::Error {
    fn from(err: TreeError) -> Self {
        match err {
            TreeError::Spawn(e) => e,
            other => io::Error::other(other),
        }
    }
}
