use std::path::PathBuf;
use thiserror::Error;

/// Failures the dispatcher reports to the user before or instead of running
/// the compose runtime. All of them end the process with exit code 1.
#[derive(Debug, Error)]
pub enum StacksError {
    #[error("STACKS_ROOT is not set (pass --root or export STACKS_ROOT)")]
    MissingRoot,

    #[error("stacks root '{}' is not a directory", .0.display())]
    InvalidRoot(PathBuf),

    #[error("unknown command: {0}")]
    UnknownCommand(String),

    #[error("unknown stack: {0}")]
    UnknownStack(String),

    #[error("stack name '{name}' is ambiguous, candidates: {}", .candidates.join(", "))]
    AmbiguousStack { name: String, candidates: Vec<String> },

    #[error("'{0}' is a global command and does not take a stack")]
    GlobalOnly(String),

    #[error("invalid argument for {command}: {message}")]
    InvalidArgument { command: String, message: String },

    #[error("failed to run {bin}: {source}")]
    Spawn {
        bin: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to scan {}: {message}", .root.display())]
    Discovery { root: PathBuf, message: String },

    #[error("failed to encode output: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("no documentation found under {}", .0.display())]
    DocsNotFound(PathBuf),
}

pub type Result<T> = std::result::Result<T, StacksError>;
