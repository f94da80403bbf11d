use crate::env::env_flag;
use crate::error::{Result, StacksError};
use clap::ValueEnum;
use std::path::{Path, PathBuf};

pub const ROOT_VAR: &str = "STACKS_ROOT";
pub const PARALLEL_VAR: &str = "STACKS_PARALLEL";
pub const ON_FAILURE_VAR: &str = "STACKS_ON_FAILURE";

/// What a fan-out over every stack does when one stack's verb fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum FailurePolicy {
    /// Visit every stack, then report the failures and exit non-zero.
    #[default]
    BestEffort,
    /// Stop at the first failing stack.
    FailFast,
    /// Visit every stack and exit 0 regardless.
    Ignore,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub root: PathBuf,
    pub docker_bin: String,
    pub on_failure: FailurePolicy,
    pub parallel: bool,
}

pub fn resolve_docker_binary() -> String {
    std::env::var("DOCKER_BIN").unwrap_or_else(|_| "docker".to_string())
}

/// Validate the stacks root. `None` means neither `--root` nor `STACKS_ROOT` was given.
pub fn resolve_root(root: Option<&Path>) -> Result<PathBuf> {
    let root = match root {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => return Err(StacksError::MissingRoot),
    };
    if !root.is_dir() {
        return Err(StacksError::InvalidRoot(root.to_path_buf()));
    }
    Ok(root.to_path_buf())
}

pub fn get_config(root: Option<&Path>, on_failure: FailurePolicy, parallel: bool) -> Result<Config> {
    Ok(Config {
        root: resolve_root(root)?,
        docker_bin: resolve_docker_binary(),
        on_failure,
        parallel: parallel || env_flag(PARALLEL_VAR),
    })
}
