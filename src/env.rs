use anyhow::Result;
use std::path::Path;

/// Load `<dir>/.env` into the process environment.
/// Variables already set are left alone. Returns the names of the files loaded.
pub fn load_env(dir: &Path) -> Result<Vec<String>> {
    let mut loaded: Vec<String> = Vec::new();

    let base = dir.join(".env");
    if base.is_file() {
        dotenvy::from_path(&base)?;
        loaded.push(base.display().to_string());
    }

    Ok(loaded)
}

/// Read a boolean-ish flag from the environment (`1`, `true`, `yes`, `on`).
pub fn env_flag(key: &str) -> bool {
    std::env::var(key)
        .map(|v| matches!(v.trim().to_lowercase().as_str(), "1" | "true" | "yes" | "on"))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn missing_env_file_is_not_an_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(load_env(dir.path()).unwrap().is_empty());
    }

    #[test]
    fn loads_env_file_without_overriding() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join(".env"),
            "STACKS_ENV_TEST_NEW=from-file\nSTACKS_ENV_TEST_SET=from-file\n",
        )
        .unwrap();
        std::env::set_var("STACKS_ENV_TEST_SET", "from-process");

        let loaded = load_env(dir.path()).unwrap();

        assert_eq!(loaded.len(), 1);
        assert_eq!(std::env::var("STACKS_ENV_TEST_NEW").unwrap(), "from-file");
        assert_eq!(std::env::var("STACKS_ENV_TEST_SET").unwrap(), "from-process");
    }
}
