use std::path::PathBuf;

/// Claude projects root, honoring the CLI's own relocation variable.
pub fn default_claude_root() -> PathBuf {
    if let Ok(dir) = std::env::var("CLAUDE_CONFIG_DIR") {
        return PathBuf::from(dir).join("projects");
    }
    home_dir().join(".claude").join("projects")
}

/// Codex sessions root, honoring `CODEX_HOME`.
pub fn default_codex_root() -> PathBuf {
    if let Ok(dir) = std::env::var("CODEX_HOME") {
        return PathBuf::from(dir).join("sessions");
    }
    home_dir().join(".codex").join("sessions")
}

fn home_dir() -> PathBuf {
    if let Ok(home) = std::env::var("HOME") {
        return PathBuf::from(home);
    }
    PathBuf::from(".")
}
