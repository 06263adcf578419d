//! Platform-specific directory utilities

use std::path::PathBuf;

/// Platform log directory for the CLI.
///
/// - macOS: `~/Library/Caches/spellcast/logs`
/// - Linux: `~/.cache/spellcast/logs` (or `$XDG_CACHE_HOME/spellcast/logs`)
/// - Windows: `%LOCALAPPDATA%\spellcast\logs`
/// - Fallback: `/tmp/spellcast/logs`
pub fn log_dir() -> PathBuf {
    directories::ProjectDirs::from("", "", "spellcast")
        .map(|dirs| dirs.cache_dir().to_path_buf())
        .unwrap_or_else(|| PathBuf::from("/tmp/spellcast"))
        .join("logs")
}
