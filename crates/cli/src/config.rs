//! CLI settings read from the environment (after `.env` is loaded).

use std::path::PathBuf;

use spell_content::ContentSource;

#[derive(Debug, Clone)]
pub struct CliConfig {
    /// Session label used for the log sub-directory.
    pub session_id: Option<String>,
    /// `SPELL_DATA_DIR`; bundled tables when unset.
    pub content: ContentSource,
    /// `SPELL_LOG_DIR`; platform cache directory when unset.
    pub log_dir: Option<PathBuf>,
    /// `SPELL_EVENTS=0` turns off the JSON event stream on stdout.
    pub print_events: bool,
}

impl CliConfig {
    pub fn from_env() -> Self {
        let var = |name: &str| std::env::var(name).ok().filter(|v| !v.trim().is_empty());
        Self {
            session_id: var("SPELL_SESSION_ID"),
            content: var("SPELL_DATA_DIR")
                .map(|dir| ContentSource::Directory(PathBuf::from(dir)))
                .unwrap_or_default(),
            log_dir: var("SPELL_LOG_DIR").map(PathBuf::from),
            print_events: var("SPELL_EVENTS").is_none_or(|v| v != "0"),
        }
    }
}
