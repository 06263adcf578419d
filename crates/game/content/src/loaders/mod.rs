//! Loaders turning RON/TOML text into core table entries.

pub mod config;
pub mod creatures;
pub mod factory;
pub mod items;
pub mod spells;

pub use config::ConfigLoader;
pub use creatures::{CreatureCatalog, CreatureLoader};
pub use factory::{ContentFactory, ContentSource};
pub use items::{ItemCatalog, ItemLoader};
pub use spells::{SpellCatalog, SpellLoader};

use std::path::{Path, PathBuf};

use spell_core::{ErrorSeverity, GameError};

/// Common result type for loaders.
pub type LoadResult<T> = Result<T, LoadError>;

#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {name}: {source}")]
    Ron {
        name: String,
        #[source]
        source: ron::error::SpannedError,
    },

    #[error("failed to parse {name}: {source}")]
    Toml {
        name: String,
        #[source]
        source: toml::de::Error,
    },

    #[error("duplicate {table} entry {id}")]
    Duplicate { table: &'static str, id: u32 },

    #[error("{owner} references missing {table} entry {id}")]
    DanglingReference {
        owner: String,
        table: &'static str,
        id: u32,
    },
}

impl GameError for LoadError {
    fn severity(&self) -> ErrorSeverity {
        match self {
            Self::Io { .. } => ErrorSeverity::Fatal,
            _ => ErrorSeverity::Validation,
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::Io { .. } => "CONTENT_IO",
            Self::Ron { .. } => "CONTENT_RON",
            Self::Toml { .. } => "CONTENT_TOML",
            Self::Duplicate { .. } => "CONTENT_DUPLICATE",
            Self::DanglingReference { .. } => "CONTENT_DANGLING_REFERENCE",
        }
    }
}

pub(crate) fn read_file(path: &Path) -> LoadResult<String> {
    std::fs::read_to_string(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })
}

pub(crate) fn parse_ron<T: serde::de::DeserializeOwned>(name: &str, text: &str) -> LoadResult<T> {
    ron::from_str(text).map_err(|source| LoadError::Ron {
        name: name.to_owned(),
        source,
    })
}
