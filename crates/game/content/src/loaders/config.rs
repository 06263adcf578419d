//! Engine configuration loader.

use std::path::Path;

use spell_core::GameConfig;

use super::{LoadError, LoadResult, read_file};

/// Loader for [`GameConfig`] from TOML files.
pub struct ConfigLoader;

impl ConfigLoader {
    pub fn load(path: &Path) -> LoadResult<GameConfig> {
        let content = read_file(path)?;
        Self::parse(&path.display().to_string(), &content)
    }

    /// Parses TOML text. Missing keys keep their defaults.
    pub fn parse(name: &str, text: &str) -> LoadResult<GameConfig> {
        toml::from_str(text).map_err(|source| LoadError::Toml {
            name: name.to_owned(),
            source,
        })
    }
}

#[cfg(test)]
mod tests {
    use spell_core::SpellId;

    use super::*;

    #[test]
    fn partial_config_keeps_defaults() {
        let config = ConfigLoader::parse("inline", "charge_speed = 30.0\nduel_flag_spell = 9").unwrap();
        assert_eq!(config.charge_speed, 30.0);
        assert_eq!(config.duel_flag_spell, SpellId(9));
        assert_eq!(
            config.projectile_min_travel_ms,
            GameConfig::DEFAULT_PROJECTILE_MIN_TRAVEL_MS
        );
    }

    #[test]
    fn type_mismatch_is_a_toml_error() {
        let err = ConfigLoader::parse("bad.toml", "sight_tiles = \"wide\"").unwrap_err();
        assert!(matches!(err, LoadError::Toml { .. }));
    }
}
