use std::error::Error;
use std::fmt;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::state::{Locale, ParseLocaleError};

const DEFAULT_CONFIG_TOML: &str = include_str!("config_default.toml");

/// Location of the optional override file, relative to the root.
pub const CONFIG_RELATIVE_PATH: &str = ".projecthub/config.toml";

#[derive(Debug, Clone, Default, Deserialize)]
struct RawConfig {
    db_path: Option<String>,
    export_dir: Option<String>,
    locale: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub db_path: String,
    pub export_dir: PathBuf,
    pub seed_locale: Option<Locale>,
}

#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Toml(toml::de::Error),
    Locale(ParseLocaleError),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Io(err) => write!(f, "config I/O error: {}", err),
            ConfigError::Toml(err) => write!(f, "config parse error: {}", err),
            ConfigError::Locale(err) => write!(f, "config error: {}", err),
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            ConfigError::Io(err) => Some(err),
            ConfigError::Toml(err) => Some(err),
            ConfigError::Locale(err) => Some(err),
        }
    }
}

impl From<std::io::Error> for ConfigError {
    fn from(value: std::io::Error) -> Self {
        ConfigError::Io(value)
    }
}

impl From<toml::de::Error> for ConfigError {
    fn from(value: toml::de::Error) -> Self {
        ConfigError::Toml(value)
    }
}

impl From<ParseLocaleError> for ConfigError {
    fn from(value: ParseLocaleError) -> Self {
        ConfigError::Locale(value)
    }
}

impl Config {
    /// Embedded defaults overlaid with `.projecthub/config.toml` under
    /// the given root, when present. Relative paths resolve against
    /// the root.
    pub fn load(root: &Path) -> Result<Self, ConfigError> {
        let defaults: RawConfig = toml::from_str(DEFAULT_CONFIG_TOML)?;
        let override_path = root.join(CONFIG_RELATIVE_PATH);
        let overrides = if override_path.is_file() {
            toml::from_str(&std::fs::read_to_string(&override_path)?)?
        } else {
            RawConfig::default()
        };
        Self::merge(root, defaults, overrides)
    }

    fn merge(root: &Path, defaults: RawConfig, overrides: RawConfig) -> Result<Self, ConfigError> {
        let db_path = overrides
            .db_path
            .or(defaults.db_path)
            .unwrap_or_else(|| ".projecthub/state.sqlite".to_string());
        let export_dir = overrides
            .export_dir
            .or(defaults.export_dir)
            .unwrap_or_else(|| ".".to_string());
        let seed_locale = overrides
            .locale
            .or(defaults.locale)
            .map(|value| value.parse::<Locale>())
            .transpose()?;

        Ok(Self {
            db_path: resolve(root, &db_path),
            export_dir: PathBuf::from(resolve(root, &export_dir)),
            seed_locale,
        })
    }
}

fn resolve(root: &Path, value: &str) -> String {
    let path = Path::new(value);
    if path.is_absolute() {
        value.to_string()
    } else {
        root.join(path).to_string_lossy().into_owned()
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use uuid::Uuid;

    use super::{Config, ConfigError, CONFIG_RELATIVE_PATH};
    use crate::state::Locale;

    fn unique_root() -> PathBuf {
        let root = std::env::temp_dir().join(format!("projecthub-config-test-{}", Uuid::new_v4()));
        std::fs::create_dir_all(&root).expect("temp root should be creatable");
        root
    }

    #[test]
    fn defaults_apply_without_an_override_file() {
        let root = unique_root();
        let config = Config::load(&root).expect("defaults should load");
        assert!(config.db_path.ends_with("state.sqlite"));
        assert!(config.db_path.starts_with(root.to_str().expect("utf8 path")));
        assert_eq!(config.export_dir, root.join("."));
        assert!(config.seed_locale.is_none());
        let _ = std::fs::remove_dir_all(root);
    }

    #[test]
    fn override_file_wins_over_defaults() {
        let root = unique_root();
        let config_path = root.join(CONFIG_RELATIVE_PATH);
        std::fs::create_dir_all(config_path.parent().expect("parent"))
            .expect("config dir should be creatable");
        std::fs::write(
            &config_path,
            "db_path = \"custom/data.sqlite\"\nlocale = \"en\"\n",
        )
        .expect("config should be writable");

        let config = Config::load(&root).expect("config should load");
        assert!(config.db_path.ends_with("custom/data.sqlite"));
        assert_eq!(config.seed_locale, Some(Locale::En));
        let _ = std::fs::remove_dir_all(root);
    }

    #[test]
    fn invalid_locale_is_reported() {
        let root = unique_root();
        let config_path = root.join(CONFIG_RELATIVE_PATH);
        std::fs::create_dir_all(config_path.parent().expect("parent"))
            .expect("config dir should be creatable");
        std::fs::write(&config_path, "locale = \"de\"\n").expect("config should be writable");

        let err = Config::load(&root).expect_err("unknown locale should fail");
        assert!(matches!(err, ConfigError::Locale(_)));
        let _ = std::fs::remove_dir_all(root);
    }

    #[test]
    fn malformed_toml_is_reported() {
        let root = unique_root();
        let config_path = root.join(CONFIG_RELATIVE_PATH);
        std::fs::create_dir_all(config_path.parent().expect("parent"))
            .expect("config dir should be creatable");
        std::fs::write(&config_path, "db_path = [broken\n").expect("config should be writable");

        let err = Config::load(&root).expect_err("broken toml should fail");
        assert!(matches!(err, ConfigError::Toml(_)));
        let _ = std::fs::remove_dir_all(root);
    }
}
