//! Configuration management

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::application::errors::ConfigError;
use crate::infrastructure::reporting::TRANSIENT_ERROR_PATTERNS;

/// Bot configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct Config {
    pub bot: BotConfig,
    #[serde(default)]
    pub modules: ModulesConfig,
    pub locales: LocalesConfig,
    #[serde(default)]
    pub reporting: ReportingConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct BotConfig {
    pub name: String,
    pub prefix: String,
    /// Locale used when rendering replies
    pub locale: String,
}

/// Where event handler and filter units are enumerated from.
/// When a directory is unset every builtin unit is loaded.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct ModulesConfig {
    pub events_dir: Option<PathBuf>,
    pub filters_dir: Option<PathBuf>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct LocalesConfig {
    /// Holds `source/` and `translated/<code>/`
    pub directory: PathBuf,
    /// Code of the authoritative locale
    pub source: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct ReportingConfig {
    pub dsn: Option<String>,
    pub environment: String,
    pub debug: bool,
    pub max_breadcrumbs: usize,
    pub ignore_errors: Vec<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct LoggingConfig {
    pub level: String,
}

impl Default for ReportingConfig {
    fn default() -> Self {
        Self {
            dsn: None,
            environment: "development".to_string(),
            debug: false,
            max_breadcrumbs: 5,
            ignore_errors: TRANSIENT_ERROR_PATTERNS.iter().map(|p| p.to_string()).collect(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bot: BotConfig {
                name: "herald-bot".to_string(),
                prefix: "!".to_string(),
                locale: "en".to_string(),
            },
            modules: ModulesConfig::default(),
            locales: LocalesConfig {
                directory: PathBuf::from("./locales"),
                source: "en".to_string(),
            },
            reporting: ReportingConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Config {
    pub fn load(path: impl Into<PathBuf>) -> Result<Self, ConfigError> {
        let path = path.into();
        let content = std::fs::read_to_string(&path)
            .map_err(|e| ConfigError::Parse(format!("Failed to read config: {}", e)))?;

        let config: Config = serde_yaml::from_str(&content)
            .map_err(|e| ConfigError::Parse(format!("Failed to parse config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Defaults overridden by the environment, for running without a file
    pub fn load_env() -> Result<Self, ConfigError> {
        let mut config = Config::default();
        config.apply_env()?;
        Ok(config)
    }

    /// Let environment variables override loaded values, then re-validate
    pub fn apply_env(&mut self) -> Result<(), ConfigError> {
        self.apply_overrides(|name| std::env::var(name).ok())
    }

    /// Apply overrides from `lookup`. Blank values are ignored.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        if let Some(prefix) = var("BOT_PREFIX") {
            self.bot.prefix = prefix;
        }

        if let Some(locale) = var("BOT_LOCALE") {
            self.bot.locale = locale;
        }

        if let Some(dir) = var("BOT_LOCALES_DIR") {
            self.locales.directory = PathBuf::from(dir);
        }

        if let Some(env) = var("BOT_ENV") {
            self.reporting.environment = env;
        }

        if let Some(dsn) = var("ERROR_REPORTING_DSN") {
            self.reporting.dsn = Some(dsn);
        }

        self.validate()
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.bot.prefix.trim().is_empty() {
            return Err(ConfigError::MissingField("bot.prefix".to_string()));
        }
        if self.locales.source.is_empty() {
            return Err(ConfigError::MissingField("locales.source".to_string()));
        }
        if self.reporting.max_breadcrumbs == 0 {
            return Err(ConfigError::InvalidValue(
                "reporting.max-breadcrumbs must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}
