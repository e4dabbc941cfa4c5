use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::{Once, OnceLock};

use parking_lot::ReentrantMutex;
use thiserror::Error;
use tracing_subscriber::prelude::*;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
/// Top-level AddX configuration (`addx.toml`).
///
/// ```toml
/// [registration]
/// container_type = "IServiceCollection"
/// lifetimes = ["Singleton", "Scoped", "Transient"]
/// startup_file = "Startup"
/// configure_services_method = "ConfigureServices"
/// offer_first_base_type = true
///
/// [logging]
/// level = "info"
/// json = false
/// ```
pub struct AddxConfig {
    /// How registration methods are recognized and what gets generated.
    #[serde(default)]
    pub registration: RegistrationConfig,

    /// Logging settings for the `addx` binary.
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[allow(clippy::derivable_impls)]
impl Default for AddxConfig {
    fn default() -> Self {
        Self {
            registration: RegistrationConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RegistrationConfig {
    /// Simple name of the service-collection type registration calls go through.
    #[serde(default = "RegistrationConfig::default_container_type")]
    pub container_type: String,

    /// Lifetimes offered, in order. Each one becomes an `Add{Lifetime}` call.
    #[serde(default = "RegistrationConfig::default_lifetimes")]
    pub lifetimes: Vec<String>,

    /// File stem of the ASP.NET-style startup class file.
    #[serde(default = "RegistrationConfig::default_startup_file")]
    pub startup_file: String,

    /// Method of the startup class that registers services.
    #[serde(default = "RegistrationConfig::default_configure_services_method")]
    pub configure_services_method: String,

    /// Offer a `Register as FirstBase...` group when the cursor is on the type
    /// name of a declaration that lists base types.
    #[serde(default = "RegistrationConfig::default_offer_first_base_type")]
    pub offer_first_base_type: bool,
}

impl RegistrationConfig {
    fn default_container_type() -> String {
        "IServiceCollection".to_owned()
    }

    fn default_lifetimes() -> Vec<String> {
        ["Singleton", "Scoped", "Transient"]
            .into_iter()
            .map(str::to_owned)
            .collect()
    }

    fn default_startup_file() -> String {
        "Startup".to_owned()
    }

    fn default_configure_services_method() -> String {
        "ConfigureServices".to_owned()
    }

    fn default_offer_first_base_type() -> bool {
        true
    }

    /// Rejects settings the engine cannot act on.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.lifetimes.is_empty() {
            return Err(ConfigError::Invalid(
                "registration.lifetimes must list at least one lifetime".to_owned(),
            ));
        }
        if let Some(bad) = self.lifetimes.iter().find(|l| !is_identifier(l)) {
            return Err(ConfigError::Invalid(format!(
                "registration.lifetimes entry `{bad}` is not a valid identifier"
            )));
        }
        for (key, value) in [
            ("container_type", &self.container_type),
            ("startup_file", &self.startup_file),
            ("configure_services_method", &self.configure_services_method),
        ] {
            if !is_identifier(value) {
                return Err(ConfigError::Invalid(format!(
                    "registration.{key} `{value}` is not a valid identifier"
                )));
            }
        }
        Ok(())
    }
}

impl Default for RegistrationConfig {
    fn default() -> Self {
        Self {
            container_type: Self::default_container_type(),
            lifetimes: Self::default_lifetimes(),
            startup_file: Self::default_startup_file(),
            configure_services_method: Self::default_configure_services_method(),
            offer_first_base_type: Self::default_offer_first_base_type(),
        }
    }
}

fn is_identifier(text: &str) -> bool {
    let mut chars = text.chars();
    chars
        .next()
        .is_some_and(|c| c == '_' || c.is_alphabetic())
        && chars.all(|c| c == '_' || c.is_alphanumeric())
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoggingConfig {
    /// Logging level for all AddX crates.
    #[serde(default = "LoggingConfig::default_level")]
    pub level: String,

    /// Emit logs in JSON format.
    #[serde(default)]
    pub json: bool,
}

impl LoggingConfig {
    fn default_level() -> String {
        "info".to_owned()
    }

    fn normalize_level_directives(input: &str) -> String {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Self::default_level();
        }

        match trimmed.to_ascii_lowercase().as_str() {
            "trace" => "trace".to_owned(),
            "debug" => "debug".to_owned(),
            "info" => "info".to_owned(),
            "warn" | "warning" => "warn".to_owned(),
            "error" => "error".to_owned(),
            // Anything else is treated as an `EnvFilter` directive string.
            _ => trimmed.to_owned(),
        }
    }

    fn config_env_filter(&self) -> tracing_subscriber::EnvFilter {
        let directives = Self::normalize_level_directives(&self.level);
        tracing_subscriber::EnvFilter::try_new(directives).unwrap_or_else(|_| {
            tracing_subscriber::EnvFilter::default()
                .add_directive(tracing_subscriber::filter::LevelFilter::INFO.into())
        })
    }

    /// Create the effective `EnvFilter`.
    ///
    /// `level` may be a simple level (`info`, `debug`, ...) or a full
    /// `EnvFilter` directive string. `RUST_LOG`, when set, is merged in.
    pub fn env_filter(&self) -> tracing_subscriber::EnvFilter {
        let env_directives = std::env::var("RUST_LOG")
            .ok()
            .map(|value| value.trim().to_owned())
            .filter(|value| !value.is_empty());

        let config_directives = Self::normalize_level_directives(&self.level);

        match env_directives {
            Some(env_directives) => {
                let combined = format!("{config_directives},{env_directives}");
                tracing_subscriber::EnvFilter::try_new(combined)
                    .or_else(|_| tracing_subscriber::EnvFilter::try_new(env_directives))
                    .unwrap_or_else(|_| self.config_env_filter())
            }
            None => self.config_env_filter(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: Self::default_level(),
            json: false,
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse toml config: {0}")]
    Toml(String),
    #[error("invalid config: {0}")]
    Invalid(String),
}

impl From<toml::de::Error> for ConfigError {
    fn from(err: toml::de::Error) -> Self {
        // Keep the message only; the default `Display` embeds a source snippet.
        ConfigError::Toml(err.message().to_owned())
    }
}

impl AddxConfig {
    /// Load and validate a config from TOML text.
    pub fn load_from_str(text: &str) -> Result<Self, ConfigError> {
        let config: AddxConfig = toml::from_str(text)?;
        config.registration.validate()?;
        Ok(config)
    }

    /// Load and validate a config file.
    pub fn load_from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::load_from_str(&text)
    }
}

pub const ADDX_CONFIG_ENV_VAR: &str = "ADDX_CONFIG";

static CONFIG_ENV_LOCK: OnceLock<ReentrantMutex<()>> = OnceLock::new();

fn config_env_lock() -> &'static ReentrantMutex<()> {
    CONFIG_ENV_LOCK.get_or_init(|| ReentrantMutex::new(()))
}

/// Run `f` while holding the config environment lock.
///
/// Tests that set [`ADDX_CONFIG_ENV_VAR`] must do so inside this lock, since
/// the environment is process-global.
pub fn with_config_env_lock<R>(f: impl FnOnce() -> R) -> R {
    let _guard = config_env_lock().lock();
    f()
}

/// Discover the configuration file for a project root.
///
/// Search order:
/// 1) `ADDX_CONFIG` (absolute or relative to `project_root`)
/// 2) `addx.toml` in `project_root`
/// 3) `.addx.toml` in `project_root`
pub fn discover_config_path(project_root: &Path) -> Option<PathBuf> {
    let _guard = config_env_lock().lock();
    if let Some(value) = std::env::var_os(ADDX_CONFIG_ENV_VAR) {
        let candidate = PathBuf::from(value);
        let path = if candidate.is_absolute() {
            candidate
        } else {
            project_root.join(candidate)
        };
        return Some(path.canonicalize().unwrap_or(path));
    }

    ["addx.toml", ".addx.toml"]
        .into_iter()
        .map(|name| project_root.join(name))
        .find(|path| path.is_file())
        .map(|path| path.canonicalize().unwrap_or(path))
}

/// Load the configuration for a project root.
///
/// If no config is present, returns [`AddxConfig::default`] and `None`.
pub fn load_for_project(
    project_root: &Path,
) -> Result<(AddxConfig, Option<PathBuf>), ConfigError> {
    let Some(path) = discover_config_path(project_root) else {
        return Ok((AddxConfig::default(), None));
    };

    let config = AddxConfig::load_from_path(&path)?;
    Ok((config, Some(path)))
}

static TRACING_INIT: Once = Once::new();

/// Initializes structured `tracing` logging to stderr.
///
/// Safe to call multiple times; only the first call installs a global
/// subscriber.
pub fn init_tracing(config: &LoggingConfig) {
    TRACING_INIT.call_once(|| {
        let filter = config.env_filter();
        let layer: Box<dyn tracing_subscriber::Layer<_> + Send + Sync> = if config.json {
            tracing_subscriber::fmt::layer()
                .json()
                .with_writer(std::io::stderr)
                .with_ansi(false)
                .boxed()
        } else {
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_ansi(false)
                .boxed()
        };

        let subscriber = tracing_subscriber::registry().with(filter).with(layer);
        if tracing::subscriber::set_global_default(subscriber).is_err() {
            // Another subscriber (e.g. from a test harness) is already installed.
            return;
        }
        tracing::debug!(target = "addx.config", level = %config.level, "tracing initialized");
    });
}
