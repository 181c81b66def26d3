use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::debug;

const DEFAULT_CONFIG_FILES: &[&str] = &[
    "relay.toml",
    "config/relay.toml",
    "crates/config/relay.toml",
    "../relay.toml",
    "../config/relay.toml",
];

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    pub http: HttpConfig,
    pub database: DatabaseConfig,
    pub relay: RelayConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    pub address: String,
    pub port: u16,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            address: "127.0.0.1".to_string(),
            port: 7070,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "sqlite://relay.db".to_string(),
            max_connections: 10,
        }
    }
}

/// Tuning for the realtime relay.
///
/// ```
/// use relay_config::RelayConfig;
///
/// let relay = RelayConfig::default();
/// assert_eq!(relay.subscriber_buffer, 256);
/// assert_eq!(relay.app_prefix, "app");
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RelayConfig {
    /// Capacity of each connection's outbound queue. Deliveries to a full
    /// queue are skipped.
    #[serde(default = "RelayConfig::default_subscriber_buffer")]
    pub subscriber_buffer: usize,
    /// Application prefix stripped from `SEND` destinations.
    #[serde(default = "RelayConfig::default_app_prefix")]
    pub app_prefix: String,
}

impl RelayConfig {
    const fn default_subscriber_buffer() -> usize {
        256
    }

    fn default_app_prefix() -> String {
        "app".to_string()
    }
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            subscriber_buffer: Self::default_subscriber_buffer(),
            app_prefix: Self::default_app_prefix(),
        }
    }
}

/// Load the application configuration by combining defaults, files, and environment overrides.
///
/// ```
/// use relay_config::load;
///
/// std::env::remove_var("RELAY_CONFIG");
///
/// let config = load().expect("configuration should load with defaults");
/// assert!(!config.http.address.is_empty());
/// ```
pub fn load() -> anyhow::Result<AppConfig> {
    let defaults = AppConfig::default();

    let subscriber_buffer =
        i64::try_from(defaults.relay.subscriber_buffer).unwrap_or(i64::MAX);

    let mut builder = config::Config::builder()
        .set_default("http.address", defaults.http.address.clone())?
        .set_default("http.port", i64::from(defaults.http.port))?
        .set_default("database.url", defaults.database.url.clone())?
        .set_default(
            "database.max_connections",
            i64::from(defaults.database.max_connections),
        )?
        .set_default("relay.subscriber_buffer", subscriber_buffer)?
        .set_default("relay.app_prefix", defaults.relay.app_prefix.clone())?;

    let environment_overrides = config::Environment::with_prefix("RELAY").separator("__");

    let mut config_file_attached = false;

    if let Ok(path) = std::env::var("RELAY_CONFIG") {
        builder = builder.add_source(config::File::from(PathBuf::from(&path)));
        config_file_attached = true;
        debug!(path, "loading configuration via RELAY_CONFIG");
    } else if let Ok(cwd) = std::env::current_dir() {
        let fallback = DEFAULT_CONFIG_FILES
            .iter()
            .map(|candidate| cwd.join(candidate))
            .find(|path| path.exists());

        if let Some(path) = fallback {
            debug!(path = %path.display(), "loading configuration file");
            builder = builder.add_source(config::File::from(path));
            config_file_attached = true;
        }
    }

    if !config_file_attached {
        debug!("no configuration file found, relying on defaults and environment overrides");
    }

    builder = builder.add_source(environment_overrides);

    let cfg = builder.build().context("unable to build configuration")?;

    let mut config = cfg
        .try_deserialize::<AppConfig>()
        .context("invalid configuration")?;

    if config.relay.subscriber_buffer == 0 {
        config.relay.subscriber_buffer = RelayConfig::default_subscriber_buffer();
    }

    debug!(?config, "loaded relay configuration");
    Ok(config)
}
