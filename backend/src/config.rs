use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub logging: LoggingConfig,
    pub data: DataConfig,
    pub static_config: StaticConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub file: Option<String>,
}

/// Data source configuration: where the static JSON payloads live and which
/// exceedance thresholds the analytics view uses by default
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DataConfig {
    /// Log export file (array of record objects)
    pub log_file: PathBuf,
    /// Directory of query dataset files (`{"results": [...]}` each)
    pub query_dir: PathBuf,
    /// Default exceedance thresholds in whole seconds
    pub default_thresholds_secs: Vec<u64>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StaticConfig {
    pub enabled: bool,
    pub web_root: String,
}

impl Config {
    /// Load configuration with environment variable override support
    ///
    /// Loading order:
    /// 1. Load from config.toml file
    /// 2. Override with environment variables (prefixed with APP_)
    /// 3. Validate the final configuration
    pub fn load(path: Option<&Path>) -> Result<Self, anyhow::Error> {
        // 1. Load from config file
        let mut config = match path {
            Some(path) => Self::from_toml(path)?,
            None => {
                if let Some(config_path) = Self::find_config_file() {
                    Self::from_toml(&config_path)?
                } else {
                    tracing::warn!("Configuration file not found, using defaults");
                    Config::default()
                }
            },
        };

        // 2. Override with environment variables
        config.apply_env_overrides();

        // 3. Validate configuration
        config.validate()?;

        Ok(config)
    }

    fn from_toml(path: &Path) -> Result<Self, anyhow::Error> {
        let text = fs::read_to_string(path)
            .map_err(|err| anyhow::anyhow!("failed to read {}: {}", path.display(), err))?;
        let config = toml::from_str(&text)
            .map_err(|err| anyhow::anyhow!("failed to parse {}: {}", path.display(), err))?;
        Ok(config)
    }

    fn find_config_file() -> Option<PathBuf> {
        ["conf/config.toml", "config.toml"]
            .iter()
            .map(PathBuf::from)
            .find(|candidate| candidate.exists())
    }

    /// Apply environment variable overrides
    ///
    /// Supported environment variables:
    /// - APP_SERVER_HOST: Server host (default: 0.0.0.0)
    /// - APP_SERVER_PORT: Server port (default: 8080)
    /// - APP_LOG_LEVEL: Logging level (e.g., "info,logsight=debug")
    /// - APP_LOG_FILE: Log output file (rolling daily)
    /// - APP_DATA_LOG_FILE: Path to the log export JSON
    /// - APP_DATA_QUERY_DIR: Directory with query dataset JSON files
    /// - APP_STATIC_ENABLED: Serve the bundled frontend (true/false)
    /// - APP_STATIC_WEB_ROOT: Frontend asset directory
    fn apply_env_overrides(&mut self) {
        if let Ok(host) = std::env::var("APP_SERVER_HOST") {
            self.server.host = host;
            tracing::info!("Override server.host from env: {}", self.server.host);
        }

        if let Ok(port) = std::env::var("APP_SERVER_PORT") {
            if let Ok(port) = port.parse() {
                self.server.port = port;
                tracing::info!("Override server.port from env: {}", self.server.port);
            }
        }

        if let Ok(level) = std::env::var("APP_LOG_LEVEL") {
            self.logging.level = level;
            tracing::info!("Override logging.level from env: {}", self.logging.level);
        }

        if let Ok(file) = std::env::var("APP_LOG_FILE") {
            self.logging.file = Some(file);
        }

        if let Ok(log_file) = std::env::var("APP_DATA_LOG_FILE") {
            self.data.log_file = PathBuf::from(log_file);
            tracing::info!("Override data.log_file from env: {}", self.data.log_file.display());
        }

        if let Ok(query_dir) = std::env::var("APP_DATA_QUERY_DIR") {
            self.data.query_dir = PathBuf::from(query_dir);
            tracing::info!("Override data.query_dir from env: {}", self.data.query_dir.display());
        }

        if let Ok(enabled) = std::env::var("APP_STATIC_ENABLED") {
            if let Ok(enabled) = enabled.parse() {
                self.static_config.enabled = enabled;
            }
        }

        if let Ok(web_root) = std::env::var("APP_STATIC_WEB_ROOT") {
            self.static_config.web_root = web_root;
        }
    }

    fn validate(&self) -> Result<(), anyhow::Error> {
        if self.server.port == 0 {
            anyhow::bail!("server.port must not be 0");
        }
        if self.data.default_thresholds_secs.is_empty() {
            anyhow::bail!("data.default_thresholds_secs must not be empty");
        }
        // Missing data files are non-fatal: the dashboard starts with an
        // empty store and a warning instead
        if !self.data.log_file.exists() {
            tracing::warn!("log file {} does not exist", self.data.log_file.display());
        }
        Ok(())
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { host: "0.0.0.0".to_owned(), port: 8080 }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { level: "info,logsight=debug".to_owned(), file: None }
    }
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            log_file: PathBuf::from("data/logs.json"),
            query_dir: PathBuf::from("data/queries"),
            default_thresholds_secs: vec![10, 20, 30],
        }
    }
}

impl Default for StaticConfig {
    fn default() -> Self {
        Self { enabled: false, web_root: "web/dist".to_owned() }
    }
}
