use crate::{Algorithm, RecipeGraphError, DEFAULT_BASE_ELEMENTS};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{info, warn};

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Config file not found: {0}")]
    NotFound(String),

    #[error("Failed to read config: {0}")]
    ReadError(String),

    #[error("Failed to parse config: {0}")]
    ParseError(String),

    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

impl From<ConfigError> for RecipeGraphError {
    fn from(err: ConfigError) -> Self {
        RecipeGraphError::Config(err.to_string())
    }
}

/// Main configuration for RecipeGraph
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct RecipeGraphConfig {
    /// Search defaults and worker pool tuning
    #[serde(default)]
    pub search: SearchConfig,

    /// Where the recipe catalog lives and what the starting elements are
    #[serde(default)]
    pub data: DataConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Search defaults and worker pool tuning
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Algorithm used when a request does not name one: "BFS", "DFS" or "Bi-BFS"
    #[serde(default = "default_algorithm")]
    pub algorithm: String,

    /// Recipes requested when a request does not say (<= 0 means unbounded)
    #[serde(default = "default_max_recipes")]
    pub max_recipes: i64,

    /// Worker threads for variation discovery (0 = all hardware threads)
    #[serde(default)]
    pub workers: usize,

    /// Tasks taken from the shared queue per lock acquisition
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,

    /// How often the idle monitor checks for an exhausted frontier
    #[serde(default = "default_idle_check_interval_ms")]
    pub idle_check_interval_ms: u64,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            algorithm: default_algorithm(),
            max_recipes: default_max_recipes(),
            workers: 0,
            batch_size: default_batch_size(),
            idle_check_interval_ms: default_idle_check_interval_ms(),
        }
    }
}

impl SearchConfig {
    pub fn algorithm(&self) -> Result<Algorithm, ConfigError> {
        self.algorithm
            .parse()
            .map_err(|e: RecipeGraphError| ConfigError::ValidationError(e.to_string()))
    }

    /// Configured worker count with 0 resolved to the hardware parallelism.
    pub fn effective_workers(&self) -> usize {
        resolve_worker_count(self.workers)
    }
}

/// Worker count for a pool: 0 means one worker per CPU.
pub fn resolve_worker_count(workers: usize) -> usize {
    if workers == 0 {
        num_cpus::get().max(1)
    } else {
        workers
    }
}

/// Catalog location and starting elements
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataConfig {
    /// Path of the scraped recipe catalog (JSON)
    #[serde(default = "default_recipes_path")]
    pub recipes_path: PathBuf,

    /// Tier-0 elements every search starts from
    #[serde(default = "default_base_elements")]
    pub base_elements: Vec<String>,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            recipes_path: default_recipes_path(),
            base_elements: default_base_elements(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level: "trace", "debug", "info", "warn", "error"
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log format: "pretty", "json", "compact"
    #[serde(default = "default_log_format")]
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

// Default value functions
fn default_algorithm() -> String {
    Algorithm::Bfs.to_string()
}
fn default_max_recipes() -> i64 {
    1
}
fn default_batch_size() -> usize {
    10
}
fn default_idle_check_interval_ms() -> u64 {
    5
}
fn default_recipes_path() -> PathBuf {
    PathBuf::from("data/recipes.json")
}
fn default_base_elements() -> Vec<String> {
    DEFAULT_BASE_ELEMENTS.iter().map(|s| s.to_string()).collect()
}
fn default_log_level() -> String {
    "info".to_string()
}
fn default_log_format() -> String {
    "pretty".to_string()
}

/// Configuration manager with layered sources
pub struct ConfigManager {
    config: RecipeGraphConfig,
    config_path: Option<PathBuf>,
}

impl ConfigManager {
    /// Load configuration with the following precedence:
    /// 1. Environment variables (.env file)
    /// 2. Config file (.recipegraph.toml)
    /// 3. Sensible defaults
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_dotenv();

        let (config, config_path) = Self::load_config_file()?;
        let config = Self::apply_env_overrides(config);
        Self::validate_config(&config)?;

        info!(
            config_file = %config_path
                .as_ref()
                .map(|p| p.display().to_string())
                .unwrap_or_else(|| "NONE (using defaults)".to_string()),
            algorithm = %config.search.algorithm,
            workers = config.search.effective_workers(),
            recipes = %config.data.recipes_path.display(),
            "configuration loaded"
        );

        Ok(Self {
            config,
            config_path,
        })
    }

    /// Load an explicit config file, still honouring environment overrides.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::NotFound(path.display().to_string()));
        }
        let config = Self::apply_env_overrides(Self::read_toml_file(path)?);
        Self::validate_config(&config)?;
        Ok(Self {
            config,
            config_path: Some(path.to_path_buf()),
        })
    }

    fn load_dotenv() {
        if Path::new(".env").exists() {
            if let Err(e) = dotenv::from_filename(".env") {
                warn!("Failed to load .env file: {}", e);
            }
        }
    }

    /// Find and load config file
    /// Search order:
    /// 1. ./.recipegraph.toml (current directory)
    /// 2. ~/.recipegraph/config.toml (user config)
    /// 3. Use defaults
    fn load_config_file() -> Result<(RecipeGraphConfig, Option<PathBuf>), ConfigError> {
        let local_config = Path::new(".recipegraph.toml");
        if local_config.exists() {
            let config = Self::read_toml_file(local_config)?;
            return Ok((config, Some(local_config.to_path_buf())));
        }

        if let Some(home) = dirs::home_dir() {
            let user_config = home.join(".recipegraph").join("config.toml");
            if user_config.exists() {
                let config = Self::read_toml_file(&user_config)?;
                return Ok((config, Some(user_config)));
            }
        }

        Ok((RecipeGraphConfig::default(), None))
    }

    fn read_toml_file(path: &Path) -> Result<RecipeGraphConfig, ConfigError> {
        let content =
            std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError(e.to_string()))?;

        toml::from_str(&content).map_err(|e| ConfigError::ParseError(e.to_string()))
    }

    fn apply_env_overrides(mut config: RecipeGraphConfig) -> RecipeGraphConfig {
        if let Ok(algorithm) = std::env::var("RECIPEGRAPH_ALGORITHM") {
            config.search.algorithm = algorithm;
        }
        if let Ok(max) = std::env::var("RECIPEGRAPH_MAX_RECIPES") {
            if let Ok(n) = max.parse() {
                config.search.max_recipes = n;
            }
        }
        if let Ok(workers) = std::env::var("RECIPEGRAPH_WORKERS") {
            if let Ok(n) = workers.parse() {
                config.search.workers = n;
            }
        }
        if let Ok(batch) = std::env::var("RECIPEGRAPH_BATCH_SIZE") {
            if let Ok(n) = batch.parse() {
                config.search.batch_size = n;
            }
        }
        if let Ok(path) = std::env::var("RECIPEGRAPH_DATA") {
            config.data.recipes_path = PathBuf::from(path);
        }
        if let Ok(level) = std::env::var("RUST_LOG") {
            config.logging.level = level;
        }

        config
    }

    fn validate_config(config: &RecipeGraphConfig) -> Result<(), ConfigError> {
        config.search.algorithm()?;

        if config.search.batch_size == 0 {
            return Err(ConfigError::ValidationError(
                "search.batch_size must be greater than 0".to_string(),
            ));
        }

        if config.search.idle_check_interval_ms == 0 {
            return Err(ConfigError::ValidationError(
                "search.idle_check_interval_ms must be greater than 0".to_string(),
            ));
        }

        if config.data.base_elements.iter().all(|e| e.trim().is_empty()) {
            return Err(ConfigError::ValidationError(
                "data.base_elements must name at least one element".to_string(),
            ));
        }

        // RUST_LOG may carry a full filter directive; only plain levels are checked.
        let level = config.logging.level.as_str();
        if !level.contains('=') && !level.contains(',') {
            match level {
                "trace" | "debug" | "info" | "warn" | "error" => {}
                other => {
                    return Err(ConfigError::ValidationError(format!(
                        "Invalid log level: {}. Must be one of: trace, debug, info, warn, error",
                        other
                    )))
                }
            }
        }

        match config.logging.format.as_str() {
            "pretty" | "json" | "compact" => {}
            other => {
                return Err(ConfigError::ValidationError(format!(
                    "Invalid log format: {}. Must be one of: pretty, json, compact",
                    other
                )))
            }
        }

        Ok(())
    }

    /// Get the loaded configuration
    pub fn config(&self) -> &RecipeGraphConfig {
        &self.config
    }

    /// Get the path to the config file that was loaded, if any
    pub fn config_path(&self) -> Option<&Path> {
        self.config_path.as_deref()
    }

    /// Create a default config file
    pub fn create_default_config(path: &Path) -> Result<(), ConfigError> {
        let config = RecipeGraphConfig::default();
        let toml_str =
            toml::to_string_pretty(&config).map_err(|e| ConfigError::ParseError(e.to_string()))?;

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)
                    .map_err(|e| ConfigError::ReadError(e.to_string()))?;
            }
        }

        std::fs::write(path, toml_str).map_err(|e| ConfigError::ReadError(e.to_string()))?;

        Ok(())
    }
}
