use anyhow::Result;
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Main configuration structure for the appraisal engine
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct EngineConfig {
    /// Sequence code generation settings
    pub sequence: SequenceConfig,
    /// Observability settings
    pub observability: ObservabilityConfig,
    /// Counter database settings (optional; in-memory counters when absent)
    pub database: Option<DatabaseConfig>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SequenceConfig {
    /// How many times to re-read a counter after losing a compare-and-swap race
    pub max_conflict_attempts: u32,
    /// Digit width used when callers do not supply one
    pub default_digit_width: usize,
}

impl Default for SequenceConfig {
    fn default() -> Self {
        Self {
            max_conflict_attempts: 5,
            default_digit_width: 6,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ObservabilityConfig {
    /// Log level directive used when RUST_LOG is unset
    pub log_level: String,
    /// Emit JSON log lines instead of human-readable output
    pub json_logs: bool,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            json_logs: true,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DatabaseConfig {
    /// Database URL (SQLite file path or connection string)
    pub url: String,
    /// Maximum connections in pool
    pub max_connections: u32,
    /// Enable automatic migrations
    pub auto_migrate: bool,
    /// How long a writer waits on a locked database before failing, in milliseconds
    pub busy_timeout_ms: u64,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "sqlite://.appraisal-engine/counters.db".to_string(),
            max_connections: 5,
            auto_migrate: true,
            busy_timeout_ms: 5000,
        }
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            sequence: SequenceConfig::default(),
            observability: ObservabilityConfig::default(),
            database: Some(DatabaseConfig::default()),
        }
    }
}

impl EngineConfig {
    /// Load configuration from multiple sources with precedence:
    /// 1. Default values
    /// 2. Configuration file (appraisal-engine.toml)
    /// 3. Environment variables (prefixed with APPRAISAL_ENGINE__)
    pub fn load() -> Result<Self> {
        Self::load_from(Path::new("appraisal-engine.toml"))
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let defaults = Config::try_from(&EngineConfig::default())?;
        let mut builder = Config::builder().add_source(defaults);

        if path.exists() {
            builder = builder.add_source(File::from(path));
        }

        builder = builder.add_source(
            Environment::with_prefix("APPRAISAL_ENGINE")
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        );

        let config = builder.build()?;
        Ok(config.try_deserialize()?)
    }

    /// Save configuration to file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let toml_content = toml::to_string_pretty(self)?;
        std::fs::write(path, toml_content)?;
        Ok(())
    }

    /// Load .env file if it exists
    pub fn load_env_file() -> Result<()> {
        if Path::new(".env").exists() {
            dotenvy::dotenv()?;
            tracing::info!("Loaded environment variables from .env file");
        }
        Ok(())
    }
}
