use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use crate::core::errors::{CourierError, Result};

/// Runtime configuration for the flow-start worker pool
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CourierConfig {
    // Worker pool configuration
    /// Number of worker units pulling batch tasks
    pub workers: usize,
    /// Maximum number of tasks waiting in the queue
    pub queue_capacity: usize,

    // Batch execution configuration
    /// Upper bound for processing one flow-start batch
    #[serde(with = "duration_secs")]
    pub batch_timeout: Duration,
    /// Call-start requests in flight per batch (1 = sequential)
    pub dispatch_concurrency: usize,

    // Logging
    /// Maximum tracing level (`trace`, `debug`, `info`, `warn`, `error`)
    pub log_level: String,
}

impl Default for CourierConfig {
    fn default() -> Self {
        Self {
            workers: 4,
            queue_capacity: 1_000,
            batch_timeout: Duration::from_secs(300), // 5 minutes
            dispatch_concurrency: 1,
            log_level: "info".to_string(),
        }
    }
}

impl CourierConfig {
    /// Create a new builder for CourierConfig
    pub fn builder() -> CourierConfigBuilder {
        CourierConfigBuilder::new()
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.workers == 0 {
            return Err(CourierError::configuration("workers must be greater than 0"));
        }
        if self.queue_capacity == 0 {
            return Err(CourierError::configuration(
                "queue_capacity must be greater than 0",
            ));
        }
        if self.batch_timeout.is_zero() {
            return Err(CourierError::configuration(
                "batch_timeout must be greater than 0",
            ));
        }
        if self.dispatch_concurrency == 0 {
            return Err(CourierError::configuration(
                "dispatch_concurrency must be greater than 0",
            ));
        }
        if self.log_level.parse::<tracing::Level>().is_err() {
            return Err(CourierError::configuration(format!(
                "unknown log_level: {}",
                self.log_level
            )));
        }
        Ok(())
    }

    /// Parse and validate a YAML configuration document
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(yaml)
            .map_err(|e| CourierError::configuration(format!("invalid yaml: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a YAML file
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|e| {
            CourierError::configuration(format!("unable to read {}: {}", path.display(), e))
        })?;
        Self::from_yaml_str(&contents)
    }

    /// Create a configuration suited for local development
    pub fn development() -> Self {
        Self {
            workers: 1,
            queue_capacity: 100,
            batch_timeout: Duration::from_secs(60),
            log_level: "debug".to_string(),
            ..Default::default()
        }
    }

    /// Create a configuration suited for production
    pub fn production() -> Self {
        Self {
            workers: 32,
            queue_capacity: 10_000,
            ..Default::default()
        }
    }
}

/// Builder for CourierConfig
pub struct CourierConfigBuilder {
    config: CourierConfig,
}

impl CourierConfigBuilder {
    /// Create a new builder with default values
    pub fn new() -> Self {
        Self {
            config: CourierConfig::default(),
        }
    }

    pub fn workers(mut self, workers: usize) -> Self {
        self.config.workers = workers;
        self
    }

    pub fn queue_capacity(mut self, capacity: usize) -> Self {
        self.config.queue_capacity = capacity;
        self
    }

    pub fn batch_timeout(mut self, timeout: Duration) -> Self {
        self.config.batch_timeout = timeout;
        self
    }

    pub fn dispatch_concurrency(mut self, concurrency: usize) -> Self {
        self.config.dispatch_concurrency = concurrency;
        self
    }

    pub fn log_level(mut self, level: impl Into<String>) -> Self {
        self.config.log_level = level.into();
        self
    }

    /// Build and validate the configuration
    pub fn build(self) -> Result<CourierConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}

impl Default for CourierConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

// Durations are written as whole seconds in config files
mod duration_secs {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u64(duration.as_secs())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let secs = u64::deserialize(deserializer)?;
        Ok(Duration::from_secs(secs))
    }
}
