//! Construction-time configuration for the task manager.

use std::time::Duration;
use thiserror::Error;

/// Environment variable overriding [`TaskManagerConfig::max_concurrent_tasks`].
pub const ENV_MAX_CONCURRENT_TASKS: &str = "FOREMAN_MAX_CONCURRENT_TASKS";
/// Environment variable overriding [`TaskManagerConfig::task_timeout`], in
/// milliseconds.
pub const ENV_TASK_TIMEOUT_MS: &str = "FOREMAN_TASK_TIMEOUT_MS";
/// Environment variable overriding
/// [`TaskManagerConfig::max_description_length`].
pub const ENV_MAX_DESCRIPTION_LENGTH: &str = "FOREMAN_MAX_DESCRIPTION_LENGTH";
/// Environment variable overriding [`TaskManagerConfig::max_context_length`].
pub const ENV_MAX_CONTEXT_LENGTH: &str = "FOREMAN_MAX_CONTEXT_LENGTH";
/// Environment variable overriding [`TaskManagerConfig::retention_cap`].
pub const ENV_RETENTION_CAP: &str = "FOREMAN_RETENTION_CAP";

/// Errors raised while building or validating configuration.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// An override could not be parsed as a non-negative integer.
    #[error("invalid value '{value}' for {variable}, expected a non-negative integer")]
    InvalidValue {
        /// Name of the offending variable.
        variable: &'static str,
        /// Raw value supplied.
        value: String,
    },

    /// A setting that must be positive was zero.
    #[error("{0} must be greater than zero")]
    MustBePositive(&'static str),
}

/// Limits applied by the task manager for its whole lifetime.
///
/// # Examples
///
/// ```
/// use foreman::task::services::TaskManagerConfig;
/// use std::time::Duration;
///
/// let config = TaskManagerConfig::default()
///     .with_max_concurrent_tasks(4)
///     .with_task_timeout(Duration::from_secs(30));
/// assert_eq!(config.max_concurrent_tasks, 4);
/// assert_eq!(config.retention_cap, 100);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskManagerConfig {
    /// Maximum number of pending plus in-progress tasks.
    pub max_concurrent_tasks: usize,
    /// Deadline for a single executor run, measured from task start.
    pub task_timeout: Duration,
    /// Maximum description length in characters.
    pub max_description_length: usize,
    /// Maximum context length in characters.
    pub max_context_length: usize,
    /// Maximum number of terminal records kept before eviction.
    pub retention_cap: usize,
}

impl Default for TaskManagerConfig {
    fn default() -> Self {
        Self {
            max_concurrent_tasks: 10,
            task_timeout: Duration::from_millis(300_000),
            max_description_length: 5_000,
            max_context_length: 50_000,
            retention_cap: 100,
        }
    }
}

impl TaskManagerConfig {
    /// Sets the concurrency cap.
    #[must_use]
    pub const fn with_max_concurrent_tasks(mut self, value: usize) -> Self {
        self.max_concurrent_tasks = value;
        self
    }

    /// Sets the per-task deadline.
    #[must_use]
    pub const fn with_task_timeout(mut self, value: Duration) -> Self {
        self.task_timeout = value;
        self
    }

    /// Sets the description length limit.
    #[must_use]
    pub const fn with_max_description_length(mut self, value: usize) -> Self {
        self.max_description_length = value;
        self
    }

    /// Sets the context length limit.
    #[must_use]
    pub const fn with_max_context_length(mut self, value: usize) -> Self {
        self.max_context_length = value;
        self
    }

    /// Sets the number of terminal records retained.
    ///
    /// Zero keeps no history: terminal records are evicted as soon as the
    /// policy runs.
    #[must_use]
    pub const fn with_retention_cap(mut self, value: usize) -> Self {
        self.retention_cap = value;
        self
    }

    /// Reads overrides from the process environment on top of the defaults.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when an override is malformed or the result
    /// fails [`TaskManagerConfig::validate`].
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads overrides through `lookup` on top of the defaults.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when an override is malformed or the result
    /// fails [`TaskManagerConfig::validate`].
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = Self::default();
        let timeout_ms = parse_override(&lookup, ENV_TASK_TIMEOUT_MS)?;
        let config = Self {
            max_concurrent_tasks: parse_override(&lookup, ENV_MAX_CONCURRENT_TASKS)?
                .unwrap_or(defaults.max_concurrent_tasks),
            task_timeout: timeout_ms.map_or(defaults.task_timeout, |ms| {
                Duration::from_millis(u64::try_from(ms).unwrap_or(u64::MAX))
            }),
            max_description_length: parse_override(&lookup, ENV_MAX_DESCRIPTION_LENGTH)?
                .unwrap_or(defaults.max_description_length),
            max_context_length: parse_override(&lookup, ENV_MAX_CONTEXT_LENGTH)?
                .unwrap_or(defaults.max_context_length),
            retention_cap: parse_override(&lookup, ENV_RETENTION_CAP)?
                .unwrap_or(defaults.retention_cap),
        };
        config.validate()?;
        Ok(config)
    }

    /// Checks that every limit is usable.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MustBePositive`] naming the first zero limit.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_concurrent_tasks == 0 {
            return Err(ConfigError::MustBePositive("max_concurrent_tasks"));
        }
        if self.task_timeout.is_zero() {
            return Err(ConfigError::MustBePositive("task_timeout"));
        }
        if self.max_description_length == 0 {
            return Err(ConfigError::MustBePositive("max_description_length"));
        }
        if self.max_context_length == 0 {
            return Err(ConfigError::MustBePositive("max_context_length"));
        }
        Ok(())
    }
}

fn parse_override(
    lookup: &impl Fn(&str) -> Option<String>,
    variable: &'static str,
) -> Result<Option<usize>, ConfigError> {
    lookup(variable)
        .map(|raw| {
            raw.trim()
                .parse::<usize>()
                .map_err(|_| ConfigError::InvalidValue {
                    variable,
                    value: raw.clone(),
                })
        })
        .transpose()
}
