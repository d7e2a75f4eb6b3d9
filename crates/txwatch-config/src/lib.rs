// txwatch-config/src/lib.rs

use regex::Regex;
use std::env;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;
use txwatch_types::{Network, StorageBackend, TxwatchConfig};

#[derive(Error, Debug)]
pub enum ConfigError {
	#[error("File not found: {0}")]
	FileNotFound(String),

	#[error("Parse error: {0}")]
	ParseError(String),

	#[error("Validation error: {0}")]
	ValidationError(String),

	#[error("Environment variable not found: {0}")]
	EnvVarNotFound(String),

	#[error("IO error: {0}")]
	IoError(#[from] std::io::Error),
}

/// Configuration loader with environment variable substitution
pub struct ConfigLoader {
	file_path: Option<PathBuf>,
	env_prefix: String,
}

impl Default for ConfigLoader {
	fn default() -> Self {
		Self::new()
	}
}

impl ConfigLoader {
	pub fn new() -> Self {
		Self {
			file_path: None,
			env_prefix: "TXWATCH_".to_string(),
		}
	}

	pub fn with_file<P: AsRef<Path>>(mut self, path: P) -> Self {
		self.file_path = Some(path.as_ref().to_path_buf());
		self
	}

	pub fn with_env_prefix(mut self, prefix: impl Into<String>) -> Self {
		self.env_prefix = prefix.into();
		self
	}

	pub async fn load(&self) -> Result<TxwatchConfig, ConfigError> {
		let file_path = self.file_path.as_ref().ok_or_else(|| {
			ConfigError::FileNotFound("No configuration file specified".to_string())
		})?;

		if !tokio::fs::try_exists(file_path).await? {
			return Err(ConfigError::FileNotFound(
				file_path.display().to_string(),
			));
		}

		let content = tokio::fs::read_to_string(file_path).await?;
		self.load_from_str(&content)
	}

	/// Parses, overrides and validates configuration held in memory.
	pub fn load_from_str(&self, content: &str) -> Result<TxwatchConfig, ConfigError> {
		let substituted_content = self.substitute_env_vars(content)?;

		let mut config: TxwatchConfig = toml::from_str(&substituted_content)
			.map_err(|e| ConfigError::ParseError(e.to_string()))?;

		self.apply_env_overrides(&mut config)?;
		self.validate_config(&config)?;

		Ok(config)
	}

	fn substitute_env_vars(&self, content: &str) -> Result<String, ConfigError> {
		let mut result = content.to_string();

		// Find and replace ${VAR_NAME} patterns
		let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| ConfigError::ParseError(e.to_string()))?;

		for cap in re.captures_iter(content) {
			let full_match = &cap[0];
			let var_name = &cap[1];

			let env_value = env::var(var_name)
				.map_err(|_| ConfigError::EnvVarNotFound(var_name.to_string()))?;

			result = result.replace(full_match, &env_value);
		}

		Ok(result)
	}

	fn apply_env_overrides(&self, config: &mut TxwatchConfig) -> Result<(), ConfigError> {
		if let Ok(access_node) = env::var(format!("{}ACCESS_NODE", self.env_prefix)) {
			debug!("Overriding access node from environment");
			config.ledger.access_node = Some(access_node);
		}

		if let Ok(interval) = env::var(format!("{}POLL_INTERVAL_MS", self.env_prefix)) {
			config.tracker.poll_interval_ms = interval.parse().map_err(|e| {
				ConfigError::ValidationError(format!("Invalid poll interval: {}", e))
			})?;
		}

		if let Ok(path) = env::var(format!("{}STORAGE_PATH", self.env_prefix)) {
			debug!("Overriding storage path from environment");
			config.storage.path = PathBuf::from(path);
		}

		Ok(())
	}

	fn validate_config(&self, config: &TxwatchConfig) -> Result<(), ConfigError> {
		if config.tracker.poll_interval_ms == 0 {
			return Err(ConfigError::ValidationError(
				"tracker.poll_interval_ms must be greater than zero".to_string(),
			));
		}

		if config.tracker.seal_threshold == 0 {
			return Err(ConfigError::ValidationError(
				"tracker.seal_threshold must be greater than zero".to_string(),
			));
		}

		match config.ledger.access_node_url() {
			None => {
				return Err(ConfigError::ValidationError(format!(
					"ledger.access_node is required for the {:?} network",
					Network::Custom
				)));
			}
			Some(url) if !(url.starts_with("http://") || url.starts_with("https://")) => {
				return Err(ConfigError::ValidationError(format!(
					"ledger.access_node must be an http(s) URL, got '{}'",
					url
				)));
			}
			Some(_) => {}
		}

		if config.storage.backend == StorageBackend::File
			&& config.storage.path.as_os_str().is_empty()
		{
			return Err(ConfigError::ValidationError(
				"storage.path is required for the file backend".to_string(),
			));
		}

		Ok(())
	}
}
