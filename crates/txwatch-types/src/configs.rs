//! # Configuration Types
//!
//! Configuration schema for the tracker and its collaborators: the ledger
//! access node, the persistent store and the notification sink.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Flow access node for testnet.
pub const TESTNET_ACCESS_NODE: &str = "https://rest-testnet.onflow.org";
/// Flow access node for mainnet.
pub const MAINNET_ACCESS_NODE: &str = "https://rest-mainnet.onflow.org";

/// Root configuration object.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TxwatchConfig {
	/// Polling behaviour
	#[serde(default)]
	pub tracker: TrackerConfig,
	/// Ledger access node settings
	#[serde(default)]
	pub ledger: LedgerConfig,
	/// Persistent store settings
	#[serde(default)]
	pub storage: StorageConfig,
	/// Notification sink settings
	#[serde(default)]
	pub notifications: NotificationsConfig,
}

/// Polling behaviour of the transaction tracker.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackerConfig {
	/// Delay between two polls of the same transaction
	#[serde(default = "default_poll_interval_ms")]
	pub poll_interval_ms: u64,
	/// Phase ordinal at which a transaction counts as final
	#[serde(default = "default_seal_threshold")]
	pub seal_threshold: u8,
}

impl TrackerConfig {
	pub fn poll_interval(&self) -> Duration {
		Duration::from_millis(self.poll_interval_ms)
	}
}

impl Default for TrackerConfig {
	fn default() -> Self {
		Self {
			poll_interval_ms: default_poll_interval_ms(),
			seal_threshold: default_seal_threshold(),
		}
	}
}

fn default_poll_interval_ms() -> u64 {
	2000
}

fn default_seal_threshold() -> u8 {
	4
}

/// Which Flow network the access node belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Network {
	#[default]
	Testnet,
	Mainnet,
	Custom,
}

/// Ledger access node configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LedgerConfig {
	#[serde(default)]
	pub network: Network,
	/// Explicit access node URL; overrides the network default
	#[serde(default)]
	pub access_node: Option<String>,
	/// Per-request HTTP timeout
	#[serde(default = "default_request_timeout_secs")]
	pub request_timeout_secs: u64,
}

impl LedgerConfig {
	/// Resolves the access node URL, falling back to the network default.
	pub fn access_node_url(&self) -> Option<String> {
		if let Some(url) = &self.access_node {
			return Some(url.clone());
		}
		match self.network {
			Network::Testnet => Some(TESTNET_ACCESS_NODE.to_string()),
			Network::Mainnet => Some(MAINNET_ACCESS_NODE.to_string()),
			Network::Custom => None,
		}
	}

	pub fn request_timeout(&self) -> Duration {
		Duration::from_secs(self.request_timeout_secs)
	}
}

impl Default for LedgerConfig {
	fn default() -> Self {
		Self {
			network: Network::default(),
			access_node: None,
			request_timeout_secs: default_request_timeout_secs(),
		}
	}
}

fn default_request_timeout_secs() -> u64 {
	10
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
	#[default]
	File,
	Memory,
}

/// Persistent key-value store configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
	#[serde(default)]
	pub backend: StorageBackend,
	/// Base directory for the file backend
	#[serde(default = "default_storage_path")]
	pub path: PathBuf,
}

impl Default for StorageConfig {
	fn default() -> Self {
		Self {
			backend: StorageBackend::default(),
			path: default_storage_path(),
		}
	}
}

fn default_storage_path() -> PathBuf {
	PathBuf::from("./data/txwatch")
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationBackend {
	#[default]
	Log,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NotificationsConfig {
	#[serde(default)]
	pub backend: NotificationBackend,
}
