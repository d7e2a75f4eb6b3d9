//! Storage module for the txwatch tracker.
//!
//! Provides the persistent key-value store that keeps in-flight
//! transactions across restarts, with file-based and in-memory backends.

use async_trait::async_trait;
use serde::{de::DeserializeOwned, Serialize};
use thiserror::Error;
use txwatch_types::{StorageBackend, StorageConfig};

pub mod implementations {
	pub mod file;
	pub mod memory;
}

/// Errors that can occur during storage operations.
#[derive(Debug, Error)]
pub enum StorageError {
	/// Error that occurs when a requested item is not found.
	#[error("Not found")]
	NotFound,
	/// Error that occurs during serialization/deserialization.
	#[error("Serialization error: {0}")]
	Serialization(String),
	/// Error that occurs in the storage backend.
	#[error("Backend error: {0}")]
	Backend(String),
}

/// Trait defining the low-level interface for storage backends.
///
/// Values are opaque byte strings; keys are free-form strings and are
/// returned unchanged by `list_keys`.
#[async_trait]
pub trait StorageInterface: Send + Sync {
	/// Retrieves raw bytes for the given key.
	async fn get_bytes(&self, key: &str) -> Result<Vec<u8>, StorageError>;

	/// Stores raw bytes under the given key, replacing any previous value.
	async fn set_bytes(&self, key: &str, value: Vec<u8>) -> Result<(), StorageError>;

	/// Deletes the value associated with the given key. Deleting a missing
	/// key is not an error.
	async fn delete(&self, key: &str) -> Result<(), StorageError>;

	/// Checks if a key exists in storage.
	async fn exists(&self, key: &str) -> Result<bool, StorageError>;

	/// Lists every key currently stored.
	async fn list_keys(&self) -> Result<Vec<String>, StorageError>;
}

/// High-level storage service that provides typed operations.
///
/// Wraps a storage backend and serializes values as JSON. Keys are built
/// as `namespace:id`.
pub struct StorageService {
	backend: Box<dyn StorageInterface>,
}

impl StorageService {
	/// Creates a new StorageService with the specified backend.
	pub fn new(backend: Box<dyn StorageInterface>) -> Self {
		Self { backend }
	}

	/// Stores a serializable value under `namespace:id`.
	pub async fn store<T: Serialize>(
		&self,
		namespace: &str,
		id: &str,
		data: &T,
	) -> Result<(), StorageError> {
		let key = format!("{}:{}", namespace, id);
		let bytes =
			serde_json::to_vec(data).map_err(|e| StorageError::Serialization(e.to_string()))?;
		self.backend.set_bytes(&key, bytes).await
	}

	/// Retrieves and deserializes a value stored under `namespace:id`.
	pub async fn retrieve<T: DeserializeOwned>(
		&self,
		namespace: &str,
		id: &str,
	) -> Result<T, StorageError> {
		let key = format!("{}:{}", namespace, id);
		self.retrieve_key(&key).await
	}

	/// Retrieves and deserializes a value by its full key.
	pub async fn retrieve_key<T: DeserializeOwned>(&self, key: &str) -> Result<T, StorageError> {
		let bytes = self.backend.get_bytes(key).await?;
		serde_json::from_slice(&bytes).map_err(|e| StorageError::Serialization(e.to_string()))
	}

	/// Like `retrieve`, but maps a missing entry to `None`.
	pub async fn find<T: DeserializeOwned>(
		&self,
		namespace: &str,
		id: &str,
	) -> Result<Option<T>, StorageError> {
		match self.retrieve(namespace, id).await {
			Ok(value) => Ok(Some(value)),
			Err(StorageError::NotFound) => Ok(None),
			Err(e) => Err(e),
		}
	}

	/// Removes the value stored under `namespace:id`.
	pub async fn remove(&self, namespace: &str, id: &str) -> Result<(), StorageError> {
		let key = format!("{}:{}", namespace, id);
		self.backend.delete(&key).await
	}

	/// Removes a value by its full key.
	pub async fn remove_key(&self, key: &str) -> Result<(), StorageError> {
		self.backend.delete(key).await
	}

	/// Checks whether `namespace:id` is present.
	pub async fn contains(&self, namespace: &str, id: &str) -> Result<bool, StorageError> {
		let key = format!("{}:{}", namespace, id);
		self.backend.exists(&key).await
	}

	/// Lists the full keys that belong to `namespace`.
	pub async fn keys(&self, namespace: &str) -> Result<Vec<String>, StorageError> {
		let prefix = format!("{}:", namespace);
		let mut keys: Vec<String> = self
			.backend
			.list_keys()
			.await?
			.into_iter()
			.filter(|key| key.starts_with(&prefix))
			.collect();
		keys.sort();
		Ok(keys)
	}
}

/// Creates a storage service from configuration.
pub fn create_storage(config: &StorageConfig) -> StorageService {
	let backend: Box<dyn StorageInterface> = match config.backend {
		StorageBackend::File => Box::new(implementations::file::FileStorage::new(
			config.path.clone(),
		)),
		StorageBackend::Memory => Box::new(implementations::memory::MemoryStorage::new()),
	};
	StorageService::new(backend)
}
