// txwatch-core/src/error.rs

use thiserror::Error;

#[derive(Error, Debug)]
pub enum TrackerError {
	#[error("Invalid transaction id: {0:?}")]
	InvalidTransactionId(String),

	#[error("Configuration error: {0}")]
	Configuration(String),

	#[error("Storage error: {0}")]
	Storage(#[from] txwatch_storage::StorageError),
}
