//! Ledger access for the txwatch tracker.
//!
//! The ledger is treated as an opaque service that answers "what is the
//! status of this transaction". The Flow access node REST API is the
//! provided implementation.

use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;
use txwatch_types::{LedgerConfig, LedgerStatus};

pub mod implementations {
	pub mod flow;
}

pub use implementations::flow::FlowAccessClient;

/// Errors raised while querying the ledger. All of them are local or
/// transport failures; a transaction the ledger reports as failed is a
/// successful query carrying an error message.
#[derive(Debug, Error)]
pub enum LedgerError {
	#[error("HTTP error: {0}")]
	Http(String),

	#[error("Access node returned {code}: {body}")]
	Status { code: u16, body: String },

	#[error("Failed to decode response: {0}")]
	Decode(String),

	#[error("Invalid transaction id: {0}")]
	InvalidTransactionId(String),

	#[error("Configuration error: {0}")]
	Config(String),
}

impl LedgerError {
	/// True when retrying the same query can never succeed.
	pub fn is_permanent(&self) -> bool {
		matches!(self, LedgerError::InvalidTransactionId(_))
	}
}

/// Query side of the ledger service.
#[async_trait]
pub trait LedgerInterface: Send + Sync {
	/// Short name used in logs.
	fn name(&self) -> &str;

	/// Fetches the current status of a previously submitted transaction.
	async fn transaction_status(&self, transaction_id: &str) -> Result<LedgerStatus, LedgerError>;
}

/// Builds the ledger client described by the configuration.
pub fn create_ledger(config: &LedgerConfig) -> Result<Arc<dyn LedgerInterface>, LedgerError> {
	let access_node = config.access_node_url().ok_or_else(|| {
		LedgerError::Config("custom network requires an access_node URL".to_string())
	})?;
	let client = FlowAccessClient::new(access_node, config.request_timeout())?;
	Ok(Arc::new(client))
}
