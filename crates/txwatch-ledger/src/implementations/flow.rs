//! Flow access node REST client.
//!
//! Queries `GET /v1/transaction_results/{id}` and decodes the execution
//! phase and error message from the response.

use crate::{LedgerError, LedgerInterface};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;
use txwatch_types::{LedgerStatus, TransactionPhase};

/// Client for a Flow access node's REST API.
#[derive(Debug, Clone)]
pub struct FlowAccessClient {
	base_url: String,
	client: Client,
}

/// `status` is a name ("Sealed") on the REST API and an ordinal in the
/// SDK's decoded form; both are accepted.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum StatusField {
	Ordinal(u64),
	Name(String),
}

#[derive(Debug, Deserialize)]
struct TransactionResultResponse {
	status: StatusField,
	#[serde(default)]
	error_message: Option<String>,
}

impl FlowAccessClient {
	pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, LedgerError> {
		let client = Client::builder()
			.timeout(timeout)
			.build()
			.map_err(|e| LedgerError::Http(e.to_string()))?;

		Ok(Self {
			base_url: base_url.into().trim_end_matches('/').to_string(),
			client,
		})
	}

	/// Normalizes an id to the lower-case, unprefixed hex the API expects.
	fn normalize_id(transaction_id: &str) -> Result<String, LedgerError> {
		let trimmed = transaction_id.trim();
		let hex = trimmed
			.strip_prefix("0x")
			.or_else(|| trimmed.strip_prefix("0X"))
			.unwrap_or(trimmed);

		if hex.is_empty() || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
			return Err(LedgerError::InvalidTransactionId(
				transaction_id.to_string(),
			));
		}

		Ok(hex.to_ascii_lowercase())
	}

	fn decode(body: TransactionResultResponse) -> Result<LedgerStatus, LedgerError> {
		let phase = match body.status {
			StatusField::Ordinal(value) => TransactionPhase::from_ordinal(value),
			StatusField::Name(name) => TransactionPhase::from_name(&name)
				.ok_or_else(|| LedgerError::Decode(format!("unknown status '{}'", name)))?,
		};

		Ok(LedgerStatus {
			phase,
			error_message: body.error_message.filter(|m| !m.is_empty()),
		})
	}
}

#[async_trait]
impl LedgerInterface for FlowAccessClient {
	fn name(&self) -> &str {
		"flow-access"
	}

	async fn transaction_status(&self, transaction_id: &str) -> Result<LedgerStatus, LedgerError> {
		let id = Self::normalize_id(transaction_id)?;
		let url = format!("{}/v1/transaction_results/{}", self.base_url, id);
		debug!("Querying transaction result: {}", url);

		let response = self
			.client
			.get(&url)
			.send()
			.await
			.map_err(|e| LedgerError::Http(e.to_string()))?;

		let status = response.status();
		if !status.is_success() {
			let body = response.text().await.unwrap_or_default();
			return Err(LedgerError::Status {
				code: status.as_u16(),
				body,
			});
		}

		let body: TransactionResultResponse = response
			.json()
			.await
			.map_err(|e| LedgerError::Decode(e.to_string()))?;

		Self::decode(body)
	}
}
