//! Tracked transaction records and ledger-reported phases.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Namespace prefix for persisted transaction records.
pub const TRANSACTION_NAMESPACE: &str = "transaction";

/// Extracts the transaction identifier from a storage key.
///
/// Returns `None` when the key is outside the transaction namespace or
/// carries an empty identifier.
pub fn transaction_id_from_key(key: &str) -> Option<&str> {
	key.strip_prefix(TRANSACTION_NAMESPACE)
		.and_then(|rest| rest.strip_prefix(':'))
		.filter(|id| !id.is_empty())
}

/// Execution phase reported by the ledger for a transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum TransactionPhase {
	Unknown,
	Pending,
	Finalized,
	Executed,
	Sealed,
	Expired,
}

impl TransactionPhase {
	/// Ordinal used by the ledger's phase numbering.
	pub fn ordinal(self) -> u8 {
		match self {
			TransactionPhase::Unknown => 0,
			TransactionPhase::Pending => 1,
			TransactionPhase::Finalized => 2,
			TransactionPhase::Executed => 3,
			TransactionPhase::Sealed => 4,
			TransactionPhase::Expired => 5,
		}
	}

	/// Maps a ledger ordinal back to a phase. Values past the known range
	/// saturate to `Expired` so they still compare as terminal.
	pub fn from_ordinal(value: u64) -> Self {
		match value {
			0 => TransactionPhase::Unknown,
			1 => TransactionPhase::Pending,
			2 => TransactionPhase::Finalized,
			3 => TransactionPhase::Executed,
			4 => TransactionPhase::Sealed,
			_ => TransactionPhase::Expired,
		}
	}

	/// Parses the status names used by the Flow access API.
	pub fn from_name(name: &str) -> Option<Self> {
		match name.to_ascii_lowercase().as_str() {
			"unknown" => Some(TransactionPhase::Unknown),
			"pending" => Some(TransactionPhase::Pending),
			"finalized" => Some(TransactionPhase::Finalized),
			"executed" => Some(TransactionPhase::Executed),
			"sealed" => Some(TransactionPhase::Sealed),
			"expired" => Some(TransactionPhase::Expired),
			_ => None,
		}
	}
}

impl fmt::Display for TransactionPhase {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let name = match self {
			TransactionPhase::Unknown => "Unknown",
			TransactionPhase::Pending => "Pending",
			TransactionPhase::Finalized => "Finalized",
			TransactionPhase::Executed => "Executed",
			TransactionPhase::Sealed => "Sealed",
			TransactionPhase::Expired => "Expired",
		};
		write!(f, "{}", name)
	}
}

/// Decoded answer to a transaction status query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LedgerStatus {
	pub phase: TransactionPhase,
	/// Ledger-reported failure; `None` when the transaction has not failed.
	pub error_message: Option<String>,
}

impl LedgerStatus {
	pub fn new(phase: TransactionPhase) -> Self {
		Self {
			phase,
			error_message: None,
		}
	}

	pub fn failed(phase: TransactionPhase, message: impl Into<String>) -> Self {
		Self {
			phase,
			error_message: Some(message.into()),
		}
	}

	/// Returns the error message if it is present and non-empty.
	pub fn error(&self) -> Option<&str> {
		self.error_message.as_deref().filter(|m| !m.is_empty())
	}
}

/// Persisted unit of work for one in-flight transaction.
///
/// Serialized as `{"status": <int>, "startText": ..., "successText": ..., "errText": ...}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackedTransaction {
	#[serde(skip)]
	pub transaction_id: String,
	/// Last observed phase ordinal.
	pub status: u8,
	pub start_text: String,
	pub success_text: String,
	pub err_text: String,
}

impl TrackedTransaction {
	pub fn new(
		transaction_id: impl Into<String>,
		start_text: impl Into<String>,
		success_text: impl Into<String>,
		err_text: impl Into<String>,
	) -> Self {
		Self {
			transaction_id: transaction_id.into(),
			status: TransactionPhase::Unknown.ordinal(),
			start_text: start_text.into(),
			success_text: success_text.into(),
			err_text: err_text.into(),
		}
	}

	pub fn phase(&self) -> TransactionPhase {
		TransactionPhase::from_ordinal(self.status as u64)
	}
}
