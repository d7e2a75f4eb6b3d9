//! Shared types for the txwatch transaction status tracker.

pub mod configs;
pub mod notification;
pub mod transaction;

pub use configs::*;
pub use notification::{Notification, NotificationKind};
pub use transaction::{
	transaction_id_from_key, LedgerStatus, TrackedTransaction, TransactionPhase,
	TRANSACTION_NAMESPACE,
};
