//! User-facing notifications emitted by the tracker.

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationKind {
	Start,
	Success,
	Error,
}

impl fmt::Display for NotificationKind {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			NotificationKind::Start => write!(f, "start"),
			NotificationKind::Success => write!(f, "success"),
			NotificationKind::Error => write!(f, "error"),
		}
	}
}

/// A non-expiring notification addressed to the UI layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
	pub kind: NotificationKind,
	pub title: String,
	pub message: String,
	/// Transaction the notification refers to.
	pub transaction_id: String,
}

impl Notification {
	pub fn for_transaction(
		kind: NotificationKind,
		title: impl Into<String>,
		transaction_id: impl Into<String>,
	) -> Self {
		let transaction_id = transaction_id.into();
		Self {
			kind,
			title: title.into(),
			message: format!("Transaction id: {}", transaction_id),
			transaction_id,
		}
	}

	pub fn is_terminal(&self) -> bool {
		matches!(
			self.kind,
			NotificationKind::Success | NotificationKind::Error
		)
	}
}
