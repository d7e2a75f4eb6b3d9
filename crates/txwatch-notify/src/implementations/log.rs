use crate::NotifierInterface;
use tracing::{error, info};
use txwatch_types::{Notification, NotificationKind};

/// Writes notifications to the tracing output.
#[derive(Debug, Default, Clone)]
pub struct LogNotifier;

impl LogNotifier {
	pub fn new() -> Self {
		Self
	}
}

impl NotifierInterface for LogNotifier {
	fn notify(&self, notification: Notification) {
		match notification.kind {
			NotificationKind::Start | NotificationKind::Success => info!(
				kind = %notification.kind,
				transaction_id = %notification.transaction_id,
				"{}: {}",
				notification.title,
				notification.message
			),
			NotificationKind::Error => error!(
				kind = %notification.kind,
				transaction_id = %notification.transaction_id,
				"{}: {}",
				notification.title,
				notification.message
			),
		}
	}
}
