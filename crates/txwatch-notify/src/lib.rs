//! Notification sinks for the txwatch tracker.
//!
//! Notifications are fire-and-forget: a sink never reports failure back
//! to the tracker.

use std::sync::Arc;
use txwatch_types::{Notification, NotificationBackend, NotificationsConfig};

pub mod implementations {
	pub mod channel;
	pub mod log;
}

pub use implementations::channel::ChannelNotifier;
pub use implementations::log::LogNotifier;

/// The UI-facing side of the tracker.
pub trait NotifierInterface: Send + Sync {
	fn notify(&self, notification: Notification);
}

/// Forwards every notification to each inner sink in order.
#[derive(Default, Clone)]
pub struct CompositeNotifier {
	sinks: Vec<Arc<dyn NotifierInterface>>,
}

impl CompositeNotifier {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn with_sink(mut self, sink: Arc<dyn NotifierInterface>) -> Self {
		self.sinks.push(sink);
		self
	}
}

impl NotifierInterface for CompositeNotifier {
	fn notify(&self, notification: Notification) {
		for sink in &self.sinks {
			sink.notify(notification.clone());
		}
	}
}

/// Builds the notifier described by the configuration.
pub fn create_notifier(config: &NotificationsConfig) -> Arc<dyn NotifierInterface> {
	match config.backend {
		NotificationBackend::Log => Arc::new(LogNotifier::new()),
	}
}
