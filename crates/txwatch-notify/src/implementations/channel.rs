//! Channel-backed notifier for embedding the tracker in another task.

use crate::NotifierInterface;
use tokio::sync::mpsc;
use tracing::debug;
use txwatch_types::Notification;

/// Sends notifications into an unbounded channel.
#[derive(Debug, Clone)]
pub struct ChannelNotifier {
	tx: mpsc::UnboundedSender<Notification>,
}

impl ChannelNotifier {
	/// Creates the notifier together with its receiving end.
	pub fn new() -> (Self, mpsc::UnboundedReceiver<Notification>) {
		let (tx, rx) = mpsc::unbounded_channel();
		(Self { tx }, rx)
	}
}

impl NotifierInterface for ChannelNotifier {
	fn notify(&self, notification: Notification) {
		if self.tx.send(notification).is_err() {
			debug!("Notification receiver dropped");
		}
	}
}
