//! The per-transaction poll loop.
//!
//! One loop runs per tracked transaction. Each iteration waits for the
//! previous query to complete before sleeping and querying again, so polls
//! for a single transaction never overlap.

use dashmap::DashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};
use txwatch_ledger::LedgerInterface;
use txwatch_notify::NotifierInterface;
use txwatch_storage::StorageService;
use txwatch_types::{
	LedgerStatus, Notification, NotificationKind, TrackedTransaction, TransactionPhase,
	TRANSACTION_NAMESPACE,
};

/// How a poll loop ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollOutcome {
	/// The ledger reached the seal threshold.
	Sealed(TransactionPhase),
	/// The ledger reported an error message for the transaction.
	Rejected(String),
	/// The query itself failed. The record is kept for the next start.
	QueryFailed(String),
	/// The ledger can never answer for this id; the record is dropped.
	Unqueryable(String),
}

/// A running poll loop. `token` tells apart successive loops for the same
/// transaction id.
pub(crate) struct PollTask {
	pub token: u64,
	pub handle: JoinHandle<()>,
}

pub(crate) type PollTasks = Arc<DashMap<String, PollTask>>;

/// Collaborators shared by every poll loop.
#[derive(Clone)]
pub(crate) struct PollContext {
	pub storage: Arc<StorageService>,
	pub ledger: Arc<dyn LedgerInterface>,
	pub notifier: Arc<dyn NotifierInterface>,
	pub poll_interval: Duration,
	pub seal_threshold: u8,
	pub tasks: PollTasks,
}

enum Step {
	Continue(TransactionPhase),
	Done(PollOutcome),
}

impl PollContext {
	pub fn notify(&self, kind: NotificationKind, title: &str, transaction_id: &str) {
		self.notifier
			.notify(Notification::for_transaction(kind, title, transaction_id));
	}

	/// Polls until the transaction resolves, emitting the terminal
	/// notification before returning.
	///
	/// The loop gives up its task slot before it touches the record. A
	/// registration that finds the slot free starts a fresh loop for the
	/// record it persists; one that finds it taken joins a loop that has
	/// not yet touched the record.
	pub async fn run(&self, mut record: TrackedTransaction, token: u64) -> PollOutcome {
		let id = record.transaction_id.clone();
		let mut polls: u64 = 0;

		loop {
			polls += 1;
			debug!(transaction_id = %id, poll = polls, "Querying transaction status");

			let status = match self.ledger.transaction_status(&id).await {
				Ok(status) => status,
				Err(e) if e.is_permanent() => {
					warn!(transaction_id = %id, "Transaction cannot be queried, dropping it: {}", e);
					self.release(&id, token);
					self.forget(&id).await;
					self.notify(NotificationKind::Error, &record.err_text, &id);
					return PollOutcome::Unqueryable(e.to_string());
				}
				Err(e) => {
					warn!(transaction_id = %id, "Status query failed, giving up: {}", e);
					self.release(&id, token);
					self.notify(NotificationKind::Error, &record.err_text, &id);
					return PollOutcome::QueryFailed(e.to_string());
				}
			};

			match self.evaluate(&id, &record, &status, token).await {
				Step::Done(outcome) => return outcome,
				Step::Continue(phase) => {
					if phase.ordinal() != record.status {
						record.status = phase.ordinal();
						if let Err(e) = self.storage.store(TRANSACTION_NAMESPACE, &id, &record).await
						{
							warn!(transaction_id = %id, "Failed to persist phase {}: {}", phase, e);
						}
					}
					debug!(
						transaction_id = %id,
						"Transaction {} not final yet, next poll in {:?}",
						phase,
						self.poll_interval
					);
				}
			}

			tokio::time::sleep(self.poll_interval).await;
		}
	}

	async fn evaluate(
		&self,
		id: &str,
		record: &TrackedTransaction,
		status: &LedgerStatus,
		token: u64,
	) -> Step {
		if let Some(message) = status.error() {
			info!(transaction_id = %id, "Transaction failed: {}", message);
			self.release(id, token);
			self.forget(id).await;
			self.notify(NotificationKind::Error, &record.err_text, id);
			return Step::Done(PollOutcome::Rejected(message.to_string()));
		}

		if status.phase.ordinal() >= self.seal_threshold {
			info!(transaction_id = %id, "Transaction reached {}", status.phase);
			self.release(id, token);
			self.forget(id).await;
			self.notify(NotificationKind::Success, &record.success_text, id);
			return Step::Done(PollOutcome::Sealed(status.phase));
		}

		Step::Continue(status.phase)
	}

	/// Frees the task slot if it still belongs to this loop.
	fn release(&self, id: &str, token: u64) {
		self.tasks.remove_if(id, |_, task| task.token == token);
	}

	/// Drops the persisted record. A failure is logged and the terminal
	/// notification still goes out; the leftover record is resolved again
	/// on the next start.
	async fn forget(&self, id: &str) {
		if let Err(e) = self.storage.remove(TRANSACTION_NAMESPACE, id).await {
			warn!(transaction_id = %id, "Failed to remove tracking record: {}", e);
		}
	}
}
