// txwatch-core/src/tracker.rs

use crate::{
	error::TrackerError,
	poller::{PollContext, PollTask, PollTasks},
};
use dashmap::{mapref::entry::Entry, DashMap};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::{debug, info, warn};
use txwatch_ledger::LedgerInterface;
use txwatch_notify::NotifierInterface;
use txwatch_storage::{StorageError, StorageService};
use txwatch_types::{
	transaction_id_from_key, NotificationKind, TrackedTransaction, TrackerConfig,
	TRANSACTION_NAMESPACE,
};

/// Follows submitted transactions until the ledger resolves them.
///
/// Constructed once at startup and shared by reference. Each tracked
/// transaction gets its own poll task; the task handle is kept per
/// identifier so a second registration joins the running loop instead of
/// starting another one.
pub struct TransactionTracker {
	context: PollContext,
	tasks: PollTasks,
	next_token: AtomicU64,
}

impl TransactionTracker {
	/// Creates a tracker over the given collaborators. Polling starts only
	/// through `register` or `resume_all`.
	pub fn new(
		storage: Arc<StorageService>,
		ledger: Arc<dyn LedgerInterface>,
		notifier: Arc<dyn NotifierInterface>,
		config: TrackerConfig,
	) -> Self {
		let tasks: PollTasks = Arc::new(DashMap::new());
		Self {
			context: PollContext {
				storage,
				ledger,
				notifier,
				poll_interval: config.poll_interval(),
				seal_threshold: config.seal_threshold,
				tasks: tasks.clone(),
			},
			tasks,
			next_token: AtomicU64::new(0),
		}
	}

	pub fn builder() -> TransactionTrackerBuilder {
		TransactionTrackerBuilder::new()
	}

	/// Starts tracking a transaction.
	///
	/// Creates the persisted record unless one already exists, in which
	/// case the stored record (and its texts) is reused. Emits the start
	/// notification when `announce_start` is set, then makes sure a poll
	/// loop is running. Ledger and storage failures end in an error
	/// notification rather than an `Err`.
	pub async fn register(
		&self,
		transaction_id: &str,
		start_text: &str,
		success_text: &str,
		err_text: &str,
		announce_start: bool,
	) -> Result<(), TrackerError> {
		let transaction_id = transaction_id.trim();
		if transaction_id.is_empty() {
			return Err(TrackerError::InvalidTransactionId(
				transaction_id.to_string(),
			));
		}

		let record = match self
			.load_or_create(transaction_id, start_text, success_text, err_text)
			.await
		{
			Ok(record) => record,
			Err(e) => {
				warn!(transaction_id = %transaction_id, "Cannot track transaction: {}", e);
				self.context
					.notify(NotificationKind::Error, err_text, transaction_id);
				return Ok(());
			}
		};

		self.start(record, announce_start);
		Ok(())
	}

	/// Resumes every transaction left in storage by a previous run.
	///
	/// Entries whose key or value cannot be interpreted are removed without
	/// notifying anyone. Returns the number of resumed transactions.
	pub async fn resume_all(&self) -> usize {
		let keys = match self.context.storage.keys(TRANSACTION_NAMESPACE).await {
			Ok(keys) => keys,
			Err(e) => {
				warn!("Failed to list persisted transactions: {}", e);
				return 0;
			}
		};

		let mut resumed = 0;
		for key in keys {
			let Some(transaction_id) = transaction_id_from_key(&key) else {
				debug!("Discarding record without transaction id: {}", key);
				self.discard(&key).await;
				continue;
			};

			match self
				.context
				.storage
				.retrieve_key::<TrackedTransaction>(&key)
				.await
			{
				Ok(mut record) => {
					record.transaction_id = transaction_id.to_string();
					self.start(record, true);
					resumed += 1;
				}
				// Resolved by another task between listing and reading
				Err(StorageError::NotFound) => {}
				Err(e) => {
					debug!("Discarding unreadable record {}: {}", key, e);
					self.discard(&key).await;
				}
			}
		}

		info!("Resumed {} pending transaction(s)", resumed);
		resumed
	}

	/// Returns true while a poll loop is running for the transaction.
	pub fn is_tracking(&self, transaction_id: &str) -> bool {
		self.tasks
			.get(transaction_id)
			.is_some_and(|task| !task.handle.is_finished())
	}

	/// Identifiers with a running poll loop.
	pub fn tracked_ids(&self) -> Vec<String> {
		let mut ids: Vec<String> = self
			.tasks
			.iter()
			.filter(|entry| !entry.value().handle.is_finished())
			.map(|entry| entry.key().clone())
			.collect();
		ids.sort();
		ids
	}

	/// Identifiers persisted as in flight, whether or not this process is
	/// polling them.
	pub async fn pending_ids(&self) -> Result<Vec<String>, TrackerError> {
		let keys = self.context.storage.keys(TRANSACTION_NAMESPACE).await?;
		Ok(keys
			.iter()
			.filter_map(|key| transaction_id_from_key(key))
			.map(str::to_string)
			.collect())
	}

	/// Stops every poll loop. Persisted records are left in place so the
	/// next start resumes them.
	pub fn shutdown(&self) {
		let count = self.tasks.len();
		for entry in self.tasks.iter() {
			entry.value().handle.abort();
		}
		self.tasks.clear();
		info!("Stopped {} poll task(s)", count);
	}

	async fn load_or_create(
		&self,
		transaction_id: &str,
		start_text: &str,
		success_text: &str,
		err_text: &str,
	) -> Result<TrackedTransaction, TrackerError> {
		let storage = &self.context.storage;

		if let Some(mut record) = storage
			.find::<TrackedTransaction>(TRANSACTION_NAMESPACE, transaction_id)
			.await?
		{
			debug!(transaction_id = %transaction_id, "Reusing persisted record");
			record.transaction_id = transaction_id.to_string();
			return Ok(record);
		}

		let record = TrackedTransaction::new(transaction_id, start_text, success_text, err_text);
		storage
			.store(TRANSACTION_NAMESPACE, transaction_id, &record)
			.await?;
		debug!(transaction_id = %transaction_id, "Persisted new tracking record");
		Ok(record)
	}

	fn start(&self, record: TrackedTransaction, announce_start: bool) {
		let id = record.transaction_id.clone();

		if announce_start {
			self.context
				.notify(NotificationKind::Start, &record.start_text, &id);
		}

		// Decided under the entry lock, which a finishing loop also takes to
		// release its slot
		let entry = self.tasks.entry(id.clone());
		if let Entry::Occupied(existing) = &entry {
			if !existing.get().handle.is_finished() {
				debug!(transaction_id = %id, "Poll loop already running");
				return;
			}
		}

		let token = self.next_token.fetch_add(1, Ordering::Relaxed);
		let context = self.context.clone();
		let handle = tokio::spawn(async move {
			let outcome = context.run(record, token).await;
			debug!(transaction_id = %id, "Poll loop finished: {:?}", outcome);
		});
		entry.insert(PollTask { token, handle });
	}

	async fn discard(&self, key: &str) {
		if let Err(e) = self.context.storage.remove_key(key).await {
			warn!("Failed to remove record {}: {}", key, e);
		}
	}
}

impl Drop for TransactionTracker {
	fn drop(&mut self) {
		for entry in self.tasks.iter() {
			entry.value().handle.abort();
		}
	}
}

/// Builder for TransactionTracker
#[derive(Default)]
pub struct TransactionTrackerBuilder {
	storage: Option<Arc<StorageService>>,
	ledger: Option<Arc<dyn LedgerInterface>>,
	notifier: Option<Arc<dyn NotifierInterface>>,
	config: TrackerConfig,
}

impl TransactionTrackerBuilder {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn with_storage(mut self, storage: Arc<StorageService>) -> Self {
		self.storage = Some(storage);
		self
	}

	pub fn with_ledger(mut self, ledger: Arc<dyn LedgerInterface>) -> Self {
		self.ledger = Some(ledger);
		self
	}

	pub fn with_notifier(mut self, notifier: Arc<dyn NotifierInterface>) -> Self {
		self.notifier = Some(notifier);
		self
	}

	pub fn with_config(mut self, config: TrackerConfig) -> Self {
		self.config = config;
		self
	}

	pub fn build(self) -> Result<TransactionTracker, TrackerError> {
		let storage = self
			.storage
			.ok_or_else(|| TrackerError::Configuration("storage is required".to_string()))?;
		let ledger = self
			.ledger
			.ok_or_else(|| TrackerError::Configuration("ledger is required".to_string()))?;
		let notifier = self
			.notifier
			.ok_or_else(|| TrackerError::Configuration("notifier is required".to_string()))?;

		if self.config.poll_interval_ms == 0 {
			return Err(TrackerError::Configuration(
				"poll interval must be greater than zero".to_string(),
			));
		}

		info!(
			"Transaction tracker using ledger '{}', poll interval {}ms, seal threshold {}",
			ledger.name(),
			self.config.poll_interval_ms,
			self.config.seal_threshold
		);

		Ok(TransactionTracker::new(
			storage,
			ledger,
			notifier,
			self.config,
		))
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use async_trait::async_trait;
	use std::collections::VecDeque;
	use std::sync::atomic::{AtomicUsize, Ordering};
	use std::sync::Mutex;
	use std::time::Duration;
	use tokio::sync::mpsc::UnboundedReceiver;
	use tokio::sync::Notify;
	use txwatch_ledger::LedgerError;
	use txwatch_notify::ChannelNotifier;
	use txwatch_storage::implementations::memory::MemoryStorage;
	use txwatch_storage::StorageInterface;
	use txwatch_types::{LedgerStatus, Notification, TransactionPhase};

	const INTERVAL_MS: u64 = 10;

	/// Ledger that replays scripted answers, then keeps returning the
	/// fallback answer.
	struct ScriptedLedger {
		script: Mutex<VecDeque<Result<LedgerStatus, LedgerError>>>,
		fallback: LedgerStatus,
		calls: AtomicUsize,
	}

	impl ScriptedLedger {
		fn new(
			script: Vec<Result<LedgerStatus, LedgerError>>,
			fallback: TransactionPhase,
		) -> Arc<Self> {
			Arc::new(Self {
				script: Mutex::new(script.into()),
				fallback: LedgerStatus::new(fallback),
				calls: AtomicUsize::new(0),
			})
		}

		fn phases(phases: &[u64]) -> Arc<Self> {
			Self::new(
				phases
					.iter()
					.map(|p| Ok(LedgerStatus::new(TransactionPhase::from_ordinal(*p))))
					.collect(),
				TransactionPhase::Pending,
			)
		}

		fn calls(&self) -> usize {
			self.calls.load(Ordering::SeqCst)
		}
	}

	#[async_trait]
	impl LedgerInterface for ScriptedLedger {
		fn name(&self) -> &str {
			"scripted"
		}

		async fn transaction_status(&self, _id: &str) -> Result<LedgerStatus, LedgerError> {
			self.calls.fetch_add(1, Ordering::SeqCst);
			self.script
				.lock()
				.unwrap()
				.pop_front()
				.unwrap_or_else(|| Ok(self.fallback.clone()))
		}
	}

	/// Backend whose every operation fails.
	struct BrokenStorage;

	#[async_trait]
	impl StorageInterface for BrokenStorage {
		async fn get_bytes(&self, _key: &str) -> Result<Vec<u8>, StorageError> {
			Err(StorageError::Backend("disk on fire".to_string()))
		}

		async fn set_bytes(&self, _key: &str, _value: Vec<u8>) -> Result<(), StorageError> {
			Err(StorageError::Backend("disk on fire".to_string()))
		}

		async fn delete(&self, _key: &str) -> Result<(), StorageError> {
			Err(StorageError::Backend("disk on fire".to_string()))
		}

		async fn exists(&self, _key: &str) -> Result<bool, StorageError> {
			Err(StorageError::Backend("disk on fire".to_string()))
		}

		async fn list_keys(&self) -> Result<Vec<String>, StorageError> {
			Err(StorageError::Backend("disk on fire".to_string()))
		}
	}

	struct Harness {
		tracker: TransactionTracker,
		storage: Arc<StorageService>,
		notifications: UnboundedReceiver<Notification>,
	}

	/// Holds back the first success notification until the test lets it
	/// through, then forwards everything to a channel.
	struct HeldSuccessNotifier {
		forward: ChannelNotifier,
		entered: Arc<Notify>,
		release: Mutex<Option<std::sync::mpsc::Receiver<()>>>,
	}

	impl NotifierInterface for HeldSuccessNotifier {
		fn notify(&self, notification: Notification) {
			if notification.kind == NotificationKind::Success {
				let gate = self.release.lock().unwrap().take();
				if let Some(gate) = gate {
					self.entered.notify_one();
					let _ = gate.recv();
				}
			}
			self.forward.notify(notification);
		}
	}

	fn memory_storage() -> Arc<StorageService> {
		Arc::new(StorageService::new(Box::new(MemoryStorage::new())))
	}

	fn build_tracker(
		storage: Arc<StorageService>,
		ledger: Arc<ScriptedLedger>,
		notifier: Arc<dyn NotifierInterface>,
		poll_interval_ms: u64,
	) -> TransactionTracker {
		TransactionTracker::builder()
			.with_storage(storage)
			.with_ledger(ledger)
			.with_notifier(notifier)
			.with_config(TrackerConfig {
				poll_interval_ms,
				seal_threshold: 4,
			})
			.build()
			.unwrap()
	}

	fn harness_with(storage: Arc<StorageService>, ledger: Arc<ScriptedLedger>) -> Harness {
		let (notifier, notifications) = ChannelNotifier::new();
		let tracker = build_tracker(storage.clone(), ledger, Arc::new(notifier), INTERVAL_MS);

		Harness {
			tracker,
			storage,
			notifications,
		}
	}

	fn harness(ledger: Arc<ScriptedLedger>) -> Harness {
		harness_with(memory_storage(), ledger)
	}

	async fn next(rx: &mut UnboundedReceiver<Notification>) -> Notification {
		tokio::time::timeout(Duration::from_secs(2), rx.recv())
			.await
			.expect("timed out waiting for notification")
			.expect("notifier dropped")
	}

	async fn record(storage: &StorageService, id: &str) -> Option<TrackedTransaction> {
		storage.find(TRANSACTION_NAMESPACE, id).await.unwrap()
	}

	async fn settle() {
		tokio::time::sleep(Duration::from_millis(INTERVAL_MS * 5)).await;
	}

	/// Lets spawned poll loops run without moving the paused clock.
	async fn run_ready_tasks() {
		for _ in 0..16 {
			tokio::task::yield_now().await;
		}
	}

	#[tokio::test(start_paused = true)]
	async fn test_pending_polls_once_per_interval() {
		let ledger = ScriptedLedger::phases(&[1, 1]);
		let storage = memory_storage();
		let (notifier, mut notifications) = ChannelNotifier::new();
		let tracker = build_tracker(storage.clone(), ledger.clone(), Arc::new(notifier), 2000);

		tracker
			.register("0x07", "start", "ok", "err", false)
			.await
			.unwrap();
		run_ready_tasks().await;
		assert_eq!(ledger.calls(), 1);
		let after_first = record(&storage, "0x07").await.unwrap();
		assert_eq!(after_first.phase(), TransactionPhase::Pending);

		tokio::time::advance(Duration::from_millis(1999)).await;
		run_ready_tasks().await;
		assert_eq!(ledger.calls(), 1);

		tokio::time::advance(Duration::from_millis(1)).await;
		run_ready_tasks().await;
		assert_eq!(ledger.calls(), 2);
		assert_eq!(record(&storage, "0x07").await.unwrap(), after_first);
		assert!(tracker.is_tracking("0x07"));
		assert!(notifications.try_recv().is_err());

		tracker.shutdown();
	}

	#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
	async fn test_reregister_during_terminal_step_keeps_polling() {
		let ledger = ScriptedLedger::new(Vec::new(), TransactionPhase::Sealed);
		let storage = memory_storage();
		let (forward, mut notifications) = ChannelNotifier::new();
		let entered = Arc::new(Notify::new());
		let (release_tx, release_rx) = std::sync::mpsc::channel();
		let notifier = HeldSuccessNotifier {
			forward,
			entered: entered.clone(),
			release: Mutex::new(Some(release_rx)),
		};
		let tracker = build_tracker(storage.clone(), ledger.clone(), Arc::new(notifier), INTERVAL_MS);

		tracker
			.register("0xAA", "start", "ok", "err", false)
			.await
			.unwrap();
		tokio::time::timeout(Duration::from_secs(2), entered.notified())
			.await
			.expect("first loop never reached its success notification");

		// First loop has released its slot and dropped the record
		assert!(record(&storage, "0xAA").await.is_none());
		assert!(!tracker.is_tracking("0xAA"));

		tracker
			.register("0xAA", "start", "ok", "err", false)
			.await
			.unwrap();
		release_tx.send(()).unwrap();

		assert_eq!(next(&mut notifications).await.kind, NotificationKind::Success);
		assert_eq!(next(&mut notifications).await.kind, NotificationKind::Success);

		settle().await;
		assert_eq!(ledger.calls(), 2);
		assert!(record(&storage, "0xAA").await.is_none());
		assert!(!tracker.is_tracking("0xAA"));
	}

	#[tokio::test]
	async fn test_unqueryable_id_is_dropped() {
		let ledger = ScriptedLedger::new(
			vec![Err(LedgerError::InvalidTransactionId("zz".to_string()))],
			TransactionPhase::Sealed,
		);
		let mut h = harness(ledger.clone());

		h.tracker
			.register("zz", "start", "ok", "Bad id", true)
			.await
			.unwrap();

		assert_eq!(next(&mut h.notifications).await.kind, NotificationKind::Start);
		let failed = next(&mut h.notifications).await;
		assert_eq!(failed.kind, NotificationKind::Error);
		assert_eq!(failed.title, "Bad id");
		assert!(record(&h.storage, "zz").await.is_none());

		settle().await;
		assert_eq!(ledger.calls(), 1);
		assert!(!h.tracker.is_tracking("zz"));
		assert_eq!(h.tracker.resume_all().await, 0);
	}

	#[tokio::test]
	async fn test_pending_then_sealed() {
		let ledger = ScriptedLedger::phases(&[1, 2, 4]);
		let mut h = harness(ledger.clone());

		h.tracker
			.register("0xABC", "Minting", "Minted", "Mint failed", true)
			.await
			.unwrap();

		let start = next(&mut h.notifications).await;
		assert_eq!(start.kind, NotificationKind::Start);
		assert_eq!(start.title, "Minting");
		assert_eq!(start.message, "Transaction id: 0xABC");

		let done = next(&mut h.notifications).await;
		assert_eq!(done.kind, NotificationKind::Success);
		assert_eq!(done.title, "Minted");

		assert_eq!(ledger.calls(), 3);
		assert!(record(&h.storage, "0xABC").await.is_none());

		settle().await;
		assert!(h.notifications.try_recv().is_err());
		assert_eq!(ledger.calls(), 3);
		assert!(!h.tracker.is_tracking("0xABC"));
	}

	#[tokio::test]
	async fn test_ledger_error_is_terminal() {
		let ledger = ScriptedLedger::new(
			vec![Ok(LedgerStatus::failed(
				TransactionPhase::Sealed,
				"invalid proposal",
			))],
			TransactionPhase::Pending,
		);
		let mut h = harness(ledger.clone());

		h.tracker
			.register("0xDEF", "Sending", "Sent", "Send failed", true)
			.await
			.unwrap();

		assert_eq!(next(&mut h.notifications).await.kind, NotificationKind::Start);
		let failed = next(&mut h.notifications).await;
		assert_eq!(failed.kind, NotificationKind::Error);
		assert_eq!(failed.title, "Send failed");
		assert!(record(&h.storage, "0xDEF").await.is_none());

		settle().await;
		assert_eq!(ledger.calls(), 1);
		assert!(h.notifications.try_recv().is_err());
	}

	#[tokio::test]
	async fn test_pending_keeps_record_and_polls_again() {
		let ledger = ScriptedLedger::phases(&[1]);
		let mut h = harness(ledger.clone());

		h.tracker
			.register("0x01", "start", "ok", "err", false)
			.await
			.unwrap();

		settle().await;
		assert!(ledger.calls() >= 2);
		let stored = record(&h.storage, "0x01").await.unwrap();
		assert_eq!(stored.phase(), TransactionPhase::Pending);
		assert!(h.tracker.is_tracking("0x01"));
		assert_eq!(h.tracker.tracked_ids(), vec!["0x01".to_string()]);
		assert!(h.notifications.try_recv().is_err());

		h.tracker.shutdown();
		assert!(!h.tracker.is_tracking("0x01"));
		assert!(record(&h.storage, "0x01").await.is_some());
	}

	#[tokio::test]
	async fn test_query_failure_notifies_and_keeps_record() {
		let ledger = ScriptedLedger::new(
			vec![Err(LedgerError::Http("connection refused".to_string()))],
			TransactionPhase::Sealed,
		);
		let mut h = harness(ledger.clone());

		h.tracker
			.register("0x02", "start", "ok", "err", true)
			.await
			.unwrap();

		assert_eq!(next(&mut h.notifications).await.kind, NotificationKind::Start);
		assert_eq!(next(&mut h.notifications).await.kind, NotificationKind::Error);

		settle().await;
		assert_eq!(ledger.calls(), 1);
		assert!(record(&h.storage, "0x02").await.is_some());
	}

	#[tokio::test]
	async fn test_register_twice_runs_one_loop() {
		let ledger = ScriptedLedger::new(
			vec![Ok(LedgerStatus::new(TransactionPhase::Pending))],
			TransactionPhase::Sealed,
		);
		let mut h = harness(ledger.clone());

		h.tracker
			.register("0x03", "start", "ok", "err", true)
			.await
			.unwrap();
		h.tracker
			.register("0x03", "start again", "ok again", "err again", false)
			.await
			.unwrap();

		assert_eq!(h.storage.keys(TRANSACTION_NAMESPACE).await.unwrap().len(), 1);
		assert_eq!(next(&mut h.notifications).await.kind, NotificationKind::Start);
		let done = next(&mut h.notifications).await;
		assert_eq!(done.kind, NotificationKind::Success);
		assert_eq!(done.title, "ok");

		settle().await;
		assert_eq!(ledger.calls(), 2);
		assert!(h.notifications.try_recv().is_err());
	}

	#[tokio::test]
	async fn test_existing_record_texts_are_reused() {
		let ledger = ScriptedLedger::phases(&[4]);
		let mut h = harness(ledger);
		let stored = TrackedTransaction::new("0x04", "Listing", "Listed", "Listing failed");
		h.storage
			.store(TRANSACTION_NAMESPACE, "0x04", &stored)
			.await
			.unwrap();

		h.tracker
			.register("0x04", "other", "other", "other", true)
			.await
			.unwrap();

		assert_eq!(next(&mut h.notifications).await.title, "Listing");
		assert_eq!(next(&mut h.notifications).await.title, "Listed");
	}

	#[tokio::test]
	async fn test_resume_skips_malformed_records() {
		let backend = MemoryStorage::new();
		let good = serde_json::to_vec(&TrackedTransaction::new("0xGOOD", "s", "ok", "e")).unwrap();
		backend.set_bytes("transaction:0xGOOD", good).await.unwrap();
		backend
			.set_bytes("transaction:0xBAD", b"{oops".to_vec())
			.await
			.unwrap();
		backend
			.set_bytes("transaction:", b"{}".to_vec())
			.await
			.unwrap();
		backend
			.set_bytes("session:user", b"\"alice\"".to_vec())
			.await
			.unwrap();
		let storage = Arc::new(StorageService::new(Box::new(backend)));

		let ledger = ScriptedLedger::phases(&[4]);
		let mut h = harness_with(storage, ledger.clone());

		assert_eq!(h.tracker.resume_all().await, 1);

		let start = next(&mut h.notifications).await;
		assert_eq!(start.kind, NotificationKind::Start);
		assert_eq!(start.transaction_id, "0xGOOD");
		let done = next(&mut h.notifications).await;
		assert_eq!(done.kind, NotificationKind::Success);
		assert_eq!(done.transaction_id, "0xGOOD");

		assert!(h.storage.keys(TRANSACTION_NAMESPACE).await.unwrap().is_empty());
		assert!(h.storage.contains("session", "user").await.unwrap());
		assert_eq!(ledger.calls(), 1);
		assert!(h.notifications.try_recv().is_err());
	}

	#[tokio::test]
	async fn test_pending_ids_lists_storage() {
		let ledger = ScriptedLedger::phases(&[]);
		let h = harness(ledger);
		h.tracker
			.register("0x05", "s", "ok", "e", false)
			.await
			.unwrap();

		assert_eq!(h.tracker.pending_ids().await.unwrap(), vec!["0x05".to_string()]);
		h.tracker.shutdown();
	}

	#[tokio::test]
	async fn test_empty_id_is_rejected() {
		let h = harness(ScriptedLedger::phases(&[]));
		let result = h.tracker.register("  ", "s", "ok", "e", true).await;
		assert!(matches!(result, Err(TrackerError::InvalidTransactionId(_))));
	}

	#[tokio::test]
	async fn test_storage_failure_is_reported_as_error() {
		let ledger = ScriptedLedger::phases(&[4]);
		let mut h = harness_with(
			Arc::new(StorageService::new(Box::new(BrokenStorage))),
			ledger.clone(),
		);

		h.tracker
			.register("0x06", "s", "ok", "Could not track", true)
			.await
			.unwrap();

		let failed = next(&mut h.notifications).await;
		assert_eq!(failed.kind, NotificationKind::Error);
		assert_eq!(failed.title, "Could not track");

		settle().await;
		assert_eq!(ledger.calls(), 0);
		assert!(!h.tracker.is_tracking("0x06"));
		assert_eq!(h.tracker.resume_all().await, 0);
	}

	#[test]
	fn test_builder_requires_collaborators() {
		let result = TransactionTracker::builder().build();
		assert!(matches!(result, Err(TrackerError::Configuration(_))));
	}
}
