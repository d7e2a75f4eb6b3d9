//! Transaction status tracking.
//!
//! The [`TransactionTracker`] follows submitted transactions until the
//! ledger reports them sealed or failed, keeping each in-flight transaction
//! in persistent storage so tracking resumes after a restart.

pub mod error;
pub mod poller;
pub mod tracker;

pub use error::TrackerError;
pub use poller::PollOutcome;
pub use tracker::{TransactionTracker, TransactionTrackerBuilder};
