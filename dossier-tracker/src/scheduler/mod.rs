//! Scheduler layer
//!
//! Owns the cancellable polling loop that keeps the tracked job in sync
//! with the server. The loop starts and stops on its own as the tracked job
//! appears, changes, finishes or is cleared.

pub mod poller;

pub use poller::{JobPoller, PollerHandle};
