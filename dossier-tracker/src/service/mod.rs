//! Service layer
//!
//! Services hold the tracked job and everything that reads or writes it:
//! the persisted store, the launcher that seeds it and the presenter that
//! renders it.

pub mod launcher;
pub mod presenter;
pub mod storage;
pub mod store;

pub use launcher::JobLauncher;
pub use presenter::{Download, Outcome, Presenter, ProgressView, present};
pub use storage::{FileStorage, MemoryStorage, SnapshotStorage};
pub use store::JobStore;
