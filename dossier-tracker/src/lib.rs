//! Dossier tracker
//!
//! Tracks the one CV generation job the client cares about. The job runs
//! server-side; this crate keeps a persisted copy of its record, polls the
//! server while the job is active, and renders the record for display.
//!
//! The layers mirror each other:
//! - `repository`: HTTP collaborators behind traits
//! - `service`: the store, its persistence, the launcher and the presenter
//! - `scheduler`: the cancellable polling loop
//! - `tracker`: the facade bundling all of the above

pub mod config;
pub mod error;
pub mod repository;
pub mod scheduler;
pub mod service;
pub mod tracker;

pub use config::TrackerConfig;
pub use error::{Result, StorageError, TrackerError};
pub use tracker::{JobTracker, TrackerState};
