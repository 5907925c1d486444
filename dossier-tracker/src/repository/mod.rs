//! Repository layer
//!
//! Repositories are stateless HTTP adapters over the CV API. They are the
//! tracker's only window onto the server, which executes jobs on its own.
//!
//! Both collaborators are trait-based so the poller and launcher can be
//! driven by scripted fakes in tests.

mod jobs;

// Re-export traits
pub use jobs::{JobCreator, StatusFetcher};

// Re-export implementations
pub use jobs::HttpJobRepository;
