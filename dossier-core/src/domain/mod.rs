//! Core domain types
//!
//! Shared by the HTTP client (which decodes them) and the tracker (which
//! stores, merges and persists them).

pub mod job;
