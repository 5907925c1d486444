//! Data Transfer Objects for the CV API
//!
//! Request and response bodies of the job endpoints. Status responses
//! convert into domain `JobUpdate`s.

pub mod job;
