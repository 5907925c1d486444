//! Dossier Core
//!
//! Core types for tracking CV generation jobs.
//!
//! This crate contains:
//! - Domain types: the tracked job record and its partial updates
//! - DTOs: request and response bodies exchanged with the CV API

pub mod domain;
pub mod dto;
