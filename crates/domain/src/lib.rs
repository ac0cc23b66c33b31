//! # OpsDesk Domain
//!
//! Business domain types and models for the OpsDesk operations portal.
//!
//! This crate contains:
//! - Break ledger records and their insert/close payloads
//! - Session identity, profiles and roles (idle-tracking eligibility)
//! - Activity event kinds and the read-only idle snapshot
//! - Configuration structures
//! - Domain error types and Result definitions
//!
//! ## Architecture
//! - No dependencies on other OpsDesk crates
//! - Only external dependencies allowed
//! - Pure domain models and data structures

pub mod config;
pub mod constants;
pub mod errors;
pub mod macros;
pub mod types;

// Re-export commonly used items
pub use config::*;
pub use errors::*;
pub use types::*;
