//! Break ledger adapters.

pub mod rest_ledger;

pub use rest_ledger::RestBreakLedger;
