//! Domain types and models

pub mod activity;
pub mod breaks;
pub mod idle;
pub mod user;

pub use activity::ActivityKind;
pub use breaks::{elapsed_whole_minutes, BreakClosure, BreakId, BreakRecord, BreakType, NewBreak};
pub use idle::IdleSnapshot;
pub use user::{SessionIdentity, UserProfile, UserRole};
