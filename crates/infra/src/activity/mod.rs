//! Activity event sources.

pub mod channel_source;

pub use channel_source::ChannelActivitySource;
