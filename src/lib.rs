//! tiercache - read-through caching storage
//!
//! Wraps a slow authoritative store (a network mount or an HTTP endpoint)
//! with a local directory tier. Reads are mirrored into the local tier as
//! they stream, and an object is served locally once a complete copy has
//! been recorded.

pub mod cache;
pub mod cli;
pub mod config;
pub mod error;
pub mod factory;
pub mod fsutil;
pub mod storage;
pub mod ui;

pub use cache::CachedStorage;
pub use error::{TierError, TierResult};
pub use storage::Storage;
