//! In-memory cache for API responses
//!
//! This module provides an expiring key-value store used by the client to
//! serve repeated read-mostly lookups (profiles, follower lists) without
//! hitting the network. Entries carry a TTL and are evicted lazily, at read
//! time only.

mod store;

pub use store::ExpiringCache;
