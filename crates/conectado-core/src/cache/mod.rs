//! Local caching module for offline data access.
//!
//! This module provides the `CacheManager` for storing the last loaded
//! dashboard snapshot so the dashboard can render immediately at startup.
//! Data is cached in JSON format and considered stale after 60 minutes.

pub mod manager;

pub use manager::{CacheManager, CachedData};
