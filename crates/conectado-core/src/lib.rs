//! Conectado core - session handling and census data for the rural school
//! connectivity dashboard.
//!
//! This crate holds everything below the user interface:
//! - `storage`: the persistent key-value store
//! - `auth`: login backends, the session store and the session context
//! - `api`: the HTTP client for the census backend
//! - `source`: sample and API-backed dashboard data
//! - `cache`: the on-disk dashboard snapshot cache
//! - `config`: configuration file and directory resolution

pub mod api;
pub mod auth;
pub mod cache;
pub mod config;
pub mod models;
pub mod source;
pub mod storage;
pub mod utils;
