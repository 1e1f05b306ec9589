//! Utility functions for number and string formatting.

pub mod format;

pub use format::{format_count, format_percent, format_ratio, truncate_string, yes_no, MISSING};
