//! Database query modules.
//!
//! - providers: enable flags and priority keys
//! - stats: try/success counters
//! - related_urls: cached provider URLs per title

pub mod providers;
pub mod related_urls;
pub mod stats;
