//! Sourcepool-DB: Persisted provider settings, counters and URL mappings
//!
//! This crate stores the small amount of state sourcepool keeps between runs
//! in SQLite, using rusqlite and r2d2 connection pooling.
//!
//! # Modules
//!
//! - `migrations` - Database schema migrations
//! - `pool` - Connection pool management
//! - `models` - Rust models matching database schema
//! - `queries` - Database query operations
//!
//! # Example
//!
//! ```no_run
//! use sourcepool_db::pool::{init_pool, get_conn};
//! use sourcepool_db::queries::stats;
//!
//! let pool = init_pool("/var/lib/sourcepool/sourcepool.db").unwrap();
//! let conn = get_conn(&pool).unwrap();
//!
//! stats::increment_try(&conn, "example").unwrap();
//! let counters = stats::get(&conn, "example").unwrap();
//! println!("{} tries", counters.try_count);
//! ```

pub mod migrations;
pub mod models;
pub mod pool;
pub mod queries;
