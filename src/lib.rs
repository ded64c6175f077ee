//! Sourcepool - concurrent multi-provider media source lookup
//!
//! This library crate exposes the engine, its building blocks and the
//! provider trait for integration testing and for embedding.

pub mod accounting;
pub mod aggregate;
pub mod config;
pub mod dispatch;
pub mod engine;
pub mod related;
pub mod resolve;
pub mod source;

#[cfg(test)]
mod testing;
