//! Sourcepool-Common: Shared types and error handling.
//!
//! This crate provides the vocabulary shared by the engine and its storage:
//!
//! - **Core Types**: video types, source quality, and the media descriptor
//!   that identifies what a dispatch round is looking for
//! - **Error Handling**: Common error type and result alias
//!
//! # Examples
//!
//! ```
//! use sourcepool_common::{Error, MediaDescriptor, Result, VideoType};
//!
//! let movie = MediaDescriptor::movie("Big Buck Bunny", Some(2008), "big-buck-bunny-2008");
//! assert_eq!(movie.video_type, VideoType::Movie);
//!
//! fn example() -> Result<()> {
//!     Err(Error::not_found("provider"))
//! }
//! ```

pub mod error;
pub mod types;

pub use error::{Error, Result};
pub use types::*;
