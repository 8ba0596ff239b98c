//! Castream-Common: shared error handling.
//!
//! Every castream crate reports failures through [`Error`], which keeps the
//! three failure classes of the streaming core apart:
//!
//! - **Invalid arguments**: caller bugs such as out-of-range seeks
//! - **I/O failures**: source errors, short skips, reads after close
//! - **Unsupported operations**: calls the stream contract refuses
//!
//! # Examples
//!
//! ```
//! use castream_common::{Error, Result};
//!
//! fn seek(target: u64, length: u64) -> Result<u64> {
//!     if target > length {
//!         return Err(Error::invalid_argument("position out of the bounds of the file"));
//!     }
//!     Ok(target)
//! }
//!
//! assert!(seek(10, 5).is_err());
//! ```

pub mod error;

pub use error::{Error, Result};
