//! Castream-Stream: random access over forward-only byte sources.
//!
//! Cast receivers fetch media with HTTP range requests and expect to jump
//! anywhere in the file. Many sources (pipes, sockets, decrypting readers)
//! can only be consumed front to back. This crate bridges the two.
//!
//! # Modules
//!
//! - `contract` - The [`RandomAccessStream`] trait: length, exact remaining
//!   bytes, mark/reset
//! - `forward` - [`ForwardOnlyStream`], the adapter that turns seeks into
//!   skips (or reopens, when the source can be re-acquired)
//! - `source` - Source openers and the cross-thread [`CloseHandle`]
//!
//! # Example
//!
//! ```
//! use castream_stream::{ForwardOnlyStream, RandomAccessStream};
//! use std::io::Cursor;
//!
//! let data: Vec<u8> = (0..=255).collect();
//! let mut stream = ForwardOnlyStream::new("clip.mp4", 256, Cursor::new(data));
//!
//! stream.move_to(200).unwrap();
//! assert_eq!(stream.available_exact(), 56);
//! assert_eq!(stream.read_byte().unwrap(), Some(200));
//! ```

pub mod contract;
pub mod forward;
pub mod source;

pub use contract::{RandomAccessStream, StreamBounds, NO_READ_LIMIT};
pub use forward::ForwardOnlyStream;
pub use source::{ByteSource, CloseHandle, FileOpener, SourceOpener};
