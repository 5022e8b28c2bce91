//! Reader and writer for IFF-style chunk containers.
//!
//! A container is a preamble ([`HeaderKind`]) followed by tagged, length-prefixed chunk records. Odd
//! payloads are followed by a single zero pad byte that the length field does not count. All integers
//! are little-endian.
//!
//! ```
//! use iff_codec::{Chunk, Container, ReadOptions};
//!
//! let mut container = Container::classic("FORM");
//! container.append(Chunk::from_text("NAME", "Bob")).unwrap();
//! container.append(Chunk::new("AGE", 42u32.to_le_bytes())).unwrap();
//!
//! let bytes = container.to_bytes().unwrap();
//! assert_eq!(Container::from_bytes(&bytes, ReadOptions::empty()).unwrap(), container);
//! ```

pub mod archive;
pub mod chunk;
pub mod codec;
pub mod config;
pub mod container;
pub mod cursor;
pub mod detect;
pub mod error;
pub mod forms;
pub mod header;
pub mod walk;

pub use archive::Entry;
pub use chunk::{chunk_ids, Chunk, ChunkId};
pub use codec::Layout;
pub use container::{Container, ReadOptions};
pub use detect::try_as_container;
pub use error::{Error, FormatError, Result};
pub use header::HeaderKind;
pub use walk::{ChunkTreeIterator, IterationItem};
