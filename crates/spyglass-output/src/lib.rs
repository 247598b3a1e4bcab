//! Spyglass Output - bounded streaming encoder
//!
//! Committed capture events are serialized into a fixed-capacity append-only
//! JSON array buffer that an external uploader periodically drains. The
//! buffer never grows past its capacity, never evicts, and never truncates
//! an item: overflow rejects the incoming item wholesale and surfaces a
//! typed [`Error::BufferFull`] for the caller to handle.
//!
//! Concurrency: multiple producer threads may `put` concurrently; the
//! buffer append and the drain are the only critical sections.

pub mod batch;
pub mod buffer;
pub mod error;

pub use batch::{BatchEncoder, EncoderItem, ItemEncoder, OnFull};
pub use buffer::{BufferFull, JsonBuffer};
pub use error::{Error, Result};
