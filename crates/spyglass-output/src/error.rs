//! Error types for the streaming encoder

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    /// Appending the item would exceed the buffer's fixed capacity.
    ///
    /// An expected, recoverable condition: the caller decides whether to
    /// drop. The rejected item was not written, not even partially.
    #[error("Buffer full: {current_size} bytes used, incoming item is {incoming_size} bytes")]
    BufferFull {
        current_size: usize,
        incoming_size: usize,
    },

    /// No encoder registered for the item's kind.
    ///
    /// A programming-contract violation (missing registration), not bad
    /// runtime data; surfaced hard instead of being swallowed.
    #[error("No encoder registered for item kind: {0}")]
    UnknownItemType(String),

    /// The per-item encoder failed to produce bytes
    #[error("Item serialization failed: {0}")]
    Serialization(String),
}
