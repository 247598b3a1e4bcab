//! Fixed-capacity JSON array buffer
//!
//! Accumulates pre-encoded items into a single framed JSON array:
//! a leading `[`, comma-separated items, and a trailing `]` appended at
//! flush. Size accounting always reserves the two framing bytes, so an empty
//! buffer has logical size 2.

/// Overflow report from [`JsonBuffer::put`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BufferFull {
    /// Logical size of the buffer before the rejected put
    pub current_size: usize,
    /// Encoded size of the rejected item
    pub incoming_size: usize,
}

impl From<BufferFull> for crate::error::Error {
    fn from(full: BufferFull) -> Self {
        crate::error::Error::BufferFull {
            current_size: full.current_size,
            incoming_size: full.incoming_size,
        }
    }
}

/// Append-only byte buffer with a hard capacity.
///
/// Once the capacity would be exceeded the incoming item is rejected
/// wholesale: the buffer never grows, never evicts older items, and never
/// truncates an item. After a [`flush`](Self::flush) the buffer is logically
/// empty; the next [`put`](Self::put) lazily re-seeds the framing.
#[derive(Debug)]
pub struct JsonBuffer {
    capacity: usize,
    size: usize,
    buf: Vec<u8>,
    flushed: bool,
}

impl JsonBuffer {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            size: 2,
            buf: vec![b'['],
            flushed: false,
        }
    }

    /// Logical size in bytes, framing included
    pub fn size(&self) -> usize {
        self.size
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Append one encoded item, returning its size.
    ///
    /// The overflow check covers the item plus its separator, so the logical
    /// size can never exceed the capacity.
    pub fn put(&mut self, item: &[u8]) -> Result<usize, BufferFull> {
        if self.flushed {
            self.reset();
        }

        let size = item.len();
        let separator = usize::from(self.size > 2);
        if self.size + separator + size > self.capacity {
            return Err(BufferFull {
                current_size: self.size,
                incoming_size: size,
            });
        }

        if separator == 1 {
            self.buf.push(b',');
            self.size += 1;
        }
        self.buf.extend_from_slice(item);
        self.size += size;
        Ok(size)
    }

    /// Close the array and hand the frame out.
    ///
    /// The internal storage is released; the next `put` starts a fresh
    /// frame.
    pub fn flush(&mut self) -> Vec<u8> {
        self.buf.push(b']');
        self.flushed = true;
        std::mem::take(&mut self.buf)
    }

    /// Drop any pending contents and reclaim storage
    pub fn reset(&mut self) {
        self.size = 2;
        self.buf = vec![b'['];
        self.flushed = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_buffer_reserves_framing() {
        let buffer = JsonBuffer::new(100);
        assert_eq!(buffer.size(), 2);
    }

    #[test]
    fn test_put_and_flush_frames_items() {
        let mut buffer = JsonBuffer::new(100);
        buffer.put(b"{\"a\":1}").unwrap();
        buffer.put(b"{\"b\":2}").unwrap();
        assert_eq!(buffer.flush(), b"[{\"a\":1},{\"b\":2}]".to_vec());
    }

    #[test]
    fn test_flush_empty_is_valid_array() {
        let mut buffer = JsonBuffer::new(100);
        assert_eq!(buffer.flush(), b"[]".to_vec());
    }

    #[test]
    fn test_put_after_flush_resets() {
        let mut buffer = JsonBuffer::new(100);
        buffer.put(b"1").unwrap();
        buffer.flush();
        buffer.put(b"2").unwrap();
        assert_eq!(buffer.flush(), b"[2]".to_vec());
    }

    #[test]
    fn test_overflow_rejects_wholesale() {
        let mut buffer = JsonBuffer::new(10);
        buffer.put(b"12345").unwrap(); // size 2 + 5 = 7
        let err = buffer.put(b"6789").unwrap_err(); // 7 + 4 > 10
        assert_eq!(err.current_size, 7);
        assert_eq!(err.incoming_size, 4);
        // The rejected item left no trace
        assert_eq!(buffer.flush(), b"[12345]".to_vec());
    }

    #[test]
    fn test_item_exactly_filling_capacity_fits() {
        let mut buffer = JsonBuffer::new(7);
        buffer.put(b"12345").unwrap();
        assert_eq!(buffer.size(), 7);
    }

    #[test]
    fn test_size_accounts_for_separators() {
        let mut buffer = JsonBuffer::new(100);
        buffer.put(b"11").unwrap(); // 2 + 2
        buffer.put(b"22").unwrap(); // + 1 (comma) + 2
        assert_eq!(buffer.size(), 7);
    }

    #[test]
    fn test_separator_counts_toward_capacity() {
        let mut buffer = JsonBuffer::new(9);
        buffer.put(b"123").unwrap(); // 2 + 3 = 5
        buffer.put(b"123").unwrap(); // 5 + 1 + 3 = 9, exactly full
        assert_eq!(buffer.size(), 9);

        let err = buffer.put(b"1").unwrap_err();
        assert_eq!(err.current_size, 9);
        assert!(buffer.size() <= buffer.capacity());
    }

    #[test]
    fn test_reset_reclaims() {
        let mut buffer = JsonBuffer::new(100);
        buffer.put(b"payload").unwrap();
        buffer.reset();
        assert_eq!(buffer.size(), 2);
        assert_eq!(buffer.flush(), b"[]".to_vec());
    }
}
