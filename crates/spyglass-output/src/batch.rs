//! Batch encoder - serializes items into the bounded buffer
//!
//! Items are serialized by a kind-keyed registry of per-kind encoders, then
//! appended to a [`JsonBuffer`](crate::buffer::JsonBuffer) under a single
//! mutex. Serialization of an item happens outside the lock; only the
//! append and the drain are critical sections.

use crate::buffer::JsonBuffer;
use crate::error::{Error, Result};
use std::collections::HashMap;
use std::fmt;
use std::hash::Hash;
use std::sync::Mutex;

/// An item the batch encoder can route to a per-kind encoder
pub trait EncoderItem {
    /// Discriminant used to look up the registered encoder
    type Kind: Eq + Hash + Copy + fmt::Debug;

    fn kind(&self) -> Self::Kind;
}

/// Serializes one item of kind `T` to its wire bytes
pub trait ItemEncoder<T>: Send + Sync {
    fn encode(&self, item: &T) -> Result<Vec<u8>>;
}

/// Callback invoked with the rejected item and its encoded bytes when the
/// buffer is full, before the error propagates
pub type OnFull<T> = Box<dyn Fn(&T, &[u8]) + Send + Sync>;

struct Inner {
    buffer: JsonBuffer,
    count: usize,
}

/// Size-capped streaming batch encoder.
///
/// `put`, `put_encoded` and `encode` are mutually exclusive via one mutex
/// scoped to the buffer; the item count is maintained only under that lock.
/// Capacity is fixed at construction: on overflow the encoder rejects the
/// incoming item wholesale and reports [`Error::BufferFull`] to the caller -
/// it is the caller's decision to drop.
pub struct BatchEncoder<T: EncoderItem> {
    encoders: HashMap<T::Kind, Box<dyn ItemEncoder<T>>>,
    inner: Mutex<Inner>,
    on_full: Option<OnFull<T>>,
}

impl<T: EncoderItem> BatchEncoder<T> {
    pub fn new(capacity: usize) -> Self {
        Self {
            encoders: HashMap::new(),
            inner: Mutex::new(Inner {
                buffer: JsonBuffer::new(capacity),
                count: 0,
            }),
            on_full: None,
        }
    }

    /// Register the encoder for an item kind
    pub fn with_encoder(mut self, kind: T::Kind, encoder: impl ItemEncoder<T> + 'static) -> Self {
        self.encoders.insert(kind, Box::new(encoder));
        self
    }

    /// Attach a callback invoked with rejected items on overflow
    pub fn with_on_full<F>(mut self, on_full: F) -> Self
    where
        F: Fn(&T, &[u8]) + Send + Sync + 'static,
    {
        self.on_full = Some(Box::new(on_full));
        self
    }

    /// Number of items pending since the last drain
    pub fn count(&self) -> usize {
        self.lock().count
    }

    /// Serialize the item and append it, returning its encoded size.
    ///
    /// Fails with [`Error::UnknownItemType`] when no encoder is registered
    /// for the item's kind - a missing registration, not bad runtime data.
    pub fn put(&self, item: &T) -> Result<usize> {
        let encoder = self
            .encoders
            .get(&item.kind())
            .ok_or_else(|| Error::UnknownItemType(format!("{:?}", item.kind())))?;

        // Serialize outside the lock; only the append is a critical section.
        let encoded = encoder.encode(item)?;
        self.put_encoded(item, &encoded)
    }

    /// Append pre-encoded bytes, returning the appended size.
    ///
    /// On overflow the optional on-full callback sees the rejected item
    /// first, then [`Error::BufferFull`] propagates.
    pub fn put_encoded(&self, item: &T, encoded: &[u8]) -> Result<usize> {
        let result = {
            let mut inner = self.lock();
            match inner.buffer.put(encoded) {
                Ok(size) => {
                    inner.count += 1;
                    Ok(size)
                }
                Err(full) => Err(full),
            }
        };

        result.map_err(|full| {
            if let Some(on_full) = &self.on_full {
                on_full(item, encoded);
            }
            full.into()
        })
    }

    /// Atomically drain the buffer into one framed batch.
    ///
    /// Returns `None` when nothing was pending, reclaiming the backing
    /// storage in that case. After a drain the buffer is logically empty and
    /// ready for reuse.
    pub fn encode(&self) -> Option<Vec<u8>> {
        let mut inner = self.lock();
        if inner.count == 0 {
            inner.buffer.reset();
            return None;
        }

        let batch = inner.buffer.flush();
        inner.count = 0;
        Some(batch)
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl<T: EncoderItem> fmt::Debug for BatchEncoder<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.lock();
        f.debug_struct("BatchEncoder")
            .field("registered_kinds", &self.encoders.len())
            .field("count", &inner.count)
            .field("size", &inner.buffer.size())
            .field("capacity", &inner.buffer.capacity())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    enum Kind {
        Number,
        Text,
    }

    #[derive(Debug, Clone)]
    enum Item {
        Number(i64),
        Text(String),
    }

    impl EncoderItem for Item {
        type Kind = Kind;

        fn kind(&self) -> Kind {
            match self {
                Item::Number(_) => Kind::Number,
                Item::Text(_) => Kind::Text,
            }
        }
    }

    struct NumberEncoder;

    impl ItemEncoder<Item> for NumberEncoder {
        fn encode(&self, item: &Item) -> Result<Vec<u8>> {
            match item {
                Item::Number(n) => Ok(n.to_string().into_bytes()),
                other => Err(Error::UnknownItemType(format!("{:?}", other.kind()))),
            }
        }
    }

    fn number_encoder(capacity: usize) -> BatchEncoder<Item> {
        BatchEncoder::new(capacity).with_encoder(Kind::Number, NumberEncoder)
    }

    #[test]
    fn test_put_returns_encoded_size() {
        let encoder = number_encoder(100);
        assert_eq!(encoder.put(&Item::Number(123)).unwrap(), 3);
        assert_eq!(encoder.count(), 1);
    }

    #[test]
    fn test_round_trip_preserves_submission_order() {
        let encoder = number_encoder(100);
        for n in [3, 1, 2] {
            encoder.put(&Item::Number(n)).unwrap();
        }

        let batch = encoder.encode().unwrap();
        let decoded: Vec<i64> = serde_json::from_slice(&batch).unwrap();
        assert_eq!(decoded, vec![3, 1, 2]);
    }

    #[test]
    fn test_unknown_kind_is_hard_error() {
        let encoder = number_encoder(100);
        let err = encoder.put(&Item::Text("hi".to_string())).unwrap_err();
        assert!(matches!(err, Error::UnknownItemType(_)));
        assert_eq!(encoder.count(), 0);
    }

    #[test]
    fn test_encode_empty_returns_none_idempotently() {
        let encoder = number_encoder(100);
        assert_eq!(encoder.encode(), None);
        assert_eq!(encoder.encode(), None);
        assert_eq!(encoder.count(), 0);
    }

    #[test]
    fn test_encode_resets_for_reuse() {
        let encoder = number_encoder(100);
        encoder.put(&Item::Number(1)).unwrap();
        assert!(encoder.encode().is_some());
        assert_eq!(encoder.count(), 0);

        encoder.put(&Item::Number(2)).unwrap();
        let batch = encoder.encode().unwrap();
        let decoded: Vec<i64> = serde_json::from_slice(&batch).unwrap();
        assert_eq!(decoded, vec![2]);
    }

    #[test]
    fn test_overflow_rejected_item_absent_from_batch() {
        // Capacity 8: framing(2) + "11"(2) + ","(1) + "22"(2) = 7, the next
        // item cannot fit.
        let encoder = number_encoder(8);
        encoder.put(&Item::Number(11)).unwrap();
        encoder.put(&Item::Number(22)).unwrap();
        let err = encoder.put(&Item::Number(33)).unwrap_err();
        assert!(matches!(err, Error::BufferFull { .. }));

        let decoded: Vec<i64> = serde_json::from_slice(&encoder.encode().unwrap()).unwrap();
        assert_eq!(decoded, vec![11, 22]);
    }

    #[test]
    fn test_on_full_sees_rejected_item_before_error() {
        let rejected = Arc::new(AtomicUsize::new(0));
        let seen = Arc::clone(&rejected);
        let encoder = BatchEncoder::new(4)
            .with_encoder(Kind::Number, NumberEncoder)
            .with_on_full(move |item: &Item, _encoded| {
                if let Item::Number(n) = item {
                    seen.store(*n as usize, Ordering::SeqCst);
                }
            });

        encoder.put(&Item::Number(7)).unwrap();
        let err = encoder.put(&Item::Number(42)).unwrap_err();
        assert!(matches!(err, Error::BufferFull { .. }));
        assert_eq!(rejected.load(Ordering::SeqCst), 42);
    }

    #[test]
    fn test_concurrent_producers_all_items_arrive() {
        let encoder = Arc::new(number_encoder(1 << 20));
        let handles: Vec<_> = (0..4)
            .map(|t| {
                let encoder = Arc::clone(&encoder);
                std::thread::spawn(move || {
                    for i in 0..50 {
                        encoder.put(&Item::Number(t * 1000 + i)).unwrap();
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(encoder.count(), 200);
        let decoded: Vec<i64> = serde_json::from_slice(&encoder.encode().unwrap()).unwrap();
        assert_eq!(decoded.len(), 200);
    }

    #[test]
    fn test_batch_is_utf8_json_with_no_trailing_content() {
        let encoder = number_encoder(100);
        encoder.put(&Item::Number(1)).unwrap();
        let batch = encoder.encode().unwrap();
        let text = std::str::from_utf8(&batch).unwrap();
        assert!(text.starts_with('['));
        assert!(text.ends_with(']'));
    }
}
