//! Bounded single-producer/single-consumer ring buffer.
//!
//! The hand-off primitive between an ingestion thread and the matching
//! thread: one producer pushes request records, one consumer drains them.
//! Capacity is a power of two so index wrap is a single bitmask, push fails
//! on full and pop returns empty on empty. No blocking, no notifications,
//! no overwrites.
//!
//! # Thread Safety
//! - `Producer` is `Send` but NOT `Sync` (single producer).
//! - `Consumer` is `Send` but NOT `Sync` (single consumer).

use std::cell::{Cell, UnsafeCell};
use std::marker::PhantomData;
use std::mem::MaybeUninit;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Shared ring state.
///
/// One slot is always left open: `head == tail` means empty and
/// `(tail + 1) & mask == head` means full, so the indices alone
/// disambiguate the two states.
struct Inner<T> {
    buffer: Box<[UnsafeCell<MaybeUninit<T>>]>,
    mask: usize,
    /// Next slot to read; owned by the consumer, observed by the producer.
    head: AtomicUsize,
    /// Next slot to write; owned by the producer, observed by the consumer.
    tail: AtomicUsize,
}

// SAFETY: the producer writes a slot strictly before publishing it with a
// release store of `tail`, and the consumer reads it only after an acquire
// load of `tail` observes that store (and symmetrically for `head` on the
// reclaim path). A slot is therefore never accessed from both sides at once.
unsafe impl<T: Send> Sync for Inner<T> {}
unsafe impl<T: Send> Send for Inner<T> {}

impl<T> Drop for Inner<T> {
    fn drop(&mut self) {
        // Sole owner at this point; drain whatever was never consumed.
        let mut head = *self.head.get_mut();
        let tail = *self.tail.get_mut();
        while head != tail {
            // SAFETY: slots in [head, tail) were written and not yet read.
            unsafe { (*self.buffer[head].get()).assume_init_drop() };
            head = (head + 1) & self.mask;
        }
    }
}

/// Ring buffer constructor.
pub struct RingBuffer;

impl RingBuffer {
    /// Create a ring with `capacity` slots and split it into its producer
    /// and consumer halves.
    ///
    /// One slot stays open to distinguish full from empty, so the ring
    /// holds up to `capacity - 1` items.
    ///
    /// # Panics
    /// Panics if `capacity` is not a power of two, or is less than 2.
    pub fn with_capacity<T>(capacity: usize) -> (Producer<T>, Consumer<T>) {
        assert!(
            capacity.is_power_of_two(),
            "capacity must be a power of two"
        );
        assert!(capacity >= 2, "capacity must be at least 2");

        let buffer: Box<[UnsafeCell<MaybeUninit<T>>]> = (0..capacity)
            .map(|_| UnsafeCell::new(MaybeUninit::uninit()))
            .collect();
        let inner = Arc::new(Inner {
            buffer,
            mask: capacity - 1,
            head: AtomicUsize::new(0),
            tail: AtomicUsize::new(0),
        });

        (
            Producer {
                inner: Arc::clone(&inner),
                _not_sync: PhantomData,
            },
            Consumer {
                inner,
                _not_sync: PhantomData,
            },
        )
    }
}

/// The write half of the ring.
pub struct Producer<T> {
    inner: Arc<Inner<T>>,
    _not_sync: PhantomData<Cell<()>>,
}

impl<T> Producer<T> {
    /// Push an item, handing it back if the ring is full.
    pub fn try_push(&mut self, value: T) -> Result<(), T> {
        let inner = &*self.inner;
        let tail = inner.tail.load(Ordering::Relaxed);
        let next_tail = (tail + 1) & inner.mask;
        if next_tail == inner.head.load(Ordering::Acquire) {
            return Err(value);
        }

        // SAFETY: the slot at `tail` is outside [head, tail) and thus not
        // visible to the consumer until the release store below.
        unsafe { (*inner.buffer[tail].get()).write(value) };
        inner.tail.store(next_tail, Ordering::Release);
        Ok(())
    }

    /// Whether a push would currently fail.
    pub fn is_full(&self) -> bool {
        let inner = &*self.inner;
        let tail = inner.tail.load(Ordering::Relaxed);
        (tail + 1) & inner.mask == inner.head.load(Ordering::Acquire)
    }

    /// Number of slots in the ring; up to `capacity() - 1` are usable.
    pub fn capacity(&self) -> usize {
        self.inner.mask + 1
    }
}

/// The read half of the ring.
pub struct Consumer<T> {
    inner: Arc<Inner<T>>,
    _not_sync: PhantomData<Cell<()>>,
}

impl<T> Consumer<T> {
    /// Pop the oldest item, or `None` if the ring is empty.
    pub fn try_pop(&mut self) -> Option<T> {
        let inner = &*self.inner;
        let head = inner.head.load(Ordering::Relaxed);
        if head == inner.tail.load(Ordering::Acquire) {
            return None;
        }

        // SAFETY: the acquire load of `tail` ordered this slot's write
        // before this read; the release store of `head` below returns the
        // slot to the producer.
        let value = unsafe { (*inner.buffer[head].get()).assume_init_read() };
        inner.head.store((head + 1) & inner.mask, Ordering::Release);
        Some(value)
    }

    /// Whether a pop would currently return `None`.
    pub fn is_empty(&self) -> bool {
        let inner = &*self.inner;
        inner.head.load(Ordering::Relaxed) == inner.tail.load(Ordering::Acquire)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn test_push_and_pop_fifo() {
        let (mut producer, mut consumer) = RingBuffer::with_capacity::<i32>(8);

        for i in 0..7 {
            producer.try_push(i + 1).unwrap();
        }
        for i in 0..7 {
            assert_eq!(consumer.try_pop(), Some(i + 1));
        }
        assert_eq!(consumer.try_pop(), None);
    }

    #[test]
    fn test_full_ring_rejects_push() {
        let (mut producer, mut consumer) = RingBuffer::with_capacity::<u64>(4);

        // One slot stays open: 3 items fit
        producer.try_push(1).unwrap();
        producer.try_push(2).unwrap();
        producer.try_push(3).unwrap();
        assert!(producer.is_full());
        assert_eq!(producer.try_push(4), Err(4));

        assert_eq!(consumer.try_pop(), Some(1));
        producer.try_push(4).unwrap();
    }

    #[test]
    fn test_empty_pop_returns_none() {
        let (_producer, mut consumer) = RingBuffer::with_capacity::<String>(8);
        assert!(consumer.is_empty());
        assert_eq!(consumer.try_pop(), None);
    }

    #[test]
    #[should_panic(expected = "capacity must be a power of two")]
    fn test_non_power_of_two_capacity_panics() {
        let _ = RingBuffer::with_capacity::<u8>(1000);
    }

    #[test]
    fn test_wraparound() {
        let (mut producer, mut consumer) = RingBuffer::with_capacity::<usize>(4);

        // Cycle far past the capacity to exercise the mask
        for i in 0..100 {
            producer.try_push(i).unwrap();
            assert_eq!(consumer.try_pop(), Some(i));
        }
    }

    #[test]
    fn test_unconsumed_items_dropped() {
        let payload = Arc::new(());
        {
            let (mut producer, _consumer) = RingBuffer::with_capacity::<Arc<()>>(8);
            for _ in 0..5 {
                producer.try_push(Arc::clone(&payload)).unwrap();
            }
        }
        assert_eq!(Arc::strong_count(&payload), 1);
    }

    #[test]
    fn test_threaded_handoff() {
        const COUNT: u64 = 100_000;
        let (mut producer, mut consumer) = RingBuffer::with_capacity::<u64>(1024);

        let feeder = thread::spawn(move || {
            let mut next = 0;
            while next < COUNT {
                match producer.try_push(next) {
                    Ok(()) => next += 1,
                    Err(_) => thread::yield_now(),
                }
            }
        });

        let mut expected = 0;
        while expected < COUNT {
            match consumer.try_pop() {
                Some(value) => {
                    assert_eq!(value, expected);
                    expected += 1;
                }
                None => thread::yield_now(),
            }
        }
        feeder.join().unwrap();
    }
}
