//! Fixed-bucket memory pool.
//!
//! Constant-time (de)allocation from preallocated buckets of homogeneous
//! fixed-size blocks. Accurately sized buckets avoid fragmentation, and a
//! one-bit-per-block ledger keeps the bookkeeping trivial to reason about.
//!
//! The pool is an instance with no process-global state. It is the optional
//! backing allocator noted by the order-book core; the default heap-backed
//! order pool does not use it.

use std::alloc::{alloc_zeroed, dealloc, Layout};
use std::ptr::NonNull;

use types::errors::AllocError;

const SLAB_ALIGN: usize = 16;

/// Size and count of one bucket's blocks.
#[derive(Debug, Clone, Copy)]
pub struct BucketConfig {
    pub block_size: usize,
    pub block_count: usize,
}

/// A collection of `block_count` fixed-size blocks with a bitmap ledger.
///
/// One ledger bit per block: set while the block is in use, cleared on
/// deallocation.
#[derive(Debug)]
pub struct Bucket {
    block_size: usize,
    block_count: usize,
    data: NonNull<u8>,
    ledger: Vec<u8>,
}

impl Bucket {
    /// Allocate the slab and a zeroed ledger.
    ///
    /// # Panics
    /// Panics if `block_size` or `block_count` is zero.
    pub fn new(block_size: usize, block_count: usize) -> Self {
        assert!(block_size > 0, "block size must be positive");
        assert!(block_count > 0, "block count must be positive");

        let layout = Layout::from_size_align(block_size * block_count, SLAB_ALIGN)
            .expect("bucket slab layout");
        // SAFETY: layout has non-zero size; alloc_zeroed either returns a
        // valid pointer for it or null, which we turn into an abort.
        let data = unsafe { alloc_zeroed(layout) };
        let data = NonNull::new(data).expect("bucket slab allocation failed");

        Self {
            block_size,
            block_count,
            data,
            ledger: vec![0u8; block_count.div_ceil(8)],
        }
    }

    pub fn block_size(&self) -> usize {
        self.block_size
    }

    pub fn block_count(&self) -> usize {
        self.block_count
    }

    /// Whether `ptr` points into this bucket's slab.
    pub fn contains(&self, ptr: NonNull<u8>) -> bool {
        let start = self.data.as_ptr() as usize;
        let addr = ptr.as_ptr() as usize;
        addr >= start && addr < start + self.block_size * self.block_count
    }

    /// Blocks needed to carry `bytes`.
    fn blocks_needed(&self, bytes: usize) -> usize {
        1 + (bytes - 1) / self.block_size
    }

    /// Claim enough contiguous blocks for `bytes`, or `None` if no run of
    /// free blocks is long enough.
    pub fn allocate(&mut self, bytes: usize) -> Option<NonNull<u8>> {
        assert!(bytes > 0, "allocation size must be positive");
        let needed = self.blocks_needed(bytes);
        let index = self.find_contiguous(needed)?;
        self.set_range(index, needed, true);
        // SAFETY: index * block_size is inside the slab because
        // find_contiguous only returns in-range runs.
        let ptr = unsafe { self.data.as_ptr().add(index * self.block_size) };
        NonNull::new(ptr)
    }

    /// Return the blocks carrying `bytes` at `ptr` to the free set.
    ///
    /// `ptr` must have come from `allocate` on this bucket with the same
    /// byte count.
    pub fn deallocate(&mut self, ptr: NonNull<u8>, bytes: usize) {
        debug_assert!(self.contains(ptr), "pointer does not belong to this bucket");
        let offset = ptr.as_ptr() as usize - self.data.as_ptr() as usize;
        let index = offset / self.block_size;
        let needed = self.blocks_needed(bytes);
        self.set_range(index, needed, false);
    }

    /// First index of `n` contiguous free blocks, if any.
    fn find_contiguous(&self, n: usize) -> Option<usize> {
        let mut run = 0;
        let mut start = 0;
        for index in 0..self.block_count {
            if self.is_in_use(index) {
                run = 0;
            } else {
                if run == 0 {
                    start = index;
                }
                run += 1;
                if run >= n {
                    return Some(start);
                }
            }
        }
        None
    }

    fn is_in_use(&self, index: usize) -> bool {
        self.ledger[index / 8] & (1 << (index % 8)) != 0
    }

    fn set_range(&mut self, index: usize, n: usize, in_use: bool) {
        for i in index..index + n {
            if in_use {
                self.ledger[i / 8] |= 1 << (i % 8);
            } else {
                self.ledger[i / 8] &= !(1 << (i % 8));
            }
        }
    }

    /// Number of blocks currently marked in use.
    pub fn blocks_in_use(&self) -> usize {
        (0..self.block_count).filter(|&i| self.is_in_use(i)).count()
    }
}

impl Drop for Bucket {
    fn drop(&mut self) {
        let layout = Layout::from_size_align(self.block_size * self.block_count, SLAB_ALIGN)
            .expect("bucket slab layout");
        // SAFETY: `data` was allocated in `new` with exactly this layout.
        unsafe { dealloc(self.data.as_ptr(), layout) };
    }
}

/// Candidate evaluation for an allocation: which bucket, how many blocks it
/// would take, and how much memory would be wasted.
#[derive(Debug, Clone, Copy)]
struct Candidate {
    index: usize,
    block_count: usize,
    waste: usize,
}

/// An array of buckets of increasing block size.
///
/// Allocation evaluates every bucket and takes them in least-waste order,
/// falling through to the next candidate when a bucket is too fragmented.
#[derive(Debug)]
pub struct MemoryPool {
    buckets: Vec<Bucket>,
}

impl MemoryPool {
    /// Pool with the default bucket ladder.
    pub fn new() -> Self {
        Self::with_buckets(&[
            BucketConfig { block_size: 16, block_count: 10_000 },
            BucketConfig { block_size: 64, block_count: 2_000 },
            BucketConfig { block_size: 256, block_count: 500 },
            BucketConfig { block_size: 1024, block_count: 100 },
        ])
    }

    /// Pool with caller-chosen bucket sizes.
    pub fn with_buckets(configs: &[BucketConfig]) -> Self {
        let mut buckets: Vec<Bucket> = configs
            .iter()
            .map(|c| Bucket::new(c.block_size, c.block_count))
            .collect();
        buckets.sort_by_key(|b| b.block_size());
        Self { buckets }
    }

    /// Allocate `bytes` from the best-fitting bucket.
    pub fn allocate(&mut self, bytes: usize) -> Result<NonNull<u8>, AllocError> {
        assert!(bytes > 0, "allocation size must be positive");

        let mut candidates: Vec<Candidate> = self
            .buckets
            .iter()
            .enumerate()
            .map(|(index, bucket)| {
                let block_count = 1 + (bytes - 1) / bucket.block_size();
                Candidate {
                    index,
                    block_count,
                    waste: block_count * bucket.block_size() - bytes,
                }
            })
            .collect();
        // Least waste wins; fewest blocks breaks the tie
        candidates.sort_by_key(|c| (c.waste, c.block_count));

        for candidate in candidates {
            if let Some(ptr) = self.buckets[candidate.index].allocate(bytes) {
                return Ok(ptr);
            }
        }
        Err(AllocError::CapacityExceeded { bytes })
    }

    /// Return `bytes` at `ptr` to the bucket that issued it.
    pub fn deallocate(&mut self, ptr: NonNull<u8>, bytes: usize) {
        if let Some(bucket) = self.buckets.iter_mut().find(|b| b.contains(ptr)) {
            bucket.deallocate(ptr, bytes);
        }
    }

    pub fn bucket_count(&self) -> usize {
        self.buckets.len()
    }
}

impl Default for MemoryPool {
    fn default() -> Self {
        Self::new()
    }
}
