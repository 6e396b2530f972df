//! Reusable byte buffers for the formatting step
//!
//! Each emission checks out one buffer and gives it back when the
//! [`PooledBuffer`] guard drops, so a formatter error or a panic inside a
//! formatter still returns the buffer.

use crossbeam_channel::{bounded, Receiver, Sender};
use std::ops::{Deref, DerefMut};
use std::sync::atomic::{AtomicUsize, Ordering};

/// Default number of idle buffers kept around
pub const DEFAULT_POOL_CAPACITY: usize = 64;

/// Initial capacity of a freshly allocated buffer
const INITIAL_BUFFER_CAPACITY: usize = 256;

/// Buffers that grew past this are dropped instead of pooled
const MAX_RETAINED_CAPACITY: usize = 64 * 1024;

/// Concurrent free list of byte buffers
pub struct BufferPool {
    idle_tx: Sender<Vec<u8>>,
    idle_rx: Receiver<Vec<u8>>,
    checked_out: AtomicUsize,
}

impl BufferPool {
    /// Create a pool retaining at most `capacity` idle buffers
    pub fn new(capacity: usize) -> Self {
        let (idle_tx, idle_rx) = bounded(capacity.max(1));
        Self {
            idle_tx,
            idle_rx,
            checked_out: AtomicUsize::new(0),
        }
    }

    /// Check out an empty buffer, reusing an idle one when available
    pub fn get(&self) -> PooledBuffer<'_> {
        let mut buf = self
            .idle_rx
            .try_recv()
            .unwrap_or_else(|_| Vec::with_capacity(INITIAL_BUFFER_CAPACITY));
        buf.clear();
        self.checked_out.fetch_add(1, Ordering::AcqRel);
        PooledBuffer {
            pool: self,
            buf: Some(buf),
        }
    }

    fn put(&self, buf: Vec<u8>) {
        self.checked_out.fetch_sub(1, Ordering::AcqRel);
        if buf.capacity() <= MAX_RETAINED_CAPACITY {
            // Full pool: let the buffer drop.
            let _ = self.idle_tx.try_send(buf);
        }
    }

    /// Buffers currently held by in-flight emissions
    pub fn checked_out(&self) -> usize {
        self.checked_out.load(Ordering::Acquire)
    }

    /// Buffers waiting for reuse
    pub fn idle(&self) -> usize {
        self.idle_rx.len()
    }
}

impl Default for BufferPool {
    fn default() -> Self {
        Self::new(DEFAULT_POOL_CAPACITY)
    }
}

impl std::fmt::Debug for BufferPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BufferPool")
            .field("checked_out", &self.checked_out())
            .field("idle", &self.idle())
            .finish()
    }
}

/// A buffer on loan from a [`BufferPool`]
pub struct PooledBuffer<'a> {
    pool: &'a BufferPool,
    buf: Option<Vec<u8>>,
}

impl Deref for PooledBuffer<'_> {
    type Target = Vec<u8>;

    fn deref(&self) -> &Vec<u8> {
        // Only `drop` takes the buffer out.
        self.buf.as_ref().expect("buffer present until drop")
    }
}

impl DerefMut for PooledBuffer<'_> {
    fn deref_mut(&mut self) -> &mut Vec<u8> {
        self.buf.as_mut().expect("buffer present until drop")
    }
}

impl Drop for PooledBuffer<'_> {
    fn drop(&mut self) {
        if let Some(buf) = self.buf.take() {
            self.pool.put(buf);
        }
    }
}
