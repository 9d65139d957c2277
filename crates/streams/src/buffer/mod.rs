//! The three-partition chunk buffer shared by every transform stream
//!
//! A [`ChunkBuffer`] is an owned, fixed-capacity byte region split into
//! three spans: `consumed` (already drained, not yet recycled), `ready`
//! (produced but not yet drained) and `free` (available for the next
//! fill). The partition invariant `consumed + ready + free == capacity`
//! holds at every observation point. When the ready span empties, the
//! buffer recycles to `(0, capacity)` in O(1), never a memmove.

/// Owned fixed-capacity byte buffer with a consumed/ready/free partition.
///
/// Allocated once at stream construction and mutated only by the owning
/// stream. `consumed ≤ filled ≤ capacity`; the ready span is
/// `buf[consumed..filled]` and the free span `buf[filled..]`.
pub struct ChunkBuffer {
    buf: Box<[u8]>,
    consumed: usize,
    filled: usize,
}

impl ChunkBuffer {
    pub fn new(capacity: usize) -> Self {
        assert!(capacity > 0, "chunk buffer capacity must be non-zero");
        Self {
            buf: vec![0u8; capacity].into_boxed_slice(),
            consumed: 0,
            filled: 0,
        }
    }

    pub fn capacity(&self) -> usize {
        self.buf.len()
    }

    /// Bytes drained from the front of the ready span, pending recycle.
    pub fn consumed_len(&self) -> usize {
        self.consumed
    }

    /// Bytes available to be drained by the next read.
    pub fn ready_len(&self) -> usize {
        self.filled - self.consumed
    }

    /// Bytes available to be filled by the next engine call.
    pub fn free_len(&self) -> usize {
        self.buf.len() - self.filled
    }

    pub fn is_full(&self) -> bool {
        self.free_len() == 0
    }

    /// The ready span.
    pub fn ready(&self) -> &[u8] {
        &self.buf[self.consumed..self.filled]
    }

    /// The free span, for an engine or nested source to fill. Bytes
    /// written here become ready only after [`Self::commit`].
    pub fn free_mut(&mut self) -> &mut [u8] {
        &mut self.buf[self.filled..]
    }

    /// Moves `len` bytes from the free span into the ready span.
    pub fn commit(&mut self, len: usize) {
        debug_assert!(len <= self.free_len(), "commit past free span");
        self.filled += len;
    }

    /// Copies as much of `src` as fits into the free span and commits it.
    /// Returns the number of bytes taken.
    pub fn fill_from(&mut self, src: &[u8]) -> usize {
        let took = src.len().min(self.free_len());
        if took > 0 {
            self.buf[self.filled..self.filled + took].copy_from_slice(&src[..took]);
            self.filled += took;
        }
        took
    }

    /// Advances the consumed span by `len` ready bytes, recycling to
    /// `(0, capacity)` once the ready span empties.
    pub fn mark_consumed(&mut self, len: usize) {
        debug_assert!(len <= self.ready_len(), "consume past ready span");
        self.consumed += len;
        if self.consumed == self.filled {
            self.recycle();
        }
    }

    /// Copies as much of the ready span as fits into `dst`, consuming it.
    /// Returns the number of bytes copied.
    pub fn drain_into(&mut self, dst: &mut [u8]) -> usize {
        let len = self.ready_len().min(dst.len());
        if len > 0 {
            dst[..len].copy_from_slice(&self.buf[self.consumed..self.consumed + len]);
            self.mark_consumed(len);
        }
        len
    }

    /// Moves the ready span to the front of the buffer, reclaiming the
    /// consumed span without waiting for the ready span to empty.
    ///
    /// Only needed when a sub-block remainder strands at the tail of a
    /// capacity that is not a block multiple; the moved span is at most
    /// one block in that case.
    pub fn compact(&mut self) {
        if self.consumed == 0 {
            return;
        }
        self.buf.copy_within(self.consumed..self.filled, 0);
        self.filled -= self.consumed;
        self.consumed = 0;
    }

    /// Drops `len` bytes from the tail of the ready span (padding
    /// removal at decrypt finalization).
    pub fn shrink_ready(&mut self, len: usize) {
        debug_assert!(len <= self.ready_len(), "shrink past ready span");
        self.filled -= len;
        if self.consumed == self.filled {
            self.recycle();
        }
    }

    fn recycle(&mut self) {
        self.consumed = 0;
        self.filled = 0;
    }
}

impl std::fmt::Debug for ChunkBuffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChunkBuffer")
            .field("capacity", &self.capacity())
            .field("consumed", &self.consumed_len())
            .field("ready", &self.ready_len())
            .field("free", &self.free_len())
            .finish()
    }
}
