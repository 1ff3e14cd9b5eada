//! Pre-allocated byte pools with a permanent watermark.
//!
//! A [`MemoryPool`] is a contiguous, zero-initialised `Vec<u8>` with bump
//! allocation. Session-lifetime regions are placed first and raise the
//! permanent watermark; per-event regions are placed above it and are
//! dropped wholesale by [`MemoryPool::reset_event`].

use crate::error::ArenaError;
use crate::resource::Residency;

/// A single contiguous pool with bump allocation.
///
/// ```text
/// 0            permanent_top          cursor            capacity
/// |-- session --|------ event ---------|------ free ------|
/// ```
pub struct MemoryPool {
    residency: Residency,
    /// Backing storage. Allocated to full capacity at creation.
    data: Vec<u8>,
    /// End of the session-lifetime allocations.
    permanent_top: usize,
    /// Bump pointer: next free byte.
    cursor: usize,
}

impl MemoryPool {
    /// Create a zero-initialised pool of `capacity` bytes.
    pub fn new(residency: Residency, capacity: usize) -> Self {
        Self {
            residency,
            data: vec![0; capacity],
            permanent_top: 0,
            cursor: 0,
        }
    }

    /// Reserve `size` bytes starting at a multiple of `align` for the
    /// rest of the current event. Returns the base offset.
    pub fn reserve_event(&mut self, size: usize, align: usize) -> Result<usize, ArenaError> {
        self.reserve(size, align)
    }

    /// Reserve `size` bytes for the whole session. Returns the base offset.
    ///
    /// Only allowed while no event region is placed in this pool, so that
    /// [`MemoryPool::reset_event`] never drops session memory.
    pub fn reserve_permanent(&mut self, size: usize, align: usize) -> Result<usize, ArenaError> {
        if self.cursor != self.permanent_top {
            return Err(ArenaError::PermanentAfterEvent {
                residency: self.residency,
            });
        }
        let base = self.reserve(size, align)?;
        self.permanent_top = self.cursor;
        Ok(base)
    }

    fn reserve(&mut self, size: usize, align: usize) -> Result<usize, ArenaError> {
        let exhausted = ArenaError::CapacityExceeded {
            residency: self.residency,
            requested: size,
            available: self.remaining(),
        };
        let base = self
            .cursor
            .checked_next_multiple_of(align.max(1))
            .ok_or_else(|| exhausted.clone())?;
        let end = base.checked_add(size).ok_or_else(|| exhausted.clone())?;
        if end > self.data.len() {
            return Err(exhausted);
        }
        self.data[base..end].fill(0);
        self.cursor = end;
        Ok(base)
    }

    /// Drop every per-event placement. Session memory is kept.
    ///
    /// The dropped bytes are not zeroed here; the next reservation zeroes
    /// what it hands out.
    pub fn reset_event(&mut self) {
        self.cursor = self.permanent_top;
    }

    /// Shared view of `size` bytes at `base`.
    pub fn bytes(&self, base: usize, size: usize) -> Option<&[u8]> {
        self.data.get(base..base.checked_add(size)?)
    }

    /// Mutable view of `size` bytes at `base`.
    pub fn bytes_mut(&mut self, base: usize, size: usize) -> Option<&mut [u8]> {
        self.data.get_mut(base..base.checked_add(size)?)
    }

    /// Which memory this pool models.
    pub fn residency(&self) -> Residency {
        self.residency
    }

    /// Bytes currently placed, session and event.
    pub fn used(&self) -> usize {
        self.cursor
    }

    /// Bytes held by session-lifetime regions.
    pub fn permanent_bytes(&self) -> usize {
        self.permanent_top
    }

    /// Total capacity in bytes.
    pub fn capacity(&self) -> usize {
        self.data.len()
    }

    /// Remaining free bytes.
    pub fn remaining(&self) -> usize {
        self.data.len() - self.cursor
    }
}
