//! Aligned bump cursor used by sizing callbacks.
//!
//! A [`Cursor`] starts at a region's base offset. Each [`Cursor::alloc`]
//! aligns the position, hands out a [`Span`] and advances past it. When
//! the callback returns, the cursor sits immediately past the last byte
//! the region uses. Running the same callback from base 0 measures the
//! region size without touching memory.

use clusterpack_core::ElementType;

use crate::error::ArenaError;
use crate::handle::Span;

/// Bump cursor handing out aligned field spans.
#[derive(Clone, Debug)]
pub struct Cursor {
    /// Current byte position.
    position: usize,
    /// Alignment applied to every field.
    min_alignment: usize,
    /// Strictest alignment used so far.
    max_alignment: usize,
}

impl Cursor {
    /// Create a cursor at `base`.
    ///
    /// `min_alignment` must be a power of two; [`ArenaConfig::validate`](crate::ArenaConfig::validate)
    /// enforces this for cursors created by the registry.
    pub fn new(base: usize, min_alignment: usize) -> Self {
        let min_alignment = min_alignment.max(1);
        Self {
            position: base,
            min_alignment,
            max_alignment: min_alignment,
        }
    }

    /// Allocate `len` elements of `element`.
    ///
    /// The span starts at the next offset aligned to the larger of the
    /// element's own alignment and the minimum alignment. Zero-length
    /// requests still align the cursor and return an empty span.
    pub fn alloc(&mut self, element: ElementType, len: usize) -> Result<Span, ArenaError> {
        let overflow = || ArenaError::LayoutOverflow {
            position: self.position,
            len,
            element_size: element.size(),
        };
        let align = element.align().max(self.min_alignment);
        let offset = self
            .position
            .checked_next_multiple_of(align)
            .ok_or_else(overflow)?;
        let end = len
            .checked_mul(element.size())
            .and_then(|bytes| offset.checked_add(bytes))
            .ok_or_else(overflow)?;
        self.position = end;
        self.max_alignment = self.max_alignment.max(align);
        Ok(Span::new(offset, len, element))
    }

    /// Current byte position: one past the last byte handed out.
    pub fn position(&self) -> usize {
        self.position
    }

    /// Strictest alignment any span required so far.
    pub fn max_alignment(&self) -> usize {
        self.max_alignment
    }

    /// Minimum alignment applied to every field.
    pub fn min_alignment(&self) -> usize {
        self.min_alignment
    }
}
