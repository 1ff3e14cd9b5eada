//! Field spans and region placements.
//!
//! A [`Span`] locates one structure-of-arrays field inside a region's
//! backing memory. A [`Placement`] locates a whole region inside its
//! pool. Both are plain `Copy` values: once layout is finished they are
//! shared read-only with every worker.

use std::fmt;
use std::ops::Range;

use clusterpack_core::ElementType;

use crate::resource::Residency;

/// Location of one field: byte offset, element count and element type.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[must_use]
pub struct Span {
    /// Absolute byte offset within the backing store.
    pub(crate) offset: usize,
    /// Length in elements.
    pub(crate) len: usize,
    /// Storage type of one element.
    pub(crate) element: ElementType,
}

impl Span {
    /// Create a span.
    pub fn new(offset: usize, len: usize, element: ElementType) -> Self {
        Self {
            offset,
            len,
            element,
        }
    }

    /// Absolute byte offset of the first element.
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Number of elements.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether the span holds no elements.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Storage type of one element.
    pub fn element(&self) -> ElementType {
        self.element
    }

    /// Length in bytes.
    pub fn bytes(&self) -> usize {
        self.len * self.element.size()
    }

    /// Byte offset one past the last element.
    pub fn end(&self) -> usize {
        self.offset + self.bytes()
    }

    /// Byte range covered by the span.
    pub fn byte_range(&self) -> Range<usize> {
        self.offset..self.end()
    }

    /// Whether the two spans share at least one byte.
    pub fn overlaps(&self, other: &Span) -> bool {
        !self.is_empty()
            && !other.is_empty()
            && self.offset < other.end()
            && other.offset < self.end()
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Span(off={}, len={}, {})",
            self.offset, self.len, self.element
        )
    }
}

/// Location of a whole region.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Placement {
    /// Which memory the region lives in.
    pub residency: Residency,
    /// Byte offset of the region within its backing store.
    pub base: usize,
    /// Size of the region in bytes.
    pub size: usize,
}

impl Placement {
    /// Byte offset one past the region.
    pub fn end(&self) -> usize {
        self.base + self.size
    }

    /// Whether `span` lies entirely inside this placement.
    pub fn contains(&self, span: &Span) -> bool {
        span.offset >= self.base && span.end() <= self.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn span_accessors() {
        let s = Span::new(128, 10, ElementType::U32);
        assert_eq!(s.offset(), 128);
        assert_eq!(s.len(), 10);
        assert_eq!(s.bytes(), 40);
        assert_eq!(s.end(), 168);
        assert_eq!(s.byte_range(), 128..168);
        assert!(!s.is_empty());
    }

    #[test]
    fn adjacent_spans_do_not_overlap() {
        let a = Span::new(0, 16, ElementType::U8);
        let b = Span::new(16, 4, ElementType::U16);
        assert!(!a.overlaps(&b));
        let c = Span::new(8, 4, ElementType::U16);
        assert!(a.overlaps(&c));
    }

    #[test]
    fn empty_span_overlaps_nothing() {
        let a = Span::new(0, 0, ElementType::U8);
        let b = Span::new(0, 8, ElementType::U8);
        assert!(!a.overlaps(&b));
    }

    #[test]
    fn placement_contains_span() {
        let p = Placement {
            residency: Residency::Device,
            base: 64,
            size: 64,
        };
        assert!(p.contains(&Span::new(64, 64, ElementType::U8)));
        assert!(!p.contains(&Span::new(0, 8, ElementType::U8)));
        assert!(!p.contains(&Span::new(120, 2, ElementType::U64)));
    }
}
