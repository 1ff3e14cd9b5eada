//! Arena-specific error types.

use std::error::Error;
use std::fmt;

use clusterpack_core::RegionId;

use crate::resource::Residency;

/// Errors that can occur while sizing or placing regions.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ArenaError {
    /// A pool cannot hold the requested region.
    CapacityExceeded {
        /// Which pool ran out.
        residency: Residency,
        /// Number of bytes requested.
        requested: usize,
        /// Bytes still free in the pool.
        available: usize,
    },
    /// Aligning or advancing a cursor overflowed `usize`.
    LayoutOverflow {
        /// Cursor position before the failing allocation.
        position: usize,
        /// Number of elements requested.
        len: usize,
        /// Size of one element in bytes.
        element_size: usize,
    },
    /// A `RegionId` that was never registered.
    UnknownRegion {
        /// The unrecognised region.
        region: RegionId,
    },
    /// The region is registered but has no backing memory yet.
    NotAllocated {
        /// The region without a placement.
        region: RegionId,
    },
    /// A span does not lie inside its region's placement.
    SpanOutOfBounds {
        /// The region that was addressed.
        region: RegionId,
        /// Absolute byte offset of the span.
        offset: usize,
        /// Length of the span in bytes.
        bytes: usize,
    },
    /// The sizing callback used a different number of bytes when called
    /// with real memory than when it was measured.
    SizeMismatch {
        /// The region whose callback is not deterministic.
        region: RegionId,
        /// Bytes used in the measuring pass.
        measured: usize,
        /// Bytes used in the placing pass.
        placed: usize,
    },
    /// Custom-only operation on a pooled region, or the reverse.
    WrongResidency {
        /// The region that was addressed.
        region: RegionId,
    },
    /// A session-lifetime region was requested after event regions were
    /// placed in the same pool.
    PermanentAfterEvent {
        /// Which pool.
        residency: Residency,
    },
    /// More regions were registered than a `RegionId` can number.
    TooManyRegions {
        /// Regions already registered.
        registered: usize,
    },
    /// Arena configuration is invalid.
    InvalidConfig {
        /// Description of the problem.
        reason: String,
    },
}

impl fmt::Display for ArenaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CapacityExceeded {
                residency,
                requested,
                available,
            } => write!(
                f,
                "{residency} pool exhausted: requested {requested} bytes, {available} bytes available"
            ),
            Self::LayoutOverflow {
                position,
                len,
                element_size,
            } => write!(
                f,
                "layout overflow at offset {position}: {len} elements of {element_size} bytes"
            ),
            Self::UnknownRegion { region } => write!(f, "unknown region: {region}"),
            Self::NotAllocated { region } => write!(f, "region {region} has no backing memory"),
            Self::SpanOutOfBounds {
                region,
                offset,
                bytes,
            } => write!(
                f,
                "span at offset {offset} ({bytes} bytes) lies outside region {region}"
            ),
            Self::SizeMismatch {
                region,
                measured,
                placed,
            } => write!(
                f,
                "region {region} measured {measured} bytes but placed {placed} bytes"
            ),
            Self::WrongResidency { region } => {
                write!(f, "operation does not match the residency of region {region}")
            }
            Self::PermanentAfterEvent { residency } => write!(
                f,
                "permanent region requested after event regions in the {residency} pool"
            ),
            Self::TooManyRegions { registered } => {
                write!(f, "cannot register more than {registered} regions")
            }
            Self::InvalidConfig { reason } => write!(f, "invalid arena config: {reason}"),
        }
    }
}

impl Error for ArenaError {}
