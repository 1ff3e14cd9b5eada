//! Region tags: residency and lifetime of a registered region.
//!
//! The set of region kinds is closed. Each tag fixes where the region's
//! memory lives, how long it survives, and whether it comes from a pool.

use std::fmt;

/// Which memory a region lives in.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Residency {
    /// Accelerator-resident memory.
    Device,
    /// Host-readable memory.
    Host,
}

impl fmt::Display for Residency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Device => write!(f, "device"),
            Self::Host => write!(f, "host"),
        }
    }
}

/// How long a region's placement stays valid.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Lifetime {
    /// Allocated once, kept for the whole processing session.
    Session,
    /// Re-placed for every event.
    Event,
}

/// Tag passed when registering a region.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RegionTag {
    /// Session-lifetime bookkeeping in device memory.
    Permanent,
    /// Per-event working memory, device-resident, never read by the host.
    Scratch,
    /// Per-event output kept in device memory.
    Output,
    /// Per-event host-readable output with custom (non-pooled) storage,
    /// sized only once the exact counts are known.
    OutputHostCustom,
}

impl RegionTag {
    /// Memory the region lives in.
    pub fn residency(&self) -> Residency {
        match self {
            Self::Permanent | Self::Scratch | Self::Output => Residency::Device,
            Self::OutputHostCustom => Residency::Host,
        }
    }

    /// How long a placement survives.
    pub fn lifetime(&self) -> Lifetime {
        match self {
            Self::Permanent => Lifetime::Session,
            Self::Scratch | Self::Output | Self::OutputHostCustom => Lifetime::Event,
        }
    }

    /// Whether the region bypasses the pools.
    pub fn is_custom(&self) -> bool {
        matches!(self, Self::OutputHostCustom)
    }

    /// Whether downstream consumers may read the region.
    pub fn is_output(&self) -> bool {
        matches!(self, Self::Output | Self::OutputHostCustom)
    }
}

impl fmt::Display for RegionTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Permanent => write!(f, "permanent"),
            Self::Scratch => write!(f, "scratch"),
            Self::Output => write!(f, "output"),
            Self::OutputHostCustom => write!(f, "output-host-custom"),
        }
    }
}
