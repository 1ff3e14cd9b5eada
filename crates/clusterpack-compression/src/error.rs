//! Layout error types.
//!
//! Every failure in this crate is fatal for the current event: sizing
//! is a deterministic function of its inputs, so nothing is retried.

use std::error::Error;
use std::fmt;

use clusterpack_arena::ArenaError;
use clusterpack_core::ConfigError;

/// Errors from capacity estimation, schema layout and region planning.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LayoutError {
    /// The allocator could not place a region or a field.
    Arena(ArenaError),
    /// The session configuration is invalid.
    Config(ConfigError),
    /// A count does not fit the representation it has to be stored in.
    CountOverflow {
        /// Which count overflowed.
        what: &'static str,
        /// The offending value.
        value: usize,
    },
    /// A reduced layout was requested with more tracks than attached
    /// clusters, which would need a negative number of residuals.
    InvalidCounts {
        /// Attached clusters (`nClA`).
        n_attached: usize,
        /// Tracks (`nTr`).
        n_tracks: usize,
    },
    /// Real occupancy exceeds the capacity estimate of the event.
    OccupancyExceeded {
        /// Which count exceeded its bound.
        what: &'static str,
        /// The exact count.
        count: usize,
        /// The capacity estimate.
        capacity: usize,
    },
    /// An operation ran before the step it depends on.
    NotPlanned {
        /// What is missing.
        what: &'static str,
    },
}

impl fmt::Display for LayoutError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Arena(e) => write!(f, "arena: {e}"),
            Self::Config(e) => write!(f, "config: {e}"),
            Self::CountOverflow { what, value } => {
                write!(f, "{what} = {value} is not representable")
            }
            Self::InvalidCounts {
                n_attached,
                n_tracks,
            } => write!(
                f,
                "reduced layout needs n_tracks <= n_attached, got {n_tracks} tracks for {n_attached} clusters"
            ),
            Self::OccupancyExceeded {
                what,
                count,
                capacity,
            } => write!(f, "{what} = {count} exceeds the capacity estimate {capacity}"),
            Self::NotPlanned { what } => write!(f, "{what} has not been planned yet"),
        }
    }
}

impl Error for LayoutError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Arena(e) => Some(e),
            Self::Config(e) => Some(e),
            _ => None,
        }
    }
}

impl From<ArenaError> for LayoutError {
    fn from(e: ArenaError) -> Self {
        Self::Arena(e)
    }
}

impl From<ConfigError> for LayoutError {
    fn from(e: ConfigError) -> Self {
        Self::Config(e)
    }
}
