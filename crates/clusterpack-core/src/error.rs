//! Configuration error types.
//!
//! Layout and allocation errors live next to the code that raises them
//! (`clusterpack-arena` and `clusterpack-compression`); this crate only
//! validates the session configuration.

use std::error::Error;
use std::fmt;

/// Errors detected during [`CompressionConfig::validate()`](crate::CompressionConfig::validate)
/// or while editing the encoding table.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ConfigError {
    /// `parallel_units` is zero; the sort buffer would have no partitions.
    ZeroParallelUnits,
    /// `max_clusters_per_unit_row` is zero.
    ZeroUnitRowCapacity,
    /// `parallel_units * max_clusters_per_unit_row` does not fit in `usize`.
    SortBufferOverflow {
        /// Configured number of parallel units.
        parallel_units: u32,
        /// Configured per-unit row capacity.
        max_clusters_per_unit_row: u32,
    },
    /// A field was given a storage type it cannot use.
    InvalidEncoding {
        /// Name of the field.
        field: &'static str,
        /// Why the type was rejected.
        reason: String,
    },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ZeroParallelUnits => write!(f, "parallel_units must be at least 1"),
            Self::ZeroUnitRowCapacity => {
                write!(f, "max_clusters_per_unit_row must be at least 1")
            }
            Self::SortBufferOverflow {
                parallel_units,
                max_clusters_per_unit_row,
            } => write!(
                f,
                "sort buffer size {parallel_units} * {max_clusters_per_unit_row} overflows usize"
            ),
            Self::InvalidEncoding { field, reason } => {
                write!(f, "invalid encoding for field '{field}': {reason}")
            }
        }
    }
}

impl Error for ConfigError {}
