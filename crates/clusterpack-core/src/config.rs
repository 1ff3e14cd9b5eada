//! Session-wide compression configuration.

use std::fmt;

use bitflags::bitflags;

use crate::encoding::EncodingTable;
use crate::error::ConfigError;

bitflags! {
    /// Set of enabled compression stages.
    ///
    /// Only [`CompressionModes::TRACK_MODEL`] influences the memory layout;
    /// the other bits are carried through to the output header for the
    /// encoder.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct CompressionModes: u8 {
        /// Truncate charge and width values to their encoded precision.
        const TRUNCATE = 0b001;
        /// Store unattached coordinates as differences within a row.
        const DIFFERENCES = 0b010;
        /// Encode attached clusters as anchor + residuals along the track.
        const TRACK_MODEL = 0b100;
    }
}

impl Default for CompressionModes {
    fn default() -> Self {
        Self::all()
    }
}

impl fmt::Display for CompressionModes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names = Vec::with_capacity(3);
        if self.contains(Self::TRUNCATE) {
            names.push("truncate");
        }
        if self.contains(Self::DIFFERENCES) {
            names.push("differences");
        }
        if self.contains(Self::TRACK_MODEL) {
            names.push("track-model");
        }
        if names.is_empty() {
            write!(f, "none")
        } else {
            write!(f, "{}", names.join("|"))
        }
    }
}

/// Configuration read once per event setup.
///
/// Validated with [`CompressionConfig::validate`]; the planner captures
/// what it needs at event setup and never reads the config again for
/// the rest of the event.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CompressionConfig {
    /// Enabled compression stages.
    pub modes: CompressionModes,

    /// Number of parallel units (accelerator blocks) sharing the sort
    /// buffer. Default: 64.
    pub parallel_units: u32,

    /// Upper bound on clusters one unit stages for a single row.
    /// Default: 1024.
    pub max_clusters_per_unit_row: u32,

    /// Storage type of every schema field.
    pub encoding: EncodingTable,
}

impl CompressionConfig {
    /// Default number of parallel units.
    pub const DEFAULT_PARALLEL_UNITS: u32 = 64;

    /// Default per-unit row capacity of the sort buffer.
    pub const DEFAULT_MAX_CLUSTERS_PER_UNIT_ROW: u32 = 1024;

    /// Create a config with the given modes and defaults for everything else.
    pub fn new(modes: CompressionModes) -> Self {
        Self {
            modes,
            parallel_units: Self::DEFAULT_PARALLEL_UNITS,
            max_clusters_per_unit_row: Self::DEFAULT_MAX_CLUSTERS_PER_UNIT_ROW,
            encoding: EncodingTable::default(),
        }
    }

    /// Whether track-model compression is enabled.
    pub fn track_model_enabled(&self) -> bool {
        self.modes.contains(CompressionModes::TRACK_MODEL)
    }

    /// Number of entries in the per-unit sort buffer.
    pub fn sort_buffer_len(&self) -> Result<usize, ConfigError> {
        (self.parallel_units as usize)
            .checked_mul(self.max_clusters_per_unit_row as usize)
            .ok_or(ConfigError::SortBufferOverflow {
                parallel_units: self.parallel_units,
                max_clusters_per_unit_row: self.max_clusters_per_unit_row,
            })
    }

    /// Check structural invariants.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.parallel_units == 0 {
            return Err(ConfigError::ZeroParallelUnits);
        }
        if self.max_clusters_per_unit_row == 0 {
            return Err(ConfigError::ZeroUnitRowCapacity);
        }
        self.sort_buffer_len()?;
        Ok(())
    }
}

impl Default for CompressionConfig {
    fn default() -> Self {
        Self::new(CompressionModes::all())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_enables_track_model() {
        let config = CompressionConfig::default();
        assert!(config.track_model_enabled());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn track_model_bit_gates_flag() {
        let config = CompressionConfig::new(CompressionModes::TRUNCATE | CompressionModes::DIFFERENCES);
        assert!(!config.track_model_enabled());
    }

    #[test]
    fn modes_insert_remove() {
        let mut modes = CompressionModes::empty();
        assert!(modes.is_empty());
        modes.insert(CompressionModes::TRACK_MODEL);
        assert!(modes.contains(CompressionModes::TRACK_MODEL));
        assert_eq!(modes.bits(), 4);
        modes.remove(CompressionModes::TRACK_MODEL);
        assert!(modes.is_empty());
    }

    #[test]
    fn from_bits_drops_unknown() {
        assert_eq!(CompressionModes::from_bits_truncate(0xff), CompressionModes::all());
    }

    #[test]
    fn default_modes_are_all_stages() {
        assert_eq!(CompressionModes::default(), CompressionModes::all());
        assert_eq!(CompressionModes::all().bits(), 0b111);
    }

    #[test]
    fn modes_display() {
        assert_eq!(CompressionModes::all().to_string(), "truncate|differences|track-model");
        assert_eq!(CompressionModes::empty().to_string(), "none");
    }

    #[test]
    fn zero_parallel_units_rejected() {
        let config = CompressionConfig {
            parallel_units: 0,
            ..CompressionConfig::default()
        };
        assert_eq!(config.validate(), Err(ConfigError::ZeroParallelUnits));
    }

    #[test]
    fn zero_row_capacity_rejected() {
        let config = CompressionConfig {
            max_clusters_per_unit_row: 0,
            ..CompressionConfig::default()
        };
        assert_eq!(config.validate(), Err(ConfigError::ZeroUnitRowCapacity));
    }

    #[test]
    fn sort_buffer_len_is_product() {
        let config = CompressionConfig {
            parallel_units: 8,
            max_clusters_per_unit_row: 100,
            ..CompressionConfig::default()
        };
        assert_eq!(config.sort_buffer_len().unwrap(), 800);
    }
}
