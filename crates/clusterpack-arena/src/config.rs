//! Arena configuration parameters.

use crate::error::ArenaError;

/// Configuration for the reference allocator.
///
/// Controls pool sizes and the minimum field alignment. Validated at
/// construction; all values are immutable after creation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ArenaConfig {
    /// Size of the device (accelerator-resident) pool in bytes.
    ///
    /// Default: 1 GiB. Holds permanent, scratch and device-output regions.
    pub device_capacity: usize,

    /// Size of the pooled host memory in bytes.
    ///
    /// Default: 256 MiB. Custom host regions are not taken from this pool.
    pub host_capacity: usize,

    /// Minimum alignment of every field, in bytes.
    ///
    /// Default: 64. Must be a power of two. Fields whose element type
    /// needs stricter alignment get their own.
    pub min_alignment: usize,
}

impl ArenaConfig {
    /// Default device pool size: 1 GiB.
    pub const DEFAULT_DEVICE_CAPACITY: usize = 1 << 30;

    /// Default host pool size: 256 MiB.
    pub const DEFAULT_HOST_CAPACITY: usize = 256 << 20;

    /// Default minimum field alignment.
    pub const DEFAULT_MIN_ALIGNMENT: usize = 64;

    /// Create a config with the given pool sizes and the default alignment.
    pub fn new(device_capacity: usize, host_capacity: usize) -> Self {
        Self {
            device_capacity,
            host_capacity,
            min_alignment: Self::DEFAULT_MIN_ALIGNMENT,
        }
    }

    /// Check that the alignment is a non-zero power of two.
    pub fn validate(&self) -> Result<(), ArenaError> {
        if !self.min_alignment.is_power_of_two() {
            return Err(ArenaError::InvalidConfig {
                reason: format!(
                    "min_alignment must be a power of two, got {}",
                    self.min_alignment
                ),
            });
        }
        Ok(())
    }
}

impl Default for ArenaConfig {
    fn default() -> Self {
        Self::new(Self::DEFAULT_DEVICE_CAPACITY, Self::DEFAULT_HOST_CAPACITY)
    }
}
