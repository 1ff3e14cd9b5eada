//! Reusable event and configuration fixtures.
//!
//! - [`EventProfile`]: merger bounds plus the exact counts an encoder
//!   would report for them, with a few named profiles.
//! - [`track_model_config`] / [`unattached_config`]: compression configs
//!   with the track model on and off and a small sort buffer.
//! - [`small_arena`]: pools large enough for the named profiles without
//!   allocating the production defaults.

use clusterpack_arena::ArenaConfig;
use clusterpack_core::{CompressionConfig, CompressionModes, MergerBounds};

/// Bounds and exact counts of one synthetic event.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EventProfile {
    pub name: &'static str,
    pub bounds: MergerBounds,
    pub n_attached: usize,
    pub n_tracks: usize,
    pub n_unattached: usize,
}

impl EventProfile {
    pub const fn new(
        name: &'static str,
        bounds: MergerBounds,
        n_attached: usize,
        n_tracks: usize,
        n_unattached: usize,
    ) -> Self {
        Self {
            name,
            bounds,
            n_attached,
            n_tracks,
            n_unattached,
        }
    }

    /// No clusters at all.
    pub const fn empty() -> Self {
        Self::new("empty", MergerBounds::new(0, 0, 0), 0, 0, 0)
    }

    /// Small event: a few hundred clusters, mostly on tracks.
    pub const fn small() -> Self {
        Self::new("small", MergerBounds::new(100, 60, 7), 50, 5, 20)
    }

    /// Proton-proton-like occupancy.
    pub const fn pp() -> Self {
        Self::new("pp", MergerBounds::new(20_000, 12_000, 150), 11_000, 140, 8_500)
    }

    /// Central heavy-ion-like occupancy.
    pub const fn heavy_ion() -> Self {
        Self::new(
            "heavy-ion",
            MergerBounds::new(400_000, 250_000, 3_000),
            240_000,
            2_900,
            150_000,
        )
    }

    /// Every named profile, smallest first.
    pub const fn all() -> [Self; 4] {
        [Self::empty(), Self::small(), Self::pp(), Self::heavy_ion()]
    }
}

/// Track model on, sort buffer of 4 x 256 entries.
pub fn track_model_config() -> CompressionConfig {
    CompressionConfig {
        parallel_units: 4,
        max_clusters_per_unit_row: 256,
        ..CompressionConfig::new(CompressionModes::all())
    }
}

/// Track model off, otherwise as [`track_model_config`].
pub fn unattached_config() -> CompressionConfig {
    CompressionConfig {
        modes: CompressionModes::TRUNCATE | CompressionModes::DIFFERENCES,
        ..track_model_config()
    }
}

/// 64 MiB device pool, 16 MiB host pool.
pub fn small_arena() -> ArenaConfig {
    ArenaConfig::new(64 << 20, 16 << 20)
}

/// Pools that cannot hold the scratch region of [`EventProfile::small`].
pub fn tiny_arena() -> ArenaConfig {
    ArenaConfig::new(1024, 1024)
}
