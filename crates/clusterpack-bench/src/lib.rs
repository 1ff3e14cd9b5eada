//! Benchmark profiles and utilities for the clusterpack compression engine.
//!
//! Provides pre-built sessions for benchmarking:
//!
//! - [`reference_config`]: production sort buffer (64 units x 1024 entries)
//!   with every compression mode enabled
//! - [`reference_arena`]: pools large enough for a central heavy-ion event
//! - [`synthetic_bounds`]: merger bounds derived from a cluster count
//! - [`planned_session`]: a planner with its regions registered

#![forbid(unsafe_code)]
#![deny(rustdoc::broken_intra_doc_links)]

use clusterpack_arena::ArenaConfig;
use clusterpack_compression::{CompressionPlanner, CompressionRegistry, LayoutError};
use clusterpack_core::{CompressionConfig, MergerBounds};

/// Every mode enabled, default sort buffer.
pub fn reference_config() -> CompressionConfig {
    CompressionConfig::default()
}

/// 256 MiB device pool, 64 MiB host pool.
pub fn reference_arena() -> ArenaConfig {
    ArenaConfig::new(256 << 20, 64 << 20)
}

/// Merger bounds for an event with `n_clusters` clusters.
///
/// Assumes 60% of clusters end up on tracks with an average of 80
/// clusters per track, roughly what central collisions produce.
pub fn synthetic_bounds(n_clusters: usize) -> MergerBounds {
    let track_clusters = n_clusters / 10 * 6;
    MergerBounds::new(n_clusters, track_clusters, track_clusters / 80)
}

/// Planner and registry with the four compression regions registered.
pub fn planned_session(
    config: CompressionConfig,
    arena: ArenaConfig,
) -> Result<(CompressionPlanner, CompressionRegistry), LayoutError> {
    let mut planner = CompressionPlanner::new(config)?;
    let mut registry = CompressionRegistry::new(arena)?;
    planner.register(&mut registry)?;
    Ok((planner, registry))
}

#[cfg(test)]
mod tests {
    use super::*;
    use clusterpack_core::MergerOutput;

    #[test]
    fn synthetic_bounds_are_consistent() {
        let bounds = synthetic_bounds(400_000);
        assert_eq!(bounds.n_output_track_clusters(), 240_000);
        assert_eq!(bounds.n_output_tracks(), 3_000);
        assert!(bounds.n_output_tracks() <= bounds.n_output_track_clusters());
    }

    #[test]
    fn reference_session_fits_heavy_ion_event() {
        let (mut planner, mut registry) =
            planned_session(reference_config(), reference_arena()).unwrap();
        planner
            .prepare_event(&mut registry, &synthetic_bounds(2_000_000))
            .unwrap();
        planner
            .finalize_output(&mut registry, 1_100_000, 15_000, 800_000)
            .unwrap();
    }
}
