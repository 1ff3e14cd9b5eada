//! Per-event capacity estimation.
//!
//! The estimate is always sized for the worst case the merger reports,
//! never for exact counts: exact counts only exist after the compressed
//! schema has been filled.

use clusterpack_core::{round_up_to_block, ClusterCounts, MergerOutput, CLUSTER_BLOCK};

use crate::error::LayoutError;

/// Derive the capacity estimate for one event from the merger bounds.
///
/// Copies the three bounds and rounds `max_clusters` up to the next
/// multiple of [`CLUSTER_BLOCK`]. Never rounds down.
pub fn estimate_capacity<M: MergerOutput + ?Sized>(merger: &M) -> Result<ClusterCounts, LayoutError> {
    let max_clusters = merger.n_max_clusters();
    let rounded =
        round_up_to_block(max_clusters, CLUSTER_BLOCK).ok_or(LayoutError::CountOverflow {
            what: "max_clusters",
            value: max_clusters,
        })?;
    Ok(ClusterCounts {
        max_clusters: rounded,
        max_track_clusters: merger.n_output_track_clusters(),
        max_tracks: merger.n_output_tracks(),
    })
}
