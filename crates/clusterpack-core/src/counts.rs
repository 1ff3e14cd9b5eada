//! Per-event element counts.

use crate::traits::MergerOutput;

/// Block width of the accelerator cluster kernels.
///
/// `max_clusters` is always a multiple of this so that the last block
/// never reads or writes past the end of a cluster array.
pub const CLUSTER_BLOCK: usize = 16;

/// Round `value` up to the next multiple of `block`.
///
/// Returns `value` unchanged if it is already aligned. Returns `None` if
/// `block` is zero or the result does not fit in `usize`.
pub fn round_up_to_block(value: usize, block: usize) -> Option<usize> {
    if block == 0 {
        return None;
    }
    value.checked_next_multiple_of(block)
}

/// Upper bounds reported by the track merger for one event.
///
/// These are bounds, not exact counts: exact counts are only known once
/// the compressed schema has been populated.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct MergerBounds {
    /// Upper bound on the number of clusters in the event.
    pub max_clusters: usize,
    /// Upper bound on clusters referenced by output tracks.
    pub output_track_clusters: usize,
    /// Upper bound on the number of output tracks.
    pub output_tracks: usize,
}

impl MergerBounds {
    /// Create bounds from the three merger counts.
    pub const fn new(
        max_clusters: usize,
        output_track_clusters: usize,
        output_tracks: usize,
    ) -> Self {
        Self {
            max_clusters,
            output_track_clusters,
            output_tracks,
        }
    }
}

impl MergerOutput for MergerBounds {
    fn n_max_clusters(&self) -> usize {
        self.max_clusters
    }

    fn n_output_track_clusters(&self) -> usize {
        self.output_track_clusters
    }

    fn n_output_tracks(&self) -> usize {
        self.output_tracks
    }
}

/// Capacity estimate for one event.
///
/// Invariant: `max_clusters % CLUSTER_BLOCK == 0`. Only the capacity
/// estimator constructs values of this type outside tests.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct ClusterCounts {
    /// Upper bound on total clusters, block aligned.
    pub max_clusters: usize,
    /// Upper bound on clusters referenced by tracks.
    pub max_track_clusters: usize,
    /// Upper bound on track count.
    pub max_tracks: usize,
}

impl ClusterCounts {
    /// Schema counts for the full-size scratch layout.
    pub fn scratch_schema(&self) -> SchemaCounts {
        SchemaCounts {
            n_unattached: self.max_clusters,
            n_attached: self.max_track_clusters,
            n_tracks: self.max_tracks,
        }
    }
}

/// Element counts a single schema layout is sized from.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct SchemaCounts {
    /// Unattached clusters (`nClU`).
    pub n_unattached: usize,
    /// Attached clusters (`nClA`).
    pub n_attached: usize,
    /// Tracks (`nTr`).
    pub n_tracks: usize,
}

impl SchemaCounts {
    /// Create counts from `(nClU, nClA, nTr)`.
    pub fn new(n_unattached: usize, n_attached: usize, n_tracks: usize) -> Self {
        Self {
            n_unattached,
            n_attached,
            n_tracks,
        }
    }

    /// Number of residual slots.
    ///
    /// The first cluster of each track is its anchor and carries no
    /// residual, so the reduced variant has `nClA - nTr` slots. Returns
    /// `None` if reduced and `nTr > nClA`.
    pub fn residual_count(&self, reduced: bool) -> Option<usize> {
        if reduced {
            self.n_attached.checked_sub(self.n_tracks)
        } else {
            Some(self.n_attached)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rounds_up_to_next_block() {
        assert_eq!(round_up_to_block(100, CLUSTER_BLOCK), Some(112));
        assert_eq!(round_up_to_block(1, CLUSTER_BLOCK), Some(16));
    }

    #[test]
    fn aligned_value_unchanged() {
        assert_eq!(round_up_to_block(0, CLUSTER_BLOCK), Some(0));
        assert_eq!(round_up_to_block(112, CLUSTER_BLOCK), Some(112));
    }

    #[test]
    fn overflow_and_zero_block() {
        assert_eq!(round_up_to_block(usize::MAX, CLUSTER_BLOCK), None);
        assert_eq!(round_up_to_block(10, 0), None);
    }

    #[test]
    fn reduced_residual_count() {
        let counts = SchemaCounts::new(0, 50, 5);
        assert_eq!(counts.residual_count(true), Some(45));
        assert_eq!(counts.residual_count(false), Some(50));
    }

    #[test]
    fn reduced_with_more_tracks_than_clusters_is_none() {
        let counts = SchemaCounts::new(0, 3, 5);
        assert_eq!(counts.residual_count(true), None);
        assert_eq!(counts.residual_count(false), Some(3));
    }

    #[test]
    fn scratch_schema_uses_capacity() {
        let counts = ClusterCounts {
            max_clusters: 112,
            max_track_clusters: 80,
            max_tracks: 7,
        };
        assert_eq!(counts.scratch_schema(), SchemaCounts::new(112, 80, 7));
    }

    #[cfg(not(miri))]
    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn rounding_is_idempotent(value in 0usize..1_000_000_000) {
                let once = round_up_to_block(value, CLUSTER_BLOCK).unwrap();
                prop_assert_eq!(once % CLUSTER_BLOCK, 0);
                prop_assert!(once >= value);
                prop_assert!(once - value < CLUSTER_BLOCK);
                prop_assert_eq!(round_up_to_block(once, CLUSTER_BLOCK), Some(once));
            }

            #[test]
            fn reduced_residuals_never_negative(
                n_tracks in 0usize..10_000,
                extra in 0usize..10_000,
            ) {
                let counts = SchemaCounts::new(0, n_tracks + extra, n_tracks);
                prop_assert_eq!(counts.residual_count(true), Some(extra));
            }
        }
    }
}
