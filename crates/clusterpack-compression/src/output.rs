//! Exact output counts, the compressed-clusters header and the permanent
//! bookkeeping record.

use clusterpack_core::geometry::SLICE_ROW_COUNT;
use clusterpack_core::{CompressionModes, ElementType, SchemaCounts};

use crate::error::LayoutError;
use crate::gate::ModeGate;

/// Exact counts of one encoded event.
///
/// Built with [`OutputCounts::new`], which applies the gate: with the
/// track model disabled every cluster is unattached and there are no
/// tracks, whatever the merger associated upstream.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct OutputCounts {
    /// Attached clusters (`nClA`).
    pub n_attached: usize,
    /// Tracks (`nTr`).
    pub n_tracks: usize,
    /// Unattached clusters (`nClU`).
    pub n_unattached: usize,
}

impl OutputCounts {
    /// Counts as seen by the schema under `gate`.
    ///
    /// Returns [`LayoutError::CountOverflow`] if folding attached into
    /// unattached clusters overflows.
    pub fn new(
        n_attached: usize,
        n_tracks: usize,
        n_unattached: usize,
        gate: ModeGate,
    ) -> Result<Self, LayoutError> {
        if gate.track_model() {
            return Ok(Self {
                n_attached,
                n_tracks,
                n_unattached,
            });
        }
        let total = n_unattached
            .checked_add(n_attached)
            .ok_or(LayoutError::CountOverflow {
                what: "n_unattached",
                value: n_unattached,
            })?;
        Ok(Self {
            n_attached: 0,
            n_tracks: 0,
            n_unattached: total,
        })
    }

    /// Schema counts for the exact output layout.
    pub fn schema_counts(&self) -> SchemaCounts {
        SchemaCounts::new(self.n_unattached, self.n_attached, self.n_tracks)
    }

    /// Total clusters, attached and unattached.
    pub fn n_clusters(&self) -> Result<usize, LayoutError> {
        self.n_attached
            .checked_add(self.n_unattached)
            .ok_or(LayoutError::CountOverflow {
                what: "n_clusters",
                value: self.n_attached,
            })
    }
}

/// Summary stored alongside the host-readable output.
///
/// Gives a reader every count it needs to walk the packed arrays of the
/// output-host region without access to the planner.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CompressedClustersHeader {
    /// Attached clusters.
    pub n_attached: usize,
    /// Residual slots: attached clusters minus track anchors.
    pub n_attached_reduced: usize,
    /// Unattached clusters.
    pub n_unattached: usize,
    /// Tracks.
    pub n_tracks: usize,
    /// Entries of the row/sector table.
    pub n_slice_rows: usize,
    /// Compression stages the encoder applied.
    pub modes: CompressionModes,
}

impl CompressedClustersHeader {
    /// Build the header from exact counts.
    pub fn new(counts: OutputCounts, modes: CompressionModes) -> Result<Self, LayoutError> {
        let n_attached_reduced =
            counts
                .n_attached
                .checked_sub(counts.n_tracks)
                .ok_or(LayoutError::InvalidCounts {
                    n_attached: counts.n_attached,
                    n_tracks: counts.n_tracks,
                })?;
        Ok(Self {
            n_attached: counts.n_attached,
            n_attached_reduced,
            n_unattached: counts.n_unattached,
            n_tracks: counts.n_tracks,
            n_slice_rows: SLICE_ROW_COUNT,
            modes,
        })
    }
}

/// Session-lifetime bookkeeping kept in the permanent region.
///
/// Stored little-endian as three consecutive `u32`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CompressionMemory {
    /// Tracks stored by the last finished event.
    pub n_stored_tracks: u32,
    /// Attached clusters stored by the last finished event.
    pub n_stored_attached_clusters: u32,
    /// Unattached clusters stored by the last finished event.
    pub n_stored_unattached_clusters: u32,
}

impl CompressionMemory {
    /// Size of the encoded record in bytes.
    pub const SIZE: usize = 12;

    /// Element type of the record in the permanent region.
    pub const ELEMENT: ElementType = ElementType::Record {
        size: Self::SIZE,
        align: 4,
    };

    /// Record for the given output counts.
    pub fn from_output(counts: OutputCounts) -> Result<Self, LayoutError> {
        let narrow = |what: &'static str, value: usize| {
            u32::try_from(value).map_err(|_| LayoutError::CountOverflow { what, value })
        };
        Ok(Self {
            n_stored_tracks: narrow("n_tracks", counts.n_tracks)?,
            n_stored_attached_clusters: narrow("n_attached", counts.n_attached)?,
            n_stored_unattached_clusters: narrow("n_unattached", counts.n_unattached)?,
        })
    }

    /// Encode as little-endian bytes.
    pub fn to_bytes(&self) -> [u8; Self::SIZE] {
        let mut out = [0u8; Self::SIZE];
        out[0..4].copy_from_slice(&self.n_stored_tracks.to_le_bytes());
        out[4..8].copy_from_slice(&self.n_stored_attached_clusters.to_le_bytes());
        out[8..12].copy_from_slice(&self.n_stored_unattached_clusters.to_le_bytes());
        out
    }

    /// Decode from little-endian bytes. Returns `None` if `bytes` is too short.
    pub fn from_bytes(bytes: &[u8]) -> Option<Self> {
        let word = |i: usize| -> Option<u32> {
            let chunk: [u8; 4] = bytes.get(i..i + 4)?.try_into().ok()?;
            Some(u32::from_le_bytes(chunk))
        };
        Some(Self {
            n_stored_tracks: word(0)?,
            n_stored_attached_clusters: word(4)?,
            n_stored_unattached_clusters: word(8)?,
        })
    }
}
