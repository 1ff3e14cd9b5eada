//! Element types and the cluster field catalogue.
//!
//! [`ClusterField::LAYOUT_ORDER`] is the single source of truth for the
//! order in which fields are placed in every region. The order is part
//! of the wire format: reordering it changes every offset after the
//! moved field and breaks previously written buffers.
//!
//! This order differs from the legacy interleaved wire order: all
//! per-cluster attached fields come before the four residual fields.

use std::fmt;

/// Storage type of one element of a structure-of-arrays field.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ElementType {
    /// Unsigned 8-bit integer.
    U8,
    /// Unsigned 16-bit integer.
    U16,
    /// Unsigned 32-bit integer.
    U32,
    /// Unsigned 64-bit integer.
    U64,
    /// An opaque fixed-size record (used for bookkeeping structs).
    Record {
        /// Size of one record in bytes.
        size: usize,
        /// Required alignment in bytes. Must be a power of two.
        align: usize,
    },
}

impl ElementType {
    /// Size of one element in bytes.
    pub fn size(&self) -> usize {
        match self {
            Self::U8 => 1,
            Self::U16 => 2,
            Self::U32 => 4,
            Self::U64 => 8,
            Self::Record { size, .. } => *size,
        }
    }

    /// Natural alignment of one element in bytes.
    pub fn align(&self) -> usize {
        match self {
            Self::U8 => 1,
            Self::U16 => 2,
            Self::U32 => 4,
            Self::U64 => 8,
            Self::Record { align, .. } => *align,
        }
    }

    /// Whether this is one of the primitive unsigned integer types.
    pub fn is_primitive(&self) -> bool {
        !matches!(self, Self::Record { .. })
    }
}

impl fmt::Display for ElementType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::U8 => write!(f, "u8"),
            Self::U16 => write!(f, "u16"),
            Self::U32 => write!(f, "u32"),
            Self::U64 => write!(f, "u64"),
            Self::Record { size, align } => write!(f, "record({size}b, align {align})"),
        }
    }
}

/// Which count sizes a cluster field.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FieldExtent {
    /// One entry per unattached cluster (`nClU`).
    Unattached,
    /// Fixed size: one entry per (sector, row) pair.
    SliceRowTable,
    /// One entry per attached cluster (`nClA`).
    AttachedCluster,
    /// One entry per residual: `nClA - nTr` when reduced, else `nClA`.
    Residual,
    /// One entry per track (`nTr`).
    Track,
}

impl FieldExtent {
    /// Whether fields of this extent exist only with track-model compression.
    pub fn requires_track_model(&self) -> bool {
        matches!(
            self,
            Self::AttachedCluster | Self::Residual | Self::Track
        )
    }
}

/// Every structure-of-arrays field of the compressed cluster schema.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ClusterField {
    /// Total charge of an unattached cluster.
    QTotU,
    /// Peak charge of an unattached cluster.
    QMaxU,
    /// Status flags of an unattached cluster.
    FlagsU,
    /// Pad delta to the previous unattached cluster in the same row.
    PadDiffU,
    /// Time delta to the previous unattached cluster in the same row.
    TimeDiffU,
    /// Pad width of an unattached cluster.
    SigmaPadU,
    /// Time width of an unattached cluster.
    SigmaTimeU,
    /// Unattached cluster count per (sector, row).
    SliceRowClusters,
    /// Total charge of an attached cluster.
    QTotA,
    /// Peak charge of an attached cluster.
    QMaxA,
    /// Status flags of an attached cluster.
    FlagsA,
    /// Pad width of an attached cluster.
    SigmaPadA,
    /// Time width of an attached cluster.
    SigmaTimeA,
    /// Row delta to the previous cluster on the track.
    RowDiffA,
    /// Sector delta plus leg crossing to the previous cluster on the track.
    SliceLegDiffA,
    /// Pad residual to the track prediction.
    PadResA,
    /// Time residual to the track prediction.
    TimeResA,
    /// Anchor q/pT code.
    QPtA,
    /// Anchor row.
    RowA,
    /// Anchor sector.
    SliceA,
    /// Anchor time.
    TimeA,
    /// Anchor pad.
    PadA,
    /// Number of clusters on the track.
    TrackClusters,
}

impl ClusterField {
    /// Placement order of all fields. Shared by every layout call site.
    pub const LAYOUT_ORDER: [ClusterField; 23] = [
        Self::QTotU,
        Self::QMaxU,
        Self::FlagsU,
        Self::PadDiffU,
        Self::TimeDiffU,
        Self::SigmaPadU,
        Self::SigmaTimeU,
        Self::SliceRowClusters,
        Self::QTotA,
        Self::QMaxA,
        Self::FlagsA,
        Self::SigmaPadA,
        Self::SigmaTimeA,
        Self::RowDiffA,
        Self::SliceLegDiffA,
        Self::PadResA,
        Self::TimeResA,
        Self::QPtA,
        Self::RowA,
        Self::SliceA,
        Self::TimeA,
        Self::PadA,
        Self::TrackClusters,
    ];

    /// Which count sizes this field.
    pub fn extent(&self) -> FieldExtent {
        match self {
            Self::QTotU
            | Self::QMaxU
            | Self::FlagsU
            | Self::PadDiffU
            | Self::TimeDiffU
            | Self::SigmaPadU
            | Self::SigmaTimeU => FieldExtent::Unattached,
            Self::SliceRowClusters => FieldExtent::SliceRowTable,
            Self::QTotA | Self::QMaxA | Self::FlagsA | Self::SigmaPadA | Self::SigmaTimeA => {
                FieldExtent::AttachedCluster
            }
            Self::RowDiffA | Self::SliceLegDiffA | Self::PadResA | Self::TimeResA => {
                FieldExtent::Residual
            }
            Self::QPtA | Self::RowA | Self::SliceA | Self::TimeA | Self::PadA | Self::TrackClusters => {
                FieldExtent::Track
            }
        }
    }

    /// Default storage type. See [`EncodingTable`](crate::EncodingTable)
    /// for the numeric meaning of each field.
    pub fn default_element(&self) -> ElementType {
        match self {
            Self::QTotU | Self::QMaxU | Self::QTotA | Self::QMaxA => ElementType::U16,
            Self::FlagsU | Self::FlagsA => ElementType::U8,
            Self::PadDiffU | Self::TimeDiffU => ElementType::U32,
            Self::SigmaPadU | Self::SigmaTimeU | Self::SigmaPadA | Self::SigmaTimeA => {
                ElementType::U8
            }
            Self::SliceRowClusters => ElementType::U32,
            Self::RowDiffA | Self::SliceLegDiffA => ElementType::U8,
            Self::PadResA => ElementType::U16,
            Self::TimeResA => ElementType::U32,
            Self::QPtA | Self::RowA | Self::SliceA => ElementType::U8,
            Self::TimeA => ElementType::U32,
            Self::PadA => ElementType::U16,
            Self::TrackClusters => ElementType::U16,
        }
    }

    /// Snake-case name used in diagnostics.
    pub fn name(&self) -> &'static str {
        match self {
            Self::QTotU => "q_tot_u",
            Self::QMaxU => "q_max_u",
            Self::FlagsU => "flags_u",
            Self::PadDiffU => "pad_diff_u",
            Self::TimeDiffU => "time_diff_u",
            Self::SigmaPadU => "sigma_pad_u",
            Self::SigmaTimeU => "sigma_time_u",
            Self::SliceRowClusters => "n_slice_row_clusters",
            Self::QTotA => "q_tot_a",
            Self::QMaxA => "q_max_a",
            Self::FlagsA => "flags_a",
            Self::SigmaPadA => "sigma_pad_a",
            Self::SigmaTimeA => "sigma_time_a",
            Self::RowDiffA => "row_diff_a",
            Self::SliceLegDiffA => "slice_leg_diff_a",
            Self::PadResA => "pad_res_a",
            Self::TimeResA => "time_res_a",
            Self::QPtA => "q_pt_a",
            Self::RowA => "row_a",
            Self::SliceA => "slice_a",
            Self::TimeA => "time_a",
            Self::PadA => "pad_a",
            Self::TrackClusters => "n_track_clusters",
        }
    }
}

impl fmt::Display for ClusterField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
