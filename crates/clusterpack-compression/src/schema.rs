//! Cluster schema layout.
//!
//! [`layout_cluster_fields`] walks [`ClusterField::LAYOUT_ORDER`] and
//! places each field on the caller's cursor. It is the only place that
//! decides which fields exist for a given gate and how long each one is;
//! the scratch and output-host regions both call it and differ only in
//! the counts and the `reduced` flag.

use indexmap::IndexMap;
use tracing::trace;

use clusterpack_arena::{Cursor, Span};
use clusterpack_core::geometry::SLICE_ROW_COUNT;
use clusterpack_core::{ClusterField, EncodingTable, FieldExtent, SchemaCounts};

use crate::error::LayoutError;
use crate::gate::ModeGate;

/// Spans of every field placed by one schema layout.
///
/// Fields suppressed by the gate have no entry: [`SchemaHandles::get`]
/// returns `None` and [`SchemaHandles::len`] returns 0 for them.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SchemaHandles {
    spans: IndexMap<ClusterField, Span>,
    counts: SchemaCounts,
    reduced: bool,
    gate: ModeGate,
}

impl SchemaHandles {
    /// Span of a field, if it was allocated.
    pub fn get(&self, field: ClusterField) -> Option<Span> {
        self.spans.get(&field).copied()
    }

    /// Element count of a field; 0 if it was not allocated.
    pub fn len(&self, field: ClusterField) -> usize {
        self.get(field).map_or(0, |s| s.len())
    }

    /// Number of allocated fields.
    pub fn field_count(&self) -> usize {
        self.spans.len()
    }

    /// Whether no field was allocated.
    pub fn is_empty(&self) -> bool {
        self.spans.is_empty()
    }

    /// Iterate over allocated fields in placement order.
    pub fn iter(&self) -> impl Iterator<Item = (ClusterField, Span)> + '_ {
        self.spans.iter().map(|(&f, &s)| (f, s))
    }

    /// Counts the layout was sized from.
    pub fn counts(&self) -> SchemaCounts {
        self.counts
    }

    /// Whether residual fields use the reduced count.
    pub fn is_reduced(&self) -> bool {
        self.reduced
    }

    /// Gate the layout was built under.
    pub fn gate(&self) -> ModeGate {
        self.gate
    }

    /// Payload bytes of every field of the given extent.
    pub fn extent_bytes(&self, extent: FieldExtent) -> usize {
        self.iter()
            .filter(|(f, _)| f.extent() == extent)
            .map(|(_, s)| s.bytes())
            .sum()
    }

    /// Payload bytes of attached-cluster, residual and anchor fields.
    pub fn attached_bytes(&self) -> usize {
        self.iter()
            .filter(|(f, _)| f.extent().requires_track_model())
            .map(|(_, s)| s.bytes())
            .sum()
    }

    /// Payload bytes of all fields, excluding alignment padding.
    pub fn payload_bytes(&self) -> usize {
        self.iter().map(|(_, s)| s.bytes()).sum()
    }

    /// Byte offset one past the last field.
    pub fn end(&self) -> Option<usize> {
        self.spans.values().last().map(Span::end)
    }
}

/// Lay out the compressed cluster fields on `cursor`.
///
/// Always places the seven unattached fields (`counts.n_unattached`
/// entries each) and the row/sector table. If the gate disables the track
/// model, stops there. Otherwise places the five per-cluster attached
/// fields (`n_attached`), the four residual fields (`n_attached -
/// n_tracks` when `reduced`, else `n_attached`), the five anchor fields
/// and the per-track cluster count (`n_tracks` each).
///
/// The cursor is left past the last placed field.
///
/// # Errors
///
/// [`LayoutError::InvalidCounts`] if the track model is enabled,
/// `reduced` is set and `n_tracks > n_attached`;
/// [`LayoutError::Arena`] if a span cannot be represented.
pub fn layout_cluster_fields(
    cursor: &mut Cursor,
    counts: SchemaCounts,
    reduced: bool,
    gate: ModeGate,
    encoding: &EncodingTable,
) -> Result<SchemaHandles, LayoutError> {
    let n_residuals = if gate.track_model() {
        counts
            .residual_count(reduced)
            .ok_or(LayoutError::InvalidCounts {
                n_attached: counts.n_attached,
                n_tracks: counts.n_tracks,
            })?
    } else {
        0
    };

    let mut spans = IndexMap::with_capacity(ClusterField::LAYOUT_ORDER.len());
    for field in ClusterField::LAYOUT_ORDER {
        let extent = field.extent();
        if !gate.admits(extent) {
            // Gated fields form the tail of the order.
            break;
        }
        let len = match extent {
            FieldExtent::Unattached => counts.n_unattached,
            FieldExtent::SliceRowTable => SLICE_ROW_COUNT,
            FieldExtent::AttachedCluster => counts.n_attached,
            FieldExtent::Residual => n_residuals,
            FieldExtent::Track => counts.n_tracks,
        };
        let span = cursor.alloc(encoding.element(field), len)?;
        trace!(field = field.name(), offset = span.offset(), len, "placed field");
        spans.insert(field, span);
    }

    Ok(SchemaHandles {
        spans,
        counts,
        reduced,
        gate,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use clusterpack_core::ElementType;

    const RESIDUALS: [ClusterField; 4] = [
        ClusterField::RowDiffA,
        ClusterField::SliceLegDiffA,
        ClusterField::PadResA,
        ClusterField::TimeResA,
    ];

    const PER_CLUSTER: [ClusterField; 5] = [
        ClusterField::QTotA,
        ClusterField::QMaxA,
        ClusterField::FlagsA,
        ClusterField::SigmaPadA,
        ClusterField::SigmaTimeA,
    ];

    const ANCHORS: [ClusterField; 5] = [
        ClusterField::QPtA,
        ClusterField::RowA,
        ClusterField::SliceA,
        ClusterField::TimeA,
        ClusterField::PadA,
    ];

    fn layout(counts: SchemaCounts, reduced: bool, gate: ModeGate) -> SchemaHandles {
        let mut cursor = Cursor::new(0, 64);
        layout_cluster_fields(&mut cursor, counts, reduced, gate, &EncodingTable::default())
            .unwrap()
    }

    #[test]
    fn reduced_layout_field_lengths() {
        let schema = layout(SchemaCounts::new(0, 50, 5), true, ModeGate::TRACK_MODEL);
        for f in RESIDUALS {
            assert_eq!(schema.len(f), 45, "{f}");
        }
        for f in PER_CLUSTER {
            assert_eq!(schema.len(f), 50, "{f}");
        }
        for f in ANCHORS {
            assert_eq!(schema.len(f), 5, "{f}");
        }
        assert_eq!(schema.len(ClusterField::TrackClusters), 5);
        assert_eq!(schema.field_count(), 23);
    }

    #[test]
    fn full_layout_keeps_all_residual_slots() {
        let schema = layout(SchemaCounts::new(0, 50, 5), false, ModeGate::TRACK_MODEL);
        for f in RESIDUALS {
            assert_eq!(schema.len(f), 50, "{f}");
        }
        assert!(!schema.is_reduced());
    }

    #[test]
    fn disabled_gate_allocates_only_unattached_fields() {
        let schema = layout(SchemaCounts::new(1000, 50, 5), true, ModeGate::UNATTACHED_ONLY);
        assert_eq!(schema.field_count(), 8);
        for (field, span) in schema.iter().take(7) {
            assert_eq!(field.extent(), FieldExtent::Unattached);
            assert_eq!(span.len(), 1000);
        }
        assert_eq!(schema.len(ClusterField::SliceRowClusters), SLICE_ROW_COUNT);
        assert_eq!(schema.attached_bytes(), 0);
        assert!(schema.get(ClusterField::QTotA).is_none());
        assert_eq!(schema.len(ClusterField::TrackClusters), 0);
    }

    #[test]
    fn disabled_gate_ignores_impossible_track_counts() {
        let schema = layout(SchemaCounts::new(10, 2, 9), true, ModeGate::UNATTACHED_ONLY);
        assert_eq!(schema.attached_bytes(), 0);
    }

    #[test]
    fn more_tracks_than_clusters_rejected_when_reduced() {
        let mut cursor = Cursor::new(0, 64);
        let result = layout_cluster_fields(
            &mut cursor,
            SchemaCounts::new(0, 4, 5),
            true,
            ModeGate::TRACK_MODEL,
            &EncodingTable::default(),
        );
        assert_eq!(
            result,
            Err(LayoutError::InvalidCounts {
                n_attached: 4,
                n_tracks: 5
            })
        );
        // Nothing was placed.
        assert_eq!(cursor.position(), 0);
    }

    #[test]
    fn fields_placed_in_layout_order_without_overlap() {
        let schema = layout(SchemaCounts::new(100, 50, 5), true, ModeGate::TRACK_MODEL);
        let order: Vec<_> = schema.iter().map(|(f, _)| f).collect();
        assert_eq!(order, ClusterField::LAYOUT_ORDER.to_vec());
        let spans: Vec<_> = schema.iter().map(|(_, s)| s).collect();
        for pair in spans.windows(2) {
            assert!(pair[1].offset() >= pair[0].end());
            assert_eq!(pair[1].offset() % 64, 0);
        }
    }

    #[test]
    fn cursor_left_at_schema_end() {
        let mut cursor = Cursor::new(128, 64);
        let schema = layout_cluster_fields(
            &mut cursor,
            SchemaCounts::new(7, 3, 1),
            true,
            ModeGate::TRACK_MODEL,
            &EncodingTable::default(),
        )
        .unwrap();
        assert_eq!(schema.end(), Some(cursor.position()));
        assert_eq!(schema.get(ClusterField::QTotU).unwrap().offset(), 128);
    }

    #[test]
    fn encoding_override_changes_bytes_not_order() {
        let encoding = EncodingTable::default()
            .with_element(ClusterField::PadResA, ElementType::U32)
            .unwrap();
        let mut cursor = Cursor::new(0, 64);
        let schema = layout_cluster_fields(
            &mut cursor,
            SchemaCounts::new(0, 10, 2),
            true,
            ModeGate::TRACK_MODEL,
            &encoding,
        )
        .unwrap();
        let pad_res = schema.get(ClusterField::PadResA).unwrap();
        assert_eq!(pad_res.element(), ElementType::U32);
        assert_eq!(pad_res.bytes(), 32);
    }

    #[test]
    fn extent_bytes_sum_to_payload() {
        let schema = layout(SchemaCounts::new(33, 21, 4), true, ModeGate::TRACK_MODEL);
        let by_extent: usize = [
            FieldExtent::Unattached,
            FieldExtent::SliceRowTable,
            FieldExtent::AttachedCluster,
            FieldExtent::Residual,
            FieldExtent::Track,
        ]
        .iter()
        .map(|&e| schema.extent_bytes(e))
        .sum();
        assert_eq!(by_extent, schema.payload_bytes());
    }

    #[cfg(not(miri))]
    mod proptests {
        use super::*;
        use proptest::prelude::*;

        fn arb_counts() -> impl Strategy<Value = SchemaCounts> {
            (0usize..5000, 0usize..5000, 0usize..500).prop_map(|(u, extra, t)| {
                SchemaCounts::new(u, t + extra, t)
            })
        }

        proptest! {
            #[test]
            fn disabled_gate_never_allocates_attached_fields(
                counts in (0usize..5000, 0usize..5000, 0usize..5000)
                    .prop_map(|(u, a, t)| SchemaCounts::new(u, a, t)),
                reduced in any::<bool>(),
            ) {
                let schema = layout(counts, reduced, ModeGate::UNATTACHED_ONLY);
                prop_assert_eq!(schema.attached_bytes(), 0);
                prop_assert_eq!(schema.field_count(), 8);
            }

            #[test]
            fn layout_is_deterministic(counts in arb_counts(), reduced in any::<bool>()) {
                let a = layout(counts, reduced, ModeGate::TRACK_MODEL);
                let b = layout(counts, reduced, ModeGate::TRACK_MODEL);
                prop_assert_eq!(a, b);
            }

            #[test]
            fn residuals_are_attached_minus_tracks(counts in arb_counts()) {
                let schema = layout(counts, true, ModeGate::TRACK_MODEL);
                prop_assert_eq!(
                    schema.len(ClusterField::PadResA),
                    counts.n_attached - counts.n_tracks
                );
            }

            #[test]
            fn size_is_monotonic_in_every_count(
                counts in arb_counts(),
                du in 0usize..100,
                da in 0usize..100,
                dt in 0usize..100,
            ) {
                let bigger = SchemaCounts::new(
                    counts.n_unattached + du,
                    counts.n_attached + da + dt,
                    counts.n_tracks + dt,
                );
                for reduced in [false, true] {
                    let small = layout(counts, reduced, ModeGate::TRACK_MODEL).end().unwrap();
                    let large = layout(bigger, reduced, ModeGate::TRACK_MODEL).end().unwrap();
                    prop_assert!(small <= large);
                }
            }
        }
    }
}
