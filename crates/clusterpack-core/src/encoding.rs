//! Per-field storage types of the compressed schema.
//!
//! The default table encodes:
//!
//! | field | type | meaning |
//! |-------|------|---------|
//! | `q_tot_*` | u16 | total charge, ADC counts / 16, truncated |
//! | `q_max_*` | u16 | peak charge, ADC counts, truncated |
//! | `flags_*` | u8 | cluster status bits |
//! | `pad_diff_u`, `time_diff_u` | u32 | delta to previous cluster in the row, 1/64 pad or time bin |
//! | `sigma_pad_*`, `sigma_time_*` | u8 | cluster width, 1/32 pad or time bin |
//! | `n_slice_row_clusters` | u32 | clusters per (sector, row) |
//! | `row_diff_a` | u8 | row delta to previous cluster on track |
//! | `slice_leg_diff_a` | u8 | sector delta, high bit set on leg change |
//! | `pad_res_a` | u16 | signed pad residual, 1/64 pad, two's complement |
//! | `time_res_a` | u32 | signed time residual, 1/64 bin, two's complement |
//! | `q_pt_a` | u8 | q/pT code, 127 is zero curvature |
//! | `row_a`, `slice_a` | u8 | anchor row (0..152) and sector (0..36) |
//! | `time_a` | u32 | absolute anchor time, 1/64 bin |
//! | `pad_a` | u16 | absolute anchor pad, 1/64 pad |
//! | `n_track_clusters` | u16 | clusters on the track |
//!
//! Widths can be overridden per field; the table only ever changes the
//! element size, never which fields exist or their order.

use indexmap::IndexMap;

use crate::error::ConfigError;
use crate::field::{ClusterField, ElementType};

/// Maps every [`ClusterField`] to its storage type.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EncodingTable {
    elements: IndexMap<ClusterField, ElementType>,
}

impl EncodingTable {
    /// Build the table with every field's default type.
    pub fn new() -> Self {
        let elements = ClusterField::LAYOUT_ORDER
            .iter()
            .map(|&f| (f, f.default_element()))
            .collect();
        Self { elements }
    }

    /// Storage type of a field.
    pub fn element(&self, field: ClusterField) -> ElementType {
        self.elements
            .get(&field)
            .copied()
            .unwrap_or_else(|| field.default_element())
    }

    /// Override the storage type of one field.
    ///
    /// Only primitive integer types are accepted; records are reserved for
    /// bookkeeping buffers.
    pub fn with_element(
        mut self,
        field: ClusterField,
        element: ElementType,
    ) -> Result<Self, ConfigError> {
        if !element.is_primitive() {
            return Err(ConfigError::InvalidEncoding {
                field: field.name(),
                reason: format!("{element} is not a primitive integer type"),
            });
        }
        self.elements.insert(field, element);
        Ok(self)
    }

    /// Iterate over `(field, type)` pairs in layout order.
    pub fn iter(&self) -> impl Iterator<Item = (ClusterField, ElementType)> + '_ {
        self.elements.iter().map(|(&f, &e)| (f, e))
    }

    /// Bytes needed to store one element of every field of the given set.
    pub fn row_bytes(&self, fields: impl IntoIterator<Item = ClusterField>) -> usize {
        fields.into_iter().map(|f| self.element(f).size()).sum()
    }
}

impl Default for EncodingTable {
    fn default() -> Self {
        Self::new()
    }
}
