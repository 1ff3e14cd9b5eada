//! Detector geometry constants the schema is sized against.
//!
//! Geometry lookups themselves live outside this crate; only the
//! dimensions of the per-row-per-sector table are needed here.

/// Number of pad rows per sector.
pub const ROW_COUNT: usize = 152;

/// Number of sectors (18 per side, two sides).
pub const SECTOR_COUNT: usize = 36;

/// Entries in the per-row-per-sector cluster count table.
pub const SLICE_ROW_COUNT: usize = ROW_COUNT * SECTOR_COUNT;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slice_row_table_has_one_entry_per_row_and_sector() {
        assert_eq!(SLICE_ROW_COUNT, 5472);
    }
}
