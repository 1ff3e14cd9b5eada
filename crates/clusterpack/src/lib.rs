//! Clusterpack: memory planning for compressed detector cluster data.
//!
//! This is the top-level facade crate that re-exports the public API from all
//! clusterpack sub-crates. For most users, adding `clusterpack` as a single
//! dependency is sufficient.
//!
//! # Quick start
//!
//! ```rust
//! use clusterpack::prelude::*;
//!
//! let mut planner = CompressionPlanner::new(CompressionConfig::default()).unwrap();
//! let mut registry = CompressionRegistry::new(ArenaConfig::new(64 << 20, 16 << 20)).unwrap();
//! let ids = planner.register(&mut registry).unwrap();
//!
//! // Size scratch and device output from the merger's bounds.
//! let capacity = planner
//!     .prepare_event(&mut registry, &MergerBounds::new(100, 60, 7))
//!     .unwrap();
//! assert_eq!(capacity.max_clusters, 112);
//!
//! // ... encode ...
//!
//! // Place the host-readable output at the exact counts.
//! let header = planner.finalize_output(&mut registry, 50, 5, 20).unwrap();
//! assert_eq!(header.n_attached_reduced, 45);
//!
//! let host = planner.output_host().unwrap();
//! let pad_res = host.get(ClusterField::PadResA).unwrap();
//! assert_eq!(registry.span_bytes(ids.output_host, &pad_res).unwrap().len(), 45 * 2);
//! ```
//!
//! # Modules
//!
//! Each module corresponds to a sub-crate. Use them for types not in the prelude:
//!
//! | Module | Sub-crate | Contents |
//! |--------|-----------|----------|
//! | [`arena`] | `clusterpack-arena` | Cursor, spans, pools, region registry |
//! | [`types`] | `clusterpack-core` | IDs, counts, field catalogue, encoding, configuration |
//! | [`compression`] | `clusterpack-compression` | Capacity estimate, mode gate, schema, planner |

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

/// Reference region allocator (`clusterpack-arena`).
///
/// [`arena::MemoryRegistry`] places registered regions in
/// [`arena::MemoryPool`]s by running their sizing functions on an
/// [`arena::Cursor`].
pub use clusterpack_arena as arena;

/// Core types, counts and configuration (`clusterpack-core`).
///
/// Contains the [`types::ClusterField`] catalogue, the
/// [`types::EncodingTable`] and the [`types::MergerOutput`] trait.
pub use clusterpack_core as types;

/// Capacity estimation, schema layout and region planning
/// (`clusterpack-compression`).
///
/// [`compression::CompressionPlanner`] owns the four compression regions.
pub use clusterpack_compression as compression;

/// Common imports for typical clusterpack usage.
///
/// ```rust
/// use clusterpack::prelude::*;
/// ```
pub mod prelude {
    // Allocator
    pub use clusterpack_arena::{ArenaConfig, Cursor, Placement, RegionTag, Residency, Span};

    // Core types and traits
    pub use clusterpack_core::{
        ClusterCounts, ClusterField, CompressionConfig, CompressionModes, ElementType,
        EncodingTable, FieldExtent, MergerBounds, MergerOutput, SchemaCounts,
    };

    // Errors
    pub use clusterpack_arena::ArenaError;
    pub use clusterpack_compression::LayoutError;
    pub use clusterpack_core::ConfigError;

    // Planning
    pub use clusterpack_compression::{
        estimate_capacity, layout_cluster_fields, CompressedClustersHeader, CompressionMemory,
        CompressionPlanner, CompressionRegion, CompressionRegistry, ModeGate, OutputCounts,
        RegionIds, SchemaHandles,
    };
}
