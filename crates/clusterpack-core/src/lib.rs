//! Core types for the clusterpack cluster compression engine.
//!
//! This is the leaf crate with zero internal dependencies. It defines
//! the vocabulary shared by the rest of the workspace: region ids,
//! element types, the cluster field catalogue and its wire order, the
//! per-field encoding table, event counts, configuration, and the
//! detector geometry constants the schema is sized against.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod config;
pub mod counts;
pub mod encoding;
pub mod error;
pub mod field;
pub mod geometry;
pub mod id;
pub mod traits;

pub use config::{CompressionConfig, CompressionModes};
pub use counts::{round_up_to_block, ClusterCounts, MergerBounds, SchemaCounts, CLUSTER_BLOCK};
pub use encoding::EncodingTable;
pub use error::ConfigError;
pub use field::{ClusterField, ElementType, FieldExtent};
pub use id::{EventId, RegionId};
pub use traits::MergerOutput;
