//! Cluster compression memory planning.
//!
//! Sizes and places every buffer of one event's cluster compression
//! before any encode work starts:
//!
//! - [`capacity`]: worst-case counts from the track merger's bounds.
//! - [`gate`]: the track-model flag, captured once per event.
//! - [`schema`]: the structure-of-arrays layout of the compressed
//!   clusters, shared by every region that holds them.
//! - [`planner`]: the four regions and their sizing functions.
//! - [`output`]: exact counts, the output header and the bookkeeping
//!   record.
//!
//! # Event flow
//!
//! ```text
//! set_max_data ──► allocate_pooled ──► (encode) ──► set_output_counts ──► allocate_custom
//!   capacity        scratch, output                  occupancy check       output host
//!   gate            permanent (once)
//! ```
//!
//! Every error is fatal for the event. Nothing is resized in place.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod capacity;
pub mod error;
pub mod gate;
pub mod output;
pub mod planner;
pub mod schema;

pub use capacity::estimate_capacity;
pub use error::LayoutError;
pub use gate::ModeGate;
pub use output::{CompressedClustersHeader, CompressionMemory, OutputCounts};
pub use planner::{
    CompressionPlanner, CompressionRegion, CompressionRegistry, RegionIds, ScratchLayout,
};
pub use schema::{layout_cluster_fields, SchemaHandles};
