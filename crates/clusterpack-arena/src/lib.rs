//! Reference allocator for clusterpack regions.
//!
//! The compression core treats the allocator as an external collaborator
//! that offers three things: an aligned bump [`Cursor`], region
//! registration with a sizing callback, and pooled or custom backing
//! memory per residency. This crate implements exactly that interface so
//! the core can be driven and tested end to end.
//!
//! # Architecture
//!
//! ```text
//! MemoryRegistry<P, E> (orchestrator)
//! ├── IndexMap<RegionId, RegionEntry>   name, RegionTag, SizingFn, Placement
//! ├── MemoryPool (device)               permanent watermark + per-event bump
//! ├── MemoryPool (host)
//! └── IndexMap<RegionId, Vec<u8>>       custom regions, sized per event
//! ```
//!
//! # Region tags
//!
//! - **Permanent:** placed once, below the pool's permanent watermark.
//! - **Scratch / Output:** placed per event above the watermark.
//! - **OutputHostCustom:** own buffer, placed on demand once the exact
//!   size is known.
//!
//! Sizing functions are plain `fn` pointers keyed by region; there is no
//! dynamic dispatch in the placement path.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod config;
pub mod cursor;
pub mod error;
pub mod handle;
pub mod pool;
pub mod registry;
pub mod resource;

// Public re-exports for the primary API surface.
pub use config::ArenaConfig;
pub use cursor::Cursor;
pub use error::ArenaError;
pub use handle::{Placement, Span};
pub use pool::MemoryPool;
pub use registry::{MemoryRegistry, SizingFn};
pub use resource::{Lifetime, RegionTag, Residency};
