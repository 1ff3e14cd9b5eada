//! Test utilities and mock types for clusterpack development.
//!
//! Provides a mock track merger ([`MockMerger`]) implementing
//! [`MergerOutput`] and, in [`fixtures`], event profiles and
//! configurations shared by unit tests, integration tests and benches.

#![forbid(unsafe_code)]
#![allow(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod fixtures;

use std::sync::atomic::{AtomicUsize, Ordering};

use clusterpack_core::MergerOutput;

/// Mock implementation of [`MergerOutput`].
///
/// Reports fixed bounds and counts how often the bounds were queried, so
/// tests can check that capacity is estimated once per event.
pub struct MockMerger {
    pub max_clusters: usize,
    pub output_track_clusters: usize,
    pub output_tracks: usize,
    queries: AtomicUsize,
}

impl MockMerger {
    pub fn new(max_clusters: usize, output_track_clusters: usize, output_tracks: usize) -> Self {
        Self {
            max_clusters,
            output_track_clusters,
            output_tracks,
            queries: AtomicUsize::new(0),
        }
    }

    /// Number of times `n_max_clusters` was read.
    pub fn queries(&self) -> usize {
        self.queries.load(Ordering::Relaxed)
    }

    /// Reset the query counter.
    pub fn reset(&self) {
        self.queries.store(0, Ordering::Relaxed);
    }
}

impl Default for MockMerger {
    fn default() -> Self {
        Self::new(0, 0, 0)
    }
}

impl MergerOutput for MockMerger {
    fn n_max_clusters(&self) -> usize {
        self.queries.fetch_add(1, Ordering::Relaxed);
        self.max_clusters
    }

    fn n_output_track_clusters(&self) -> usize {
        self.output_track_clusters
    }

    fn n_output_tracks(&self) -> usize {
        self.output_tracks
    }
}
