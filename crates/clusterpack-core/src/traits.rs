//! Boundary traits towards external collaborators.

/// Result counts reported by the upstream track merger.
///
/// Implemented by whatever owns the merger output; the compression core
/// only reads these three bounds when sizing an event.
pub trait MergerOutput {
    /// Upper bound on the number of clusters in the event.
    fn n_max_clusters(&self) -> usize;

    /// Upper bound on clusters referenced by output tracks.
    fn n_output_track_clusters(&self) -> usize;

    /// Upper bound on the number of output tracks.
    fn n_output_tracks(&self) -> usize;
}
