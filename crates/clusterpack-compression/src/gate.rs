//! Track-model mode gate.
//!
//! The gate is captured from the configuration once at event setup and
//! passed by value into every layout of that event. Holding a `Copy`
//! value instead of re-reading the configuration means the scratch and
//! output layouts of one event cannot disagree about the track model.

use clusterpack_core::{CompressionConfig, FieldExtent};

/// Whether track-model (attached cluster) fields exist for an event.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ModeGate {
    track_model: bool,
}

impl ModeGate {
    /// Gate with track-model compression enabled.
    pub const TRACK_MODEL: Self = Self { track_model: true };

    /// Gate with track-model compression disabled: every cluster is
    /// unattached.
    pub const UNATTACHED_ONLY: Self = Self { track_model: false };

    /// Read the flag from the configuration.
    pub fn capture(config: &CompressionConfig) -> Self {
        Self {
            track_model: config.track_model_enabled(),
        }
    }

    /// Whether track-model compression is enabled.
    pub fn track_model(&self) -> bool {
        self.track_model
    }

    /// Whether fields of the given extent are allocated under this gate.
    pub fn admits(&self, extent: FieldExtent) -> bool {
        self.track_model || !extent.requires_track_model()
    }
}
