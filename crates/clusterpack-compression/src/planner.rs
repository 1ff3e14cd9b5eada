//! Region planner.
//!
//! The [`CompressionPlanner`] owns the four regions of cluster
//! compression and the sizing function of each. Per event it:
//!
//! 1. captures the capacity estimate and the [`ModeGate`]
//!    ([`CompressionPlanner::set_max_data`]),
//! 2. lets the registry place the pooled regions, which calls back into
//!    [`CompressionPlanner::size_scratch`] and
//!    [`CompressionPlanner::size_output`] (and, once per session,
//!    [`CompressionPlanner::size_permanent`]),
//! 3. after encoding, takes the exact counts
//!    ([`CompressionPlanner::set_output_counts`]) and places the
//!    host-readable output through [`CompressionPlanner::size_output_host`].
//!
//! [`CompressionPlanner::prepare_event`] and
//! [`CompressionPlanner::finalize_output`] bundle steps 1-2 and step 3.

use tracing::{debug, info};

use clusterpack_arena::{Cursor, MemoryRegistry, RegionTag, SizingFn, Span};
use clusterpack_core::{
    ClusterCounts, CompressionConfig, CompressionModes, ElementType, EventId, MergerOutput,
    RegionId,
};

use crate::capacity::estimate_capacity;
use crate::error::LayoutError;
use crate::gate::ModeGate;
use crate::output::{CompressedClustersHeader, CompressionMemory, OutputCounts};
use crate::schema::{layout_cluster_fields, SchemaHandles};

/// Registry specialised to the planner's sizing functions.
pub type CompressionRegistry = MemoryRegistry<CompressionPlanner, LayoutError>;

/// The regions of cluster compression, in registration order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CompressionRegion {
    /// Host-readable reduced schema at exact counts.
    OutputHost,
    /// Device-resident first attached cluster index per track.
    Output,
    /// Working memory: cluster status, full schema, sort buffer.
    Scratch,
    /// Session bookkeeping record.
    Permanent,
}

impl CompressionRegion {
    /// Every region, in the order they are registered.
    pub const ALL: [Self; 4] = [Self::OutputHost, Self::Output, Self::Scratch, Self::Permanent];

    /// Name the region is registered under.
    pub fn name(&self) -> &'static str {
        match self {
            Self::OutputHost => "ClusterCompressionOutputHost",
            Self::Output => "ClusterCompressionOutput",
            Self::Scratch => "ClusterCompressionScratch",
            Self::Permanent => "ClusterCompressionMemory",
        }
    }

    /// Allocator tag of the region.
    pub fn tag(&self) -> RegionTag {
        match self {
            Self::OutputHost => RegionTag::OutputHostCustom,
            Self::Output => RegionTag::Output,
            Self::Scratch => RegionTag::Scratch,
            Self::Permanent => RegionTag::Permanent,
        }
    }

    /// Sizing function the allocator calls for the region.
    pub fn sizer(&self) -> SizingFn<CompressionPlanner, LayoutError> {
        match self {
            Self::OutputHost => CompressionPlanner::size_output_host,
            Self::Output => CompressionPlanner::size_output,
            Self::Scratch => CompressionPlanner::size_scratch,
            Self::Permanent => CompressionPlanner::size_permanent,
        }
    }
}

/// Ids handed out by the registry for each region.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RegionIds {
    /// `ClusterCompressionOutputHost`.
    pub output_host: RegionId,
    /// `ClusterCompressionOutput`.
    pub output: RegionId,
    /// `ClusterCompressionScratch`.
    pub scratch: RegionId,
    /// `ClusterCompressionMemory`.
    pub permanent: RegionId,
}

impl RegionIds {
    /// Id of the given region.
    pub fn get(&self, region: CompressionRegion) -> RegionId {
        match region {
            CompressionRegion::OutputHost => self.output_host,
            CompressionRegion::Output => self.output,
            CompressionRegion::Scratch => self.scratch,
            CompressionRegion::Permanent => self.permanent,
        }
    }
}

/// Field spans of the scratch region.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ScratchLayout {
    /// One status byte per cluster, `max_clusters` entries.
    pub cluster_status: Span,
    /// Full (non-reduced) schema at capacity.
    pub schema: SchemaHandles,
    /// Per-unit row staging buffer.
    pub sort_buffer: Span,
}

/// What [`CompressionPlanner::set_max_data`] captured for the event.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct EventPlan {
    id: EventId,
    capacity: ClusterCounts,
    gate: ModeGate,
    modes: CompressionModes,
}

/// Owner of the compression regions and their sizing functions.
#[derive(Debug)]
pub struct CompressionPlanner {
    config: CompressionConfig,
    sort_buffer_len: usize,
    next_event: EventId,
    plan: Option<EventPlan>,
    output_counts: Option<OutputCounts>,
    regions: Option<RegionIds>,
    memory: Option<Span>,
    scratch: Option<ScratchLayout>,
    first_index: Option<Span>,
    output_host: Option<SchemaHandles>,
}

impl CompressionPlanner {
    /// Create a planner for a validated configuration.
    pub fn new(config: CompressionConfig) -> Result<Self, LayoutError> {
        config.validate()?;
        let sort_buffer_len = config.sort_buffer_len()?;
        Ok(Self {
            config,
            sort_buffer_len,
            next_event: EventId(0),
            plan: None,
            output_counts: None,
            regions: None,
            memory: None,
            scratch: None,
            first_index: None,
            output_host: None,
        })
    }

    /// Replace the configuration. Takes effect at the next
    /// [`CompressionPlanner::set_max_data`]; the current event keeps the
    /// gate and modes it captured.
    pub fn update_config(&mut self, config: CompressionConfig) -> Result<(), LayoutError> {
        config.validate()?;
        self.sort_buffer_len = config.sort_buffer_len()?;
        self.config = config;
        Ok(())
    }

    /// Register the four regions with the allocator.
    pub fn register(
        &mut self,
        registry: &mut CompressionRegistry,
    ) -> Result<RegionIds, LayoutError> {
        let mut ids = [RegionId(0); 4];
        for (slot, region) in ids.iter_mut().zip(CompressionRegion::ALL) {
            *slot = registry.register(region.name(), region.tag(), region.sizer())?;
        }
        let [output_host, output, scratch, permanent] = ids;
        let ids = RegionIds {
            output_host,
            output,
            scratch,
            permanent,
        };
        self.regions = Some(ids);
        Ok(ids)
    }

    /// Start a new event: estimate capacity from the merger bounds and
    /// capture the mode gate.
    ///
    /// Layouts of the previous event are forgotten; the permanent record
    /// is kept.
    pub fn set_max_data<M: MergerOutput + ?Sized>(
        &mut self,
        merger: &M,
    ) -> Result<ClusterCounts, LayoutError> {
        let capacity = estimate_capacity(merger)?;
        let gate = ModeGate::capture(&self.config);
        let id = self.next_event;
        self.next_event = id.next();
        self.plan = Some(EventPlan {
            id,
            capacity,
            gate,
            modes: self.config.modes,
        });
        self.output_counts = None;
        self.scratch = None;
        self.first_index = None;
        self.output_host = None;
        info!(
            event = id.0,
            max_clusters = capacity.max_clusters,
            max_track_clusters = capacity.max_track_clusters,
            max_tracks = capacity.max_tracks,
            track_model = gate.track_model(),
            "planned event"
        );
        Ok(capacity)
    }

    fn plan(&self) -> Result<EventPlan, LayoutError> {
        self.plan.ok_or(LayoutError::NotPlanned {
            what: "capacity estimate",
        })
    }

    /// Sizing function of `ClusterCompressionMemory`.
    pub fn size_permanent(&mut self, cursor: &mut Cursor) -> Result<(), LayoutError> {
        self.memory = Some(cursor.alloc(CompressionMemory::ELEMENT, 1)?);
        Ok(())
    }

    /// Sizing function of `ClusterCompressionScratch`.
    ///
    /// Cluster status bytes, then the full schema at capacity (residuals
    /// sized `max_track_clusters`), then the sort buffer.
    pub fn size_scratch(&mut self, cursor: &mut Cursor) -> Result<(), LayoutError> {
        let plan = self.plan()?;
        let cluster_status = cursor.alloc(ElementType::U8, plan.capacity.max_clusters)?;
        let schema = layout_cluster_fields(
            cursor,
            plan.capacity.scratch_schema(),
            false,
            plan.gate,
            &self.config.encoding,
        )?;
        let sort_buffer = cursor.alloc(ElementType::U32, self.sort_buffer_len)?;
        self.scratch = Some(ScratchLayout {
            cluster_status,
            schema,
            sort_buffer,
        });
        Ok(())
    }

    /// Sizing function of `ClusterCompressionOutput`.
    ///
    /// One first-index entry per `max_track_clusters`, whatever the gate.
    pub fn size_output(&mut self, cursor: &mut Cursor) -> Result<(), LayoutError> {
        let plan = self.plan()?;
        self.first_index = Some(cursor.alloc(
            ElementType::U32,
            plan.capacity.max_track_clusters,
        )?);
        Ok(())
    }

    /// Sizing function of `ClusterCompressionOutputHost`.
    ///
    /// Reduced schema at the exact counts given to
    /// [`CompressionPlanner::set_output_counts`].
    pub fn size_output_host(&mut self, cursor: &mut Cursor) -> Result<(), LayoutError> {
        let plan = self.plan()?;
        let counts = self.output_counts.ok_or(LayoutError::NotPlanned {
            what: "output counts",
        })?;
        let schema = layout_cluster_fields(
            cursor,
            counts.schema_counts(),
            true,
            plan.gate,
            &self.config.encoding,
        )?;
        self.output_host = Some(schema);
        Ok(())
    }

    /// Record the exact counts produced by the encoder.
    ///
    /// Counts are passed through the event's gate first (see
    /// [`OutputCounts::new`]) and then checked against the capacity
    /// estimate.
    ///
    /// # Errors
    ///
    /// [`LayoutError::OccupancyExceeded`] if a count exceeds the estimate,
    /// [`LayoutError::InvalidCounts`] if there are more tracks than
    /// attached clusters.
    pub fn set_output_counts(
        &mut self,
        n_attached: usize,
        n_tracks: usize,
        n_unattached: usize,
    ) -> Result<OutputCounts, LayoutError> {
        let plan = self.plan()?;
        let counts = OutputCounts::new(n_attached, n_tracks, n_unattached, plan.gate)?;
        let capacity = plan.capacity;
        let checks = [
            ("n_clusters", counts.n_clusters()?, capacity.max_clusters),
            ("n_attached", counts.n_attached, capacity.max_track_clusters),
            ("n_tracks", counts.n_tracks, capacity.max_tracks),
        ];
        for (what, count, bound) in checks {
            if count > bound {
                return Err(LayoutError::OccupancyExceeded {
                    what,
                    count,
                    capacity: bound,
                });
            }
        }
        if counts.n_tracks > counts.n_attached {
            return Err(LayoutError::InvalidCounts {
                n_attached: counts.n_attached,
                n_tracks: counts.n_tracks,
            });
        }
        debug!(
            event = plan.id.0,
            n_attached = counts.n_attached,
            n_tracks = counts.n_tracks,
            n_unattached = counts.n_unattached,
            "output counts set"
        );
        self.output_counts = Some(counts);
        Ok(counts)
    }

    fn region_ids(&self) -> Result<RegionIds, LayoutError> {
        self.regions.ok_or(LayoutError::NotPlanned {
            what: "region registration",
        })
    }

    /// Forget every layout whose region has no placement in `registry`.
    ///
    /// Sizing functions also record spans during the measuring pass, so a
    /// failed reservation can leave spans behind that point at nothing.
    fn drop_unplaced(&mut self, registry: &CompressionRegistry, ids: RegionIds) {
        if registry.placement(ids.permanent).is_none() {
            self.memory = None;
        }
        if registry.placement(ids.scratch).is_none() {
            self.scratch = None;
        }
        if registry.placement(ids.output).is_none() {
            self.first_index = None;
        }
        if registry.placement(ids.output_host).is_none() {
            self.output_host = None;
        }
    }

    /// Begin an event on `registry` and place the pooled regions.
    ///
    /// The capacity estimate is taken before the registry drops the
    /// previous event, so a rejected estimate leaves that event intact.
    /// The permanent region is placed on the first call only.
    pub fn prepare_event<M: MergerOutput + ?Sized>(
        &mut self,
        registry: &mut CompressionRegistry,
        merger: &M,
    ) -> Result<ClusterCounts, LayoutError> {
        let ids = self.region_ids()?;
        let capacity = self.set_max_data(merger)?;
        registry.begin_event();
        if let Err(e) = registry.allocate_pooled(self) {
            self.drop_unplaced(registry, ids);
            return Err(e);
        }
        Ok(capacity)
    }

    /// Take the exact counts, place the host-readable output and store
    /// the bookkeeping record.
    pub fn finalize_output(
        &mut self,
        registry: &mut CompressionRegistry,
        n_attached: usize,
        n_tracks: usize,
        n_unattached: usize,
    ) -> Result<CompressedClustersHeader, LayoutError> {
        let ids = self.region_ids()?;
        self.set_output_counts(n_attached, n_tracks, n_unattached)?;
        if let Err(e) = registry.allocate_custom(ids.output_host, self) {
            self.drop_unplaced(registry, ids);
            return Err(e);
        }
        self.store_bookkeeping(registry)?;
        self.header()
    }

    /// Write the current output counts into the permanent region.
    pub fn store_bookkeeping(&self, registry: &mut CompressionRegistry) -> Result<(), LayoutError> {
        let ids = self.region_ids()?;
        let span = self.memory.ok_or(LayoutError::NotPlanned {
            what: "permanent region",
        })?;
        let counts = self.output_counts.ok_or(LayoutError::NotPlanned {
            what: "output counts",
        })?;
        let record = CompressionMemory::from_output(counts)?;
        registry
            .span_bytes_mut(ids.permanent, &span)?
            .copy_from_slice(&record.to_bytes());
        debug!(
            tracks = record.n_stored_tracks,
            attached = record.n_stored_attached_clusters,
            unattached = record.n_stored_unattached_clusters,
            "stored bookkeeping"
        );
        Ok(())
    }

    /// Read the bookkeeping record back from the permanent region.
    pub fn read_bookkeeping(
        &self,
        registry: &CompressionRegistry,
    ) -> Result<CompressionMemory, LayoutError> {
        let ids = self.region_ids()?;
        let span = self.memory.ok_or(LayoutError::NotPlanned {
            what: "permanent region",
        })?;
        let bytes = registry.span_bytes(ids.permanent, &span)?;
        CompressionMemory::from_bytes(bytes).ok_or(LayoutError::NotPlanned {
            what: "permanent region",
        })
    }

    /// Header describing the current event's output.
    pub fn header(&self) -> Result<CompressedClustersHeader, LayoutError> {
        let plan = self.plan()?;
        let counts = self.output_counts.ok_or(LayoutError::NotPlanned {
            what: "output counts",
        })?;
        CompressedClustersHeader::new(counts, plan.modes)
    }

    /// The configuration new events are planned with.
    pub fn config(&self) -> &CompressionConfig {
        &self.config
    }

    /// Id of the current event, if one was planned.
    pub fn event(&self) -> Option<EventId> {
        self.plan.map(|p| p.id)
    }

    /// Capacity estimate of the current event.
    pub fn capacity(&self) -> Option<ClusterCounts> {
        self.plan.map(|p| p.capacity)
    }

    /// Gate captured for the current event.
    pub fn gate(&self) -> Option<ModeGate> {
        self.plan.map(|p| p.gate)
    }

    /// Exact counts of the current event, once set.
    pub fn output_counts(&self) -> Option<OutputCounts> {
        self.output_counts
    }

    /// Entries of the sort buffer.
    pub fn sort_buffer_len(&self) -> usize {
        self.sort_buffer_len
    }

    /// Ids of the registered regions.
    pub fn regions(&self) -> Option<RegionIds> {
        self.regions
    }

    /// Span of the bookkeeping record.
    pub fn memory_span(&self) -> Option<Span> {
        self.memory
    }

    /// Scratch layout of the current event.
    pub fn scratch(&self) -> Option<&ScratchLayout> {
        self.scratch.as_ref()
    }

    /// First-index table of the current event.
    pub fn first_index(&self) -> Option<Span> {
        self.first_index
    }

    /// Host-readable schema of the current event.
    pub fn output_host(&self) -> Option<&SchemaHandles> {
        self.output_host.as_ref()
    }
}
