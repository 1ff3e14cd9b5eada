//! Region registration and placement.
//!
//! The [`MemoryRegistry`] is the allocator-side view of every region:
//! a name, a [`RegionTag`] and a sizing function. It uses `IndexMap`
//! (not `HashMap`) so that regions are always placed in registration
//! order, which keeps offsets reproducible across runs.
//!
//! Placing a region runs its sizing function twice: once on a cursor at
//! offset 0 to measure the size, and once on a cursor at the real base
//! offset once memory has been reserved. The owner stores the spans it
//! receives in the second pass.

use indexmap::IndexMap;
use smallvec::SmallVec;
use tracing::debug;

use clusterpack_core::RegionId;

use crate::config::ArenaConfig;
use crate::cursor::Cursor;
use crate::error::ArenaError;
use crate::handle::{Placement, Span};
use crate::pool::MemoryPool;
use crate::resource::{Lifetime, RegionTag, Residency};

/// Sizing callback: lay out the region's fields on the cursor.
///
/// Must be deterministic for a given owner state: the measuring and the
/// placing pass have to consume exactly the same number of bytes.
pub type SizingFn<P, E> = fn(&mut P, &mut Cursor) -> Result<(), E>;

struct RegionEntry<P, E> {
    name: String,
    tag: RegionTag,
    sizer: SizingFn<P, E>,
    placement: Option<Placement>,
}

/// Registry of regions plus the pools that back them.
///
/// `P` is the owner whose sizing functions are registered; `E` is the
/// owner's error type, which must absorb [`ArenaError`].
pub struct MemoryRegistry<P, E> {
    config: ArenaConfig,
    regions: IndexMap<RegionId, RegionEntry<P, E>>,
    device: MemoryPool,
    host: MemoryPool,
    /// Backing storage of custom regions, one buffer each.
    custom: IndexMap<RegionId, Vec<u8>>,
}

impl<P, E: From<ArenaError>> MemoryRegistry<P, E> {
    /// Create a registry with freshly allocated pools.
    pub fn new(config: ArenaConfig) -> Result<Self, ArenaError> {
        config.validate()?;
        Ok(Self {
            device: MemoryPool::new(Residency::Device, config.device_capacity),
            host: MemoryPool::new(Residency::Host, config.host_capacity),
            config,
            regions: IndexMap::new(),
            custom: IndexMap::new(),
        })
    }

    /// Register a region. Memory is not reserved until placement.
    ///
    /// Fails with [`ArenaError::TooManyRegions`] once ids no longer fit
    /// a `u32`.
    pub fn register(
        &mut self,
        name: impl Into<String>,
        tag: RegionTag,
        sizer: SizingFn<P, E>,
    ) -> Result<RegionId, ArenaError> {
        let id = region_id(self.regions.len())?;
        let name = name.into();
        debug!(region = %name, %tag, id = id.0, "registered region");
        self.regions.insert(
            id,
            RegionEntry {
                name,
                tag,
                sizer,
                placement: None,
            },
        );
        Ok(id)
    }

    /// Drop every per-event placement and release custom buffers.
    /// Session regions keep their memory.
    pub fn begin_event(&mut self) {
        self.device.reset_event();
        self.host.reset_event();
        self.custom.clear();
        for entry in self.regions.values_mut() {
            if entry.tag.lifetime() == Lifetime::Event {
                entry.placement = None;
            }
        }
    }

    /// Place every pooled region that has no placement yet.
    ///
    /// Session regions are placed before event regions so that they sit
    /// below the permanent watermark. Custom regions are skipped; they
    /// are placed with [`MemoryRegistry::allocate_custom`] once their
    /// size is known. Returns the ids placed by this call.
    pub fn allocate_pooled(&mut self, owner: &mut P) -> Result<SmallVec<[RegionId; 4]>, E> {
        let mut placed = SmallVec::new();
        for lifetime in [Lifetime::Session, Lifetime::Event] {
            let pending: SmallVec<[RegionId; 4]> = self
                .regions
                .iter()
                .filter(|(_, e)| {
                    !e.tag.is_custom() && e.tag.lifetime() == lifetime && e.placement.is_none()
                })
                .map(|(&id, _)| id)
                .collect();
            for id in pending {
                self.place(id, owner)?;
                placed.push(id);
            }
        }
        Ok(placed)
    }

    /// Place a custom region in its own exactly-sized buffer.
    pub fn allocate_custom(&mut self, region: RegionId, owner: &mut P) -> Result<Placement, E> {
        let entry = self.entry(region)?;
        if !entry.tag.is_custom() {
            return Err(ArenaError::WrongResidency { region }.into());
        }
        self.place(region, owner)
    }

    fn place(&mut self, region: RegionId, owner: &mut P) -> Result<Placement, E> {
        let min_alignment = self.config.min_alignment;
        let (tag, sizer) = {
            let entry = self.entry(region)?;
            (entry.tag, entry.sizer)
        };

        let mut probe = Cursor::new(0, min_alignment);
        sizer(owner, &mut probe)?;
        let size = probe.position();
        let align = probe.max_alignment();

        let base = if tag.is_custom() {
            self.custom.insert(region, vec![0; size]);
            0
        } else {
            let pool = match tag.residency() {
                Residency::Device => &mut self.device,
                Residency::Host => &mut self.host,
            };
            match tag.lifetime() {
                Lifetime::Session => pool.reserve_permanent(size, align)?,
                Lifetime::Event => pool.reserve_event(size, align)?,
            }
        };

        let mut cursor = Cursor::new(base, min_alignment);
        sizer(owner, &mut cursor)?;
        let used = cursor.position() - base;
        if used != size {
            return Err(ArenaError::SizeMismatch {
                region,
                measured: size,
                placed: used,
            }
            .into());
        }

        let placement = Placement {
            residency: tag.residency(),
            base,
            size,
        };
        let entry = self
            .regions
            .get_mut(&region)
            .ok_or(ArenaError::UnknownRegion { region })?;
        entry.placement = Some(placement);
        debug!(region = %entry.name, %tag, base, bytes = size, "placed region");
        Ok(placement)
    }

    fn entry(&self, region: RegionId) -> Result<&RegionEntry<P, E>, ArenaError> {
        self.regions
            .get(&region)
            .ok_or(ArenaError::UnknownRegion { region })
    }

    /// Look up a region by its registered name.
    pub fn find(&self, name: &str) -> Option<RegionId> {
        self.regions
            .iter()
            .find(|(_, e)| e.name == name)
            .map(|(&id, _)| id)
    }

    /// Registered name of a region.
    pub fn name(&self, region: RegionId) -> Option<&str> {
        self.regions.get(&region).map(|e| e.name.as_str())
    }

    /// Registered tag of a region.
    pub fn tag(&self, region: RegionId) -> Option<RegionTag> {
        self.regions.get(&region).map(|e| e.tag)
    }

    /// Current placement of a region, if it has one.
    pub fn placement(&self, region: RegionId) -> Option<Placement> {
        self.regions.get(&region).and_then(|e| e.placement)
    }

    /// Iterate over `(id, name, tag)` in registration order.
    pub fn regions(&self) -> impl Iterator<Item = (RegionId, &str, RegionTag)> {
        self.regions
            .iter()
            .map(|(&id, e)| (id, e.name.as_str(), e.tag))
    }

    /// Bytes of a placed region.
    pub fn region_bytes(&self, region: RegionId) -> Result<&[u8], ArenaError> {
        let placement = self.placed(region)?;
        self.backing(region, placement.residency)
            .and_then(|data| data.get(placement.base..placement.end()))
            .ok_or(ArenaError::NotAllocated { region })
    }

    /// Bytes of one field inside a placed region.
    pub fn span_bytes(&self, region: RegionId, span: &Span) -> Result<&[u8], ArenaError> {
        let placement = self.placed(region)?;
        if !placement.contains(span) {
            return Err(ArenaError::SpanOutOfBounds {
                region,
                offset: span.offset(),
                bytes: span.bytes(),
            });
        }
        self.backing(region, placement.residency)
            .and_then(|data| data.get(span.byte_range()))
            .ok_or(ArenaError::NotAllocated { region })
    }

    /// Mutable bytes of one field inside a placed region.
    pub fn span_bytes_mut(&mut self, region: RegionId, span: &Span) -> Result<&mut [u8], ArenaError> {
        let placement = self.placed(region)?;
        if !placement.contains(span) {
            return Err(ArenaError::SpanOutOfBounds {
                region,
                offset: span.offset(),
                bytes: span.bytes(),
            });
        }
        let data = match self.custom.get_mut(&region) {
            Some(buf) => buf.get_mut(span.byte_range()),
            None => match placement.residency {
                Residency::Device => self.device.bytes_mut(span.offset(), span.bytes()),
                Residency::Host => self.host.bytes_mut(span.offset(), span.bytes()),
            },
        };
        data.ok_or(ArenaError::NotAllocated { region })
    }

    fn placed(&self, region: RegionId) -> Result<Placement, ArenaError> {
        self.entry(region)?
            .placement
            .ok_or(ArenaError::NotAllocated { region })
    }

    /// Whole backing store the region's offsets are relative to.
    fn backing(&self, region: RegionId, residency: Residency) -> Option<&[u8]> {
        if let Some(buf) = self.custom.get(&region) {
            return Some(buf.as_slice());
        }
        let pool = match residency {
            Residency::Device => &self.device,
            Residency::Host => &self.host,
        };
        pool.bytes(0, pool.capacity())
    }

    /// Pool backing the given residency.
    pub fn pool(&self, residency: Residency) -> &MemoryPool {
        match residency {
            Residency::Device => &self.device,
            Residency::Host => &self.host,
        }
    }

    /// Total bytes held by custom regions.
    pub fn custom_bytes(&self) -> usize {
        self.custom.values().map(Vec::len).sum()
    }

    /// The configuration the registry was built with.
    pub fn config(&self) -> &ArenaConfig {
        &self.config
    }
}

/// Id of the region registered at `index`.
fn region_id(index: usize) -> Result<RegionId, ArenaError> {
    u32::try_from(index)
        .map(RegionId)
        .map_err(|_| ArenaError::TooManyRegions { registered: index })
}

#[cfg(test)]
mod tests {
    use super::*;
    use clusterpack_core::ElementType;

    /// Minimal owner: lays out `len` u32 elements per region.
    #[derive(Default)]
    struct Owner {
        len: usize,
        last: Option<Span>,
        calls: usize,
    }

    fn size_fixed(owner: &mut Owner, cursor: &mut Cursor) -> Result<(), ArenaError> {
        owner.calls += 1;
        owner.last = Some(cursor.alloc(ElementType::U32, owner.len)?);
        Ok(())
    }

    fn size_bookkeeping(owner: &mut Owner, cursor: &mut Cursor) -> Result<(), ArenaError> {
        owner.calls += 1;
        cursor.alloc(ElementType::Record { size: 12, align: 4 }, 1)?;
        Ok(())
    }

    fn size_unstable(owner: &mut Owner, cursor: &mut Cursor) -> Result<(), ArenaError> {
        owner.calls += 1;
        cursor.alloc(ElementType::U8, owner.calls)?;
        Ok(())
    }

    fn small_registry() -> MemoryRegistry<Owner, ArenaError> {
        MemoryRegistry::new(ArenaConfig::new(4096, 1024)).unwrap()
    }

    #[test]
    #[cfg(target_pointer_width = "64")]
    fn region_ids_past_u32_rejected() {
        assert_eq!(region_id(7), Ok(RegionId(7)));
        assert_eq!(region_id(u32::MAX as usize), Ok(RegionId(u32::MAX)));
        let past = u32::MAX as usize + 1;
        assert_eq!(
            region_id(past),
            Err(ArenaError::TooManyRegions { registered: past })
        );
    }

    #[test]
    fn register_assigns_sequential_ids() {
        let mut reg = small_registry();
        let a = reg.register("a", RegionTag::Scratch, size_fixed).unwrap();
        let b = reg.register("b", RegionTag::Output, size_fixed).unwrap();
        assert_eq!(a, RegionId(0));
        assert_eq!(b, RegionId(1));
        assert_eq!(reg.find("b"), Some(b));
        assert_eq!(reg.name(a), Some("a"));
        assert_eq!(reg.tag(b), Some(RegionTag::Output));
        assert!(reg.placement(a).is_none());
    }

    #[test]
    fn sizing_runs_twice_and_stores_absolute_span() {
        let mut reg = small_registry();
        let mut owner = Owner {
            len: 10,
            ..Owner::default()
        };
        reg.register("perm", RegionTag::Permanent, size_bookkeeping).unwrap();
        let scratch = reg.register("scratch", RegionTag::Scratch, size_fixed).unwrap();
        reg.allocate_pooled(&mut owner).unwrap();
        assert_eq!(owner.calls, 4);
        let placement = reg.placement(scratch).unwrap();
        assert_eq!(placement.base, 64);
        assert_eq!(placement.size, 40);
        assert_eq!(owner.last.unwrap().offset(), 64);
    }

    #[test]
    fn permanent_placed_before_event_regions() {
        let mut reg = small_registry();
        let mut owner = Owner {
            len: 4,
            ..Owner::default()
        };
        let scratch = reg.register("scratch", RegionTag::Scratch, size_fixed).unwrap();
        let perm = reg.register("perm", RegionTag::Permanent, size_bookkeeping).unwrap();
        let placed = reg.allocate_pooled(&mut owner).unwrap();
        assert_eq!(placed.as_slice(), &[perm, scratch]);
        assert_eq!(reg.placement(perm).unwrap().base, 0);
    }

    #[test]
    fn begin_event_keeps_permanent_placement() {
        let mut reg = small_registry();
        let mut owner = Owner {
            len: 4,
            ..Owner::default()
        };
        let perm = reg.register("perm", RegionTag::Permanent, size_bookkeeping).unwrap();
        let scratch = reg.register("scratch", RegionTag::Scratch, size_fixed).unwrap();
        reg.allocate_pooled(&mut owner).unwrap();
        let before = reg.placement(perm).unwrap();

        reg.begin_event();
        assert_eq!(reg.placement(perm), Some(before));
        assert!(reg.placement(scratch).is_none());

        let placed = reg.allocate_pooled(&mut owner).unwrap();
        assert_eq!(placed.as_slice(), &[scratch]);
        assert_eq!(reg.pool(Residency::Device).permanent_bytes(), 12);
    }

    #[test]
    fn custom_regions_are_skipped_by_pooled_allocation() {
        let mut reg = small_registry();
        let mut owner = Owner {
            len: 3,
            ..Owner::default()
        };
        let host = reg.register("host", RegionTag::OutputHostCustom, size_fixed).unwrap();
        let placed = reg.allocate_pooled(&mut owner).unwrap();
        assert!(placed.is_empty());
        assert!(reg.placement(host).is_none());

        let placement = reg.allocate_custom(host, &mut owner).unwrap();
        assert_eq!(placement.base, 0);
        assert_eq!(placement.size, 12);
        assert_eq!(reg.custom_bytes(), 12);
        assert_eq!(reg.pool(Residency::Host).used(), 0);

        reg.begin_event();
        assert_eq!(reg.custom_bytes(), 0);
        assert!(reg.placement(host).is_none());
    }

    #[test]
    fn allocate_custom_rejects_pooled_region() {
        let mut reg = small_registry();
        let mut owner = Owner::default();
        let scratch = reg.register("scratch", RegionTag::Scratch, size_fixed).unwrap();
        assert_eq!(
            reg.allocate_custom(scratch, &mut owner),
            Err(ArenaError::WrongResidency { region: scratch })
        );
    }

    #[test]
    fn pool_exhaustion_propagates() {
        let mut reg = small_registry();
        let mut owner = Owner {
            len: 2000,
            ..Owner::default()
        };
        reg.register("scratch", RegionTag::Scratch, size_fixed).unwrap();
        let result = reg.allocate_pooled(&mut owner);
        assert!(matches!(
            result,
            Err(ArenaError::CapacityExceeded {
                residency: Residency::Device,
                requested: 8000,
                ..
            })
        ));
    }

    #[test]
    fn nondeterministic_sizer_detected() {
        let mut reg = small_registry();
        let mut owner = Owner::default();
        let id = reg.register("unstable", RegionTag::Scratch, size_unstable).unwrap();
        let result = reg.allocate_pooled(&mut owner);
        assert_eq!(
            result,
            Err(ArenaError::SizeMismatch {
                region: id,
                measured: 1,
                placed: 2,
            })
        );
    }

    #[test]
    fn span_bytes_are_bounds_checked() {
        let mut reg = small_registry();
        let mut owner = Owner {
            len: 4,
            ..Owner::default()
        };
        let scratch = reg.register("scratch", RegionTag::Scratch, size_fixed).unwrap();
        reg.allocate_pooled(&mut owner).unwrap();
        let span = owner.last.unwrap();
        reg.span_bytes_mut(scratch, &span).unwrap().fill(0xab);
        assert!(reg.span_bytes(scratch, &span).unwrap().iter().all(|&b| b == 0xab));
        assert_eq!(reg.region_bytes(scratch).unwrap().len(), 16);

        let outside = Span::new(span.end(), 1, ElementType::U32);
        assert!(matches!(
            reg.span_bytes(scratch, &outside),
            Err(ArenaError::SpanOutOfBounds { .. })
        ));
    }

    #[test]
    fn unplaced_and_unknown_regions() {
        let mut reg = small_registry();
        let id = reg.register("scratch", RegionTag::Scratch, size_fixed).unwrap();
        assert_eq!(
            reg.region_bytes(id),
            Err(ArenaError::NotAllocated { region: id })
        );
        assert_eq!(
            reg.region_bytes(RegionId(9)),
            Err(ArenaError::UnknownRegion {
                region: RegionId(9)
            })
        );
    }

    #[test]
    fn invalid_config_rejected() {
        let config = ArenaConfig {
            min_alignment: 3,
            ..ArenaConfig::new(64, 64)
        };
        assert!(MemoryRegistry::<Owner, ArenaError>::new(config).is_err());
    }
}
