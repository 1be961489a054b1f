use foundation::handles::Handle;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ResourceId(pub Handle);

impl ResourceId {
    pub fn index(&self) -> u32 {
        self.0.index()
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ResourceKind {
    Geometry,
    Material,
    Texture,
}

/// What a resource belongs to; groups are released together.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ResourceGroup {
    Globe,
    Markers,
    Selection,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceEntry {
    pub kind: ResourceKind,
    pub group: ResourceGroup,
    pub label: String,
}

#[derive(Debug, Default)]
struct Slot {
    generation: u32,
    entry: Option<ResourceEntry>,
}

/// Registry of GPU-side objects a session created.
///
/// Ids are generational: once released, an id never matches again even if
/// its slot is reused.
#[derive(Debug, Default)]
pub struct ResourceRegistry {
    slots: Vec<Slot>,
    free: Vec<u32>,
    live: usize,
}

impl ResourceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn create(
        &mut self,
        kind: ResourceKind,
        group: ResourceGroup,
        label: impl Into<String>,
    ) -> ResourceId {
        let entry = ResourceEntry {
            kind,
            group,
            label: label.into(),
        };
        let index = match self.free.pop() {
            Some(index) => index,
            None => {
                self.slots.push(Slot::default());
                (self.slots.len() - 1) as u32
            }
        };
        let slot = &mut self.slots[index as usize];
        slot.entry = Some(entry);
        self.live += 1;
        ResourceId(Handle::new(index, slot.generation))
    }

    pub fn get(&self, id: ResourceId) -> Option<&ResourceEntry> {
        let slot = self.slots.get(id.index() as usize)?;
        if slot.generation != id.0.generation() {
            return None;
        }
        slot.entry.as_ref()
    }

    pub fn is_live(&self, id: ResourceId) -> bool {
        self.get(id).is_some()
    }

    /// Release one resource. Returns false for stale or unknown ids.
    pub fn release(&mut self, id: ResourceId) -> bool {
        let Some(slot) = self.slots.get_mut(id.index() as usize) else {
            return false;
        };
        if slot.generation != id.0.generation() || slot.entry.is_none() {
            return false;
        }
        self.free_slot(id.index());
        true
    }

    /// Release every resource of `group`; returns how many were released.
    pub fn release_group(&mut self, group: ResourceGroup) -> usize {
        let doomed: Vec<u32> = self
            .slots
            .iter()
            .enumerate()
            .filter(|(_, s)| s.entry.as_ref().is_some_and(|e| e.group == group))
            .map(|(i, _)| i as u32)
            .collect();
        for index in &doomed {
            self.free_slot(*index);
        }
        doomed.len()
    }

    pub fn release_all(&mut self) -> usize {
        let released = self.live;
        for index in 0..self.slots.len() as u32 {
            if self.slots[index as usize].entry.is_some() {
                self.free_slot(index);
            }
        }
        released
    }

    pub fn live_count(&self) -> usize {
        self.live
    }

    pub fn live_in(&self, group: ResourceGroup) -> usize {
        self.slots
            .iter()
            .filter(|s| s.entry.as_ref().is_some_and(|e| e.group == group))
            .count()
    }

    fn free_slot(&mut self, index: u32) {
        let slot = &mut self.slots[index as usize];
        slot.entry = None;
        slot.generation = slot.generation.wrapping_add(1);
        self.free.push(index);
        self.live -= 1;
    }
}

#[cfg(test)]
mod tests {
    use super::{ResourceGroup, ResourceKind, ResourceRegistry};

    #[test]
    fn stale_ids_miss_after_slot_reuse() {
        let mut reg = ResourceRegistry::new();
        let a = reg.create(ResourceKind::Geometry, ResourceGroup::Markers, "marker 0");
        assert!(reg.release(a));
        let b = reg.create(ResourceKind::Texture, ResourceGroup::Selection, "image");
        assert_eq!(a.index(), b.index());
        assert!(!reg.is_live(a));
        assert!(!reg.release(a));
        assert_eq!(reg.get(b).map(|e| e.kind), Some(ResourceKind::Texture));
    }

    #[test]
    fn groups_release_independently() {
        let mut reg = ResourceRegistry::new();
        reg.create(ResourceKind::Geometry, ResourceGroup::Globe, "sphere");
        for i in 0..3 {
            reg.create(ResourceKind::Geometry, ResourceGroup::Markers, format!("marker {i}"));
        }
        let tex = reg.create(ResourceKind::Texture, ResourceGroup::Selection, "image");
        assert_eq!(reg.release_group(ResourceGroup::Markers), 3);
        assert_eq!(reg.live_in(ResourceGroup::Markers), 0);
        assert!(reg.is_live(tex));
        assert_eq!(reg.live_count(), 2);
        assert_eq!(reg.release_all(), 2);
        assert_eq!(reg.live_count(), 0);
    }
}
