//! Minimal in-memory [`Substrate`].
//!
//! Entities carry typed components and growable typed sequences stored as plain bytes,
//! plus a reference table. Values go in and out as `bytemuck::Pod`.

use bytemuck::Pod;
use hashbrown::HashMap;

use crate::error::AutomationError;
use crate::ids::{EntityId, RefId, TypeTag};
use crate::substrate::{Region, Substrate};
use crate::Result;

#[derive(Clone, Debug, Default)]
struct Sequence {
    element_size: usize,
    bytes: Vec<u8>,
}

impl Sequence {
    fn len(&self) -> usize {
        if self.element_size == 0 {
            0
        } else {
            self.bytes.len() / self.element_size
        }
    }
}

#[derive(Debug, Default)]
pub struct World {
    next_entity: u32,
    components: HashMap<(EntityId, TypeTag), Vec<u8>>,
    sequences: HashMap<(EntityId, TypeTag), Sequence>,
    references: HashMap<EntityId, Vec<EntityId>>,
}

impl World {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn create_entity(&mut self) -> EntityId {
        let id = EntityId(self.next_entity);
        self.next_entity += 1;
        id
    }

    /// Insert or replace component `T` on `entity`.
    pub fn add_component<T: Pod>(&mut self, entity: EntityId, value: T) {
        self.add_component_bytes(entity, TypeTag::of::<T>(), bytemuck::bytes_of(&value));
    }

    /// Insert or replace a component by tag (for host-named types).
    pub fn add_component_bytes(&mut self, entity: EntityId, tag: TypeTag, bytes: &[u8]) {
        self.components.insert((entity, tag), bytes.to_vec());
    }

    pub fn has_component<T: 'static>(&self, entity: EntityId) -> bool {
        self.components.contains_key(&(entity, TypeTag::of::<T>()))
    }

    pub fn component<T: Pod>(&self, entity: EntityId) -> Option<T> {
        let bytes = self.components.get(&(entity, TypeTag::of::<T>()))?;
        (bytes.len() == std::mem::size_of::<T>()).then(|| bytemuck::pod_read_unaligned(bytes))
    }

    pub fn component_bytes(&self, entity: EntityId, tag: TypeTag) -> Option<&[u8]> {
        self.components.get(&(entity, tag)).map(Vec::as_slice)
    }

    /// Overwrite an existing component.
    pub fn set_component<T: Pod>(&mut self, entity: EntityId, value: T) -> Result<()> {
        let bytes = self
            .components
            .get_mut(&(entity, TypeTag::of::<T>()))
            .ok_or(AutomationError::MissingRegion { entity })?;
        bytes.copy_from_slice(bytemuck::bytes_of(&value));
        Ok(())
    }

    /// Create an empty sequence of `T` on `entity` (no-op if it exists).
    ///
    /// Zero-sized element types are not stored; pushing to them fails with `MissingRegion`.
    pub fn create_sequence<T: Pod>(&mut self, entity: EntityId) {
        if std::mem::size_of::<T>() == 0 {
            return;
        }
        self.sequences
            .entry((entity, TypeTag::of::<T>()))
            .or_insert_with(|| Sequence {
                element_size: std::mem::size_of::<T>(),
                bytes: Vec::new(),
            });
    }

    /// Append to the sequence of `T`; returns the new element's index.
    pub fn push_element<T: Pod>(&mut self, entity: EntityId, value: T) -> Result<usize> {
        let sequence = self
            .sequences
            .get_mut(&(entity, TypeTag::of::<T>()))
            .ok_or(AutomationError::MissingRegion { entity })?;
        sequence.bytes.extend_from_slice(bytemuck::bytes_of(&value));
        Ok(sequence.len().saturating_sub(1))
    }

    pub fn element<T: Pod>(&self, entity: EntityId, index: usize) -> Option<T> {
        let sequence = self.sequences.get(&(entity, TypeTag::of::<T>()))?;
        let size = sequence.element_size;
        let bytes = sequence.bytes.get(index * size..(index + 1) * size)?;
        Some(bytemuck::pod_read_unaligned(bytes))
    }

    pub fn sequence_len<T: 'static>(&self, entity: EntityId) -> usize {
        self.sequences
            .get(&(entity, TypeTag::of::<T>()))
            .map_or(0, Sequence::len)
    }
}

impl Substrate for World {
    fn region(&self, entity: EntityId, region: Region) -> Result<&[u8]> {
        let bytes = match region {
            Region::Component(tag) => self.components.get(&(entity, tag)),
            Region::Element(tag) => self.sequences.get(&(entity, tag)).map(|s| &s.bytes),
        };
        bytes
            .map(Vec::as_slice)
            .ok_or(AutomationError::MissingRegion { entity })
    }

    fn region_mut(&mut self, entity: EntityId, region: Region) -> Result<&mut [u8]> {
        let bytes = match region {
            Region::Component(tag) => self.components.get_mut(&(entity, tag)),
            Region::Element(tag) => self
                .sequences
                .get_mut(&(entity, tag))
                .map(|s| &mut s.bytes),
        };
        bytes
            .map(Vec::as_mut_slice)
            .ok_or(AutomationError::MissingRegion { entity })
    }

    fn resolve_reference(&self, entity: EntityId, reference: RefId) -> Option<EntityId> {
        self.references
            .get(&entity)?
            .get(reference.position())
            .copied()
    }

    fn add_reference(&mut self, entity: EntityId, target: EntityId) -> RefId {
        let table = self.references.entry(entity).or_default();
        table.push(target);
        RefId::from_position(table.len() - 1)
    }

    fn set_reference(
        &mut self,
        entity: EntityId,
        reference: RefId,
        target: EntityId,
    ) -> Result<()> {
        let slot = self
            .references
            .get_mut(&entity)
            .and_then(|table| table.get_mut(reference.position()))
            .ok_or(AutomationError::MissingReference { entity, reference })?;
        *slot = target;
        Ok(())
    }
}
