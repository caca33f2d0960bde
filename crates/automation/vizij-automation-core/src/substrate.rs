//! Host store abstraction.
//!
//! The core never owns the values it animates. It reaches them through a [`Substrate`]:
//! byte regions (whole components or sequence contents) addressed by type tag, and
//! per-entity reference tables resolving [`RefId`]s to entities.

use serde::{Deserialize, Serialize};

use crate::error::AutomationError;
use crate::ids::{EntityId, RefId, TypeTag};
use crate::Result;

/// Which region of an entity a target points into.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub enum Region {
    /// A whole component of the given type.
    Component(TypeTag),
    /// The contiguous contents of a sequence of the given element type.
    Element(TypeTag),
}

/// Write destination of an automation: a byte window inside a region of the owning entity.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct AutomationTarget {
    pub region: Region,
    pub byte_offset: usize,
    pub byte_len: usize,
}

impl AutomationTarget {
    /// Field of component `C` at `field_offset`, `byte_len` bytes wide.
    pub fn component<C: 'static>(field_offset: usize, byte_len: usize) -> Self {
        Self {
            region: Region::Component(TypeTag::of::<C>()),
            byte_offset: field_offset,
            byte_len,
        }
    }

    /// Field of element `index` in the sequence of `E`.
    pub fn element<E: 'static>(index: usize, field_offset: usize, byte_len: usize) -> Self {
        Self {
            region: Region::Element(TypeTag::of::<E>()),
            byte_offset: index * std::mem::size_of::<E>() + field_offset,
            byte_len,
        }
    }

    /// Byte range within the region, checked against its length.
    pub fn range(&self, entity: EntityId, available: usize) -> Result<std::ops::Range<usize>> {
        let end = self.byte_offset.checked_add(self.byte_len);
        match end {
            Some(end) if end <= available => Ok(self.byte_offset..end),
            _ => Err(AutomationError::RegionOutOfBounds {
                entity,
                offset: self.byte_offset,
                len: self.byte_len,
                available,
            }),
        }
    }
}

/// Entity store the engine reads and writes through.
pub trait Substrate {
    /// Bytes of `region` on `entity`.
    fn region(&self, entity: EntityId, region: Region) -> Result<&[u8]>;

    /// Mutable bytes of `region` on `entity`. The view lives only for one write.
    fn region_mut(&mut self, entity: EntityId, region: Region) -> Result<&mut [u8]>;

    fn resolve_reference(&self, entity: EntityId, reference: RefId) -> Option<EntityId>;

    /// Append `target` to `entity`'s reference table.
    fn add_reference(&mut self, entity: EntityId, target: EntityId) -> RefId;

    /// Repoint an existing slot.
    fn set_reference(&mut self, entity: EntityId, reference: RefId, target: EntityId)
        -> Result<()>;

    fn target_bytes(&self, entity: EntityId, target: &AutomationTarget) -> Result<&[u8]> {
        let bytes = self.region(entity, target.region)?;
        let range = target.range(entity, bytes.len())?;
        Ok(&bytes[range])
    }

    fn target_bytes_mut(
        &mut self,
        entity: EntityId,
        target: &AutomationTarget,
    ) -> Result<&mut [u8]> {
        let bytes = self.region_mut(entity, target.region)?;
        let range = target.range(entity, bytes.len())?;
        Ok(&mut bytes[range])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[repr(C)]
    struct Pose {
        _position: [f32; 3],
        _weight: f32,
    }

    #[test]
    fn element_offset_includes_index_stride() {
        let target = AutomationTarget::element::<Pose>(2, 12, 4);
        assert_eq!(target.byte_offset, 2 * 16 + 12);
        assert_eq!(target.region, Region::Element(TypeTag::of::<Pose>()));
    }

    #[test]
    fn range_is_bounds_checked() {
        let target = AutomationTarget::component::<Pose>(12, 4);
        assert_eq!(target.range(EntityId(1), 16).unwrap(), 12..16);
        assert_eq!(
            target.range(EntityId(1), 15),
            Err(AutomationError::RegionOutOfBounds {
                entity: EntityId(1),
                offset: 12,
                len: 4,
                available: 15
            })
        );
    }
}
