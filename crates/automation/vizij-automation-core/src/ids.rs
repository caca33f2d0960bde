//! Identifiers, handles and name hashing.

use std::num::{NonZeroU16, NonZeroU32};

use serde::{Deserialize, Serialize};

/// Host entity identifier.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
pub struct EntityId(pub u32);

/// Slot in an entity's reference table (1-based). Holding one never implies
/// ownership of the referenced entity.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct RefId(NonZeroU32);

impl RefId {
    /// Reference for the given 0-based table position.
    #[inline]
    pub fn from_position(position: usize) -> Self {
        let raw = u32::try_from(position + 1).unwrap_or(u32::MAX);
        Self(NonZeroU32::new(raw).unwrap_or(NonZeroU32::MIN))
    }

    #[inline]
    pub fn get(self) -> u32 {
        self.0.get()
    }

    #[inline]
    pub fn position(self) -> usize {
        (self.0.get() - 1) as usize
    }
}

/// 1-based index into a state machine's state list.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct StateIndex(NonZeroU32);

impl StateIndex {
    /// `None` for the reserved value 0.
    #[inline]
    pub fn new(raw: u32) -> Option<Self> {
        NonZeroU32::new(raw).map(Self)
    }

    #[inline]
    pub fn from_position(position: usize) -> Self {
        let raw = u32::try_from(position + 1).unwrap_or(u32::MAX);
        Self(NonZeroU32::new(raw).unwrap_or(NonZeroU32::MIN))
    }

    #[inline]
    pub fn get(self) -> u32 {
        self.0.get()
    }

    #[inline]
    pub fn position(self) -> usize {
        (self.0.get() - 1) as usize
    }
}

/// 1-based id of a registered interpolation function. Id 0 is reserved for
/// "not interpolated" and is therefore not representable; tracks use
/// `Option<MethodId>` instead.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct MethodId(NonZeroU16);

impl MethodId {
    pub const FLOAT_LINEAR: MethodId = MethodId(NonZeroU16::MIN);
    pub const VEC2_LINEAR: MethodId = MethodId(match NonZeroU16::new(2) {
        Some(v) => v,
        None => NonZeroU16::MIN,
    });
    pub const VEC3_LINEAR: MethodId = MethodId(match NonZeroU16::new(3) {
        Some(v) => v,
        None => NonZeroU16::MIN,
    });
    pub const VEC4_LINEAR: MethodId = MethodId(match NonZeroU16::new(4) {
        Some(v) => v,
        None => NonZeroU16::MIN,
    });

    #[inline]
    pub fn new(raw: u16) -> Option<Self> {
        NonZeroU16::new(raw).map(Self)
    }

    #[inline]
    pub fn get(self) -> u16 {
        self.0.get()
    }
}

const FNV_OFFSET: u32 = 0x811c_9dc5;
const FNV_PRIME: u32 = 0x0100_0193;

#[inline]
const fn fnv1a(bytes: &[u8]) -> u32 {
    let mut hash = FNV_OFFSET;
    let mut i = 0;
    while i < bytes.len() {
        hash ^= bytes[i] as u32;
        hash = hash.wrapping_mul(FNV_PRIME);
        i += 1;
    }
    hash
}

/// 32-bit FNV-1a hash of a state or parameter name.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct NameHash(pub u32);

impl NameHash {
    #[inline]
    pub const fn of(name: &str) -> Self {
        Self(fnv1a(name.as_bytes()))
    }
}

impl From<&str> for NameHash {
    fn from(name: &str) -> Self {
        Self::of(name)
    }
}

/// Identifies a component or sequence element type in the substrate.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct TypeTag(pub u32);

impl TypeTag {
    /// Tag derived from the Rust type name; stable within a build.
    #[inline]
    pub fn of<T: ?Sized + 'static>() -> Self {
        Self(fnv1a(std::any::type_name::<T>().as_bytes()))
    }

    /// Tag for a host-named type (used when the host has no Rust type to offer).
    #[inline]
    pub const fn named(name: &str) -> Self {
        Self(fnv1a(name.as_bytes()))
    }
}
