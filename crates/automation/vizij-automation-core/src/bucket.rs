//! Fixed storage containers for type-erased keyframe values.
//!
//! Every value type is stored in the smallest power-of-two container that fits it.
//! The ladder stops at 256 bytes.

use serde::{Deserialize, Serialize};

use crate::error::AutomationError;
use crate::Result;

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub enum ValueBucket {
    B1,
    B2,
    B4,
    B8,
    B16,
    B32,
    B64,
    B128,
    B256,
}

impl ValueBucket {
    pub const ALL: [ValueBucket; 9] = [
        ValueBucket::B1,
        ValueBucket::B2,
        ValueBucket::B4,
        ValueBucket::B8,
        ValueBucket::B16,
        ValueBucket::B32,
        ValueBucket::B64,
        ValueBucket::B128,
        ValueBucket::B256,
    ];

    /// Smallest bucket holding `byte_size` bytes.
    pub fn for_size(byte_size: usize) -> Result<Self> {
        if byte_size == 0 {
            return Err(AutomationError::UnsupportedValueSize { size: byte_size });
        }
        Self::ALL
            .into_iter()
            .find(|bucket| bucket.size() >= byte_size)
            .ok_or(AutomationError::UnsupportedValueSize { size: byte_size })
    }

    /// Bucket for a concrete value type.
    #[inline]
    pub fn of<T>() -> Result<Self> {
        Self::for_size(std::mem::size_of::<T>())
    }

    #[inline]
    pub const fn size(self) -> usize {
        match self {
            ValueBucket::B1 => 1,
            ValueBucket::B2 => 2,
            ValueBucket::B4 => 4,
            ValueBucket::B8 => 8,
            ValueBucket::B16 => 16,
            ValueBucket::B32 => 32,
            ValueBucket::B64 => 64,
            ValueBucket::B128 => 128,
            ValueBucket::B256 => 256,
        }
    }
}

/// Container size in bytes for a value of `byte_size` bytes.
#[inline]
pub fn bucket_size(byte_size: usize) -> Result<usize> {
    ValueBucket::for_size(byte_size).map(ValueBucket::size)
}
