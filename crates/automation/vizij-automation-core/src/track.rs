//! Type-erased keyframe tracks.
//!
//! A track stores keyframe times and values in two parallel sequences. Values are kept
//! as raw bytes, one bucket-sized slot per keyframe, so tracks of any `Pod` value type
//! share a single representation. Typed access happens only at the boundary.

use bytemuck::Pod;
use serde::{Deserialize, Serialize};

use crate::bucket::ValueBucket;
use crate::error::AutomationError;
use crate::ids::{MethodId, TypeTag};
use crate::Result;

/// Declared value type of a track, fixed by its first keyframe.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct ValueLayout {
    pub bucket: ValueBucket,
    pub value_type: TypeTag,
    /// Natural size of the value type (≤ bucket size).
    pub value_size: usize,
}

impl ValueLayout {
    pub fn of<T: Pod>() -> Result<Self> {
        Ok(Self {
            bucket: ValueBucket::of::<T>()?,
            value_type: TypeTag::of::<T>(),
            value_size: std::mem::size_of::<T>(),
        })
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct KeyframeTrack {
    times: Vec<f32>,
    values: Vec<u8>,
    layout: Option<ValueLayout>,
    pub looping: bool,
    /// `None` holds the current keyframe value without blending.
    pub interpolation: Option<MethodId>,
}

impl KeyframeTrack {
    /// Empty track; its value type is fixed by the first appended keyframe.
    pub fn new(looping: bool) -> Self {
        Self {
            looping,
            ..Self::default()
        }
    }

    /// Empty track with a declared value type.
    pub fn typed<T: Pod>(looping: bool) -> Result<Self> {
        Ok(Self {
            layout: Some(ValueLayout::of::<T>()?),
            looping,
            ..Self::default()
        })
    }

    pub fn from_keyframes<T: Pod>(keyframes: &[(f32, T)], looping: bool) -> Result<Self> {
        let mut track = Self::typed::<T>(looping)?;
        track.times.reserve(keyframes.len());
        for (time, value) in keyframes {
            track.push(*time, *value)?;
        }
        Ok(track)
    }

    /// Build from parallel time/value slices of equal length.
    pub fn from_parts<T: Pod>(times: &[f32], values: &[T], looping: bool) -> Result<Self> {
        if times.len() != values.len() {
            return Err(AutomationError::KeyframeLengthMismatch {
                times: times.len(),
                values: values.len(),
            });
        }
        let mut track = Self::typed::<T>(looping)?;
        for (time, value) in times.iter().zip(values) {
            track.push(*time, *value)?;
        }
        Ok(track)
    }

    pub fn with_interpolation(mut self, method: MethodId) -> Self {
        self.interpolation = Some(method);
        self
    }

    /// Append a keyframe. Both sequences grow by one element.
    ///
    /// Appending a value of another type than the track already stores is rejected and
    /// leaves the track unchanged.
    pub fn push<T: Pod>(&mut self, time: f32, value: T) -> Result<()> {
        let layout = ValueLayout::of::<T>()?;
        match self.layout {
            Some(existing) if existing != layout => {
                return Err(AutomationError::ValueTypeMismatch {
                    expected_size: existing.value_size,
                    actual_size: layout.value_size,
                });
            }
            Some(_) => {}
            None => self.layout = Some(layout),
        }

        let slot = layout.bucket.size();
        let start = self.values.len();
        self.values.resize(start + slot, 0);
        self.values[start..start + layout.value_size].copy_from_slice(bytemuck::bytes_of(&value));
        self.times.push(time);
        Ok(())
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.times.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.times.is_empty()
    }

    #[inline]
    pub fn times(&self) -> &[f32] {
        &self.times
    }

    #[inline]
    pub fn layout(&self) -> Option<ValueLayout> {
        self.layout
    }

    /// Slot size in bytes, 0 while the value type is undeclared.
    #[inline]
    pub fn bucket_size(&self) -> usize {
        self.layout.map_or(0, |l| l.bucket.size())
    }

    #[inline]
    pub fn last_time(&self) -> Option<f32> {
        self.times.last().copied()
    }

    /// Raw bucket-sized slot of keyframe `index`.
    pub fn value_bytes(&self, index: usize) -> Option<&[u8]> {
        let slot = self.bucket_size();
        if index >= self.len() || slot == 0 {
            return None;
        }
        self.values.get(index * slot..(index + 1) * slot)
    }

    /// Typed read-back of keyframe `index`; `Ok(None)` when out of range.
    pub fn keyframe<T: Pod>(&self, index: usize) -> Result<Option<(f32, T)>> {
        let wanted = ValueLayout::of::<T>()?;
        if let Some(layout) = self.layout {
            if layout != wanted {
                return Err(AutomationError::ValueTypeMismatch {
                    expected_size: layout.value_size,
                    actual_size: wanted.value_size,
                });
            }
        }
        Ok(self.value_bytes(index).map(|bytes| {
            let value = bytemuck::pod_read_unaligned::<T>(&bytes[..wanted.value_size]);
            (self.times[index], value)
        }))
    }
}
