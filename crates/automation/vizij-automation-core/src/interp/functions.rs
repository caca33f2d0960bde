//! Built-in linear blends over f32 components.
//!
//! Values arrive as raw byte spans (bucket-sized slots for keyframes, target-sized for the
//! destination). Components are read unaligned and written back in native byte order.

use bytemuck::pod_read_unaligned;

use super::Interpolator;
use crate::error::AutomationError;
use crate::Result;

const F32_SIZE: usize = std::mem::size_of::<f32>();

/// Linear interpolation of scalars.
#[inline]
pub fn lerp_f32(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

#[inline]
fn check_span(span: &[u8], expected: usize) -> Result<()> {
    if span.len() < expected {
        return Err(AutomationError::InterpolationSizeMismatch {
            expected,
            actual: span.len(),
        });
    }
    Ok(())
}

/// Component-wise blend of `N` f32 values.
fn blend_components<const N: usize>(
    current: &[u8],
    next: &[u8],
    progress: f32,
    out: &mut [u8],
) -> Result<()> {
    let expected = N * F32_SIZE;
    check_span(current, expected)?;
    check_span(next, expected)?;
    if out.len() != expected {
        return Err(AutomationError::InterpolationSizeMismatch {
            expected,
            actual: out.len(),
        });
    }

    let a: [f32; N] = pod_read_unaligned(&current[..expected]);
    let b: [f32; N] = pod_read_unaligned(&next[..expected]);
    let blended: [f32; N] = std::array::from_fn(|i| lerp_f32(a[i], b[i], progress));

    for (chunk, value) in out.chunks_exact_mut(F32_SIZE).zip(blended) {
        chunk.copy_from_slice(&value.to_ne_bytes());
    }
    Ok(())
}

/// `floatLinear` (method 1).
#[derive(Debug, Default, Clone, Copy)]
pub struct FloatLinear;

impl Interpolator for FloatLinear {
    fn name(&self) -> &str {
        "floatLinear"
    }

    fn interpolate(
        &self,
        current: &[u8],
        next: &[u8],
        progress: f32,
        out: &mut [u8],
    ) -> Result<()> {
        blend_components::<1>(current, next, progress, out)
    }
}

/// `vec{N}Linear` (methods 2..=4).
#[derive(Debug, Default, Clone, Copy)]
pub struct VectorLinear<const N: usize>;

impl<const N: usize> Interpolator for VectorLinear<N> {
    fn name(&self) -> &str {
        match N {
            2 => "vec2Linear",
            3 => "vec3Linear",
            4 => "vec4Linear",
            _ => "vecLinear",
        }
    }

    fn interpolate(
        &self,
        current: &[u8],
        next: &[u8],
        progress: f32,
        out: &mut [u8],
    ) -> Result<()> {
        blend_components::<N>(current, next, progress, out)
    }
}
