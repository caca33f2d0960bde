//! Keyframe track evaluation.
//!
//! Converts an elapsed time into a value written to a destination byte region:
//! - Past the last keyframe the time wraps (looping) or clamps (one-shot).
//! - The current keyframe is the last one whose time is `<= t`; the next one wraps to the
//!   first keyframe on looping tracks and otherwise holds the current keyframe.
//! - Tracks without an interpolation method copy the current keyframe verbatim.

use crate::interp::InterpolationRegistry;
use crate::track::KeyframeTrack;
use crate::Result;

/// Locate the bracketing keyframes and progress for time `t` (already wrapped/clamped).
/// Returns `(current, next, progress)`.
fn find_segment(times: &[f32], t: f32, looping: bool) -> (usize, usize, f32) {
    let n = times.len();
    // Linear scan; ties resolve to the later keyframe.
    let mut current = 0;
    for (i, &time) in times.iter().enumerate() {
        if t >= time {
            current = i;
        }
    }

    let next = if current + 1 == n {
        if looping {
            0
        } else {
            current
        }
    } else {
        current + 1
    };

    let denom = times[next] - times[current];
    let mut progress = if denom == 0.0 {
        0.0
    } else {
        (t - times[current]) / denom
    };
    if !progress.is_finite() {
        progress = 0.0;
    }
    (current, next, progress.clamp(0.0, 1.0))
}

/// Wrap or clamp `t` against the last keyframe time.
#[inline]
fn wrap_time(t: f32, last: f32, looping: bool) -> f32 {
    if t < last {
        return t;
    }
    if !looping {
        return last;
    }
    if last <= 0.0 {
        0.0
    } else {
        t % last
    }
}

/// Evaluate `track` at `t` seconds into `out`.
///
/// `out` is the destination region, sized to the target value. Zero-keyframe tracks leave
/// it untouched.
pub fn evaluate_track(
    track: &KeyframeTrack,
    t: f32,
    registry: &InterpolationRegistry,
    out: &mut [u8],
) -> Result<()> {
    let Some(last) = track.last_time() else {
        return Ok(());
    };
    let t = wrap_time(t, last, track.looping);
    let (current, next, progress) = find_segment(track.times(), t, track.looping);

    let (Some(current_bytes), Some(next_bytes)) =
        (track.value_bytes(current), track.value_bytes(next))
    else {
        return Ok(());
    };

    match track.interpolation {
        None => {
            let n = out.len().min(current_bytes.len());
            out[..n].copy_from_slice(&current_bytes[..n]);
            Ok(())
        }
        Some(method) => registry.invoke(method, current_bytes, next_bytes, progress, out),
    }
}

/// Typed convenience over [`evaluate_track`] for hosts and tests.
pub fn sample<T: bytemuck::Pod>(
    track: &KeyframeTrack,
    t: f32,
    registry: &InterpolationRegistry,
) -> Result<T> {
    let mut value = T::zeroed();
    evaluate_track(track, t, registry, bytemuck::bytes_of_mut(&mut value))?;
    Ok(value)
}
