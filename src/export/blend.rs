//! Loop-seam blending.
//!
//! The last `lerp_frames` frames of a sequence are cross-faded toward the
//! same layers rendered at negative time (`frame - num_frames`), which is
//! the animation state just before frame 0. Played on repeat, the tail then
//! flows into the head without a visible cut.

/// Wrapped frame index for `frame`, if it falls inside the blend window.
pub fn wrapped_frame(frame: u32, num_frames: u32, lerp_frames: u32) -> Option<i64> {
    let old = i64::from(frame) - i64::from(num_frames);
    (old >= -i64::from(lerp_frames)).then_some(old)
}

/// Blend weight of the wrapped frame: `(old + lerp + 1) / (lerp + 1)`.
pub fn lerp_factor(old_frame: i64, lerp_frames: u32) -> f32 {
    let lerp = lerp_frames as f32;
    (old_frame as f32 + lerp + 1.0) / (lerp + 1.0)
}

/// Move every channel of `current` toward `wrapped` by `t`, truncating.
pub fn blend_frames(current: &mut [u8], wrapped: &[u8], t: f32) {
    for (a, &b) in current.iter_mut().zip(wrapped) {
        let (fa, fb) = (f32::from(*a), f32::from(b));
        *a = (fa + (fb - fa) * t) as u8;
    }
}
