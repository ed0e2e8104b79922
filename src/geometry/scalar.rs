/// Clamp `n` into `[lo, hi]`.
///
/// Unlike `f32::clamp` this never panics when `lo > hi`; `lo` wins.
#[inline]
pub fn clamp(n: f32, lo: f32, hi: f32) -> f32 {
    lo.max(hi.min(n))
}

/// Linear interpolation, `t = 0` yields `a` and `t = 1` yields `b`.
#[inline]
pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + t * (b - a)
}
