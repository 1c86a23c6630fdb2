//! Utility maths functions

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use num_traits::Float;

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Clamp a value between a minimum and a maximum.
pub fn clamp<T>(value: &T, min: &T, max: &T) -> T
where
    T: Float
{
    let mut ret = *value;

    if ret > *max {
        ret = *max
    }
    if ret < *min {
        ret = *min
    }

    ret
}

/// Calculates the least nonnegative remainder of `lhs (mod rhs)`.
///
/// `num_traits::Float` does not provide `rem_euclid`, so this mirrors the std implementation. Due
/// to floating point round-off the result may equal `rhs.abs()` when `lhs` is a tiny negative
/// number.
pub fn rem_euclid<T>(lhs: T, rhs: T) -> T
where
    T: Float
{
    let r = lhs % rhs;
    if r < T::zero() { r + rhs.abs() } else { r }
}

/// Wrap an angle in degrees into the range (-180, 180].
pub fn wrap_deg_180<T>(angle_deg: T) -> T
where
    T: Float
{
    let full = T::from(360.0).unwrap_or_else(T::nan);
    let half = T::from(180.0).unwrap_or_else(T::nan);

    let wrapped = rem_euclid(angle_deg + half, full) - half;

    // rem_euclid gives [-180, 180), move the lower bound across
    if wrapped <= -half {
        wrapped + full
    }
    else {
        wrapped
    }
}

/// Signed shortest angular distance in degrees from `a` to `b`, in the range (-180, 180].
pub fn ang_dist_deg<T>(a: T, b: T) -> T
where
    T: Float
{
    wrap_deg_180(b - a)
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------
