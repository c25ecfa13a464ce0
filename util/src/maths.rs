//! Utility maths functions

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use num_traits::Float;

/// Linearly interpolate between `from` and `to` by `fraction`.
///
/// A fraction of 0 returns `from` exactly, 1 returns `to`.
pub fn lerp<T>(from: T, to: T, fraction: T) -> T
where
    T: Float
{
    from + (to - from) * fraction
}

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

/// Get the signed angular distance between two angles in the range of [0, 2pi].
///
/// This function will return the shortest signed distance between a and b accounting for wrapping
/// between 0 and 2pi.
pub fn get_ang_dist_2pi<T>(a: T, b: T) -> T
where
    T: Float
{
    let tau_t: T = T::from(std::f64::consts::TAU).unwrap();
    
    let c = rem_euclid(a - b, tau_t);
    let d = rem_euclid(b - a, tau_t);

    if c < d {
        return -c
    }
    else {
        return d
    }
}

/// Calculates the least nonnegative remainder of `lhs (mod rhs)`.
/// 
/// This function is taken from the std library as num is missing it.
///
/// In particular, the return value `r` satisfies `0.0 <= r < rhs.abs()` in
/// most cases. However, due to a floating point round-off error it can
/// result in `r == rhs.abs()`, violating the mathematical definition, if
/// `self` is much smaller than `rhs.abs()` in magnitude and `self < 0.0`.
pub fn rem_euclid<T>(lhs: T, rhs: T) -> T
where
    T: Float
{
    let r = lhs % rhs;
    if r < T::zero() { r + rhs.abs() } else { r }
}

/// Wrap an angle into the range [-pi, pi).
pub fn wrap_to_pi<T>(value: T) -> T
where
    T: Float
{
    let pi_t: T = T::from(std::f64::consts::PI).unwrap();
    let tau_t: T = T::from(std::f64::consts::TAU).unwrap();

    rem_euclid(value + pi_t, tau_t) - pi_t
}

/// Return the representative of `value` modulo `period` closest to `reference`.
///
/// The result is `value + m * period` where `m` is the integer minimising the
/// distance to `reference`.
pub fn closest_representative<T>(value: T, reference: T, period: T) -> T
where
    T: Float
{
    let m = ((reference - value) / period).round();
    value + m * period
}

#[cfg(test)]
mod test {
    use super::*;
    use approx::assert_relative_eq;

    const TAU: f64 = std::f64::consts::TAU;
    const PI: f64 = std::f64::consts::PI;

    #[test]
    fn test_get_ang_dist_2pi() {
        assert_eq!(get_ang_dist_2pi(1f64, 2f64), 1f64);
        assert_eq!(get_ang_dist_2pi(2f64, 1f64), -1f64);
        assert_eq!(get_ang_dist_2pi(0f64, TAU), 0f64);
        assert_eq!(get_ang_dist_2pi(TAU, 0f64), 0f64);
        assert_eq!(get_ang_dist_2pi(1f64, TAU), -1f64);
        assert_eq!(get_ang_dist_2pi(0f64, TAU - 1f64), -1f64);
        assert_eq!(get_ang_dist_2pi(TAU - 1f64, 1f64), 2f64);
    }

    #[test]
    fn test_lerp() {
        assert_eq!(lerp(1.0, 3.0, 0.0), 1.0);
        assert_eq!(lerp(1.0, 3.0, 1.0), 3.0);
        assert_eq!(lerp(1.0, 3.0, 0.25), 1.5);
    }

    #[test]
    fn test_wrap_to_pi() {
        assert_relative_eq!(wrap_to_pi(0.5), 0.5);
        assert_relative_eq!(wrap_to_pi(TAU + 0.5), 0.5, epsilon = 1e-12);
        assert_relative_eq!(wrap_to_pi(-TAU - 0.5), -0.5, epsilon = 1e-12);
        assert_relative_eq!(wrap_to_pi(PI + 0.1), -PI + 0.1, epsilon = 1e-12);
    }

    #[test]
    fn test_closest_representative() {
        assert_relative_eq!(
            closest_representative(3.0 - TAU + 0.1, 3.0, TAU),
            3.1,
            epsilon = 1e-12
        );
        assert_relative_eq!(closest_representative(0.2, 0.0, TAU), 0.2);
        assert_relative_eq!(
            closest_representative(0.2, 4.0 * PI, TAU),
            0.2 + 2.0 * TAU,
            epsilon = 1e-12
        );
    }

    #[test]
    fn test_clamp() {
        assert_eq!(clamp(&2.0, &0.0, &1.0), 1.0);
        assert_eq!(clamp(&-2.0, &0.0, &1.0), 0.0);
        assert_eq!(clamp(&0.5, &0.0, &1.0), 0.5);
    }
}
