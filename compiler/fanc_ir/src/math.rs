//! Numeric semantics shared by every stage that computes block results.
//!
//! The parser converts literal rotations, the folder precomputes pure
//! expressions and the interpreter evaluates them at run time. All three go
//! through these functions so a folded program computes exactly what the
//! unfolded one would. The C runtime library emitted by the AOT backend
//! mirrors the same formulas.

use glam::{Mat3, Quat, Vec3};

/// Degrees to radians.
pub const DEG_TO_RAD: f32 = std::f32::consts::PI / 180.0;

/// Radians to degrees.
pub const RAD_TO_DEG: f32 = 180.0 / std::f32::consts::PI;

/// Tolerance used by the number and vector equality blocks.
pub const EQUALITY_EPSILON: f32 = 0.001;

/// Floored modulo: the result lies in `[0, divisor)` for a positive divisor
/// (and in `(divisor, 0]` for a negative one).
///
/// Rounding in the quotient can leave the raw remainder one divisor outside
/// that range, so it is wrapped back in.
#[inline]
pub fn modulo(value: f32, divisor: f32) -> f32 {
    let mut r = value - divisor * (value / divisor).floor();
    if r != 0.0 && (r < 0.0) != (divisor < 0.0) {
        r += divisor;
    }
    if r.abs() >= divisor.abs() {
        r -= divisor;
    }
    r
}

#[inline]
pub fn sin_degrees(angle: f32) -> f32 {
    (angle * DEG_TO_RAD).sin()
}

#[inline]
pub fn cos_degrees(angle: f32) -> f32 {
    (angle * DEG_TO_RAD).cos()
}

#[inline]
pub fn numbers_equal(a: f32, b: f32) -> bool {
    (a - b).abs() < EQUALITY_EPSILON
}

#[inline]
pub fn vectors_equal(a: Vec3, b: Vec3) -> bool {
    (a - b).length() < EQUALITY_EPSILON
}

/// Euler angles in degrees to a rotation. Applied as roll (z), then pitch
/// (x), then yaw (y), all about world axes.
pub fn euler_degrees_to_quat(x: f32, y: f32, z: f32) -> Quat {
    Quat::from_rotation_y(y * DEG_TO_RAD)
        * Quat::from_rotation_x(x * DEG_TO_RAD)
        * Quat::from_rotation_z(z * DEG_TO_RAD)
}

/// Decompose a rotation into Euler angles in degrees, inverse of
/// [`euler_degrees_to_quat`].
///
/// The pitch term is clamped to ±90° when rounding pushes its sine outside
/// `[-1, 1]`.
pub fn quat_to_euler_degrees(q: Quat) -> [f32; 3] {
    let sin_pitch = 2.0 * (q.w * q.x - q.y * q.z);
    let pitch = if sin_pitch.abs() >= 1.0 {
        90.0_f32.copysign(sin_pitch)
    } else {
        sin_pitch.asin() * RAD_TO_DEG
    };
    let yaw = (2.0 * (q.w * q.y + q.x * q.z)).atan2(1.0 - 2.0 * (q.x * q.x + q.y * q.y));
    let roll = (2.0 * (q.w * q.z + q.x * q.y)).atan2(1.0 - 2.0 * (q.x * q.x + q.z * q.z));
    [pitch, yaw * RAD_TO_DEG, roll * RAD_TO_DEG]
}

/// Rotation of `angle` degrees about `axis`; identity for a zero axis.
pub fn axis_angle(axis: Vec3, angle: f32) -> Quat {
    let axis = axis.normalize_or_zero();
    if axis == Vec3::ZERO {
        return Quat::IDENTITY;
    }
    Quat::from_axis_angle(axis, angle * DEG_TO_RAD)
}

/// Rotation whose forward (+z) axis points along `direction` with its up
/// axis as close to `up` as possible. Degenerate inputs give identity.
pub fn look_rotation(direction: Vec3, up: Vec3) -> Quat {
    let forward = direction.normalize_or_zero();
    if forward == Vec3::ZERO {
        return Quat::IDENTITY;
    }
    let right = up.cross(forward).normalize_or_zero();
    if right == Vec3::ZERO {
        return Quat::IDENTITY;
    }
    let up = forward.cross(right);
    Quat::from_mat3(&Mat3::from_cols(right, up, forward)).normalize()
}

/// Intersection of the line through `from` and `to` with a plane. A line
/// parallel to the plane yields non-finite components.
pub fn line_vs_plane(from: Vec3, to: Vec3, plane_point: Vec3, plane_normal: Vec3) -> Vec3 {
    let direction = to - from;
    let t = plane_normal.dot(plane_point - from) / plane_normal.dot(direction);
    from + direction * t
}

/// Spherical interpolation between two rotations.
#[inline]
pub fn lerp_rotation(from: Quat, to: Quat, amount: f32) -> Quat {
    from.slerp(to, amount)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-3
    }

    #[test]
    fn modulo_wraps_into_divisor_range() {
        assert_eq!(modulo(7.0, 3.0), 1.0);
        assert_eq!(modulo(-1.0, 3.0), 2.0);
        assert_eq!(modulo(-3.0, 3.0), 0.0);
        assert_eq!(modulo(1.0, -3.0), -2.0);
    }

    #[test]
    fn modulo_of_tiny_values_stays_inside_the_range() {
        let r = modulo(-1e-8, 3.0);
        assert!((0.0..3.0).contains(&r), "got {r}");
        let r = modulo(1e-8, -3.0);
        assert!(r <= 0.0 && r > -3.0, "got {r}");
        let r = modulo(2.999_999_8, 3.0);
        assert!((0.0..3.0).contains(&r), "got {r}");
    }

    #[test]
    fn euler_round_trip() {
        let [x, y, z] = quat_to_euler_degrees(euler_degrees_to_quat(30.0, 45.0, -60.0));
        assert!(close(x, 30.0), "pitch {x}");
        assert!(close(y, 45.0), "yaw {y}");
        assert!(close(z, -60.0), "roll {z}");
    }

    #[test]
    fn pitch_clamps_at_ninety() {
        let [x, _, _] = quat_to_euler_degrees(euler_degrees_to_quat(90.0, 0.0, 0.0));
        assert!(close(x, 90.0));
        // Slightly denormalized so the sine argument exceeds one.
        let q = Quat::from_xyzw(0.7072, 0.0, 0.0, 0.7072);
        assert_eq!(quat_to_euler_degrees(q)[0], 90.0);
        let q = Quat::from_xyzw(-0.7072, 0.0, 0.0, 0.7072);
        assert_eq!(quat_to_euler_degrees(q)[0], -90.0);
    }

    #[test]
    fn degenerate_rotations_are_identity() {
        assert_eq!(axis_angle(Vec3::ZERO, 45.0), Quat::IDENTITY);
        assert_eq!(look_rotation(Vec3::ZERO, Vec3::Y), Quat::IDENTITY);
        assert_eq!(look_rotation(Vec3::Y, Vec3::Y), Quat::IDENTITY);
    }

    #[test]
    fn look_rotation_points_forward() {
        let q = look_rotation(Vec3::X, Vec3::Y);
        let forward = q * Vec3::Z;
        assert!((forward - Vec3::X).length() < 1e-4);
    }

    #[test]
    fn line_hits_plane() {
        let hit = line_vs_plane(Vec3::new(0.0, 5.0, 0.0), Vec3::ZERO, Vec3::ZERO, Vec3::Y);
        assert!((hit - Vec3::ZERO).length() < 1e-6);
    }
}
