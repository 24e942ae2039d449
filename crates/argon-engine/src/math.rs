//! Small math helpers for hosts building model matrices.

use cgmath::{Deg, Matrix4, Rad, SquareMatrix};

pub fn degrees_to_radians(degrees: f64) -> f64 {
    Rad::from(Deg(degrees)).0
}

pub fn radians_to_degrees(radians: f64) -> f64 {
    Deg::from(Rad(radians)).0
}

/// Rotation about several axes at once, each weighted against `angle`.
///
/// Applies X, then Y, then Z (as `Rx * Ry * Rz`); an axis with a
/// non-positive weight is skipped.
pub fn multi_rotate_3d(angle: Rad<f32>, x: f32, y: f32, z: f32) -> Matrix4<f32> {
    let mut rotation = Matrix4::identity();
    if x > 0.0 {
        rotation = rotation * Matrix4::from_angle_x(angle * x);
    }
    if y > 0.0 {
        rotation = rotation * Matrix4::from_angle_y(angle * y);
    }
    if z > 0.0 {
        rotation = rotation * Matrix4::from_angle_z(angle * z);
    }
    rotation
}

#[cfg(test)]
mod tests {
    use super::*;
    use cgmath::{InnerSpace, vec4};
    use std::f64::consts::PI;

    #[test]
    fn degree_conversions() {
        assert!((degrees_to_radians(180.0) - PI).abs() < 1e-12);
        assert!((radians_to_degrees(PI / 2.0) - 90.0).abs() < 1e-12);
    }

    #[test]
    fn no_axes_is_identity() {
        assert_eq!(multi_rotate_3d(Rad(1.0), 0.0, 0.0, 0.0), Matrix4::identity());
    }

    #[test]
    fn single_axis_matches_cgmath() {
        let angle = Rad(0.75f32);
        let ours = multi_rotate_3d(angle, 0.0, 1.0, 0.0);
        let theirs = Matrix4::from_angle_y(angle);
        assert_eq!(ours, theirs);
    }

    #[test]
    fn weights_scale_each_axis() {
        let angle = Rad(0.5f32);
        let ours = multi_rotate_3d(angle, 1.0, 0.3, 0.5);
        let expected = Matrix4::from_angle_x(angle)
            * Matrix4::from_angle_y(angle * 0.3)
            * Matrix4::from_angle_z(angle * 0.5);
        let v = vec4(1.0, 2.0, 3.0, 1.0);
        assert!(((ours * v) - (expected * v)).magnitude() < 1e-6);
    }
}
