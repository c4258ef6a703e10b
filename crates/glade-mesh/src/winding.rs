//! Winding order checks for terrain surfaces and skirts.
//!
//! The surface is wound counter-clockwise when viewed from above (+Y), so
//! the right-handed face normal points up. Skirt faces wind so their normal
//! points horizontally away from the section centre.

use glam::{Vec2, Vec3};

/// Unnormalised face normal `(b - a) × (c - a)`.
#[inline]
pub fn triangle_normal(a: Vec3, b: Vec3, c: Vec3) -> Vec3 {
    (b - a).cross(c - a)
}

/// Returns `true` if the triangle is counter-clockwise seen from above.
pub fn triangle_faces_up(a: Vec3, b: Vec3, c: Vec3) -> bool {
    triangle_normal(a, b, c).y > 0.0
}

/// Returns `true` if the triangle faces away from `center` in the XZ plane.
///
/// Used for vertical skirt walls, whose normals are horizontal.
pub fn triangle_winds_outward(a: Vec3, b: Vec3, c: Vec3, center: Vec2) -> bool {
    let normal = triangle_normal(a, b, c);
    let centroid = (a + b + c) / 3.0;
    let outward = Vec2::new(centroid.x - center.x, centroid.z - center.y);
    Vec2::new(normal.x, normal.z).dot(outward) > 0.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ccw_from_above_faces_up() {
        let a = Vec3::ZERO;
        let b = Vec3::new(0.0, 0.0, 1.0);
        let c = Vec3::new(1.0, 0.0, 0.0);
        assert!(triangle_faces_up(a, b, c));
        assert!(!triangle_faces_up(a, c, b), "reversed order must face down");
    }

    #[test]
    fn test_wall_winding_relative_to_center() {
        // Wall along the -Z edge of a section centred at the origin.
        let top0 = Vec3::new(-1.0, 0.0, -1.0);
        let top1 = Vec3::new(1.0, 0.0, -1.0);
        let bottom0 = Vec3::new(-1.0, -2.0, -1.0);
        let center = Vec2::ZERO;

        assert!(triangle_winds_outward(top0, top1, bottom0, center));
        assert!(!triangle_winds_outward(top0, bottom0, top1, center));
    }
}
