use crate::geometry::math::{BARYCENTRIC_EPSILON, INSIDE_EPSILON, W_EPSILON};
use nalgebra::{Vector2, Vector3};
use std::ops::{Add, Mul};

/// Calculates barycentric coordinates (alpha, beta, gamma) for point p
/// with respect to the 2D triangle (v1, v2, v3).
/// Alpha corresponds to v1, Beta to v2, Gamma to v3.
///
/// A triangle whose doubled area is below `BARYCENTRIC_EPSILON` is degenerate
/// in screen space and yields (0, 0, 0), which never passes `is_inside_triangle`.
pub fn barycentric_coordinates(
    p: Vector2<f32>,
    v1: Vector2<f32>,
    v2: Vector2<f32>,
    v3: Vector2<f32>,
) -> Vector3<f32> {
    let e1 = v2 - v1;
    let e2 = v3 - v1;
    let p_v1 = p - v1;

    // Area of the main triangle (times 2) using 2D cross product determinant
    let total_area_x2 = e1.x * e2.y - e1.y * e2.x;

    if total_area_x2.abs() < BARYCENTRIC_EPSILON {
        return Vector3::zeros();
    }

    let inv_total_area_x2 = 1.0 / total_area_x2;

    // Area of subtriangle opposite v2 (p, v3, v1) / total_area -> bary for v2 (beta)
    let beta = (p_v1.x * e2.y - p_v1.y * e2.x) * inv_total_area_x2;

    // Area of subtriangle opposite v3 (p, v1, v2) / total_area -> bary for v3 (gamma)
    let gamma = (e1.x * p_v1.y - e1.y * p_v1.x) * inv_total_area_x2;

    Vector3::new(1.0 - beta - gamma, beta, gamma)
}

/// Checks if the barycentric coordinates indicate the point is inside the triangle.
/// Edge pixels are accepted so adjacent triangles leave no gap between them.
#[inline(always)]
pub fn is_inside_triangle(bary: Vector3<f32>) -> bool {
    bary.x >= -INSIDE_EPSILON
        && bary.y >= -INSIDE_EPSILON
        && bary.z >= -INSIDE_EPSILON
        && (bary.x + bary.y + bary.z - 1.0).abs() <= INSIDE_EPSILON
}

/// Screen-linear interpolation `α·v1 + β·v2 + γ·v3`, for scalars and vectors alike.
#[inline]
pub fn interpolate<T>(bary: Vector3<f32>, v1: T, v2: T, v3: T) -> T
where
    T: Mul<f32, Output = T> + Add<Output = T>,
{
    v1 * bary.x + v2 * bary.y + v3 * bary.z
}

/// Perspective-correct weights `αᵢ/wᵢ / Σ(αⱼ/wⱼ)`.
///
/// `w` are the per-vertex view depths (clip-space w). Returns None when any
/// depth or the interpolated `1/w` is too close to zero to divide by.
pub fn perspective_weights(bary: Vector3<f32>, w: Vector3<f32>) -> Option<Vector3<f32>> {
    if w.iter().any(|wi| wi.abs() <= W_EPSILON) {
        return None;
    }

    let over_w = bary.component_div(&w);
    let sum = over_w.x + over_w.y + over_w.z;
    if sum.abs() <= W_EPSILON * W_EPSILON {
        return None;
    }

    Some(over_w / sum)
}

/// Perspective-correct interpolation `Σ(αᵢ·Xᵢ/wᵢ) / Σ(αᵢ/wᵢ)`.
/// Falls back to screen-linear interpolation when the depths are unusable.
pub fn interpolate_perspective<T>(bary: Vector3<f32>, w: Vector3<f32>, v1: T, v2: T, v3: T) -> T
where
    T: Mul<f32, Output = T> + Add<Output = T>,
{
    let weights = perspective_weights(bary, w).unwrap_or(bary);
    interpolate(weights, v1, v2, v3)
}

/// Interpolates an optional per-vertex vector attribute.
/// Returns None unless all three vertices carry the attribute.
pub fn interpolate_optional<T>(weights: Vector3<f32>, values: [Option<T>; 3]) -> Option<T>
where
    T: Mul<f32, Output = T> + Add<Output = T>,
{
    match values {
        [Some(a), Some(b), Some(c)] => Some(interpolate(weights, a, b, c)),
        _ => None,
    }
}

/// Depth-buffer value for a pixel: projected NDC depth interpolated with
/// perspective correction, then remapped from [-1, 1] to [0, 1].
pub fn interpolate_depth(bary: Vector3<f32>, w: Vector3<f32>, z_ndc: Vector3<f32>) -> f32 {
    let z = interpolate_perspective(bary, w, z_ndc.x, z_ndc.y, z_ndc.z);
    (z + 1.0) * 0.5
}
