use crate::geometry::math::{AREA_EPSILON, NORMAL_EPSILON, SafeNormalize};
use nalgebra::Vector3;

/// 三角形的几何法线与面积；退化三角形返回 None
pub fn triangle_normal_and_area(
    p0: &Vector3<f32>,
    p1: &Vector3<f32>,
    p2: &Vector3<f32>,
) -> Option<(Vector3<f32>, f32)> {
    let cross = (p1 - p0).cross(&(p2 - p0));
    let length = cross.norm();
    let area = 0.5 * length;

    if length < NORMAL_EPSILON || area < AREA_EPSILON {
        return None;
    }

    Some((cross / length, area))
}

/// 面积加权的顶点法线
///
/// `triangles` 为已三角化的顶点索引。每个非退化三角形向其三个顶点累加
/// `normal × area` 与 `area`，最后取 `(sum / weight)` 归一化。
/// 未被任何有效三角形引用的顶点得到零向量；越界的三角形被跳过。
pub fn compute_vertex_normals(
    positions: &[Vector3<f32>],
    triangles: &[[usize; 3]],
) -> Vec<Vector3<f32>> {
    let mut sums = vec![Vector3::zeros(); positions.len()];
    let mut weights = vec![0.0f32; positions.len()];

    for triangle in triangles {
        if triangle.iter().any(|&index| index >= positions.len()) {
            continue;
        }

        let [i0, i1, i2] = *triangle;
        let Some((normal, area)) =
            triangle_normal_and_area(&positions[i0], &positions[i1], &positions[i2])
        else {
            continue;
        };

        for &index in triangle {
            sums[index] += normal * area;
            weights[index] += area;
        }
    }

    sums.into_iter()
        .zip(weights)
        .map(|(mut sum, weight)| {
            if weight > 0.0 {
                sum /= weight;
                sum.safe_normalize_mut();
                sum
            } else {
                Vector3::zeros()
            }
        })
        .collect()
}
