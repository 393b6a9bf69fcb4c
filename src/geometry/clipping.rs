//! 裁剪空间近平面裁剪
//!
//! 只裁剪近平面 `z >= -w`（NDC 深度范围 [-1, 1]），其余平面不裁剪，
//! 超出屏幕的部分由光栅化包围盒截断。

use nalgebra::{Vector2, Vector3, Vector4};

/// 裁剪空间顶点，携带所有待插值属性
#[derive(Debug, Clone, PartialEq)]
pub struct ClipVertex {
    pub position: Vector4<f32>,
    pub texcoord: Option<Vector2<f32>>,
    pub normal_view: Option<Vector3<f32>>,
    pub normal_world: Option<Vector3<f32>>,
    pub position_world: Vector3<f32>,
}

impl ClipVertex {
    /// 到近平面的有向距离，非负表示在可见一侧
    #[inline]
    pub fn near_distance(&self) -> f32 {
        self.position.z + self.position.w
    }

    /// 沿边线性插值所有属性（裁剪空间中插值是正确的）
    pub fn lerp(&self, other: &Self, t: f32) -> Self {
        Self {
            position: self.position.lerp(&other.position, t),
            texcoord: lerp_optional(self.texcoord, other.texcoord, t),
            normal_view: lerp_optional(self.normal_view, other.normal_view, t),
            normal_world: lerp_optional(self.normal_world, other.normal_world, t),
            position_world: self.position_world.lerp(&other.position_world, t),
        }
    }
}

fn lerp_optional<const D: usize>(
    a: Option<nalgebra::SVector<f32, D>>,
    b: Option<nalgebra::SVector<f32, D>>,
    t: f32,
) -> Option<nalgebra::SVector<f32, D>> {
    match (a, b) {
        (Some(a), Some(b)) => Some(a.lerp(&b, t)),
        _ => None,
    }
}

/// Sutherland–Hodgman 近平面裁剪，返回凸多边形（0、3 或 4 个顶点）
pub fn clip_near_plane(triangle: &[ClipVertex; 3]) -> Vec<ClipVertex> {
    let distances = triangle.each_ref().map(ClipVertex::near_distance);
    if distances.iter().all(|&d| d >= 0.0) {
        return triangle.to_vec();
    }
    if distances.iter().all(|&d| d < 0.0) {
        return Vec::new();
    }

    let mut output = Vec::with_capacity(4);
    for i in 0..3 {
        let next = (i + 1) % 3;
        let (current, following) = (&triangle[i], &triangle[next]);
        let (d1, d2) = (distances[i], distances[next]);

        if d1 >= 0.0 {
            output.push(current.clone());
        }
        if (d1 >= 0.0) != (d2 >= 0.0) {
            let t = d1 / (d1 - d2);
            output.push(current.lerp(following, t));
        }
    }

    output
}

/// 凸多边形扇形三角化
pub fn fan_triangles(polygon: &[ClipVertex]) -> impl Iterator<Item = [&ClipVertex; 3]> {
    (1..polygon.len().saturating_sub(1)).map(move |i| [&polygon[0], &polygon[i], &polygon[i + 1]])
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn vertex(z: f32, w: f32, u: f32) -> ClipVertex {
        ClipVertex {
            position: Vector4::new(0.0, 0.0, z, w),
            texcoord: Some(Vector2::new(u, 0.0)),
            normal_view: None,
            normal_world: None,
            position_world: Vector3::new(u, 0.0, 0.0),
        }
    }

    #[test]
    fn fully_visible_triangle_is_unchanged() {
        let tri = [vertex(0.0, 1.0, 0.0), vertex(0.5, 1.0, 0.5), vertex(0.9, 1.0, 1.0)];
        assert_eq!(clip_near_plane(&tri), tri.to_vec());
    }

    #[test]
    fn fully_behind_triangle_is_removed() {
        let tri = [vertex(-2.0, 1.0, 0.0), vertex(-3.0, 1.0, 0.5), vertex(-5.0, 1.0, 1.0)];
        assert!(clip_near_plane(&tri).is_empty());
    }

    #[test]
    fn one_vertex_behind_yields_quad() {
        let tri = [vertex(-3.0, 1.0, 0.0), vertex(0.0, 1.0, 1.0), vertex(0.0, 1.0, 1.0)];
        let clipped = clip_near_plane(&tri);
        assert_eq!(clipped.len(), 4);
        assert!(clipped.iter().all(|v| v.near_distance() >= -1e-6));
        assert_eq!(fan_triangles(&clipped).count(), 2);

        // 交点在 d = -2 与 d = 1 之间的 2/3 处
        let entry = &clipped[3];
        assert_relative_eq!(entry.texcoord.unwrap().x, 2.0 / 3.0, epsilon = 1e-6);
        assert_relative_eq!(entry.position_world.x, 2.0 / 3.0, epsilon = 1e-6);
    }

    #[test]
    fn two_vertices_behind_yield_triangle() {
        let tri = [vertex(0.0, 1.0, 0.0), vertex(-3.0, 1.0, 1.0), vertex(-3.0, 1.0, 1.0)];
        let clipped = clip_near_plane(&tri);
        assert_eq!(clipped.len(), 3);
        assert_eq!(fan_triangles(&clipped).count(), 1);
    }
}
