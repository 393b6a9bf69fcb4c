use super::triangle_data::{BoundingBox, TriangleData};
use crate::core::depth_buffer::DepthBuffer;
use crate::geometry::interpolation::{
    barycentric_coordinates, interpolate_depth, interpolate_optional, is_inside_triangle,
    perspective_weights,
};
use crate::geometry::math::SafeNormalize;
use nalgebra::{Vector2, Vector3};

/// 通过深度测试的片元，交给像素着色/合成方
///
/// 缺失的属性不会以 None 传递下去：
/// - 没有 UV 时 `uv = (0, 0)` 且 `has_texcoord = false`
/// - 没有法线时 `normal` / `world_normal` 为零向量
/// - 没有世界坐标时 `world_position` 为原点
#[derive(Debug, Clone, PartialEq)]
pub struct Fragment {
    pub x: i32,
    pub y: i32,
    /// [0, 1]，越小越近
    pub depth: f32,
    pub barycentric: Vector3<f32>,
    pub uv: Vector2<f32>,
    pub has_texcoord: bool,
    /// 观察空间法线（已归一化）
    pub normal: Vector3<f32>,
    pub world_normal: Vector3<f32>,
    pub world_position: Vector3<f32>,
}

/// 像素接收方
pub trait PixelSink {
    fn emit(&mut self, fragment: &Fragment);
}

impl<F> PixelSink for F
where
    F: FnMut(&Fragment),
{
    #[inline]
    fn emit(&mut self, fragment: &Fragment) {
        self(fragment)
    }
}

/// 光栅化单个三角形
///
/// 遍历包围盒内每个像素中心，计算重心坐标，剔除三角形外的像素，
/// 透视校正插值深度后查询深度缓冲，可见时插值属性并交给 `sink`。
/// 返回写入的片元数量。
pub fn rasterize_triangle<S>(
    triangle: &TriangleData,
    depth_buffer: &mut DepthBuffer,
    sink: &mut S,
) -> usize
where
    S: PixelSink + ?Sized,
{
    if !triangle.is_valid() {
        return 0;
    }

    let Some(bbox) = BoundingBox::from_triangle(triangle, depth_buffer.width(), depth_buffer.height())
    else {
        return 0;
    };

    let [v0, v1, v2] = triangle.pix();
    let w = triangle.w();
    let z_ndc = triangle.z_ndc();
    let mut written = 0;

    bbox.for_each_pixel(|x, y| {
        let pixel_center = Vector2::new(x as f32 + 0.5, y as f32 + 0.5);
        let bary = barycentric_coordinates(pixel_center, v0, v1, v2);

        if !is_inside_triangle(bary) {
            return;
        }

        let depth = interpolate_depth(bary, w, z_ndc);
        if !depth.is_finite() {
            return;
        }

        let (x, y) = (x as i32, y as i32);
        if !depth_buffer.test_and_set(x, y, depth) {
            return;
        }

        let fragment = shade_attributes(triangle, bary, w, x, y, depth);
        sink.emit(&fragment);
        written += 1;
    });

    written
}

/// 透视校正插值 UV、法线与世界坐标
fn shade_attributes(
    triangle: &TriangleData,
    bary: Vector3<f32>,
    w: Vector3<f32>,
    x: i32,
    y: i32,
    depth: f32,
) -> Fragment {
    let weights = perspective_weights(bary, w).unwrap_or(bary);
    let [a, b, c] = &triangle.vertices;

    let uv = interpolate_optional(weights, [a.texcoord, b.texcoord, c.texcoord]);
    let normal = interpolate_optional(weights, [a.normal_view, b.normal_view, c.normal_view])
        .map(|n| n.safe_normalize())
        .unwrap_or_else(Vector3::zeros);
    let world_normal = interpolate_optional(weights, [a.normal_world, b.normal_world, c.normal_world])
        .map(|n| n.safe_normalize())
        .unwrap_or_else(Vector3::zeros);
    let world_position = interpolate_optional(
        weights,
        [a.position_world, b.position_world, c.position_world],
    )
    .unwrap_or_else(Vector3::zeros);

    Fragment {
        x,
        y,
        depth,
        barycentric: bary,
        uv: uv.unwrap_or_else(Vector2::zeros),
        has_texcoord: uv.is_some(),
        normal,
        world_normal,
        world_position,
    }
}
