use crate::geometry::math::BARYCENTRIC_EPSILON;
use nalgebra::{Vector2, Vector3};

/// 顶点渲染数据（屏幕空间位置 + 待插值属性）
#[derive(Debug, Clone)]
pub struct VertexRenderData {
    /// 屏幕像素坐标
    pub pix: Vector2<f32>,
    /// 裁剪空间 w（透视投影下即观察空间深度，正交投影下为 1）
    pub w: f32,
    /// NDC 深度 [-1, 1]
    pub z_ndc: f32,
    pub texcoord: Option<Vector2<f32>>,
    pub normal_view: Option<Vector3<f32>>,
    pub normal_world: Option<Vector3<f32>>,
    pub position_world: Option<Vector3<f32>>,
}

impl VertexRenderData {
    /// 只有屏幕位置和深度的顶点（测试与线框等场景）
    pub fn new(pix: Vector2<f32>, w: f32, z_ndc: f32) -> Self {
        Self {
            pix,
            w,
            z_ndc,
            texcoord: None,
            normal_view: None,
            normal_world: None,
            position_world: None,
        }
    }
}

/// 三角形光栅化数据
#[derive(Debug, Clone)]
pub struct TriangleData {
    pub vertices: [VertexRenderData; 3],
}

impl TriangleData {
    pub fn new(vertices: [VertexRenderData; 3]) -> Self {
        Self { vertices }
    }

    /// 屏幕空间有向面积的两倍
    pub fn signed_area_x2(&self) -> f32 {
        let v0 = &self.vertices[0].pix;
        let v1 = &self.vertices[1].pix;
        let v2 = &self.vertices[2].pix;
        (v1.x - v0.x) * (v2.y - v0.y) - (v2.x - v0.x) * (v1.y - v0.y)
    }

    pub fn is_valid(&self) -> bool {
        self.signed_area_x2().abs() >= BARYCENTRIC_EPSILON
    }

    pub fn pix(&self) -> [Vector2<f32>; 3] {
        [
            self.vertices[0].pix,
            self.vertices[1].pix,
            self.vertices[2].pix,
        ]
    }

    pub fn w(&self) -> Vector3<f32> {
        Vector3::new(self.vertices[0].w, self.vertices[1].w, self.vertices[2].w)
    }

    pub fn z_ndc(&self) -> Vector3<f32> {
        Vector3::new(
            self.vertices[0].z_ndc,
            self.vertices[1].z_ndc,
            self.vertices[2].z_ndc,
        )
    }
}

/// 屏幕空间包围盒，半开区间 [min, max)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoundingBox {
    pub min_x: usize,
    pub min_y: usize,
    pub max_x: usize,
    pub max_y: usize,
}

impl BoundingBox {
    /// 取 min 的 floor 与 max 的 ceil，并裁剪到缓冲区范围
    pub fn from_triangle(triangle: &TriangleData, width: usize, height: usize) -> Option<Self> {
        let [v0, v1, v2] = triangle.pix();

        let min_x = v0.x.min(v1.x).min(v2.x).floor().max(0.0) as usize;
        let min_y = v0.y.min(v1.y).min(v2.y).floor().max(0.0) as usize;
        let max_x = v0.x.max(v1.x).max(v2.x).ceil().min(width as f32).max(0.0) as usize;
        let max_y = v0.y.max(v1.y).max(v2.y).ceil().min(height as f32).max(0.0) as usize;

        if max_x <= min_x || max_y <= min_y {
            None
        } else {
            Some(Self {
                min_x,
                min_y,
                max_x,
                max_y,
            })
        }
    }

    pub fn for_each_pixel<F>(&self, mut callback: F)
    where
        F: FnMut(usize, usize),
    {
        for y in self.min_y..self.max_y {
            for x in self.min_x..self.max_x {
                callback(x, y);
            }
        }
    }
}
