use crate::geometry::normals::compute_vertex_normals;
use crate::geometry::triangulation::{apply_triangulation, triangulate_indices, triangulate_positions};
use log::debug;
use nalgebra::{Vector2, Vector3};
use std::ops::Range;

/// 顶点：位置、可选法线、以及多个纹理坐标变体（支持 UV 接缝）
#[derive(Debug, Clone, PartialEq)]
pub struct Vertex {
    pub position: Vector3<f32>,
    /// 法线估计之前为 None
    pub normal: Option<Vector3<f32>>,
    /// 同一几何顶点在不同面上可能需要不同的 UV
    pub texture_coordinates: Vec<Vector2<f32>>,
}

impl Vertex {
    pub fn new(position: Vector3<f32>) -> Self {
        Self {
            position,
            normal: None,
            texture_coordinates: Vec::new(),
        }
    }

    /// 追加一个 UV 变体并返回其下标；完全相等的 UV 复用已有下标
    pub fn add_texture_coordinate(&mut self, uv: Vector2<f32>) -> usize {
        if let Some(index) = self.texture_coordinates.iter().position(|existing| *existing == uv) {
            return index;
        }
        self.texture_coordinates.push(uv);
        self.texture_coordinates.len() - 1
    }
}

/// 扁平索引存储的多边形网格
///
/// - `polygons`：所有多边形的顶点索引首尾相接
/// - `polygon_boundaries`：每个多边形在 `polygons` 中的起始偏移，严格递增且从 0 开始
/// - `polygon_texture_indices`：可选，与 `polygons` 等长，给出每个角使用的 UV 变体
#[derive(Debug, Clone, Default)]
pub struct Mesh {
    pub vertices: Vec<Vertex>,
    polygons: Vec<u32>,
    polygon_boundaries: Vec<u32>,
    polygon_texture_indices: Option<Vec<u32>>,
}

impl Mesh {
    /// 构造并校验网格不变量；不合法的输入在这里被拒绝，不会进入光栅化阶段
    pub fn new(
        vertices: Vec<Vertex>,
        polygons: Vec<u32>,
        polygon_boundaries: Vec<u32>,
        polygon_texture_indices: Option<Vec<u32>>,
    ) -> Result<Self, String> {
        let mesh = Self {
            vertices,
            polygons,
            polygon_boundaries,
            polygon_texture_indices,
        };
        mesh.validate()?;
        Ok(mesh)
    }

    fn validate(&self) -> Result<(), String> {
        if self.polygon_boundaries.is_empty() {
            if self.polygons.is_empty() {
                return Ok(());
            }
            return Err("存在顶点索引但没有多边形边界".to_string());
        }

        if self.polygon_boundaries[0] != 0 {
            return Err(format!(
                "多边形边界必须从 0 开始，实际为 {}",
                self.polygon_boundaries[0]
            ));
        }

        for (i, pair) in self.polygon_boundaries.windows(2).enumerate() {
            if pair[1] <= pair[0] {
                return Err(format!(
                    "多边形边界必须严格递增：第 {} 个为 {}，第 {} 个为 {}",
                    i,
                    pair[0],
                    i + 1,
                    pair[1]
                ));
            }
        }

        for polygon in 0..self.polygon_count() {
            let range = self.polygon_range(polygon);
            if range.end > self.polygons.len() {
                return Err(format!("多边形 {} 的边界超出索引数组", polygon));
            }
            if range.len() < 3 {
                return Err(format!("多边形 {} 只有 {} 个顶点", polygon, range.len()));
            }
        }

        if let Some(index) = self
            .polygons
            .iter()
            .find(|&&index| index as usize >= self.vertices.len())
        {
            return Err(format!(
                "顶点索引 {} 越界（共 {} 个顶点）",
                index,
                self.vertices.len()
            ));
        }

        if let Some(texture_indices) = &self.polygon_texture_indices {
            if texture_indices.len() != self.polygons.len() {
                return Err(format!(
                    "纹理索引数量 {} 与顶点索引数量 {} 不一致",
                    texture_indices.len(),
                    self.polygons.len()
                ));
            }

            for (corner, (&vertex, &uv)) in self.polygons.iter().zip(texture_indices).enumerate() {
                let variants = self.vertices[vertex as usize].texture_coordinates.len();
                if uv as usize >= variants {
                    return Err(format!(
                        "第 {} 个角的纹理索引 {} 越界（顶点 {} 只有 {} 个 UV）",
                        corner, uv, vertex, variants
                    ));
                }
            }
        }

        Ok(())
    }

    pub fn polygon_count(&self) -> usize {
        self.polygon_boundaries.len()
    }

    pub fn corner_count(&self) -> usize {
        self.polygons.len()
    }

    /// 多边形在扁平数组中的角范围；最后一个多边形延伸到数组末尾
    pub fn polygon_range(&self, polygon: usize) -> Range<usize> {
        let start = self.polygon_boundaries[polygon] as usize;
        let end = self
            .polygon_boundaries
            .get(polygon + 1)
            .map_or(self.polygons.len(), |&next| next as usize);
        start..end
    }

    pub fn polygon(&self, polygon: usize) -> &[u32] {
        &self.polygons[self.polygon_range(polygon)]
    }

    pub fn polygon_texture_indices(&self, polygon: usize) -> Option<&[u32]> {
        let range = self.polygon_range(polygon);
        self.polygon_texture_indices
            .as_ref()
            .map(|indices| &indices[range])
    }

    pub fn has_texture_coordinates(&self) -> bool {
        self.polygon_texture_indices.is_some()
    }

    pub fn is_triangulated(&self) -> bool {
        (0..self.polygon_count()).all(|polygon| self.polygon_range(polygon).len() == 3)
    }

    /// 某个角引用的顶点下标
    pub fn corner_vertex(&self, corner: usize) -> Option<usize> {
        self.polygons.get(corner).map(|&vertex| vertex as usize)
    }

    /// 某个角的 UV；没有 UV 或索引越界时返回 None
    pub fn texture_coordinate(&self, corner: usize) -> Option<Vector2<f32>> {
        let vertex = *self.polygons.get(corner)? as usize;
        let uv_index = *self.polygon_texture_indices.as_ref()?.get(corner)? as usize;
        self.vertices
            .get(vertex)?
            .texture_coordinates
            .get(uv_index)
            .copied()
    }

    /// 生成三角化后的新网格
    ///
    /// 有 UV 索引时按多边形内位置三角化，同一组三元组同时作用于顶点索引和 UV 索引；
    /// 否则直接在顶点索引上三角化。
    pub fn triangulate(&self) -> Mesh {
        let mut polygons = Vec::with_capacity(self.polygons.len() * 2);
        let mut boundaries = Vec::with_capacity(self.polygon_count() * 2);
        let mut texture_indices = self
            .polygon_texture_indices
            .as_ref()
            .map(|_| Vec::with_capacity(self.polygons.len() * 2));

        for polygon in 0..self.polygon_count() {
            let corners = self.polygon(polygon);

            match (&mut texture_indices, self.polygon_texture_indices(polygon)) {
                (Some(out_uv), Some(uv)) => {
                    let triangles = triangulate_positions(corners.len());
                    for chunk in apply_triangulation(corners, &triangles).chunks_exact(3) {
                        boundaries.push(polygons.len() as u32);
                        polygons.extend_from_slice(chunk);
                    }
                    out_uv.extend(apply_triangulation(uv, &triangles));
                }
                _ => {
                    for triangle in triangulate_indices(corners) {
                        boundaries.push(polygons.len() as u32);
                        polygons.extend_from_slice(&triangle);
                    }
                }
            }
        }

        debug!(
            "三角化：{} 个多边形 -> {} 个三角形",
            self.polygon_count(),
            boundaries.len()
        );

        Mesh {
            vertices: self.vertices.clone(),
            polygons,
            polygon_boundaries: boundaries,
            polygon_texture_indices: texture_indices,
        }
    }

    /// 面积加权顶点法线，覆盖旧值；非三角形的多边形按同样的二分细分拆成三角形参与加权
    pub fn compute_vertex_normals(&mut self) {
        let positions: Vec<Vector3<f32>> = self.vertices.iter().map(|v| v.position).collect();
        let triangles: Vec<[usize; 3]> = (0..self.polygon_count())
            .flat_map(|polygon| triangulate_indices(self.polygon(polygon)))
            .map(|triangle| triangle.map(|index| index as usize))
            .collect();

        let normals = compute_vertex_normals(&positions, &triangles);
        for (vertex, normal) in self.vertices.iter_mut().zip(normals) {
            vertex.normal = Some(normal);
        }
    }

    /// 轴对齐包围盒 (min, max)；空网格返回 None
    pub fn bounds(&self) -> Option<(Vector3<f32>, Vector3<f32>)> {
        let first = self.vertices.first()?.position;
        Some(self.vertices.iter().fold((first, first), |(min, max), v| {
            (min.inf(&v.position), max.sup(&v.position))
        }))
    }

    /// 平移到原点并缩放到单位立方体内（最长边为 2）
    pub fn normalize_and_center(&mut self) {
        let Some((min, max)) = self.bounds() else {
            return;
        };

        let center = (min + max) * 0.5;
        let extent = (max - min).max();
        let scale = if extent > 1e-6 { 2.0 / extent } else { 1.0 };

        for vertex in &mut self.vertices {
            vertex.position = (vertex.position - center) * scale;
        }
    }
}
