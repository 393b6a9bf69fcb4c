use crate::core::depth_buffer::DepthBuffer;
use crate::core::frame_buffer::{FrameBuffer, save_depth};
use crate::core::rasterizer::{
    Fragment, LinePoint, TriangleData, VertexRenderData, draw_thick_line, rasterize_triangle,
};
use crate::geometry::camera::Camera;
use crate::geometry::clipping::{ClipVertex, clip_near_plane, fan_triangles};
use crate::geometry::math::{
    SafeNormalize, W_EPSILON, transform_homogeneous, transform_point_affine,
};
use crate::geometry::transform::{compute_normal_matrix, ndc_depth_to_unit, ndc_to_pixel};
use crate::geometry::triangulation::triangulate_positions;
use crate::io::render_settings::RenderSettings;
use crate::material_system::shading::Shader;
use crate::model::mesh::Mesh;
use log::{debug, info};
use nalgebra::{Matrix3, Matrix4, Vector4};
use std::path::Path;
use std::time::Instant;

/// 线框与顶点高亮相对于表面深度的容差
const OVERLAY_DEPTH_BIAS: f32 = 1e-3;

/// 单帧渲染所需的只读上下文
pub struct RenderContext<'a> {
    pub camera: &'a Camera,
    pub model_matrix: Matrix4<f32>,
    pub settings: &'a RenderSettings,
}

/// 单帧统计
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RenderStats {
    /// 三角化后送入管线的三角形数
    pub triangles_submitted: usize,
    /// 整个位于近平面之后而被裁掉的三角形数
    pub triangles_clipped: usize,
    /// 因索引越界或屏幕空间退化而跳过的三角形数
    pub triangles_skipped: usize,
    pub fragments_written: usize,
}

/// 逐帧变换矩阵，避免在每个顶点上重复组合
struct FrameTransforms {
    model: Matrix4<f32>,
    view_projection: Matrix4<f32>,
    normal_world: Matrix3<f32>,
    normal_view: Matrix3<f32>,
}

impl FrameTransforms {
    fn new(context: &RenderContext) -> Self {
        let model = context.model_matrix;
        let view = context.camera.view_matrix();
        Self {
            model,
            view_projection: context.camera.view_projection_matrix(),
            normal_world: compute_normal_matrix(&model),
            normal_view: compute_normal_matrix(&(view * model)),
        }
    }
}

/// 渲染器：持有颜色与深度缓冲，按多边形驱动光栅化
pub struct Renderer {
    pub frame_buffer: FrameBuffer,
    pub depth_buffer: DepthBuffer,
}

impl Renderer {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            frame_buffer: FrameBuffer::new(width, height),
            depth_buffer: DepthBuffer::new(width, height),
        }
    }

    pub fn width(&self) -> usize {
        self.frame_buffer.width
    }

    pub fn height(&self) -> usize {
        self.frame_buffer.height
    }

    /// 渲染一帧：清屏、逐多边形三角化与光栅化、可选线框叠加
    pub fn render<S>(&mut self, mesh: &Mesh, context: &RenderContext, shader: &S) -> RenderStats
    where
        S: Shader + ?Sized,
    {
        let frame_start = Instant::now();
        let settings = context.settings;
        let apply_gamma = settings.use_gamma;

        self.frame_buffer
            .clear(&settings.get_background_color_vec(), apply_gamma);
        self.depth_buffer.clear();

        let transforms = FrameTransforms::new(context);
        let mut stats = RenderStats::default();

        for polygon in 0..mesh.polygon_count() {
            let corner_start = mesh.polygon_range(polygon).start;
            let corners = mesh.polygon(polygon);

            for triangle in triangulate_positions(corners.len()) {
                stats.triangles_submitted += 1;

                let Some(clip_vertices) = self.clip_triangle(
                    mesh,
                    &transforms,
                    triangle.map(|position| corner_start + position),
                ) else {
                    debug!("多边形 {} 引用了越界顶点，跳过该三角形", polygon);
                    stats.triangles_skipped += 1;
                    continue;
                };

                let clipped = clip_near_plane(&clip_vertices);
                if clipped.is_empty() {
                    stats.triangles_clipped += 1;
                    continue;
                }

                for [a, b, c] in fan_triangles(&clipped) {
                    let (Some(a), Some(b), Some(c)) = (
                        self.to_screen(a),
                        self.to_screen(b),
                        self.to_screen(c),
                    ) else {
                        stats.triangles_skipped += 1;
                        continue;
                    };

                    let triangle_data = TriangleData::new([a, b, c]);
                    if !triangle_data.is_valid() {
                        stats.triangles_skipped += 1;
                        continue;
                    }

                    let frame_buffer = &mut self.frame_buffer;
                    let mut sink = |fragment: &Fragment| {
                        let color = shader.shade(fragment);
                        frame_buffer.set_pixel(fragment.x, fragment.y, &color, apply_gamma);
                    };
                    stats.fragments_written +=
                        rasterize_triangle(&triangle_data, &mut self.depth_buffer, &mut sink);
                }
            }
        }

        if settings.wireframe || settings.vertex_size > 0 {
            self.draw_overlay(mesh, &transforms, settings);
        }

        info!(
            "渲染完成: {} 个三角形, {} 个被近平面裁掉, {} 个跳过, {} 个片元, 耗时 {:?}",
            stats.triangles_submitted,
            stats.triangles_clipped,
            stats.triangles_skipped,
            stats.fragments_written,
            frame_start.elapsed()
        );

        stats
    }

    /// 把三个角变换到裁剪空间；任一顶点索引越界时返回 None
    fn clip_triangle(
        &self,
        mesh: &Mesh,
        transforms: &FrameTransforms,
        corners: [usize; 3],
    ) -> Option<[ClipVertex; 3]> {
        let [a, b, c] = corners;
        Some([
            clip_vertex(mesh, transforms, a)?,
            clip_vertex(mesh, transforms, b)?,
            clip_vertex(mesh, transforms, c)?,
        ])
    }

    /// 透视除法并映射到像素坐标；`w` 过小时返回 None
    fn to_screen(&self, vertex: &ClipVertex) -> Option<VertexRenderData> {
        let clip = vertex.position;
        if clip.w.abs() <= W_EPSILON {
            return None;
        }

        let ndc = clip.xyz() / clip.w;
        let pix = ndc_to_pixel(ndc.x, ndc.y, self.width() as f32, self.height() as f32);

        Some(VertexRenderData {
            pix,
            w: clip.w,
            z_ndc: ndc.z,
            texcoord: vertex.texcoord,
            normal_view: vertex.normal_view,
            normal_world: vertex.normal_world,
            position_world: Some(vertex.position_world),
        })
    }

    /// 多边形轮廓与顶点高亮，在表面之后单独绘制
    fn draw_overlay(&mut self, mesh: &Mesh, transforms: &FrameTransforms, settings: &RenderSettings) {
        let color = settings.get_wireframe_color_vec();
        let apply_gamma = settings.use_gamma;
        let (width, height) = (self.width() as f32, self.height() as f32);

        // 位于近平面之后的顶点不参与叠加
        let projected: Vec<Option<LinePoint>> = mesh
            .vertices
            .iter()
            .map(|vertex| {
                let world = transform_point_affine(&transforms.model, &vertex.position);
                let clip = transform_homogeneous(&transforms.view_projection, &world);
                project_overlay_point(clip, width, height)
            })
            .collect();

        let frame_buffer = &mut self.frame_buffer;
        let depth_buffer = &mut self.depth_buffer;
        let mut plot = |x: i32, y: i32, depth: f32| {
            let current = depth_buffer.get_depth(x, y);
            if depth <= current + OVERLAY_DEPTH_BIAS {
                frame_buffer.set_pixel(x, y, &color, apply_gamma);
                depth_buffer.set_depth(x, y, depth.min(current));
            }
        };

        if settings.wireframe {
            for polygon in 0..mesh.polygon_count() {
                let corners = mesh.polygon(polygon);
                for (i, &start) in corners.iter().enumerate() {
                    let end = corners[(i + 1) % corners.len()];
                    let endpoints = (
                        projected.get(start as usize).copied().flatten(),
                        projected.get(end as usize).copied().flatten(),
                    );
                    if let (Some(p0), Some(p1)) = endpoints {
                        draw_thick_line(p0, p1, settings.line_width, &mut plot);
                    }
                }
            }
        }

        if settings.vertex_size > 0 {
            for point in projected.iter().flatten() {
                draw_thick_line(*point, *point, settings.vertex_size, &mut plot);
            }
        }

        debug!(
            "叠加绘制完成: 线框={}, 顶点大小={}",
            settings.wireframe, settings.vertex_size
        );
    }

    /// 保存颜色图与（可选）深度图，文件名为 `<output>_color.png` / `<output>_depth.png`
    pub fn save_outputs(&self, settings: &RenderSettings) -> Result<(), String> {
        std::fs::create_dir_all(&settings.output_dir).map_err(|e| {
            format!("创建输出目录 '{}' 失败: {}", settings.output_dir, e)
        })?;

        let dir = Path::new(&settings.output_dir);
        self.frame_buffer
            .save_color(dir.join(format!("{}_color.png", settings.output)))?;

        if settings.save_depth {
            save_depth(
                &self.depth_buffer,
                dir.join(format!("{}_depth.png", settings.output)),
            )?;
        }

        Ok(())
    }
}

/// 单个角：模型 → 世界 → 裁剪空间，同时准备 UV 与两套法线
fn clip_vertex(mesh: &Mesh, transforms: &FrameTransforms, corner: usize) -> Option<ClipVertex> {
    let vertex_index = mesh.corner_vertex(corner)?;
    let vertex = mesh.vertices.get(vertex_index)?;

    let position_world = transform_point_affine(&transforms.model, &vertex.position);
    let position = transform_homogeneous(&transforms.view_projection, &position_world);

    Some(ClipVertex {
        position,
        texcoord: mesh.texture_coordinate(corner),
        normal_view: vertex
            .normal
            .map(|n| (transforms.normal_view * n).safe_normalize()),
        normal_world: vertex
            .normal
            .map(|n| (transforms.normal_world * n).safe_normalize()),
        position_world,
    })
}

fn project_overlay_point(clip: Vector4<f32>, width: f32, height: f32) -> Option<LinePoint> {
    if clip.z + clip.w < 0.0 || clip.w.abs() <= W_EPSILON {
        return None;
    }

    let ndc = clip.xyz() / clip.w;
    let pix = ndc_to_pixel(ndc.x, ndc.y, width, height);
    if !pix.x.is_finite() || !pix.y.is_finite() {
        return None;
    }

    Some(LinePoint::new(
        pix.x.floor() as i32,
        pix.y.floor() as i32,
        ndc_depth_to_unit(ndc.z),
    ))
}

/// 便捷入口：按设置构造上下文并渲染
pub fn render_with_settings<S>(
    renderer: &mut Renderer,
    mesh: &Mesh,
    camera: &Camera,
    settings: &RenderSettings,
    shader: &S,
) -> RenderStats
where
    S: Shader + ?Sized,
{
    let context = RenderContext {
        camera,
        model_matrix: settings.get_model_matrix(),
        settings,
    };
    renderer.render(mesh, &context, shader)
}
