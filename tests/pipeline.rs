use approx::assert_relative_eq;
use mesh_rasterizer::core::renderer::render_with_settings;
use mesh_rasterizer::geometry::camera::Camera;
use mesh_rasterizer::io::config_loader::TomlConfigLoader;
use mesh_rasterizer::io::obj_loader::load_obj_from_reader;
use mesh_rasterizer::io::render_settings::RenderSettings;
use mesh_rasterizer::material_system::color::Color;
use mesh_rasterizer::material_system::shading::{HeadlightShader, Shader};
use mesh_rasterizer::{DepthBuffer, Fragment, Mesh, Renderer, Vertex};
use nalgebra::{Point3, Vector2, Vector3};
use std::cell::RefCell;
use std::f32::consts::TAU;
use std::io::Cursor;

const SIZE: usize = 64;

fn settings() -> RenderSettings {
    RenderSettings {
        width: SIZE,
        height: SIZE,
        use_gamma: false,
        background_color: "0,0,0".to_string(),
        ..Default::default()
    }
}

fn camera() -> Camera {
    Camera::new_perspective(
        Point3::new(0.0, 0.0, 3.0),
        Point3::origin(),
        Vector3::y(),
        60.0,
        1.0,
        0.1,
        100.0,
    )
}

/// 按世界坐标 z 区分前后两层
struct LayerShader;

impl Shader for LayerShader {
    fn shade(&self, fragment: &Fragment) -> Color {
        if fragment.world_position.z > 0.0 {
            Color::new(1.0, 0.0, 0.0)
        } else {
            Color::new(0.0, 0.0, 1.0)
        }
    }
}

/// 记录每个片元收到的 UV
#[derive(Default)]
struct UvProbe {
    seen: RefCell<Vec<(bool, Vector2<f32>)>>,
}

impl Shader for UvProbe {
    fn shade(&self, fragment: &Fragment) -> Color {
        self.seen
            .borrow_mut()
            .push((fragment.has_texcoord, fragment.uv));
        Color::new(fragment.uv.x, fragment.uv.y, 0.0)
    }
}

fn square(vertices: &mut Vec<Vertex>, half: f32, z: f32) -> Vec<u32> {
    let base = vertices.len() as u32;
    for (x, y) in [(-half, -half), (half, -half), (half, half), (-half, half)] {
        vertices.push(Vertex::new(Vector3::new(x, y, z)));
    }
    (base..base + 4).collect()
}

fn two_layers(near_first: bool) -> Mesh {
    let mut vertices = Vec::new();
    let far = square(&mut vertices, 1.0, -0.5);
    let near = square(&mut vertices, 0.3, 0.5);
    let (first, second) = if near_first { (near, far) } else { (far, near) };

    let mut polygons = first;
    polygons.extend(second);
    Mesh::new(vertices, polygons, vec![0, 4], None).unwrap()
}

#[test]
fn nearer_surface_wins_regardless_of_draw_order() {
    let settings = settings();
    let camera = camera();

    for near_first in [false, true] {
        let mut renderer = Renderer::new(SIZE, SIZE);
        let stats = render_with_settings(
            &mut renderer,
            &two_layers(near_first),
            &camera,
            &settings,
            &LayerShader,
        );

        assert_eq!(stats.triangles_submitted, 4);
        assert_eq!(renderer.frame_buffer.get_pixel(32, 32), Some([255, 0, 0]));
        assert_eq!(renderer.frame_buffer.get_pixel(20, 32), Some([0, 0, 255]));
        assert_eq!(renderer.frame_buffer.get_pixel(2, 2), Some([0, 0, 0]));

        let near_depth = renderer.depth_buffer.get_depth(32, 32);
        let far_depth = renderer.depth_buffer.get_depth(20, 32);
        assert!(near_depth < far_depth);
        assert!(far_depth < 1.0);
        assert_eq!(renderer.depth_buffer.get_depth(2, 2), DepthBuffer::CLEARED);
    }
}

#[test]
fn octagon_with_uvs_is_triangulated_and_interpolated() {
    let mut vertices = Vec::new();
    let mut uv_indices = Vec::new();
    for i in 0..8 {
        let angle = TAU * i as f32 / 8.0;
        let (sin, cos) = angle.sin_cos();
        let mut vertex = Vertex::new(Vector3::new(cos, sin, 0.0));
        let uv = vertex.add_texture_coordinate(Vector2::new(0.5 + 0.5 * cos, 0.5 + 0.5 * sin));
        uv_indices.push(uv as u32);
        vertices.push(vertex);
    }
    let mut mesh = Mesh::new(vertices, (0..8).collect(), vec![0], Some(uv_indices)).unwrap();
    mesh.compute_vertex_normals();

    let probe = UvProbe::default();
    let mut renderer = Renderer::new(SIZE, SIZE);
    let stats = render_with_settings(&mut renderer, &mesh, &camera(), &settings(), &probe);

    assert_eq!(stats.triangles_submitted, 6);
    assert_eq!(stats.triangles_skipped, 0);

    let seen = probe.seen.borrow();
    assert_eq!(seen.len(), stats.fragments_written);
    assert!(!seen.is_empty());
    for &(has_texcoord, uv) in seen.iter() {
        assert!(has_texcoord);
        assert!((-1e-4..=1.0 + 1e-4).contains(&uv.x));
        assert!((-1e-4..=1.0 + 1e-4).contains(&uv.y));
    }

    let covered = renderer
        .depth_buffer
        .as_slice()
        .iter()
        .filter(|&&d| d != DepthBuffer::CLEARED)
        .count();
    assert!(covered > 0);
    assert!(covered <= stats.fragments_written);
}

#[test]
fn obj_source_renders_with_estimated_normals() {
    let source = "v -1 -1 0\nv 1 -1 0\nv 1 1 0\nv -1 1 0\nf 1 2 3 4\n";
    let mut mesh = load_obj_from_reader(&mut Cursor::new(source.as_bytes())).unwrap();
    mesh.compute_vertex_normals();
    for vertex in &mesh.vertices {
        assert_relative_eq!(vertex.normal.unwrap(), Vector3::z(), epsilon = 1e-6);
    }

    let shader = HeadlightShader::new(Color::new(1.0, 1.0, 1.0), Vector3::new(0.0, 0.0, 3.0));
    let mut renderer = Renderer::new(SIZE, SIZE);
    render_with_settings(&mut renderer, &mesh, &camera(), &settings(), &shader);

    // 正对相机的中心像素接近满亮度
    let [r, g, b] = renderer.frame_buffer.get_pixel(32, 32).unwrap();
    assert!(r > 240 && g > 240 && b > 240);
}

#[test]
fn toml_settings_drive_a_frame() {
    let content = r#"
        [render]
        width = 48
        height = 32
        projection = "orthographic"
        use_gamma = false
        background_color = "0,0,0"

        [camera]
        from = "0,0,5"
        ortho_height = 4.0

        [wireframe]
        enabled = true
        line_width = 2
        color = "0,1,0"
    "#;
    let settings = TomlConfigLoader::load_from_content(content).unwrap();
    settings.validate().unwrap();
    let camera = settings.build_camera().unwrap();
    assert!(!camera.is_perspective());

    let mut vertices = Vec::new();
    let polygon = square(&mut vertices, 1.0, 0.0);
    let mesh = Mesh::new(vertices, polygon, vec![0], None).unwrap();

    let mut renderer = Renderer::new(settings.width, settings.height);
    let shader = HeadlightShader::new(Color::new(1.0, 0.0, 0.0), camera.position.coords);
    let stats = render_with_settings(&mut renderer, &mesh, &camera, &settings, &shader);

    assert!(stats.fragments_written > 0);
    assert_eq!(renderer.frame_buffer.get_pixel(24, 16), Some([255, 0, 0]));

    let green = (0..settings.height)
        .flat_map(|y| (0..settings.width).map(move |x| (x, y)))
        .filter(|&(x, y)| renderer.frame_buffer.get_pixel(x, y) == Some([0, 255, 0]))
        .count();
    assert!(green > 0);
}

#[test]
fn depth_buffer_keeps_the_nearest_value() {
    let mut depth = DepthBuffer::new(4, 4);
    depth.clear();
    assert!(depth.test_and_set(1, 2, 0.5));
    assert!(!depth.test_and_set(1, 2, 0.9));
    assert!(depth.test_and_set(1, 2, 0.3));
    assert_eq!(depth.get_depth(1, 2), 0.3);
    assert!(!depth.test_and_set(-1, 0, 0.1));
    assert_eq!(depth.get_depth(7, 7), DepthBuffer::CLEARED);
}
