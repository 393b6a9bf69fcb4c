use clap::Parser;
use log::{info, warn};
use mesh_rasterizer::core::renderer::{RenderContext, Renderer};
use mesh_rasterizer::io::args::Args;
use mesh_rasterizer::io::config_loader::TomlConfigLoader;
use mesh_rasterizer::io::obj_loader::load_obj_model;
use mesh_rasterizer::io::render_settings::RenderSettings;
use mesh_rasterizer::material_system::color::Color;
use mesh_rasterizer::material_system::shading::{HeadlightShader, NormalShader, Shader};
use mesh_rasterizer::material_system::texture::load_texture;
use nalgebra::Vector3;
use std::path::PathBuf;
use std::time::Instant;

fn main() -> Result<(), String> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();

    if let Some(path) = &args.example_config {
        TomlConfigLoader::create_example_config(path)?;
        info!("已创建示例配置: {}", path);
        return Ok(());
    }

    let settings = args.resolve_settings()?;
    run(&settings)
}

fn run(settings: &RenderSettings) -> Result<(), String> {
    let start_time = Instant::now();

    let obj_path = settings
        .obj
        .as_ref()
        .ok_or_else(|| "错误: 未指定OBJ文件（--obj 或配置 [files].obj）".to_string())?;

    let load_start = Instant::now();
    let loaded = load_obj_model(obj_path)?;
    let mut mesh = loaded.mesh;
    info!("模型 '{}' 加载耗时 {:?}", loaded.name, load_start.elapsed());

    if settings.normalize_model {
        mesh.normalize_and_center();
    }

    // 多边形保持原样：渲染时逐多边形三角化，线框沿原始轮廓绘制
    mesh.compute_vertex_normals();

    let camera = settings.build_camera()?;
    let shader = build_shader(settings, loaded.diffuse_texture, &camera.position.coords);

    let context = RenderContext {
        camera: &camera,
        model_matrix: settings.get_model_matrix(),
        settings,
    };

    let mut renderer = Renderer::new(settings.width, settings.height);
    let stats = renderer.render(&mesh, &context, shader.as_ref());

    if stats.fragments_written == 0 {
        warn!("没有任何片元通过深度测试，请检查相机参数");
    }

    renderer.save_outputs(settings)?;
    info!("总耗时 {:?}", start_time.elapsed());
    Ok(())
}

fn build_shader(
    settings: &RenderSettings,
    mtl_texture: Option<PathBuf>,
    camera_position: &Vector3<f32>,
) -> Box<dyn Shader> {
    if settings.shading == "normal" {
        return Box::new(NormalShader);
    }

    // 命令行/配置中指定的纹理优先于 MTL
    let texture_path = settings.texture.as_ref().map(PathBuf::from).or(mtl_texture);
    let texture = texture_path.map(|path| {
        let texture = load_texture(&path, Color::new(1.0, 1.0, 1.0));
        info!(
            "使用纹理 {:?}: 类型={}, 尺寸={}x{}",
            path,
            texture.get_type_description(),
            texture.width,
            texture.height
        );
        texture
    });

    let mut shader = HeadlightShader::new(settings.get_base_color_vec(), *camera_position)
        .with_texture(texture);
    shader.ambient = settings.ambient;
    shader.use_lighting = settings.use_lighting;
    Box::new(shader)
}
