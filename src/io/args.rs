use crate::io::config_loader::TomlConfigLoader;
use crate::io::render_settings::RenderSettings;
use clap::Parser;
use log::info;

/// TOML驱动的网格光栅化渲染器
///
/// 命令行参数只覆盖显式给出的项，其余取自配置文件或默认值。
#[derive(Parser, Debug, Clone, Default)]
#[command(name = "mesh_rasterizer", author, version, about, long_about = None)]
pub struct Args {
    // ===== 配置文件 =====
    /// 配置文件路径（TOML格式）
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<String>,

    /// 在该路径写出示例配置后退出
    #[arg(long, value_name = "FILE")]
    pub example_config: Option<String>,

    // ===== 文件路径 =====
    /// 输入OBJ文件的路径
    #[arg(long)]
    pub obj: Option<String>,

    /// 漫反射纹理文件
    #[arg(long)]
    pub texture: Option<String>,

    /// 输出文件的基础名称（"render" -> "render_color.png", "render_depth.png"）
    #[arg(short, long)]
    pub output: Option<String>,

    /// 输出图像的目录
    #[arg(long)]
    pub output_dir: Option<String>,

    // ===== 渲染设置 =====
    #[arg(long)]
    pub width: Option<usize>,

    #[arg(long)]
    pub height: Option<usize>,

    /// 投影类型："perspective" 或 "orthographic"
    #[arg(long)]
    pub projection: Option<String>,

    // ===== 相机参数 =====
    /// 相机位置，格式为"x,y,z"
    #[arg(long, allow_negative_numbers = true)]
    pub camera_from: Option<String>,

    /// 相机目标，格式为"x,y,z"
    #[arg(long, allow_negative_numbers = true)]
    pub camera_at: Option<String>,

    /// 相机上方向，格式为"x,y,z"
    #[arg(long, allow_negative_numbers = true)]
    pub camera_up: Option<String>,

    /// 垂直视场角（度）
    #[arg(long)]
    pub fov: Option<f32>,

    // ===== 线框与输出 =====
    /// 叠加多边形轮廓
    #[arg(long)]
    pub wireframe: bool,

    /// 线框线宽（像素）
    #[arg(long)]
    pub line_width: Option<u32>,

    /// 保存深度图（true/false）
    #[arg(long)]
    pub save_depth: Option<bool>,
}

impl Args {
    /// 组合配置文件与命令行覆盖项，得到最终设置
    pub fn resolve_settings(&self) -> Result<RenderSettings, String> {
        let mut settings = if let Some(config_path) = &self.config {
            info!("加载配置文件: {}", config_path);
            TomlConfigLoader::load_from_file(config_path)
                .map_err(|e| format!("配置文件加载失败: {}", e))?
        } else {
            info!("使用默认设置");
            RenderSettings::default()
        };

        self.apply_overrides(&mut settings);
        settings.validate()?;
        Ok(settings)
    }

    pub fn apply_overrides(&self, settings: &mut RenderSettings) {
        if let Some(obj) = &self.obj {
            settings.obj = Some(obj.clone());
        }
        if let Some(texture) = &self.texture {
            settings.texture = Some(texture.clone());
        }
        if let Some(output) = &self.output {
            settings.output = output.clone();
        }
        if let Some(output_dir) = &self.output_dir {
            settings.output_dir = output_dir.clone();
        }
        if let Some(width) = self.width {
            settings.width = width;
        }
        if let Some(height) = self.height {
            settings.height = height;
        }
        if let Some(projection) = &self.projection {
            settings.projection = projection.clone();
        }
        if let Some(from) = &self.camera_from {
            settings.camera_from = from.clone();
        }
        if let Some(at) = &self.camera_at {
            settings.camera_at = at.clone();
        }
        if let Some(up) = &self.camera_up {
            settings.camera_up = up.clone();
        }
        if let Some(fov) = self.fov {
            settings.camera_fov = fov;
        }
        if self.wireframe {
            settings.wireframe = true;
        }
        if let Some(line_width) = self.line_width {
            settings.line_width = line_width.max(1);
        }
        if let Some(save_depth) = self.save_depth {
            settings.save_depth = save_depth;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_given_flags_override() {
        let args = Args::parse_from([
            "mesh_rasterizer",
            "--obj",
            "cube.obj",
            "--width",
            "64",
            "--camera-from",
            "-1,2,-3",
            "--wireframe",
            "--line-width",
            "0",
        ]);
        let mut settings = RenderSettings::default();
        args.apply_overrides(&mut settings);

        assert_eq!(settings.obj.as_deref(), Some("cube.obj"));
        assert_eq!(settings.width, 64);
        assert_eq!(settings.height, RenderSettings::default().height);
        assert_eq!(settings.camera_from, "-1,2,-3");
        assert!(settings.wireframe);
        assert_eq!(settings.line_width, 1);
    }

    #[test]
    fn resolve_without_config_validates() {
        let args = Args::parse_from(["mesh_rasterizer", "--projection", "fisheye"]);
        assert!(args.resolve_settings().is_err());

        let args = Args::parse_from(["mesh_rasterizer", "--save-depth", "false"]);
        assert!(!args.resolve_settings().unwrap().save_depth);
    }
}
