use crate::geometry::camera::Camera;
use crate::geometry::transform::TransformFactory;
use crate::material_system::color::{Color, parse_color};
use log::warn;
use nalgebra::{Matrix4, Point3, Vector3};

/// 所有可通过TOML或命令行配置的渲染参数（纯数据结构）
#[derive(Debug, Clone, PartialEq)]
pub struct RenderSettings {
    // ===== 文件路径设置 =====
    /// 输入OBJ文件的路径
    pub obj: Option<String>,
    /// 输出文件的基础名称
    pub output: String,
    /// 输出图像的目录
    pub output_dir: String,
    /// 显式指定要使用的纹理文件
    pub texture: Option<String>,

    // ===== 渲染基础设置 =====
    /// 输出图像的宽度
    pub width: usize,
    /// 输出图像的高度
    pub height: usize,
    /// 投影类型："perspective"或"orthographic"
    pub projection: String,
    /// 启用gamma矫正
    pub use_gamma: bool,
    /// 保存深度图
    pub save_depth: bool,
    /// 背景颜色，格式为"r,g,b"
    pub background_color: String,
    /// 加载后将模型居中并缩放到单位立方体
    pub normalize_model: bool,

    // ===== 物体变换（字符串格式，用于TOML序列化）=====
    /// 物体位置 (x,y,z)
    pub object_position: String,
    /// 物体旋转 (欧拉角，度)
    pub object_rotation: String,
    /// 物体缩放 (x,y,z)
    pub object_scale_xyz: String,
    /// 物体的全局均匀缩放因子
    pub object_scale: f32,

    // ===== 相机参数 =====
    /// 相机位置，格式为"x,y,z"
    pub camera_from: String,
    /// 相机目标，格式为"x,y,z"
    pub camera_at: String,
    /// 相机上方向，格式为"x,y,z"
    pub camera_up: String,
    /// 垂直视场角（度，用于透视投影）
    pub camera_fov: f32,
    /// 正交投影的视口高度
    pub ortho_height: f32,
    pub near: f32,
    pub far: f32,

    // ===== 着色 =====
    /// 启用光照计算（相机即光源）
    pub use_lighting: bool,
    /// 环境光强度因子
    pub ambient: f32,
    /// 基础颜色，格式为"r,g,b"
    pub base_color: String,
    /// "headlight" 或 "normal"
    pub shading: String,

    // ===== 线框与顶点高亮 =====
    /// 叠加多边形轮廓
    pub wireframe: bool,
    /// 线宽（像素）
    pub line_width: u32,
    /// 线框颜色，格式为"r,g,b"
    pub wireframe_color: String,
    /// 顶点高亮圆盘直径（像素），0 表示关闭
    pub vertex_size: u32,
}

pub fn parse_vec3(s: &str) -> Result<Vector3<f32>, String> {
    let parts: Vec<&str> = s.split(',').collect();
    if parts.len() != 3 {
        return Err("需要3个逗号分隔的值".to_string());
    }
    let mut values = [0.0f32; 3];
    for (value, part) in values.iter_mut().zip(&parts) {
        *value = part
            .trim()
            .parse::<f32>()
            .map_err(|e| format!("无效数字 '{}': {}", part, e))?;
    }
    Ok(Vector3::from(values))
}

pub fn parse_point3(s: &str) -> Result<Point3<f32>, String> {
    parse_vec3(s).map(Point3::from)
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            // ===== 文件路径设置 =====
            obj: None,
            output: "output".to_string(),
            output_dir: "output_rust".to_string(),
            texture: None,

            // ===== 渲染基础设置 =====
            width: 1024,
            height: 1024,
            projection: "perspective".to_string(),
            use_gamma: true,
            save_depth: true,
            background_color: "0.1,0.1,0.12".to_string(),
            normalize_model: true,

            // ===== 物体变换 =====
            object_position: "0,0,0".to_string(),
            object_rotation: "0,0,0".to_string(),
            object_scale_xyz: "1,1,1".to_string(),
            object_scale: 1.0,

            // ===== 相机参数 =====
            camera_from: "0,0,3".to_string(),
            camera_at: "0,0,0".to_string(),
            camera_up: "0,1,0".to_string(),
            camera_fov: 45.0,
            ortho_height: 2.5,
            near: 0.1,
            far: 100.0,

            // ===== 着色 =====
            use_lighting: true,
            ambient: 0.15,
            base_color: "0.8,0.8,0.8".to_string(),
            shading: "headlight".to_string(),

            // ===== 线框与顶点高亮 =====
            wireframe: false,
            line_width: 1,
            wireframe_color: "1.0,0.6,0.1".to_string(),
            vertex_size: 0,
        }
    }
}

impl RenderSettings {
    pub fn is_perspective(&self) -> bool {
        self.projection == "perspective"
    }

    pub fn get_background_color_vec(&self) -> Color {
        parse_color(&self.background_color).unwrap_or_else(|_| {
            warn!("无效的背景颜色 '{}'，使用默认值", self.background_color);
            Vector3::new(0.1, 0.1, 0.12)
        })
    }

    pub fn get_base_color_vec(&self) -> Color {
        parse_color(&self.base_color).unwrap_or_else(|_| {
            warn!("无效的基础颜色 '{}'，使用默认值", self.base_color);
            Vector3::new(0.8, 0.8, 0.8)
        })
    }

    pub fn get_wireframe_color_vec(&self) -> Color {
        parse_color(&self.wireframe_color).unwrap_or_else(|_| Vector3::new(1.0, 0.6, 0.1))
    }

    /// 由位置、旋转（度）、缩放组合模型矩阵
    pub fn get_model_matrix(&self) -> Matrix4<f32> {
        let position = parse_vec3(&self.object_position).unwrap_or_else(|_| Vector3::zeros());
        let rotation = parse_vec3(&self.object_rotation).unwrap_or_else(|_| Vector3::zeros());
        let scale = parse_vec3(&self.object_scale_xyz)
            .unwrap_or_else(|_| Vector3::new(1.0, 1.0, 1.0))
            * self.object_scale;
        TransformFactory::model(&position, &rotation, &scale)
    }

    /// 按当前设置构造相机
    pub fn build_camera(&self) -> Result<Camera, String> {
        let from = parse_point3(&self.camera_from).map_err(|e| format!("相机位置无效: {}", e))?;
        let at = parse_point3(&self.camera_at).map_err(|e| format!("相机目标无效: {}", e))?;
        let up = parse_vec3(&self.camera_up).map_err(|e| format!("相机上方向无效: {}", e))?;
        let aspect_ratio = self.width as f32 / self.height as f32;

        Ok(if self.is_perspective() {
            Camera::new_perspective(
                from,
                at,
                up,
                self.camera_fov,
                aspect_ratio,
                self.near,
                self.far,
            )
        } else {
            Camera::new_orthographic(
                from,
                at,
                up,
                self.ortho_height,
                aspect_ratio,
                self.near,
                self.far,
            )
        })
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.width == 0 || self.height == 0 {
            return Err("错误: 图像宽度和高度必须大于0".to_string());
        }

        if self.projection != "perspective" && self.projection != "orthographic" {
            return Err(format!(
                "错误: 投影类型必须是 perspective 或 orthographic，实际为 '{}'",
                self.projection
            ));
        }

        if self.near <= 0.0 || self.far <= self.near {
            return Err(format!(
                "错误: 需要 0 < near < far，实际 near={} far={}",
                self.near, self.far
            ));
        }

        if self.is_perspective() && !(self.camera_fov > 0.0 && self.camera_fov < 180.0) {
            return Err(format!("错误: 视场角必须在 (0, 180) 之间，实际为 {}", self.camera_fov));
        }

        if self.shading != "headlight" && self.shading != "normal" {
            return Err(format!(
                "错误: 着色模式必须是 headlight 或 normal，实际为 '{}'",
                self.shading
            ));
        }

        if self.output.trim().is_empty() {
            return Err("错误: 输出文件名不能为空".to_string());
        }

        parse_point3(&self.camera_from).map_err(|e| format!("错误: 相机位置格式不正确: {}", e))?;
        parse_point3(&self.camera_at).map_err(|e| format!("错误: 相机目标格式不正确: {}", e))?;
        parse_vec3(&self.camera_up).map_err(|e| format!("错误: 相机上方向格式不正确: {}", e))?;

        Ok(())
    }
}
