use crate::core::rasterizer::Fragment;
use crate::material_system::color::Color;
use crate::material_system::texture::Texture;
use nalgebra::Vector3;

/// 着色方：根据片元的 UV、法线和世界坐标返回线性 RGB
pub trait Shader {
    fn shade(&self, fragment: &Fragment) -> Color;
}

/// 以相机作为唯一光源的漫反射着色（头灯模型）
///
/// 漫反射项取法线与“指向相机”方向的点积，而不是指向某个独立光源。
#[derive(Debug, Clone)]
pub struct HeadlightShader {
    pub base_color: Color,
    pub texture: Option<Texture>,
    pub camera_position: Vector3<f32>,
    pub ambient: f32,
    pub use_lighting: bool,
}

impl HeadlightShader {
    pub fn new(base_color: Color, camera_position: Vector3<f32>) -> Self {
        Self {
            base_color,
            texture: None,
            camera_position,
            ambient: 0.15,
            use_lighting: true,
        }
    }

    pub fn with_texture(mut self, texture: Option<Texture>) -> Self {
        self.texture = texture;
        self
    }

    /// 没有 UV 或没有纹理时返回白色（不改变基础色）
    fn texture_factor(&self, fragment: &Fragment) -> Color {
        match &self.texture {
            Some(texture) if fragment.has_texcoord => {
                texture.sample(fragment.uv.x, fragment.uv.y)
            }
            _ => Color::new(1.0, 1.0, 1.0),
        }
    }

    /// 法线缺失（零向量）时视为不受光照影响
    fn lighting_factor(&self, fragment: &Fragment) -> f32 {
        if !self.use_lighting || fragment.world_normal == Vector3::zeros() {
            return 1.0;
        }

        let to_camera = self.camera_position - fragment.world_position;
        let distance = to_camera.norm();
        if distance <= f32::EPSILON {
            return 1.0;
        }

        let diffuse = fragment.world_normal.dot(&(to_camera / distance)).max(0.0);
        (self.ambient + (1.0 - self.ambient) * diffuse).clamp(0.0, 1.0)
    }
}

impl Shader for HeadlightShader {
    fn shade(&self, fragment: &Fragment) -> Color {
        self.base_color
            .component_mul(&self.texture_factor(fragment))
            * self.lighting_factor(fragment)
    }
}

/// 以插值法线为颜色的调试着色
#[derive(Debug, Clone, Copy, Default)]
pub struct NormalShader;

impl Shader for NormalShader {
    fn shade(&self, fragment: &Fragment) -> Color {
        fragment.world_normal.map(|c| c * 0.5 + 0.5)
    }
}
