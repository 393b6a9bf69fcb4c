use crate::material_system::color::{Color, srgb_to_linear};
use image::RgbImage;
use log::warn;
use std::path::Path;
use std::sync::Arc;

#[derive(Debug, Clone)]
pub enum TextureData {
    Image(Arc<RgbImage>),
    SolidColor(Color),
}

#[derive(Debug, Clone)]
pub struct Texture {
    pub data: TextureData,
    pub width: u32,
    pub height: u32,
}

impl Texture {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Option<Self> {
        match image::open(path.as_ref()) {
            Ok(img) => Some(Self::from_image(img.to_rgb8())),
            Err(e) => {
                warn!("无法加载纹理 {:?}: {}", path.as_ref(), e);
                None
            }
        }
    }

    pub fn from_image(image: RgbImage) -> Self {
        Texture {
            width: image.width(),
            height: image.height(),
            data: TextureData::Image(Arc::new(image)),
        }
    }

    pub fn solid_color(color: Color) -> Self {
        Texture {
            data: TextureData::SolidColor(color),
            width: 1,
            height: 1,
        }
    }

    pub fn get_type_description(&self) -> &'static str {
        match &self.data {
            TextureData::Image(_) => "图像纹理",
            TextureData::SolidColor(_) => "单色纹理",
        }
    }

    /// 最近邻采样，UV 超出 [0, 1) 时环绕；V 轴向上，图像行向下
    pub fn sample(&self, u: f32, v: f32) -> Color {
        match &self.data {
            TextureData::Image(img) => {
                if self.width == 0 || self.height == 0 || !u.is_finite() || !v.is_finite() {
                    return Color::new(1.0, 1.0, 1.0);
                }

                let u = u.rem_euclid(1.0);
                let v = v.rem_euclid(1.0);
                let x = ((u * self.width as f32) as u32).min(self.width - 1);
                let y = (((1.0 - v) * self.height as f32) as u32).min(self.height - 1);

                let pixel = img.get_pixel(x, y);
                let srgb_color = Color::new(
                    pixel[0] as f32 / 255.0,
                    pixel[1] as f32 / 255.0,
                    pixel[2] as f32 / 255.0,
                );

                srgb_to_linear(&srgb_color)
            }
            TextureData::SolidColor(color) => *color,
        }
    }
}

pub fn load_texture<P: AsRef<Path>>(path: P, default_color: Color) -> Texture {
    Texture::from_file(path).unwrap_or_else(|| {
        warn!("无法加载纹理，使用默认颜色 {:?}", default_color);
        Texture::solid_color(default_color)
    })
}
