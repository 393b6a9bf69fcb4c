use crate::core::depth_buffer::DepthBuffer;
use crate::material_system::color::{Color, linear_rgb_to_u8};
use image::{GrayImage, RgbImage};
use log::info;
use std::path::Path;

/// 颜色缓冲区，存储 RGB8
pub struct FrameBuffer {
    pub width: usize,
    pub height: usize,
    color_buffer: Vec<u8>,
}

impl FrameBuffer {
    pub fn new(width: usize, height: usize) -> Self {
        FrameBuffer {
            width,
            height,
            color_buffer: vec![0; width * height * 3],
        }
    }

    /// 用背景色填充
    pub fn clear(&mut self, background: &Color, apply_gamma: bool) {
        let rgb = linear_rgb_to_u8(background, apply_gamma);
        for pixel in self.color_buffer.chunks_exact_mut(3) {
            pixel.copy_from_slice(&rgb);
        }
    }

    /// 写入线性颜色；越界时忽略
    #[inline]
    pub fn set_pixel(&mut self, x: i32, y: i32, color: &Color, apply_gamma: bool) {
        if x < 0 || y < 0 || x as usize >= self.width || y as usize >= self.height {
            return;
        }
        let start = (y as usize * self.width + x as usize) * 3;
        self.color_buffer[start..start + 3].copy_from_slice(&linear_rgb_to_u8(color, apply_gamma));
    }

    pub fn get_pixel(&self, x: usize, y: usize) -> Option<[u8; 3]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let start = (y * self.width + x) * 3;
        Some([
            self.color_buffer[start],
            self.color_buffer[start + 1],
            self.color_buffer[start + 2],
        ])
    }

    /// 保存颜色缓冲为 PNG
    pub fn save_color<P: AsRef<Path>>(&self, path: P) -> Result<(), String> {
        let image = RgbImage::from_raw(
            self.width as u32,
            self.height as u32,
            self.color_buffer.clone(),
        )
        .ok_or_else(|| "颜色缓冲区尺寸不匹配".to_string())?;
        image
            .save(path.as_ref())
            .map_err(|e| format!("保存图像 {:?} 失败: {}", path.as_ref(), e))?;
        info!("图像已保存到 {:?}", path.as_ref());
        Ok(())
    }
}

/// 深度缓冲可视化：有效深度归一化到 [0, 255]（近处暗、远处亮），未写入的像素为白色
pub fn depth_to_grayscale(depth_buffer: &DepthBuffer) -> Vec<u8> {
    let mut min_depth = f32::INFINITY;
    let mut max_depth = f32::NEG_INFINITY;
    for &depth in depth_buffer.as_slice() {
        if depth < DepthBuffer::CLEARED {
            min_depth = min_depth.min(depth);
            max_depth = max_depth.max(depth);
        }
    }

    let range = max_depth - min_depth;
    let inv_range = if range > 1e-6 { 1.0 / range } else { 0.0 };

    depth_buffer
        .as_slice()
        .iter()
        .map(|&depth| {
            if depth < DepthBuffer::CLEARED {
                (((depth - min_depth) * inv_range).clamp(0.0, 1.0) * 254.0) as u8
            } else {
                255
            }
        })
        .collect()
}

/// 保存深度图为灰度 PNG
pub fn save_depth<P: AsRef<Path>>(depth_buffer: &DepthBuffer, path: P) -> Result<(), String> {
    let image = GrayImage::from_raw(
        depth_buffer.width() as u32,
        depth_buffer.height() as u32,
        depth_to_grayscale(depth_buffer),
    )
    .ok_or_else(|| "深度缓冲区尺寸不匹配".to_string())?;
    image
        .save(path.as_ref())
        .map_err(|e| format!("保存深度图 {:?} 失败: {}", path.as_ref(), e))?;
    info!("深度图已保存到 {:?}", path.as_ref());
    Ok(())
}
