use nalgebra::Vector3;

pub type Color = Vector3<f32>;

/// sRGB -> 线性空间
pub fn srgb_to_linear(color: &Color) -> Color {
    color.map(|c| {
        if c <= 0.04045 {
            c / 12.92
        } else {
            ((c + 0.055) / 1.055).powf(2.4)
        }
    })
}

/// 线性空间 -> sRGB
pub fn linear_to_srgb(color: &Color) -> Color {
    color.map(|c| {
        if c <= 0.003_130_8 {
            c * 12.92
        } else {
            1.055 * c.powf(1.0 / 2.4) - 0.055
        }
    })
}

/// 线性 RGB 转 8 位颜色，可选 gamma 校正
pub fn linear_rgb_to_u8(color: &Color, apply_gamma: bool) -> [u8; 3] {
    let clamped = color.map(|c| c.clamp(0.0, 1.0));
    let output = if apply_gamma {
        linear_to_srgb(&clamped)
    } else {
        clamped
    };
    [
        (output.x * 255.0).round() as u8,
        (output.y * 255.0).round() as u8,
        (output.z * 255.0).round() as u8,
    ]
}

/// 解析 "r,g,b" 格式的颜色，分量范围 [0, 1]
pub fn parse_color(value: &str) -> Result<Color, String> {
    crate::io::render_settings::parse_vec3(value)
        .map(|c| c.map(|component| component.clamp(0.0, 1.0)))
}
