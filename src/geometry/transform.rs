use crate::geometry::math::upper_left_3x3;
use log::warn;
use nalgebra::{Matrix3, Matrix4, Point3, Rotation3, Unit, Vector2, Vector3};

/// 变换矩阵工厂，提供创建各种变换矩阵的静态方法
pub struct TransformFactory;

impl TransformFactory {
    /// 创建绕任意轴旋转的变换矩阵
    pub fn rotation(axis: &Vector3<f32>, angle_rad: f32) -> Matrix4<f32> {
        let axis_unit = Unit::new_normalize(*axis);
        Matrix4::from(Rotation3::from_axis_angle(&axis_unit, angle_rad))
    }

    /// 创建绕X轴旋转的变换矩阵
    pub fn rotation_x(angle_rad: f32) -> Matrix4<f32> {
        Matrix4::from_euler_angles(angle_rad, 0.0, 0.0)
    }

    /// 创建绕Y轴旋转的变换矩阵
    pub fn rotation_y(angle_rad: f32) -> Matrix4<f32> {
        Matrix4::from_euler_angles(0.0, angle_rad, 0.0)
    }

    /// 创建绕Z轴旋转的变换矩阵
    pub fn rotation_z(angle_rad: f32) -> Matrix4<f32> {
        Matrix4::from_euler_angles(0.0, 0.0, angle_rad)
    }

    /// 创建平移矩阵
    pub fn translation(translation: &Vector3<f32>) -> Matrix4<f32> {
        Matrix4::new_translation(translation)
    }

    /// 创建非均匀缩放矩阵
    pub fn scaling_nonuniform(scale: &Vector3<f32>) -> Matrix4<f32> {
        Matrix4::new_nonuniform_scaling(scale)
    }

    /// 由位置、欧拉角（度）和缩放组合模型矩阵，顺序为 T * Rz * Ry * Rx * S
    pub fn model(
        position: &Vector3<f32>,
        rotation_degrees: &Vector3<f32>,
        scale: &Vector3<f32>,
    ) -> Matrix4<f32> {
        Self::translation(position)
            * Self::rotation_z(rotation_degrees.z.to_radians())
            * Self::rotation_y(rotation_degrees.y.to_radians())
            * Self::rotation_x(rotation_degrees.x.to_radians())
            * Self::scaling_nonuniform(scale)
    }

    /// 创建视图矩阵 (lookAt)
    pub fn view(eye: &Point3<f32>, target: &Point3<f32>, up: &Vector3<f32>) -> Matrix4<f32> {
        Matrix4::look_at_rh(eye, target, up)
    }

    /// 创建透视投影矩阵，NDC 深度范围 [-1, 1]
    pub fn perspective(aspect_ratio: f32, fov_y_rad: f32, near: f32, far: f32) -> Matrix4<f32> {
        Matrix4::new_perspective(aspect_ratio, fov_y_rad, near, far)
    }

    /// 创建正交投影矩阵
    pub fn orthographic(
        left: f32,
        right: f32,
        bottom: f32,
        top: f32,
        near: f32,
        far: f32,
    ) -> Matrix4<f32> {
        Matrix4::new_orthographic(left, right, bottom, top, near, far)
    }
}

/// 计算法线变换矩阵（模型矩阵左上 3×3 的逆转置）
pub fn compute_normal_matrix(matrix: &Matrix4<f32>) -> Matrix3<f32> {
    upper_left_3x3(matrix).try_inverse().map_or_else(
        || {
            warn!("矩阵不可逆，使用单位矩阵代替法线矩阵");
            Matrix3::identity()
        },
        |inv| inv.transpose(),
    )
}

/// 将NDC坐标转换为屏幕像素坐标
pub fn ndc_to_pixel(ndc_x: f32, ndc_y: f32, width: f32, height: f32) -> Vector2<f32> {
    let screen_x = (ndc_x + 1.0) * 0.5 * width;
    // 翻转Y轴：NDC中+1是顶部，屏幕坐标中0是顶部
    let screen_y = (1.0 - (ndc_y + 1.0) * 0.5) * height;
    Vector2::new(screen_x, screen_y)
}

/// 将NDC深度 [-1, 1] 映射到深度缓冲区的 [0, 1]，越小越近
#[inline]
pub fn ndc_depth_to_unit(ndc_z: f32) -> f32 {
    (ndc_z + 1.0) * 0.5
}
