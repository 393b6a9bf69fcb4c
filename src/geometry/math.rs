//! 向量与矩阵基础工具
//!
//! 向量、矩阵本身直接使用 nalgebra 的 `f32` 类型，这里只补充管线依赖的约定：
//! 安全归一化、带 `w` 守卫的齐次变换，以及带容差的矩阵比较。
//!
//! 原地 / 纯函数两种形式并存：
//! - `safe_normalize_mut` 用于累加缓冲区收尾（法线估计），避免额外拷贝；
//! - `safe_normalize` 用于插值结果等临时值，调用方保留原值。

use approx::AbsDiffEq;
use nalgebra::{Matrix3, Matrix4, SVector, Vector3, Vector4};

/// 包围盒内判定容差（重心坐标允许的负偏移与和的偏差）
pub const INSIDE_EPSILON: f32 = 1e-5;
/// 齐次除法前 `|w|` 的下限
pub const W_EPSILON: f32 = 1e-5;
/// 面法线叉积长度下限，低于此值视为退化
pub const NORMAL_EPSILON: f32 = 1e-6;
/// 屏幕空间重心坐标行列式下限
pub const BARYCENTRIC_EPSILON: f32 = 1e-10;
/// 三角形面积下限
pub const AREA_EPSILON: f32 = 1e-12;

/// Squared length below which a vector is treated as zero.
const NORMALIZE_EPSILON_SQUARED: f32 = 1e-12;

/// 不会产生 NaN 的归一化
pub trait SafeNormalize: Sized {
    /// 返回新向量；近零向量返回零向量
    fn safe_normalize(&self) -> Self;

    /// 原地归一化；近零向量被置零
    fn safe_normalize_mut(&mut self);
}

impl<const D: usize> SafeNormalize for SVector<f32, D> {
    fn safe_normalize(&self) -> Self {
        let mut result = *self;
        result.safe_normalize_mut();
        result
    }

    fn safe_normalize_mut(&mut self) {
        if self.norm_squared() > NORMALIZE_EPSILON_SQUARED {
            self.normalize_mut();
        } else {
            self.fill(0.0);
        }
    }
}

/// 4×4 矩阵乘 3 维点：隐含 `w = 1`，仅当 `|w| > W_EPSILON` 时做透视除法，
/// 否则返回除法前的 xyz。仿射矩阵的 `w` 恒为 1，结果与不除等价。
pub fn transform_point(matrix: &Matrix4<f32>, point: &Vector3<f32>) -> Vector3<f32> {
    let homogeneous = matrix * point.push(1.0);
    if homogeneous.w.abs() > W_EPSILON {
        homogeneous.xyz() / homogeneous.w
    } else {
        homogeneous.xyz()
    }
}

/// 4×4 矩阵乘 3 维点，保留齐次分量（裁剪空间坐标）
pub fn transform_homogeneous(matrix: &Matrix4<f32>, point: &Vector3<f32>) -> Vector4<f32> {
    matrix * point.push(1.0)
}

/// 只取仿射部分的点变换（不除 `w`）
pub fn transform_point_affine(matrix: &Matrix4<f32>, point: &Vector3<f32>) -> Vector3<f32> {
    (matrix * point.push(1.0)).xyz()
}

/// 方向向量变换（`w = 0`，不受平移影响）
pub fn transform_direction(matrix: &Matrix4<f32>, direction: &Vector3<f32>) -> Vector3<f32> {
    (matrix * direction.push(0.0)).xyz()
}

/// 逐元素容差比较，适用于 Matrix3 / Matrix4
pub fn matrix_approx_eq<M>(a: &M, b: &M, epsilon: f32) -> bool
where
    M: AbsDiffEq<Epsilon = f32>,
{
    a.abs_diff_eq(b, epsilon)
}

/// 从 4×4 矩阵取左上 3×3
pub fn upper_left_3x3(matrix: &Matrix4<f32>) -> Matrix3<f32> {
    matrix.fixed_view::<3, 3>(0, 0).into_owned()
}
