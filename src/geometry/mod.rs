// geometry/mod.rs
// 导出几何和变换相关模块
pub mod camera;
pub mod clipping;
pub mod interpolation;
pub mod math;
pub mod normals;
pub mod transform;
pub mod triangulation;
