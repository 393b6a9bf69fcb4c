//! # 三角形与线段光栅化模块
//!
//! 重心坐标 + 包围盒扫描的三角形光栅化，透视校正的属性插值，
//! 以及 Bresenham 线段与粗线绘制。

pub mod line;
pub mod pixel_processor;
pub mod triangle_data;

// 重新导出主要类型和函数
pub use line::{LinePoint, draw_line, draw_thick_line};
pub use pixel_processor::{Fragment, PixelSink, rasterize_triangle};
pub use triangle_data::{BoundingBox, TriangleData, VertexRenderData};
