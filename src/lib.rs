//! CPU 软件光栅化核心
//!
//! 多边形网格三角化、面积加权顶点法线、重心坐标三角形光栅化（线性与透视校正插值）、
//! Bresenham 线段与粗线，以及深度缓冲。`core::renderer` 把这些组合成完整的一帧。

pub mod core;
pub mod geometry;
pub mod io;
pub mod material_system;
pub mod model;

pub use crate::core::depth_buffer::DepthBuffer;
pub use crate::core::rasterizer::{Fragment, PixelSink, rasterize_triangle};
pub use crate::core::renderer::{RenderContext, RenderStats, Renderer};
pub use crate::model::mesh::{Mesh, Vertex};
