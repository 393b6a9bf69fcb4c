pub mod depth_buffer;
pub mod frame_buffer;
pub mod rasterizer;
pub mod renderer;
