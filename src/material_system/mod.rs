pub mod color;
pub mod shading;
pub mod texture;
