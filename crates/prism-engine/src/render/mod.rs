//! Static resources and the redraw cycle.
//!
//! - `geometry`, `image`: CPU-side immutable data
//! - `strategy`: buffered vs immediate drawing, chosen per scene
//! - `upload`: one-shot transfer to the device
//! - `cycle`: the clear → enable → bind → draw → disable → present plan
//! - `renderer`: encodes a plan with wgpu
//!
//! Coordinates are clip space: x and y in `[-1, 1]`, +Y up.

mod cycle;
mod geometry;
mod image;
mod pipeline;
mod primitive;
mod renderer;
mod strategy;
mod target;
mod upload;

pub use cycle::{CycleError, DrawStep, FramePlan, RedrawCycle, RedrawPhase};
pub use geometry::{ComponentType, GeometryBuffer, LayoutError, VertexAttribute, VertexLayout};
pub use image::{ImageBuffer, ImageError};
pub use primitive::PrimitiveKind;
pub use renderer::SceneRenderer;
pub use strategy::{BufferedDraw, DrawCall, DrawStrategy, ImmediateDraw, ImmediateVertex};
pub use target::{RenderCtx, RenderTarget};
pub use upload::{
    GeometryHandles, IMAGE_FORMAT, SceneResources, TextureHandles, UploadError, upload,
    upload_geometry, upload_image,
};
