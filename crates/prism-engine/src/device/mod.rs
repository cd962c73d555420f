//! GPU device + surface management.
//!
//! This module is responsible for:
//! - acquiring the wgpu Instance/Adapter/Device/Queue for a window
//! - creating & configuring the Surface (swapchain)
//! - acquiring frames and providing encoders/views for the redraw cycle

mod context;
mod error;
mod frame;
mod init;
mod surface;

pub use context::Gpu;
pub use error::{BootstrapError, SurfaceErrorAction};
pub use frame::GpuFrame;
pub use init::{Buffering, ColorMode, DisplayMode, GpuInit};
