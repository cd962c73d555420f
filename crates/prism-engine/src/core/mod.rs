//! Core engine-facing contracts.
//!
//! The interface between the runtime (platform loop) and a scene: the
//! `App` callbacks and the per-redraw context they receive.

mod app;
mod ctx;

pub use app::{App, AppControl};
pub use ctx::{FrameCtx, WindowCtx};
