use anyhow::Result;
use winit::event::WindowEvent;

use crate::device::Gpu;

use super::ctx::FrameCtx;

/// Control directive returned by app callbacks.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum AppControl {
    Continue,
    Exit,
}

/// Callbacks the runtime drives, in order: `on_device_ready` once, then
/// `on_window_event` / `on_frame` for as long as the loop runs.
pub trait App {
    /// Called once, after the device exists and before the first redraw.
    ///
    /// This is where static resources are uploaded. An error stops the loop
    /// and is returned from `Runtime::run`.
    fn on_device_ready(&mut self, gpu: &Gpu<'_>) -> Result<()>;

    /// Called for every window event, before the runtime handles it.
    fn on_window_event(&mut self, event: &WindowEvent) -> AppControl {
        let _ = event;
        AppControl::Continue
    }

    /// Called for every redraw request.
    fn on_frame(&mut self, ctx: &mut FrameCtx<'_, '_>) -> AppControl;
}
