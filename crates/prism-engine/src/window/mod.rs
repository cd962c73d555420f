//! Windowing runtime (winit integration).

mod runtime;
mod stop;

pub use runtime::{RedrawPolicy, Runtime, RuntimeConfig};
pub use stop::StopHandle;
