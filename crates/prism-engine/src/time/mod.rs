//! Frame timing.
//!
//! One `FrameClock` per window; `tick()` once per redraw cycle. The frame
//! index feeds redraw diagnostics, the delta is clamped so a long stall
//! (window hidden, debugger break) does not produce a huge value.

mod frame_clock;

pub use frame_clock::{FrameClock, FrameTime};
