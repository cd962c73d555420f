//! Prism engine crate.
//!
//! Owns the platform + GPU runtime pieces behind the single-primitive demos:
//! window/device bootstrap, one-shot static resource upload, and the
//! clear → bind → draw → present redraw cycle.

pub mod device;
pub mod window;
pub mod time;
pub mod core;

pub mod logging;
pub mod paint;
pub mod render;
pub mod scene;
pub mod launch;
