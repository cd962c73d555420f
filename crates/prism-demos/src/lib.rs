//! The three hard-coded scenes and their window configurations.
//!
//! Each binary in `src/bin` pairs one `scenes::*` constructor with the
//! matching `configs::*` window and hands both to the engine.

pub mod configs;
pub mod scenes;
