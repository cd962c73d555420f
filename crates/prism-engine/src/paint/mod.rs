//! Color values handed to the clear step.

mod color;

pub use color::Color;
