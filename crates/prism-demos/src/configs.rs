use prism_engine::device::DisplayMode;
use prism_engine::window::{RedrawPolicy, RuntimeConfig};

fn base() -> RuntimeConfig {
    RuntimeConfig::default()
        .display_mode(DisplayMode::DOUBLE_RGBA)
        .redraw(RedrawPolicy::OnDemand)
}

pub fn triangle() -> RuntimeConfig {
    base().title("20200414-02").size(1136, 640).position(100, 100)
}

pub fn point() -> RuntimeConfig {
    base().title("20200414-01").size(1136, 640).position(100, 100)
}

/// Platform-chosen position.
pub fn textured_quad() -> RuntimeConfig {
    base().title("Pure GL Image Show").size(512, 512)
}
