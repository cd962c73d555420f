/// How many color buffers back the window.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Default)]
pub enum Buffering {
    Single,
    /// Draw into a hidden back buffer, present by swapping.
    #[default]
    Double,
}

/// Color channels requested for the window.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Default)]
pub enum ColorMode {
    Rgb,
    #[default]
    Rgba,
}

/// Window display mode, fixed before the window is created.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Default)]
pub struct DisplayMode {
    pub buffering: Buffering,
    pub color: ColorMode,
}

impl DisplayMode {
    /// Double-buffered RGBA, the mode every demo uses.
    pub const DOUBLE_RGBA: Self = Self {
        buffering: Buffering::Double,
        color: ColorMode::Rgba,
    };
}

/// Initialization parameters for the GPU layer.
#[derive(Debug, Clone)]
pub struct GpuInit {
    /// Prefer an sRGB surface format when available.
    ///
    /// The demos turn this off so clear colors and texel bytes reach the
    /// screen without a transfer-function conversion.
    pub prefer_srgb: bool,

    /// Present mode (swap behavior).
    pub present_mode: wgpu::PresentMode,

    /// Optional alpha mode preference for the surface.
    ///
    /// If provided but unsupported on the current surface, a supported mode is selected.
    pub alpha_mode: Option<wgpu::CompositeAlphaMode>,

    /// Required wgpu features.
    pub required_features: wgpu::Features,

    /// Limits requested from the adapter/device.
    pub required_limits: wgpu::Limits,

    /// Desired maximum frame latency for the surface.
    pub desired_maximum_frame_latency: u32,
}

impl Default for GpuInit {
    fn default() -> Self {
        Self {
            prefer_srgb: true,
            present_mode: wgpu::PresentMode::Fifo,
            alpha_mode: None,
            required_features: wgpu::Features::empty(),
            required_limits: wgpu::Limits::default(),
            desired_maximum_frame_latency: 2,
        }
    }
}

impl GpuInit {
    /// Applies a display mode to the surface settings.
    ///
    /// Double buffering keeps one frame queued behind the presented one;
    /// single buffering allows no queued frame. An RGB window is composited
    /// opaque, RGBA leaves the surface's alpha mode choice open.
    pub fn with_display_mode(mut self, mode: DisplayMode) -> Self {
        self.desired_maximum_frame_latency = match mode.buffering {
            Buffering::Single => 1,
            Buffering::Double => 2,
        };
        self.alpha_mode = match mode.color {
            ColorMode::Rgb => Some(wgpu::CompositeAlphaMode::Opaque),
            ColorMode::Rgba => self.alpha_mode,
        };
        self
    }

    pub fn with_srgb(mut self, prefer_srgb: bool) -> Self {
        self.prefer_srgb = prefer_srgb;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn double_buffering_queues_two_frames() {
        let init = GpuInit::default().with_display_mode(DisplayMode::DOUBLE_RGBA);
        assert_eq!(init.desired_maximum_frame_latency, 2);
        assert_eq!(init.alpha_mode, None);
    }

    #[test]
    fn single_rgb_is_opaque_with_one_frame() {
        let mode = DisplayMode { buffering: Buffering::Single, color: ColorMode::Rgb };
        let init = GpuInit::default().with_display_mode(mode);
        assert_eq!(init.desired_maximum_frame_latency, 1);
        assert_eq!(init.alpha_mode, Some(wgpu::CompositeAlphaMode::Opaque));
    }

    #[test]
    fn default_display_mode_is_double_rgba() {
        assert_eq!(DisplayMode::default(), DisplayMode::DOUBLE_RGBA);
    }
}
