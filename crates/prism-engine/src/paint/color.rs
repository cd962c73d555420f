/// RGBA clear color, components in `[0, 1]`.
///
/// Components are straight (not premultiplied); the clear step writes them to
/// the surface unchanged.
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Color {
    pub const BLACK: Self = Self::rgba(0.0, 0.0, 0.0, 1.0);
    pub const TRANSPARENT: Self = Self::rgba(0.0, 0.0, 0.0, 0.0);

    #[inline]
    pub const fn rgba(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    /// Builds a color from byte channels (`0`–`255`).
    #[inline]
    pub fn from_u8(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self::rgba(
            r as f32 / 255.0,
            g as f32 / 255.0,
            b as f32 / 255.0,
            a as f32 / 255.0,
        )
    }

    /// Clamps every channel to `[0, 1]`; non-finite channels become `0`.
    #[inline]
    pub fn clamped(self) -> Self {
        fn c(v: f32) -> f32 {
            if v.is_finite() { v.clamp(0.0, 1.0) } else { 0.0 }
        }
        Self::rgba(c(self.r), c(self.g), c(self.b), c(self.a))
    }
}

impl From<Color> for wgpu::Color {
    fn from(c: Color) -> Self {
        let c = c.clamped();
        wgpu::Color {
            r: c.r as f64,
            g: c.g as f64,
            b: c.b as f64,
            a: c.a as f64,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_u8_maps_full_range() {
        let c = Color::from_u8(0, 255, 0, 255);
        assert_eq!(c, Color::rgba(0.0, 1.0, 0.0, 1.0));
    }

    #[test]
    fn clamped_limits_out_of_range() {
        let c = Color::rgba(-1.0, 2.0, 0.5, f32::NAN).clamped();
        assert_eq!(c, Color::rgba(0.0, 1.0, 0.5, 0.0));
    }

    #[test]
    fn converts_to_wgpu_color() {
        let w: wgpu::Color = Color::BLACK.into();
        assert_eq!(w.r, 0.0);
        assert_eq!(w.a, 1.0);
    }
}
