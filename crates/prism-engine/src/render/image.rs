use thiserror::Error;

/// Bytes per pixel of the CPU raster.
pub const RGB_CHANNELS: usize = 3;
/// Bytes per pixel of the device copy.
pub const RGBA_CHANNELS: usize = 4;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ImageError {
    #[error("image has zero area ({width}x{height})")]
    Empty { width: u32, height: u32 },
    #[error("expected {expected} bytes for {width}x{height} RGB, got {actual}")]
    SizeMismatch {
        width: u32,
        height: u32,
        expected: usize,
        actual: usize,
    },
}

/// Row-major `height × width × 3` byte raster.
///
/// Row 0 is the first row uploaded, which is texture coordinate `v = 0`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageBuffer {
    width: u32,
    height: u32,
    rgb: Vec<u8>,
}

impl ImageBuffer {
    /// A raster where every pixel is `rgb`.
    pub fn filled(width: u32, height: u32, rgb: [u8; 3]) -> Result<Self, ImageError> {
        let pixels = pixel_count(width, height)?;
        let data = rgb.iter().copied().cycle().take(pixels * RGB_CHANNELS).collect();
        Ok(Self { width, height, rgb: data })
    }

    /// Wraps existing tightly packed RGB bytes.
    pub fn from_rgb(width: u32, height: u32, rgb: Vec<u8>) -> Result<Self, ImageError> {
        let expected = pixel_count(width, height)? * RGB_CHANNELS;
        if rgb.len() != expected {
            return Err(ImageError::SizeMismatch {
                width,
                height,
                expected,
                actual: rgb.len(),
            });
        }
        Ok(Self { width, height, rgb })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.rgb
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 3]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = (y as usize * self.width as usize + x as usize) * RGB_CHANNELS;
        Some([self.rgb[i], self.rgb[i + 1], self.rgb[i + 2]])
    }

    /// Device upload payload: each RGB triple followed by an opaque alpha.
    ///
    /// wgpu has no three-channel 8-bit texture format, so the RGB bytes are
    /// widened here and left otherwise untouched.
    pub fn to_rgba8(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.rgb.len() / RGB_CHANNELS * RGBA_CHANNELS);
        for px in self.rgb.chunks_exact(RGB_CHANNELS) {
            out.extend_from_slice(px);
            out.push(u8::MAX);
        }
        out
    }

    pub(crate) fn extent(&self) -> wgpu::Extent3d {
        wgpu::Extent3d {
            width: self.width,
            height: self.height,
            depth_or_array_layers: 1,
        }
    }
}

fn pixel_count(width: u32, height: u32) -> Result<usize, ImageError> {
    if width == 0 || height == 0 {
        return Err(ImageError::Empty { width, height });
    }
    Ok(width as usize * height as usize)
}
