//! One-shot transfer of a scene's immutable data to the device.
//!
//! Buffers are created initialized and without `COPY_DST`, so the device
//! copy can never be rewritten: write once, read many.

use thiserror::Error;
use wgpu::util::DeviceExt;

use super::geometry::{GeometryBuffer, LayoutError, VertexLayout};
use super::image::ImageBuffer;
use super::strategy::DrawStrategy;

/// Texel format of uploaded images.
///
/// Linear, so texel bytes are sampled exactly as uploaded.
pub const IMAGE_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba8Unorm;

#[derive(Debug, Error)]
pub enum UploadError {
    #[error("invalid geometry: {0}")]
    InvalidLayout(#[from] LayoutError),
    #[error("device cannot hold {what}: {detail}")]
    Device { what: &'static str, detail: String },
}

/// Device copy of a vertex store and optional index store.
pub struct GeometryHandles {
    pub vertices: wgpu::Buffer,
    pub indices: Option<wgpu::Buffer>,
}

/// Device copy of an image plus its sampling state.
pub struct TextureHandles {
    pub texture: wgpu::Texture,
    pub view: wgpu::TextureView,
    pub sampler: wgpu::Sampler,
}

/// Handles written by upload and read by every redraw.
pub enum SceneResources {
    Geometry(GeometryHandles),
    Texture(TextureHandles),
}

impl SceneResources {
    pub fn geometry(&self) -> Option<&GeometryHandles> {
        match self {
            SceneResources::Geometry(g) => Some(g),
            SceneResources::Texture(_) => None,
        }
    }

    pub fn texture(&self) -> Option<&TextureHandles> {
        match self {
            SceneResources::Texture(t) => Some(t),
            SceneResources::Geometry(_) => None,
        }
    }
}

/// Uploads whatever `strategy` draws from.
pub fn upload(
    device: &wgpu::Device,
    queue: &wgpu::Queue,
    strategy: &DrawStrategy,
) -> Result<SceneResources, UploadError> {
    match strategy {
        DrawStrategy::Buffered(draw) => {
            upload_geometry(device, draw.geometry()).map(SceneResources::Geometry)
        }
        DrawStrategy::Immediate(draw) => {
            upload_image(device, queue, draw.texture()).map(SceneResources::Texture)
        }
    }
}

/// Creates the vertex store and, when indices exist, the index store.
pub fn upload_geometry(
    device: &wgpu::Device,
    geometry: &GeometryBuffer,
) -> Result<GeometryHandles, UploadError> {
    geometry.layout().validate()?;
    if geometry.vertex_count() == 0 {
        return Err(UploadError::Device {
            what: "vertex store",
            detail: "no vertices".into(),
        });
    }

    let limits = device.limits();
    check_vertex_limits(geometry.layout(), &limits)?;
    let max = limits.max_buffer_size;
    check_buffer_size("vertex store", geometry.byte_len(), max)?;

    let vertices = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
        label: Some("prism vertex store"),
        contents: geometry.vertex_bytes(),
        usage: wgpu::BufferUsages::VERTEX,
    });
    log::debug!(
        "uploaded vertex store: {} vertices, {} bytes, stride {}",
        geometry.vertex_count(),
        geometry.byte_len(),
        geometry.layout().stride
    );

    let indices = match geometry.index_bytes() {
        Some(bytes) => {
            check_buffer_size("index store", bytes.len() as u64, max)?;
            let buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("prism index store"),
                contents: bytes,
                usage: wgpu::BufferUsages::INDEX,
            });
            log::debug!(
                "uploaded index store: {} indices, {} bytes",
                geometry.index_count(),
                bytes.len()
            );
            Some(buffer)
        }
        None => None,
    };

    Ok(GeometryHandles { vertices, indices })
}

/// Creates a 2D texture from `image` with linear min/mag filtering.
pub fn upload_image(
    device: &wgpu::Device,
    queue: &wgpu::Queue,
    image: &ImageBuffer,
) -> Result<TextureHandles, UploadError> {
    let max = device.limits().max_texture_dimension_2d;
    if image.width() > max || image.height() > max {
        return Err(UploadError::Device {
            what: "image",
            detail: format!(
                "{}x{} exceeds the {max} texel limit",
                image.width(),
                image.height()
            ),
        });
    }

    let texels = image.to_rgba8();
    let texture = device.create_texture_with_data(
        queue,
        &wgpu::TextureDescriptor {
            label: Some("prism image"),
            size: image.extent(),
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: IMAGE_FORMAT,
            usage: wgpu::TextureUsages::TEXTURE_BINDING,
            view_formats: &[],
        },
        wgpu::util::TextureDataOrder::LayerMajor,
        &texels,
    );
    let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
    let sampler = device.create_sampler(&linear_sampler());

    log::debug!(
        "uploaded image: {}x{}, {} bytes",
        image.width(),
        image.height(),
        texels.len()
    );

    Ok(TextureHandles { texture, view, sampler })
}

fn linear_sampler() -> wgpu::SamplerDescriptor<'static> {
    wgpu::SamplerDescriptor {
        label: Some("prism linear sampler"),
        mag_filter: wgpu::FilterMode::Linear,
        min_filter: wgpu::FilterMode::Linear,
        ..Default::default()
    }
}

fn check_vertex_limits(layout: &VertexLayout, limits: &wgpu::Limits) -> Result<(), UploadError> {
    let max_stride = limits.max_vertex_buffer_array_stride as u64;
    if layout.stride > max_stride {
        return Err(UploadError::Device {
            what: "vertex layout",
            detail: format!("stride {} exceeds the {max_stride} byte limit", layout.stride),
        });
    }

    let max_attributes = limits.max_vertex_attributes;
    if layout.attributes.len() as u64 > max_attributes as u64 {
        return Err(UploadError::Device {
            what: "vertex layout",
            detail: format!(
                "{} attributes exceed the {max_attributes} attribute limit",
                layout.attributes.len()
            ),
        });
    }
    if let Some(attr) = layout.attributes.iter().find(|a| a.location >= max_attributes) {
        return Err(UploadError::Device {
            what: "vertex layout",
            detail: format!(
                "location {} is past the {max_attributes} attribute limit",
                attr.location
            ),
        });
    }
    Ok(())
}

fn check_buffer_size(what: &'static str, len: u64, max: u64) -> Result<(), UploadError> {
    if len > max {
        return Err(UploadError::Device {
            what,
            detail: format!("{len} bytes exceeds the {max} byte buffer limit"),
        });
    }
    Ok(())
}
