//! CPU-side geometry: interleaved `f32` vertex records plus optional `u32`
//! indices, and the byte layout that describes each attribute.

use thiserror::Error;

const F32_SIZE: u64 = std::mem::size_of::<f32>() as u64;

/// Vertex strides and attribute offsets must be multiples of this.
pub(crate) const VERTEX_ALIGN: u64 = 4;

/// Numeric type of one attribute component.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum ComponentType {
    F32,
}

impl ComponentType {
    pub const fn size(self) -> u64 {
        match self {
            ComponentType::F32 => F32_SIZE,
        }
    }
}

/// One per-vertex data channel inside an interleaved record.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct VertexAttribute {
    /// Attribute index the shader reads (0 position, 1 texture coordinate).
    pub location: u32,
    pub components: u32,
    pub ty: ComponentType,
    /// Ignored for float components.
    pub normalized: bool,
    /// Byte distance from the start of a vertex record to this attribute.
    pub offset: u64,
}

impl VertexAttribute {
    pub const fn f32(location: u32, components: u32, offset: u64) -> Self {
        Self {
            location,
            components,
            ty: ComponentType::F32,
            normalized: false,
            offset,
        }
    }

    /// Bytes occupied by this attribute inside one record.
    pub const fn byte_len(&self) -> u64 {
        self.components as u64 * self.ty.size()
    }

    /// One past the last byte this attribute reads inside a record.
    pub const fn end(&self) -> u64 {
        self.offset + self.byte_len()
    }

    pub(crate) fn wgpu_format(&self) -> Option<wgpu::VertexFormat> {
        match (self.ty, self.components) {
            (ComponentType::F32, 1) => Some(wgpu::VertexFormat::Float32),
            (ComponentType::F32, 2) => Some(wgpu::VertexFormat::Float32x2),
            (ComponentType::F32, 3) => Some(wgpu::VertexFormat::Float32x3),
            (ComponentType::F32, 4) => Some(wgpu::VertexFormat::Float32x4),
            _ => None,
        }
    }
}

/// Byte layout of an interleaved vertex record.
#[derive(Debug, Clone, PartialEq)]
pub struct VertexLayout {
    /// Byte distance between consecutive vertices' same attribute.
    pub stride: u64,
    pub attributes: Vec<VertexAttribute>,
}

/// Reasons a geometry description cannot be uploaded or drawn.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum LayoutError {
    #[error("vertex stride is zero")]
    ZeroStride,
    #[error("vertex layout declares no attributes")]
    NoAttributes,
    #[error("attribute {location} has unsupported shape ({components} components)")]
    UnsupportedAttribute { location: u32, components: u32 },
    #[error("stride {stride} or an attribute offset is not a multiple of {align} bytes")]
    Misaligned { stride: u64, offset: Option<u64>, align: u64 },
    #[error("attribute location {0} declared twice")]
    DuplicateLocation(u32),
    #[error("attribute {location} reads bytes {offset}..{end} past the {stride}-byte stride")]
    AttributeOverrun {
        location: u32,
        offset: u64,
        end: u64,
        stride: u64,
    },
    #[error("vertex data is {len} bytes, not a multiple of the {stride}-byte stride")]
    RaggedVertexData { len: u64, stride: u64 },
    #[error("index {index} references vertex past the end ({vertex_count} vertices)")]
    IndexOutOfRange { index: u32, vertex_count: u32 },
    #[error("draw reads {first}..{end} but only {available} are available")]
    DrawOutOfRange { first: u32, end: u64, available: u32 },
    #[error("no position attribute at location 0")]
    MissingPosition,
    #[error("indexed draw requested but no indices were supplied")]
    MissingIndices,
    #[error("{count} vertices do not form whole {primitive:?}")]
    IncompletePrimitive { primitive: super::PrimitiveKind, count: usize },
    #[error("{0:?} cannot be drawn from a vertex buffer")]
    UnsupportedPrimitive(super::PrimitiveKind),
}

impl VertexLayout {
    /// Tightly packed float attributes, in order, starting at location 0.
    ///
    /// `packed_f32(&[3, 2])` is position xyz at offset 0 and a texture
    /// coordinate uv at offset 12, with a 20-byte stride.
    pub fn packed_f32(components: &[u32]) -> Self {
        let mut offset = 0;
        let attributes = components
            .iter()
            .enumerate()
            .map(|(location, &n)| {
                let attr = VertexAttribute::f32(location as u32, n, offset);
                offset += attr.byte_len();
                attr
            })
            .collect();
        Self { stride: offset, attributes }
    }

    pub fn attribute(&self, location: u32) -> Option<&VertexAttribute> {
        self.attributes.iter().find(|a| a.location == location)
    }

    /// Number of `f32` values in one record.
    pub fn floats_per_vertex(&self) -> u64 {
        self.stride / F32_SIZE
    }

    /// Checks that every attribute fits inside one record.
    pub fn validate(&self) -> Result<(), LayoutError> {
        if self.stride == 0 {
            return Err(LayoutError::ZeroStride);
        }
        if self.attributes.is_empty() {
            return Err(LayoutError::NoAttributes);
        }
        if self.stride % VERTEX_ALIGN != 0 {
            return Err(LayoutError::Misaligned {
                stride: self.stride,
                offset: None,
                align: VERTEX_ALIGN,
            });
        }

        for (i, attr) in self.attributes.iter().enumerate() {
            if attr.wgpu_format().is_none() {
                return Err(LayoutError::UnsupportedAttribute {
                    location: attr.location,
                    components: attr.components,
                });
            }
            if attr.offset % VERTEX_ALIGN != 0 {
                return Err(LayoutError::Misaligned {
                    stride: self.stride,
                    offset: Some(attr.offset),
                    align: VERTEX_ALIGN,
                });
            }
            if self.attributes[..i].iter().any(|a| a.location == attr.location) {
                return Err(LayoutError::DuplicateLocation(attr.location));
            }
            if attr.end() > self.stride {
                return Err(LayoutError::AttributeOverrun {
                    location: attr.location,
                    offset: attr.offset,
                    end: attr.end(),
                    stride: self.stride,
                });
            }
        }
        Ok(())
    }

    pub(crate) fn wgpu_attributes(&self) -> Vec<wgpu::VertexAttribute> {
        self.attributes
            .iter()
            .filter_map(|a| {
                Some(wgpu::VertexAttribute {
                    format: a.wgpu_format()?,
                    offset: a.offset,
                    shader_location: a.location,
                })
            })
            .collect()
    }
}

/// Immutable vertex data with its layout and optional indices.
#[derive(Debug, Clone, PartialEq)]
pub struct GeometryBuffer {
    vertices: Vec<f32>,
    indices: Option<Vec<u32>>,
    layout: VertexLayout,
}

impl GeometryBuffer {
    /// Validates `layout` against `vertices` and every index.
    pub fn new(
        vertices: Vec<f32>,
        indices: Option<Vec<u32>>,
        layout: VertexLayout,
    ) -> Result<Self, LayoutError> {
        layout.validate()?;

        let len = vertices.len() as u64 * F32_SIZE;
        if len % layout.stride != 0 {
            return Err(LayoutError::RaggedVertexData { len, stride: layout.stride });
        }

        let geometry = Self { vertices, indices, layout };
        let vertex_count = geometry.vertex_count();
        if let Some(&index) = geometry
            .indices()
            .and_then(|ix| ix.iter().find(|&&i| i >= vertex_count))
        {
            return Err(LayoutError::IndexOutOfRange { index, vertex_count });
        }
        Ok(geometry)
    }

    pub fn layout(&self) -> &VertexLayout {
        &self.layout
    }

    pub fn vertices(&self) -> &[f32] {
        &self.vertices
    }

    pub fn indices(&self) -> Option<&[u32]> {
        self.indices.as_deref()
    }

    pub fn vertex_count(&self) -> u32 {
        (self.byte_len() / self.layout.stride) as u32
    }

    pub fn index_count(&self) -> u32 {
        self.indices.as_ref().map_or(0, |ix| ix.len() as u32)
    }

    /// Size of the vertex store in bytes.
    pub fn byte_len(&self) -> u64 {
        self.vertices.len() as u64 * F32_SIZE
    }

    pub fn vertex_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.vertices)
    }

    pub fn index_bytes(&self) -> Option<&[u8]> {
        self.indices.as_deref().map(bytemuck::cast_slice)
    }

    /// Values of `location` for vertex `vertex`, if both exist.
    pub fn attribute_values(&self, vertex: u32, location: u32) -> Option<&[f32]> {
        let attr = self.layout.attribute(location)?;
        if vertex >= self.vertex_count() {
            return None;
        }
        let start = ((vertex as u64 * self.layout.stride + attr.offset) / F32_SIZE) as usize;
        self.vertices.get(start..start + attr.components as usize)
    }

    /// Highest byte any declared attribute reads, over all vertices.
    pub fn max_read_end(&self) -> u64 {
        let Some(last) = self.vertex_count().checked_sub(1) else {
            return 0;
        };
        self.layout
            .attributes
            .iter()
            .map(|a| last as u64 * self.layout.stride + a.end())
            .max()
            .unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square() -> GeometryBuffer {
        #[rustfmt::skip]
        let vertices = vec![
            -0.5, -0.5, 0.0, 0.0, 0.0,
             0.5, -0.5, 0.0, 0.0, 0.0,
             0.5,  0.5, 0.0, 0.0, 0.0,
            -0.5,  0.5, 0.0, 0.0, 0.0,
        ];
        GeometryBuffer::new(
            vertices,
            Some(vec![0, 1, 2, 2, 3, 0]),
            VertexLayout::packed_f32(&[3, 2]),
        )
        .unwrap()
    }

    // ── layout ────────────────────────────────────────────────────────────

    #[test]
    fn packed_layout_offsets_follow_component_counts() {
        let layout = VertexLayout::packed_f32(&[3, 2]);
        assert_eq!(layout.stride, 20);
        assert_eq!(layout.attributes[0], VertexAttribute::f32(0, 3, 0));
        assert_eq!(layout.attributes[1], VertexAttribute::f32(1, 2, 12));
        assert_eq!(layout.floats_per_vertex(), 5);
    }

    #[test]
    fn zero_stride_rejected() {
        let layout = VertexLayout { stride: 0, attributes: vec![VertexAttribute::f32(0, 3, 0)] };
        assert_eq!(layout.validate(), Err(LayoutError::ZeroStride));
    }

    #[test]
    fn attribute_past_stride_rejected() {
        let layout = VertexLayout {
            stride: 16,
            attributes: vec![VertexAttribute::f32(0, 3, 0), VertexAttribute::f32(1, 2, 12)],
        };
        assert!(matches!(
            layout.validate(),
            Err(LayoutError::AttributeOverrun { location: 1, end: 20, .. })
        ));
    }

    #[test]
    fn unaligned_stride_rejected() {
        let layout = VertexLayout { stride: 6, attributes: vec![VertexAttribute::f32(0, 1, 2)] };
        assert_eq!(
            layout.validate(),
            Err(LayoutError::Misaligned { stride: 6, offset: None, align: 4 })
        );
        assert!(GeometryBuffer::new(vec![1.0, 2.0, 3.0], None, layout).is_err());
    }

    #[test]
    fn unaligned_offset_rejected() {
        let layout = VertexLayout { stride: 8, attributes: vec![VertexAttribute::f32(0, 1, 2)] };
        assert_eq!(
            layout.validate(),
            Err(LayoutError::Misaligned { stride: 8, offset: Some(2), align: 4 })
        );
    }

    #[test]
    fn duplicate_location_rejected() {
        let layout = VertexLayout {
            stride: 24,
            attributes: vec![VertexAttribute::f32(0, 3, 0), VertexAttribute::f32(0, 3, 12)],
        };
        assert_eq!(layout.validate(), Err(LayoutError::DuplicateLocation(0)));
    }

    #[test]
    fn five_component_attribute_rejected() {
        let layout = VertexLayout::packed_f32(&[5]);
        assert!(matches!(
            layout.validate(),
            Err(LayoutError::UnsupportedAttribute { components: 5, .. })
        ));
    }

    // ── geometry ──────────────────────────────────────────────────────────

    #[test]
    fn byte_length_is_components_times_vertices_times_float() {
        let g = square();
        assert_eq!(g.vertex_count(), 4);
        assert_eq!(g.byte_len(), 5 * 4 * 4);
        assert_eq!(g.vertex_bytes().len() as u64, g.byte_len());
    }

    #[test]
    fn declared_attributes_never_read_past_buffer() {
        let g = square();
        assert!(g.max_read_end() <= g.byte_len());
        assert_eq!(g.max_read_end(), g.byte_len());
    }

    #[test]
    fn ragged_vertex_data_rejected() {
        let err = GeometryBuffer::new(vec![0.0; 7], None, VertexLayout::packed_f32(&[3]));
        assert_eq!(err, Err(LayoutError::RaggedVertexData { len: 28, stride: 12 }));
    }

    #[test]
    fn index_past_last_vertex_rejected() {
        let err = GeometryBuffer::new(
            vec![0.0; 9],
            Some(vec![0, 1, 3]),
            VertexLayout::packed_f32(&[3]),
        );
        assert_eq!(err, Err(LayoutError::IndexOutOfRange { index: 3, vertex_count: 3 }));
    }

    #[test]
    fn attribute_values_follow_stride_and_offset() {
        let g = square();
        assert_eq!(g.attribute_values(2, 0), Some(&[0.5, 0.5, 0.0][..]));
        assert_eq!(g.attribute_values(3, 1), Some(&[0.0, 0.0][..]));
        assert_eq!(g.attribute_values(4, 0), None);
        assert_eq!(g.attribute_values(0, 7), None);
    }

    #[test]
    fn index_bytes_are_little_u32() {
        let g = square();
        assert_eq!(g.index_count(), 6);
        assert_eq!(g.index_bytes().map(<[u8]>::len), Some(24));
    }

    #[test]
    fn empty_geometry_reads_nothing() {
        let g = GeometryBuffer::new(vec![], None, VertexLayout::packed_f32(&[3])).unwrap();
        assert_eq!(g.vertex_count(), 0);
        assert_eq!(g.max_read_end(), 0);
    }
}
