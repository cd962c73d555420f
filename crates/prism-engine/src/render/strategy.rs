//! The two ways a scene gets its primitive on screen.
//!
//! `Buffered` reads vertices from a device buffer uploaded once; `Immediate`
//! re-emits explicit texture-coordinate/position pairs every redraw and
//! samples a texture uploaded once.

use bytemuck::{Pod, Zeroable};

use super::geometry::{GeometryBuffer, LayoutError};
use super::image::ImageBuffer;
use super::primitive::PrimitiveKind;

/// The single draw issued per redraw cycle.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum DrawCall {
    /// Sequential vertices `first..first + count`.
    Arrays { first: u32, count: u32 },
    /// `count` `u32` indices starting at index `first` of the index store.
    Indexed { first: u32, count: u32 },
}

impl DrawCall {
    pub fn is_indexed(&self) -> bool {
        matches!(self, DrawCall::Indexed { .. })
    }

    /// Checks the call stays inside the uploaded vertex or index store.
    pub fn validate(&self, geometry: &GeometryBuffer) -> Result<(), LayoutError> {
        let (first, count, available) = match *self {
            DrawCall::Arrays { first, count } => (first, count, geometry.vertex_count()),
            DrawCall::Indexed { first, count } => {
                if geometry.indices().is_none() {
                    return Err(LayoutError::MissingIndices);
                }
                (first, count, geometry.index_count())
            }
        };

        let end = first as u64 + count as u64;
        if end > available as u64 {
            return Err(LayoutError::DrawOutOfRange { first, end, available });
        }
        Ok(())
    }

    /// Vertices the call feeds to the rasterizer, in submission order.
    pub fn referenced_vertices(&self, geometry: &GeometryBuffer) -> Vec<u32> {
        match *self {
            DrawCall::Arrays { first, count } => (first..first.saturating_add(count)).collect(),
            DrawCall::Indexed { first, count } => geometry
                .indices()
                .unwrap_or_default()
                .iter()
                .skip(first as usize)
                .take(count as usize)
                .copied()
                .collect(),
        }
    }
}

/// Vertex-buffer drawing: geometry uploaded once, one draw call per cycle.
#[derive(Debug, Clone, PartialEq)]
pub struct BufferedDraw {
    primitive: PrimitiveKind,
    geometry: GeometryBuffer,
    call: DrawCall,
}

impl BufferedDraw {
    pub fn new(
        primitive: PrimitiveKind,
        geometry: GeometryBuffer,
        call: DrawCall,
    ) -> Result<Self, LayoutError> {
        if primitive.native_topology().is_none() {
            return Err(LayoutError::UnsupportedPrimitive(primitive));
        }
        if geometry.layout().attribute(0).is_none() {
            return Err(LayoutError::MissingPosition);
        }
        call.validate(&geometry)?;
        Ok(Self { primitive, geometry, call })
    }

    pub fn primitive(&self) -> PrimitiveKind {
        self.primitive
    }

    pub fn geometry(&self) -> &GeometryBuffer {
        &self.geometry
    }

    pub fn call(&self) -> DrawCall {
        self.call
    }
}

/// One vertex emitted between begin/end in immediate mode.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct ImmediateVertex {
    pub tex_coord: [f32; 2],
    pub position: [f32; 2],
}

impl ImmediateVertex {
    const ATTRS: [wgpu::VertexAttribute; 2] = wgpu::vertex_attr_array![
        0 => Float32x2, // tex_coord
        1 => Float32x2  // position
    ];

    pub const fn new(tex_coord: [f32; 2], position: [f32; 2]) -> Self {
        Self { tex_coord, position }
    }

    pub(crate) fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<ImmediateVertex>() as u64,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRS,
        }
    }
}

/// Immediate-mode textured drawing.
#[derive(Debug, Clone, PartialEq)]
pub struct ImmediateDraw {
    primitive: PrimitiveKind,
    vertices: Vec<ImmediateVertex>,
    texture: ImageBuffer,
}

impl ImmediateDraw {
    /// Rejects vertex counts that leave a partial shape, e.g. 6 quad corners.
    pub fn new(
        primitive: PrimitiveKind,
        vertices: Vec<ImmediateVertex>,
        texture: ImageBuffer,
    ) -> Result<Self, LayoutError> {
        if !primitive.is_complete(vertices.len()) {
            return Err(LayoutError::IncompletePrimitive {
                primitive,
                count: vertices.len(),
            });
        }
        Ok(Self { primitive, vertices, texture })
    }

    pub fn primitive(&self) -> PrimitiveKind {
        self.primitive
    }

    /// Vertices in emission order.
    pub fn vertices(&self) -> &[ImmediateVertex] {
        &self.vertices
    }

    pub fn texture(&self) -> &ImageBuffer {
        &self.texture
    }

    /// Vertices in the order the expanded topology consumes them.
    pub fn expanded_vertices(&self) -> Vec<ImmediateVertex> {
        self.primitive
            .expand(self.vertices.len())
            .into_iter()
            .map(|i| self.vertices[i])
            .collect()
    }
}

/// Drawing strategy, chosen per scene.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawStrategy {
    Buffered(BufferedDraw),
    Immediate(ImmediateDraw),
}

impl DrawStrategy {
    pub fn primitive(&self) -> PrimitiveKind {
        match self {
            DrawStrategy::Buffered(b) => b.primitive,
            DrawStrategy::Immediate(i) => i.primitive,
        }
    }
}
