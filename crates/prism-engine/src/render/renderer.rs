use super::cycle::{DrawStep, FramePlan};
use super::pipeline::{self, BufferedPipeline, ImmediatePipeline};
use super::strategy::{DrawCall, DrawStrategy, ImmediateVertex};
use super::upload::{SceneResources, TextureHandles};
use super::{RenderCtx, RenderTarget};

/// Encodes validated frame plans against wgpu.
///
/// Owns the per-surface-format state (pipelines, the image bind group) and
/// the stream buffer immediate-mode vertices are written into each redraw.
/// The clear and the present happen around it, in `FrameCtx::render`.
#[derive(Default)]
pub struct SceneRenderer {
    pipeline_format: Option<wgpu::TextureFormat>,
    buffered: Option<BufferedPipeline>,
    immediate: Option<ImmediatePipeline>,

    image_bind_group: Option<wgpu::BindGroup>,

    stream_vbo: Option<wgpu::Buffer>,
    stream_capacity: usize,

    warned_mismatch: bool,
}

impl SceneRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Encodes everything between clear and present for one cycle.
    pub fn encode(
        &mut self,
        ctx: &RenderCtx<'_>,
        target: &mut RenderTarget<'_>,
        plan: &FramePlan,
        strategy: &DrawStrategy,
        resources: &SceneResources,
    ) {
        self.ensure_pipeline(ctx, strategy);

        let stream_len = match (strategy, resources) {
            (DrawStrategy::Immediate(draw), SceneResources::Texture(texture)) => {
                self.ensure_image_binding(ctx, texture);
                let emitted = plan.emitted();
                let expanded: Vec<ImmediateVertex> = draw
                    .primitive()
                    .expand(emitted.len())
                    .into_iter()
                    .map(|i| emitted[i])
                    .collect();
                self.write_stream(ctx, &expanded);
                expanded.len() as u32
            }
            (DrawStrategy::Buffered(_), SceneResources::Geometry(_)) => 0,
            _ => {
                if !self.warned_mismatch {
                    log::warn!("SceneRenderer: resources do not match the draw strategy; skipping");
                    self.warned_mismatch = true;
                }
                return;
            }
        };

        let mut rpass = target.encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("prism scene pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: target.color_view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Load,
                    store: wgpu::StoreOp::Store,
                },
                depth_slice: None,
            })],
            depth_stencil_attachment: None,
            timestamp_writes: None,
            occlusion_query_set: None,
            multiview_mask: None,
        });

        let mut pipeline_set = false;

        for step in plan.steps() {
            match step {
                // Handled by FrameCtx::render around this pass.
                DrawStep::Clear(_) | DrawStep::Present => {}

                DrawStep::EnableAttribute(_) | DrawStep::EnableTexturing => {
                    if pipeline_set {
                        continue;
                    }
                    let pipeline = match strategy {
                        DrawStrategy::Buffered(_) => self.buffered.as_ref().map(|p| &p.pipeline),
                        DrawStrategy::Immediate(_) => self.immediate.as_ref().map(|p| &p.pipeline),
                    };
                    let Some(pipeline) = pipeline else { return };
                    rpass.set_pipeline(pipeline);
                    pipeline_set = true;
                }

                DrawStep::DeclareAttribute { attribute, stride } => {
                    debug_assert!(self.buffered.as_ref().is_some_and(|p| {
                        p.layout.stride == *stride && p.layout.attribute(attribute.location) == Some(attribute)
                    }));
                }

                DrawStep::BindTexture => {
                    let Some(bind_group) = self.image_bind_group.as_ref() else { return };
                    rpass.set_bind_group(0, bind_group, &[]);
                }

                DrawStep::BindVertexBuffer => {
                    let Some(geometry) = resources.geometry() else { return };
                    rpass.set_vertex_buffer(0, geometry.vertices.slice(..));
                }

                DrawStep::BindIndexBuffer => {
                    let Some(indices) = resources.geometry().and_then(|g| g.indices.as_ref()) else {
                        return;
                    };
                    rpass.set_index_buffer(indices.slice(..), wgpu::IndexFormat::Uint32);
                }

                DrawStep::Begin(_) | DrawStep::Emit(_) => {}

                DrawStep::End => {
                    let Some(stream) = self.stream_vbo.as_ref() else { return };
                    if stream_len == 0 {
                        continue;
                    }
                    let bytes = stream_len as u64 * std::mem::size_of::<ImmediateVertex>() as u64;
                    rpass.set_vertex_buffer(0, stream.slice(..bytes));
                    rpass.draw(0..stream_len, 0..1);
                }

                DrawStep::Draw(DrawCall::Arrays { first, count }) => {
                    rpass.draw(*first..first + count, 0..1);
                }

                DrawStep::Draw(DrawCall::Indexed { first, count }) => {
                    rpass.draw_indexed(*first..first + count, 0, 0..1);
                }

                DrawStep::DisableAttribute(_) | DrawStep::DisableTexturing => {}
            }
        }
    }

    fn ensure_pipeline(&mut self, ctx: &RenderCtx<'_>, strategy: &DrawStrategy) {
        let built = match strategy {
            DrawStrategy::Buffered(_) => self.buffered.is_some(),
            DrawStrategy::Immediate(_) => self.immediate.is_some(),
        };
        if self.pipeline_format == Some(ctx.surface_format) && built {
            return;
        }

        match strategy {
            DrawStrategy::Buffered(draw) => {
                self.buffered = Some(pipeline::buffered_pipeline(ctx, draw));
            }
            DrawStrategy::Immediate(draw) => {
                self.immediate = Some(pipeline::immediate_pipeline(ctx, draw.primitive()));
                self.image_bind_group = None;
            }
        }
        self.pipeline_format = Some(ctx.surface_format);
    }

    fn ensure_image_binding(&mut self, ctx: &RenderCtx<'_>, texture: &TextureHandles) {
        if self.image_bind_group.is_some() {
            return;
        }
        let Some(immediate) = self.immediate.as_ref() else { return };

        self.image_bind_group = Some(ctx.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("prism image bind group"),
            layout: &immediate.bind_group_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(&texture.view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(&texture.sampler),
                },
            ],
        }));
    }

    fn write_stream(&mut self, ctx: &RenderCtx<'_>, vertices: &[ImmediateVertex]) {
        if vertices.is_empty() {
            return;
        }
        if vertices.len() > self.stream_capacity || self.stream_vbo.is_none() {
            let cap = vertices.len().next_power_of_two().max(16);
            self.stream_vbo = Some(ctx.device.create_buffer(&wgpu::BufferDescriptor {
                label: Some("prism immediate stream"),
                size: (cap * std::mem::size_of::<ImmediateVertex>()) as u64,
                usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
                mapped_at_creation: false,
            }));
            self.stream_capacity = cap;
        }

        let Some(vbo) = self.stream_vbo.as_ref() else { return };
        ctx.queue.write_buffer(vbo, 0, bytemuck::cast_slice(vertices));
    }
}
