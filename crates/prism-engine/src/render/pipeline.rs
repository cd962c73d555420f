//! Render pipelines for the two drawing strategies.
//!
//! Attribute enables and layout declarations live in the pipeline's vertex
//! state under wgpu, so each pipeline is derived from the same description
//! the upload used.

use super::RenderCtx;
use super::geometry::VertexLayout;
use super::primitive::PrimitiveKind;
use super::strategy::{BufferedDraw, ImmediateVertex};

/// Pipeline for vertex-buffer drawing, with the layout it was built from.
pub(super) struct BufferedPipeline {
    pub pipeline: wgpu::RenderPipeline,
    pub layout: VertexLayout,
}

/// Pipeline for immediate textured drawing.
pub(super) struct ImmediatePipeline {
    pub pipeline: wgpu::RenderPipeline,
    pub bind_group_layout: wgpu::BindGroupLayout,
}

pub(super) fn buffered_pipeline(ctx: &RenderCtx<'_>, draw: &BufferedDraw) -> BufferedPipeline {
    let layout = draw.geometry().layout().clone();
    let attributes = layout.wgpu_attributes();

    let shader = ctx.device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some("prism buffered shader"),
        source: wgpu::ShaderSource::Wgsl(include_str!("shaders/buffered.wgsl").into()),
    });

    let pipeline_layout = ctx
        .device
        .create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("prism buffered pipeline layout"),
            bind_group_layouts: &[],
            immediate_size: 0,
        });

    let topology = draw.primitive().expanded_topology();
    let strip_index_format = (draw.call().is_indexed() && topology.is_strip())
        .then_some(wgpu::IndexFormat::Uint32);

    let pipeline = ctx.device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some("prism buffered pipeline"),
        layout: Some(&pipeline_layout),
        vertex: wgpu::VertexState {
            module: &shader,
            entry_point: Some("vs_main"),
            compilation_options: Default::default(),
            buffers: &[wgpu::VertexBufferLayout {
                array_stride: layout.stride,
                step_mode: wgpu::VertexStepMode::Vertex,
                attributes: &attributes,
            }],
        },
        fragment: Some(wgpu::FragmentState {
            module: &shader,
            entry_point: Some("fs_main"),
            compilation_options: Default::default(),
            targets: &[Some(wgpu::ColorTargetState {
                format: ctx.surface_format,
                blend: None,
                write_mask: wgpu::ColorWrites::ALL,
            })],
        }),
        primitive: primitive_state(topology, strip_index_format),
        depth_stencil: None,
        multisample: wgpu::MultisampleState::default(),
        multiview_mask: None,
        cache: None,
    });

    log::debug!(
        "built buffered pipeline: {:?}, {} attributes, stride {}",
        draw.primitive(),
        attributes.len(),
        layout.stride
    );

    BufferedPipeline { pipeline, layout }
}

pub(super) fn immediate_pipeline(
    ctx: &RenderCtx<'_>,
    primitive: PrimitiveKind,
) -> ImmediatePipeline {
    let shader = ctx.device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some("prism immediate shader"),
        source: wgpu::ShaderSource::Wgsl(include_str!("shaders/immediate.wgsl").into()),
    });

    let bind_group_layout = ctx
        .device
        .create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("prism image bgl"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Float { filterable: true },
                        view_dimension: wgpu::TextureViewDimension::D2,
                        multisampled: false,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
            ],
        });

    let pipeline_layout = ctx
        .device
        .create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("prism immediate pipeline layout"),
            bind_group_layouts: &[&bind_group_layout],
            immediate_size: 0,
        });

    let pipeline = ctx.device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some("prism immediate pipeline"),
        layout: Some(&pipeline_layout),
        vertex: wgpu::VertexState {
            module: &shader,
            entry_point: Some("vs_main"),
            compilation_options: Default::default(),
            buffers: &[ImmediateVertex::layout()],
        },
        fragment: Some(wgpu::FragmentState {
            module: &shader,
            entry_point: Some("fs_main"),
            compilation_options: Default::default(),
            targets: &[Some(wgpu::ColorTargetState {
                format: ctx.surface_format,
                blend: None,
                write_mask: wgpu::ColorWrites::ALL,
            })],
        }),
        primitive: primitive_state(primitive.expanded_topology(), None),
        depth_stencil: None,
        multisample: wgpu::MultisampleState::default(),
        multiview_mask: None,
        cache: None,
    });

    log::debug!("built immediate pipeline: {primitive:?}");

    ImmediatePipeline {
        pipeline,
        bind_group_layout,
    }
}

fn primitive_state(
    topology: wgpu::PrimitiveTopology,
    strip_index_format: Option<wgpu::IndexFormat>,
) -> wgpu::PrimitiveState {
    wgpu::PrimitiveState {
        topology,
        strip_index_format,
        front_face: wgpu::FrontFace::Ccw,
        cull_mode: None,
        polygon_mode: wgpu::PolygonMode::Fill,
        unclipped_depth: false,
        conservative: false,
    }
}
