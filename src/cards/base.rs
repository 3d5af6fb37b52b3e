//! State and draw setup shared by every card layer.

use bytemuck::Pod;
use wgpu::util::DeviceExt;

use super::binder::BoundTextures;
use super::ShaderVariant;
use crate::render::{
    quad_vertices, LayerUniforms, Mat4, RenderContext, UiVertex, UniformTarget, QUAD_INDICES,
};

/// Colour: `src + dst * (1 - src.a)`. Alpha: `src * (1 - dst.a) + dst`.
const CARD_BLEND: wgpu::BlendState = wgpu::BlendState {
    color: wgpu::BlendComponent {
        src_factor: wgpu::BlendFactor::One,
        dst_factor: wgpu::BlendFactor::OneMinusSrcAlpha,
        operation: wgpu::BlendOperation::Add,
    },
    alpha: wgpu::BlendComponent {
        src_factor: wgpu::BlendFactor::OneMinusDstAlpha,
        dst_factor: wgpu::BlendFactor::One,
        operation: wgpu::BlendOperation::Add,
    },
};

/// Quad geometry, both constant buffers and the pipeline for one layer.
///
/// `P` is the family's pixel constant layout.
pub struct LayerBase<P: Pod> {
    uniforms: LayerUniforms<P>,
    vertex_buffer: wgpu::Buffer,
    index_buffer: wgpu::Buffer,
    view_buffer: wgpu::Buffer,
    pixel_buffer: wgpu::Buffer,
    view_bind_group: wgpu::BindGroup,
    pixel_bind_group: wgpu::BindGroup,
    textures: BoundTextures,
    pipeline: wgpu::RenderPipeline,
}

impl<P: Pod> std::fmt::Debug for LayerBase<P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LayerBase")
            .field("view_dirty", &self.uniforms.view.is_dirty())
            .field("pixel_dirty", &self.uniforms.pixel.is_dirty())
            .field("texture_slots", &self.textures.bindings.resolved().len())
            .finish()
    }
}

impl<P: Pod> LayerBase<P> {
    pub fn new(
        ctx: &RenderContext,
        vertex_module: &wgpu::ShaderModule,
        variant: &ShaderVariant,
        constants: P,
        textures: BoundTextures,
    ) -> Self {
        let device = &ctx.device;
        let uniforms = LayerUniforms::new(constants);

        let vertex_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Card Vertex Buffer"),
            size: std::mem::size_of::<[UiVertex; 4]>() as u64,
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Card Index Buffer"),
            contents: bytemuck::cast_slice(&QUAD_INDICES),
            usage: wgpu::BufferUsages::INDEX,
        });
        let view_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Card View Constants"),
            contents: bytemuck::bytes_of(uniforms.view.get()),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });
        // Sized once; later changes are written in place.
        let pixel_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Card Pixel Constants"),
            contents: bytemuck::bytes_of(uniforms.pixel.get()),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        let view_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Card View Bind Group"),
            layout: ctx.view_layout(),
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: view_buffer.as_entire_binding(),
            }],
        });
        let mut pixel_entries = vec![wgpu::BindGroupEntry {
            binding: 0,
            resource: pixel_buffer.as_entire_binding(),
        }];
        pixel_entries.extend(ctx.samplers().bind_entries());
        let pixel_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Card Pixel Bind Group"),
            layout: ctx.pixel_layout(),
            entries: &pixel_entries,
        });

        let pipeline = create_pipeline(ctx, vertex_module, variant, &textures.layout);

        Self {
            uniforms,
            vertex_buffer,
            index_buffer,
            view_buffer,
            pixel_buffer,
            view_bind_group,
            pixel_bind_group,
            textures,
            pipeline,
        }
    }

    pub fn set_view_transform(&mut self, transform: Mat4) {
        self.uniforms.set_view_transform(transform);
    }

    pub fn uniforms(&self) -> &LayerUniforms<P> {
        &self.uniforms
    }

    /// Mutate the pixel constants, marking them for upload.
    pub fn update_constants(&mut self, f: impl FnOnce(&mut P)) {
        self.uniforms.pixel.update(f);
    }

    /// Write the quad for this draw and whichever constants changed.
    pub fn prepare(&mut self, queue: &wgpu::Queue, pos: [f32; 2], size: [f32; 2]) {
        let vertices = quad_vertices(pos, size);
        queue.write_buffer(&self.vertex_buffer, 0, bytemuck::cast_slice(&vertices));

        let (view_buffer, pixel_buffer) = (&self.view_buffer, &self.pixel_buffer);
        self.uniforms.flush(|target, bytes| {
            let buffer = match target {
                UniformTarget::View => view_buffer,
                UniformTarget::Pixel => pixel_buffer,
            };
            queue.write_buffer(buffer, 0, bytes);
        });
    }

    /// Bind everything and issue the 6-index draw.
    pub fn record(&self, pass: &mut wgpu::RenderPass<'_>) {
        pass.set_pipeline(&self.pipeline);
        pass.set_vertex_buffer(0, self.vertex_buffer.slice(..));
        pass.set_index_buffer(self.index_buffer.slice(..), wgpu::IndexFormat::Uint16);
        pass.set_bind_group(0, &self.view_bind_group, &[]);
        pass.set_bind_group(1, &self.pixel_bind_group, &[]);
        pass.set_bind_group(2, &self.textures.bind_group, &[]);
        pass.draw_indexed(0..QUAD_INDICES.len() as u32, 0, 0..1);
    }
}

fn create_pipeline(
    ctx: &RenderContext,
    vertex_module: &wgpu::ShaderModule,
    variant: &ShaderVariant,
    texture_layout: &wgpu::BindGroupLayout,
) -> wgpu::RenderPipeline {
    let device = &ctx.device;
    let pixel_module = variant.pixel.create_shader_module(device);

    let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
        label: Some(&variant.name),
        bind_group_layouts: &[ctx.view_layout(), ctx.pixel_layout(), texture_layout],
        push_constant_ranges: &[],
    });

    device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some(&variant.name),
        layout: Some(&layout),
        vertex: wgpu::VertexState {
            module: vertex_module,
            entry_point: Some(variant.vertex.entry_point()),
            buffers: &[UiVertex::desc()],
            compilation_options: wgpu::PipelineCompilationOptions::default(),
        },
        fragment: Some(wgpu::FragmentState {
            module: &pixel_module,
            entry_point: Some(variant.pixel.entry_point()),
            targets: &[Some(wgpu::ColorTargetState {
                format: ctx.target_format(),
                blend: Some(CARD_BLEND),
                write_mask: wgpu::ColorWrites::ALL,
            })],
            compilation_options: wgpu::PipelineCompilationOptions::default(),
        }),
        primitive: wgpu::PrimitiveState {
            topology: wgpu::PrimitiveTopology::TriangleList,
            strip_index_format: None,
            front_face: wgpu::FrontFace::Cw,
            cull_mode: None,
            polygon_mode: wgpu::PolygonMode::Fill,
            unclipped_depth: false,
            conservative: false,
        },
        depth_stencil: None,
        multisample: wgpu::MultisampleState::default(),
        multiview: None,
        cache: None,
    })
}
