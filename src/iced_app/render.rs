//! Shader widget integration: every card drawn into the widget each frame.

use std::sync::Arc;

use iced::keyboard::{self, key::Named, Key};
use iced::mouse;
use iced::widget::shader::{self, Action, Viewport};
use iced::{Event, Rectangle};

use crate::assets::AssetRoots;
use crate::cards::{CardEffect, CardLayers, VariantSet};
use crate::render::{ui_matrix, RenderContext, TextureStore};

use super::app::App;
use super::layout::{card_origin, card_size};
use super::Message;

impl shader::Program<Message> for &App {
    type State = ();
    type Primitive = CardsPrimitive;

    fn update(
        &self,
        _state: &mut Self::State,
        event: &Event,
        _bounds: Rectangle,
        _cursor: mouse::Cursor,
    ) -> Option<Action<Message>> {
        match event {
            Event::Keyboard(keyboard::Event::KeyReleased {
                key: Key::Named(named),
                ..
            }) => match named {
                Named::PageDown => Some(Action::publish(Message::NextCard)),
                Named::PageUp => Some(Action::publish(Message::PrevCard)),
                _ => None,
            },
            _ => None,
        }
    }

    fn draw(
        &self,
        _state: &Self::State,
        _cursor: mouse::Cursor,
        _bounds: Rectangle,
    ) -> Self::Primitive {
        CardsPrimitive {
            set: Arc::clone(&self.variants),
            roots: self.roots.clone(),
            time: self.elapsed(),
        }
    }

    fn mouse_interaction(
        &self,
        _state: &Self::State,
        _bounds: Rectangle,
        _cursor: mouse::Cursor,
    ) -> mouse::Interaction {
        mouse::Interaction::default()
    }
}

/// One frame of the card grid.
#[derive(Debug)]
pub struct CardsPrimitive {
    set: Arc<VariantSet>,
    roots: AssetRoots,
    time: f64,
}

/// GPU state for the card grid. Layers are built on first use, since the
/// compiled variants only arrive with the first primitive.
pub struct CardsPipeline {
    ctx: RenderContext,
    layers: Option<CardLayers>,
}

impl CardsPipeline {
    fn layers_for(&mut self, primitive: &CardsPrimitive) -> &mut CardLayers {
        let ctx = &self.ctx;
        self.layers.get_or_insert_with(|| {
            let mut store = TextureStore::new(primitive.roots.clone());
            let layers = CardLayers::build(ctx, &mut store, &primitive.set);
            tracing::info!("Interactive layers ready: {}", layers.names().join(", "));
            layers
        })
    }
}

impl std::fmt::Debug for CardsPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CardsPipeline")
            .field("format", &self.ctx.target_format())
            .field("layers", &self.layers.as_ref().map(CardLayers::len))
            .finish()
    }
}

impl shader::Pipeline for CardsPipeline {
    fn new(device: &wgpu::Device, queue: &wgpu::Queue, format: wgpu::TextureFormat) -> Self {
        Self {
            ctx: RenderContext::new(device.clone(), queue.clone(), format),
            layers: None,
        }
    }
}

impl shader::Primitive for CardsPrimitive {
    type Pipeline = CardsPipeline;

    fn prepare(
        &self,
        pipeline: &mut Self::Pipeline,
        _device: &wgpu::Device,
        queue: &wgpu::Queue,
        bounds: &Rectangle,
        viewport: &Viewport,
    ) {
        let scale = viewport.scale_factor();
        let screen = [
            (bounds.width * scale).round().max(1.0) as u32,
            (bounds.height * scale).round().max(1.0) as u32,
        ];
        let screen_f = [screen[0] as f32, screen[1] as f32];
        let transform = ui_matrix(screen);

        for (index, layer) in pipeline.layers_for(self).iter_mut().enumerate() {
            layer.set_view_transform(transform);
            layer.set_time(self.time);
            layer.prepare(queue, card_origin(index, screen_f), card_size());
        }
    }

    fn render(
        &self,
        pipeline: &Self::Pipeline,
        encoder: &mut wgpu::CommandEncoder,
        target: &wgpu::TextureView,
        clip_bounds: &Rectangle<u32>,
    ) {
        let Some(layers) = &pipeline.layers else {
            return;
        };

        let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("Card Grid Pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: target,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(wgpu::Color::TRANSPARENT),
                    store: wgpu::StoreOp::Store,
                },
                depth_slice: None,
            })],
            depth_stencil_attachment: None,
            timestamp_writes: None,
            occlusion_query_set: None,
        });

        pass.set_viewport(
            clip_bounds.x as f32,
            clip_bounds.y as f32,
            clip_bounds.width as f32,
            clip_bounds.height as f32,
            0.0,
            1.0,
        );
        pass.set_scissor_rect(clip_bounds.x, clip_bounds.y, clip_bounds.width, clip_bounds.height);

        for layer in layers.iter() {
            layer.record(&mut pass);
        }
    }
}
