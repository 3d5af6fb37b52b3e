//! Name-based texture registration against reflected slots.
//!
//! Effect variants register textures by the names their pixel programs use.
//! Names the program does not declare are ignored on purpose: families share
//! a registration routine but not an identical texture set.

use crate::render::{generate_solid, texture_layout, RenderContext, TextureStore};
use crate::shader::TextureSlotMap;

/// One registration: a slot and its texture, or `None` for an empty slot.
#[derive(Debug, Clone, PartialEq)]
pub struct TextureBinding<T> {
    pub slot: u32,
    pub texture: Option<T>,
}

/// Sparse registrations plus the dense array they resolve to.
#[derive(Debug, Clone)]
pub struct TextureBindings<T> {
    slots: TextureSlotMap,
    bindings: Vec<TextureBinding<T>>,
    resolved: Vec<Option<T>>,
}

impl<T: Clone> TextureBindings<T> {
    pub fn new(slots: TextureSlotMap) -> Self {
        Self {
            slots,
            bindings: Vec::new(),
            resolved: Vec::new(),
        }
    }

    pub fn slots(&self) -> &TextureSlotMap {
        &self.slots
    }

    /// Slot for `name`, if the program declares it.
    pub fn slot(&self, name: &str) -> Option<u32> {
        self.slots.slot(name)
    }

    /// Record a binding for `name`. Returns `false` for unknown names.
    pub fn bind(&mut self, name: &str, texture: Option<T>) -> bool {
        match self.slots.slot(name) {
            Some(slot) => {
                self.bindings.push(TextureBinding { slot, texture });
                true
            }
            None => false,
        }
    }

    /// Replay the sparse list into a dense array of `max slot + 1` entries.
    /// Later registrations of the same slot win.
    pub fn resolve(&mut self) {
        self.resolved.clear();
        for binding in &self.bindings {
            let slot = binding.slot as usize;
            if slot >= self.resolved.len() {
                self.resolved.resize(slot + 1, None);
            }
            self.resolved[slot] = binding.texture.clone();
        }
    }

    pub fn resolved(&self) -> &[Option<T>] {
        &self.resolved
    }
}

/// Texture registration calls a family makes while it is being built.
pub trait TextureRegistry {
    /// Bind the file at `path`; an empty path binds an empty slot.
    fn add_texture(&mut self, name: &str, path: &str, srgb: bool);
    /// Bind a generated solid texture of `size` filled with `value`.
    fn gen_texture(&mut self, name: &str, size: [u32; 2], value: u32);
}

/// Group 2 objects for one layer.
#[derive(Debug)]
pub struct BoundTextures {
    pub layout: wgpu::BindGroupLayout,
    pub bind_group: wgpu::BindGroup,
    pub bindings: TextureBindings<wgpu::TextureView>,
}

/// Builds a layer's texture bindings against the shared store.
pub struct ResourceBinder<'a> {
    ctx: &'a RenderContext,
    store: &'a mut TextureStore,
    bindings: TextureBindings<wgpu::TextureView>,
}

impl<'a> ResourceBinder<'a> {
    /// Start from a reflected slot map. Must precede any registration.
    pub fn new(ctx: &'a RenderContext, store: &'a mut TextureStore, slots: TextureSlotMap) -> Self {
        Self {
            ctx,
            store,
            bindings: TextureBindings::new(slots),
        }
    }

    /// Resolve the dense array and create the group 2 layout and bind group.
    pub fn finish(mut self, label: &str) -> BoundTextures {
        self.bindings.resolve();

        // Reflected slots nobody registered still need an entry.
        let slot_count = self
            .bindings
            .slots()
            .iter()
            .map(|(_, slot)| slot + 1)
            .chain(std::iter::once(self.bindings.resolved().len() as u32))
            .max()
            .unwrap_or(0);

        let layout = texture_layout(&self.ctx.device, slot_count);
        let bind_group = {
            let null = self.ctx.null_texture();
            let resolved = self.bindings.resolved();
            let entries: Vec<_> = (0..slot_count)
                .map(|slot| wgpu::BindGroupEntry {
                    binding: slot,
                    resource: wgpu::BindingResource::TextureView(
                        resolved.get(slot as usize).and_then(Option::as_ref).unwrap_or(null),
                    ),
                })
                .collect();
            self.ctx.device.create_bind_group(&wgpu::BindGroupDescriptor {
                label: Some(label),
                layout: &layout,
                entries: &entries,
            })
        };

        BoundTextures {
            layout,
            bind_group,
            bindings: self.bindings,
        }
    }
}

impl TextureRegistry for ResourceBinder<'_> {
    /// Files that cannot be found or decoded also bind an empty slot.
    fn add_texture(&mut self, name: &str, path: &str, srgb: bool) {
        if self.bindings.slot(name).is_none() {
            return;
        }
        let view = if path.is_empty() {
            None
        } else {
            self.store.load(self.ctx, path, srgb)
        };
        self.bindings.bind(name, view);
    }

    fn gen_texture(&mut self, name: &str, size: [u32; 2], value: u32) {
        if self.bindings.slot(name).is_none() {
            return;
        }
        let view = generate_solid(self.ctx, size, value);
        self.bindings.bind(name, Some(view));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn slots() -> TextureSlotMap {
        TextureSlotMap::from_pairs([("tex", 0), ("mask_tex", 1), ("muddle_tex", 4)])
    }

    #[test]
    fn unknown_names_are_ignored() {
        let mut b = TextureBindings::new(slots());
        assert!(b.bind("tex", Some("paper")));
        b.resolve();
        let before = b.resolved().to_vec();

        assert!(!b.bind("noise_map", Some("lookup")));
        b.resolve();
        assert_eq!(b.resolved(), before.as_slice());
        assert_eq!(b.resolved().len(), 1);
    }

    #[test]
    fn resolved_length_is_max_slot_plus_one() {
        let mut b = TextureBindings::new(slots());
        b.bind("muddle_tex", Some("muddle"));
        b.bind("tex", Some("paper"));
        b.resolve();
        assert_eq!(b.resolved(), &[Some("paper"), None, None, None, Some("muddle")]);
    }

    #[test]
    fn empty_registration_occupies_its_slot() {
        let mut b: TextureBindings<&str> = TextureBindings::new(slots());
        b.bind("mask_tex", None);
        b.resolve();
        assert_eq!(b.resolved(), &[None, None]);
    }

    #[test]
    fn later_registration_of_same_slot_wins() {
        let mut b = TextureBindings::new(slots());
        b.bind("tex", Some("first"));
        b.bind("tex", Some("second"));
        b.resolve();
        assert_eq!(b.resolved(), &[Some("second")]);
    }

    #[test]
    fn resolve_with_no_registrations_is_empty() {
        let mut b: TextureBindings<&str> = TextureBindings::new(slots());
        b.resolve();
        assert!(b.resolved().is_empty());
    }
}
