//! Constant buffers with explicit dirty tracking.
//!
//! Constants are mutated freely on the CPU; the GPU copy is refreshed only
//! when something changed since the last draw.

use bytemuck::Pod;

/// Column-major 4x4 matrix.
pub type Mat4 = [[f32; 4]; 4];

/// CPU copy of one constant buffer plus its dirty flag.
#[derive(Debug, Clone)]
pub struct DirtyConstants<T: Pod> {
    value: T,
    dirty: bool,
}

impl<T: Pod> DirtyConstants<T> {
    /// New constants start dirty so the first draw uploads them.
    pub fn new(value: T) -> Self {
        Self { value, dirty: true }
    }

    pub fn get(&self) -> &T {
        &self.value
    }

    pub fn update(&mut self, f: impl FnOnce(&mut T)) {
        f(&mut self.value);
        self.dirty = true;
    }

    pub fn replace(&mut self, value: T) {
        self.value = value;
        self.dirty = true;
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Bytes to upload, clearing the flag. `None` when nothing changed.
    pub fn take_upload(&mut self) -> Option<&[u8]> {
        if !self.dirty {
            return None;
        }
        self.dirty = false;
        Some(bytemuck::bytes_of(&self.value))
    }
}

/// Vertex-stage constants.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct ViewConstants {
    pub ui_scale: Mat4,
}

/// Orthographic transform mapping `(0,0)..size` pixels to clip space, y down.
pub fn ui_matrix(size: [u32; 2]) -> Mat4 {
    let (w, h) = (size[0] as f32, size[1] as f32);
    [
        [2.0 / w, 0.0, 0.0, 0.0],
        [0.0, -2.0 / h, 0.0, 0.0],
        [0.0, 0.0, 1.0, 0.0],
        [-1.0, 1.0, 0.0, 1.0],
    ]
}

pub fn transpose(m: Mat4) -> Mat4 {
    std::array::from_fn(|c| std::array::from_fn(|r| m[r][c]))
}

/// Which constant buffer an upload targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UniformTarget {
    View,
    Pixel,
}

/// The two constant buffers every layer owns.
#[derive(Debug, Clone)]
pub struct LayerUniforms<P: Pod> {
    pub view: DirtyConstants<ViewConstants>,
    pub pixel: DirtyConstants<P>,
}

impl<P: Pod> LayerUniforms<P> {
    pub fn new(pixel: P) -> Self {
        Self {
            view: DirtyConstants::new(ViewConstants { ui_scale: identity() }),
            pixel: DirtyConstants::new(pixel),
        }
    }

    /// Store a view transform; it is uploaded transposed.
    pub fn set_view_transform(&mut self, transform: Mat4) {
        self.view.replace(ViewConstants { ui_scale: transpose(transform) });
    }

    /// Hand every dirty buffer to `sink`. Returns how many were uploaded.
    pub fn flush(&mut self, mut sink: impl FnMut(UniformTarget, &[u8])) -> usize {
        let mut uploaded = 0;
        if let Some(bytes) = self.view.take_upload() {
            sink(UniformTarget::View, bytes);
            uploaded += 1;
        }
        if let Some(bytes) = self.pixel.take_upload() {
            sink(UniformTarget::Pixel, bytes);
            uploaded += 1;
        }
        uploaded
    }
}

fn identity() -> Mat4 {
    std::array::from_fn(|c| std::array::from_fn(|r| if r == c { 1.0 } else { 0.0 }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[repr(C)]
    #[derive(Debug, Clone, Copy, bytemuck::Pod, bytemuck::Zeroable)]
    struct Pixel {
        time: f32,
        pad: [u32; 3],
    }

    fn uploads(u: &mut LayerUniforms<Pixel>) -> Vec<UniformTarget> {
        let mut targets = Vec::new();
        u.flush(|t, _| targets.push(t));
        targets
    }

    #[test]
    fn first_draw_uploads_both_buffers() {
        let mut u = LayerUniforms::new(Pixel { time: 0.0, pad: [0; 3] });
        assert_eq!(uploads(&mut u), vec![UniformTarget::View, UniformTarget::Pixel]);
    }

    #[test]
    fn second_draw_without_changes_uploads_nothing() {
        let mut u = LayerUniforms::new(Pixel { time: 0.0, pad: [0; 3] });
        uploads(&mut u);
        assert!(uploads(&mut u).is_empty());
        assert!(!u.view.is_dirty());
        assert!(!u.pixel.is_dirty());
    }

    #[test]
    fn only_changed_buffer_is_uploaded() {
        let mut u = LayerUniforms::new(Pixel { time: 0.0, pad: [0; 3] });
        uploads(&mut u);

        u.pixel.update(|p| p.time = 1.5);
        let mut bytes = Vec::new();
        u.flush(|t, b| bytes.push((t, b.to_vec())));
        assert_eq!(bytes.len(), 1);
        assert_eq!(bytes[0].0, UniformTarget::Pixel);
        assert_eq!(&bytes[0].1[..4], &1.5f32.to_le_bytes());

        u.set_view_transform(ui_matrix([390, 280]));
        assert_eq!(uploads(&mut u), vec![UniformTarget::View]);
    }

    #[test]
    fn view_transform_is_stored_transposed() {
        let mut u = LayerUniforms::new(Pixel { time: 0.0, pad: [0; 3] });
        let m = ui_matrix([200, 100]);
        u.set_view_transform(m);
        let stored = u.view.get().ui_scale;
        assert_eq!(stored[0], [0.01, 0.0, 0.0, -1.0]);
        assert_eq!(stored[1], [0.0, -0.02, 0.0, 1.0]);
        assert_eq!(transpose(stored), m);
    }

    #[test]
    fn ui_matrix_maps_corners_to_clip_space() {
        let m = ui_matrix([256, 128]);
        let apply = |x: f32, y: f32| {
            [
                m[0][0] * x + m[1][0] * y + m[3][0],
                m[0][1] * x + m[1][1] * y + m[3][1],
            ]
        };
        assert_eq!(apply(0.0, 0.0), [-1.0, 1.0]);
        assert_eq!(apply(256.0, 128.0), [1.0, -1.0]);
        assert_eq!(apply(128.0, 64.0), [0.0, 0.0]);
    }
}
