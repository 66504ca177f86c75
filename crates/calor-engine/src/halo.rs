//! Double-buffered padded tile storage.

use calor_grid::TileLayout;

/// The `current` and `next` padded temperature buffers of one tile.
///
/// Each iteration reads `current` and writes `next`; [`swap`](Self::swap)
/// then exchanges their roles. Both buffers share one [`TileLayout`].
#[derive(Clone, Debug, PartialEq)]
pub struct TileBuffers {
    layout: TileLayout,
    current: Vec<f32>,
    next: Vec<f32>,
}

impl TileBuffers {
    /// Two zero-filled buffers for `layout`.
    pub fn new(layout: TileLayout) -> Self {
        Self {
            layout,
            current: vec![0.0; layout.padded_len()],
            next: vec![0.0; layout.padded_len()],
        }
    }

    /// Geometry of both buffers.
    pub fn layout(&self) -> TileLayout {
        self.layout
    }

    /// The buffer read this iteration.
    pub fn current(&self) -> &[f32] {
        &self.current
    }

    /// Mutable access to the read buffer, used while loading the tile.
    pub fn current_mut(&mut self) -> &mut [f32] {
        &mut self.current
    }

    /// The buffer written this iteration.
    pub fn next(&self) -> &[f32] {
        &self.next
    }

    /// Borrow `current` for reading and `next` for writing at once.
    pub fn split(&mut self) -> (&[f32], &mut [f32]) {
        (&self.current, &mut self.next)
    }

    /// Copy `current` into `next`, so cells that are never computed hold
    /// the same value in both buffers.
    pub fn sync_next(&mut self) {
        self.next.copy_from_slice(&self.current);
    }

    /// Exchange the roles of the two buffers.
    pub fn swap(&mut self) {
        std::mem::swap(&mut self.current, &mut self.next);
    }
}
