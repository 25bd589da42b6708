//! Reusable geometry buffers.
//!
//! One arena per builder thread; cleared between frames but never shrunk,
//! so steady-state rendering does no allocation.

/// Growable vertex/color/index storage for one geometry build.
///
/// Layout matches the upload format: two `f32` per vertex position, one
/// `f32` color-table index per vertex, `i32` triangle indices.
#[derive(Debug, Default)]
pub struct GeometryArena {
    positions: Vec<f32>,
    colors: Vec<f32>,
    indices: Vec<i32>,
}

impl GeometryArena {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-size for an expected segment count (4 vertices, 6 indices per
    /// quad).
    pub fn with_capacity(segments: usize) -> Self {
        Self {
            positions: Vec::with_capacity(segments * 8),
            colors: Vec::with_capacity(segments * 4),
            indices: Vec::with_capacity(segments * 6),
        }
    }

    /// Clear contents, keep capacity.
    pub fn reset(&mut self) {
        self.positions.clear();
        self.colors.clear();
        self.indices.clear();
    }

    pub fn vertex_count(&self) -> usize {
        self.positions.len() / 2
    }

    pub fn index_count(&self) -> usize {
        self.indices.len()
    }

    /// Push one vertex, returning its index for triangle assembly.
    pub fn push_vertex(&mut self, x: f32, y: f32) -> i32 {
        let ix = self.vertex_count() as i32;
        self.positions.push(x);
        self.positions.push(y);
        ix
    }

    /// Assign a color-table slot to the last `n` pushed vertices.
    pub fn push_color(&mut self, color_ix: f32, n: usize) {
        self.colors.extend(std::iter::repeat(color_ix).take(n));
    }

    pub fn push_triangle(&mut self, a: i32, b: i32, c: i32) {
        self.indices.push(a);
        self.indices.push(b);
        self.indices.push(c);
    }

    /// Axis-aligned quad as two triangles, all four vertices in one color.
    pub fn push_rect(&mut self, x: f32, y: f32, width: f32, height: f32, color_ix: f32) {
        let tl = self.push_vertex(x, y);
        let tr = self.push_vertex(x + width, y);
        let br = self.push_vertex(x + width, y + height);
        let bl = self.push_vertex(x, y + height);
        self.push_triangle(tl, tr, br);
        self.push_triangle(tl, br, bl);
        self.push_color(color_ix, 4);
    }

    pub fn positions(&self) -> &[f32] {
        &self.positions
    }

    pub fn colors(&self) -> &[f32] {
        &self.colors
    }

    pub fn indices(&self) -> &[i32] {
        &self.indices
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rect_produces_two_triangles() {
        let mut arena = GeometryArena::new();
        arena.push_rect(10.0, 20.0, 100.0, 8.0, 3.0);
        assert_eq!(arena.vertex_count(), 4);
        assert_eq!(arena.index_count(), 6);
        assert_eq!(arena.colors(), &[3.0, 3.0, 3.0, 3.0]);
        assert_eq!(arena.positions()[0..2], [10.0, 20.0]);
        assert_eq!(arena.positions()[4..6], [110.0, 28.0]);
    }

    #[test]
    fn test_reset_keeps_capacity() {
        let mut arena = GeometryArena::with_capacity(16);
        for i in 0..16 {
            arena.push_rect(i as f32, 0.0, 1.0, 1.0, 0.0);
        }
        let cap = arena.positions.capacity();
        arena.reset();
        assert_eq!(arena.vertex_count(), 0);
        assert_eq!(arena.index_count(), 0);
        assert_eq!(arena.positions.capacity(), cap);
    }

    #[test]
    fn test_vertex_indices_are_sequential() {
        let mut arena = GeometryArena::new();
        assert_eq!(arena.push_vertex(0.0, 0.0), 0);
        assert_eq!(arena.push_vertex(1.0, 0.0), 1);
        arena.push_rect(0.0, 0.0, 1.0, 1.0, 0.0);
        assert_eq!(arena.push_vertex(2.0, 0.0), 6);
    }
}
