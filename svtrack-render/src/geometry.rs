//! Viewport-scoped geometry construction.
//!
//! Takes packed segments and emits the vertex, color, and index buffers for
//! one frame, along with the placed-segment list the host uses for hit
//! testing. The pipeline is cull, cap, dedup, then quad emission.

use crate::arena::GeometryArena;
use crate::color::ColorTable;
use serde::{Deserialize, Serialize};
use svtrack_core::{AbsSpan, Segment, SourceProfile};

/// Vertical gap between rows, in pixels.
pub const ROW_GAP: f32 = 2.0;

/// Affine map from genome-absolute coordinates to screen x.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct LinearScale {
    pub domain: [f64; 2],
    pub range: [f64; 2],
}

impl LinearScale {
    pub fn new(domain: [f64; 2], range: [f64; 2]) -> Self {
        Self { domain, range }
    }

    pub fn apply(&self, x: f64) -> f32 {
        let span = self.domain[1] - self.domain[0];
        if span == 0.0 {
            return self.range[0] as f32;
        }
        let t = (x - self.domain[0]) / span;
        (self.range[0] + t * (self.range[1] - self.range[0])) as f32
    }
}

/// Per-frame styling and limits.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderOptions {
    /// Quad height in pixels.
    pub variant_height: f32,
    /// Hard cap on quads per frame; longest variants win.
    pub max_variants: usize,
    /// Population allele frequency above which a variant is drawn in its
    /// light color.
    pub common_af_threshold: f64,
    /// Five-color scale: insertion, deletion, inversion, translocation,
    /// duplication.
    pub color_scale: [[f32; 4]; 5],
    pub profile: SourceProfile,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            variant_height: 12.0,
            max_variants: 100_000,
            common_af_threshold: 0.01,
            color_scale: [
                [0.25, 0.65, 0.25, 1.0],
                [0.85, 0.25, 0.25, 1.0],
                [0.25, 0.35, 0.85, 1.0],
                [0.55, 0.25, 0.65, 1.0],
                [0.90, 0.60, 0.20, 1.0],
            ],
            profile: SourceProfile::Generic,
        }
    }
}

/// A rendered segment with its resolved vertical position, for tooltips
/// and click lookup.
#[derive(Debug, Clone)]
pub struct PlacedSegment {
    pub segment: Segment,
    pub screen_top: f32,
}

/// Output of one geometry build: upload-ready buffers plus bookkeeping.
#[derive(Debug, Default)]
pub struct GeometryBatch {
    pub positions: Vec<f32>,
    pub colors: Vec<f32>,
    pub indices: Vec<i32>,
    pub variants: Vec<PlacedSegment>,
    /// Segments intersecting the viewport, counted before the row drop and
    /// the cap.
    pub visible_count: usize,
    /// Segments actually emitted, after cap and dedup.
    pub rendered_count: usize,
}

impl GeometryBatch {
    /// True when not everything in view was drawn, whether by filter,
    /// cap, or dedup; drives the "N of M visible" notice.
    pub fn is_truncated(&self) -> bool {
        self.rendered_count < self.visible_count
    }

    pub fn position_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.positions)
    }

    pub fn color_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.colors)
    }

    pub fn index_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.indices)
    }
}

/// Build one frame of quads from packed segments.
///
/// Segments without a row are skipped, the visible set is capped to
/// `max_variants` keeping the longest calls, and duplicate ids from
/// overlapping fetches are collapsed. Emission order is by id, so output
/// is independent of fetch order.
pub fn build_geometry(
    segments: &[Segment],
    visible: &AbsSpan,
    scale: &LinearScale,
    options: &RenderOptions,
    arena: &mut GeometryArena,
) -> GeometryBatch {
    arena.reset();

    let mut in_view: Vec<&Segment> = segments
        .iter()
        .filter(|s| visible.intersects(s.from, s.to))
        .collect();
    // Counted before the row drop: the notice denominator is everything in
    // view, including what the filter excluded.
    let visible_count = in_view.len();
    in_view.retain(|s| s.row.is_some());

    if in_view.len() > options.max_variants {
        in_view.sort_by(|a, b| b.length_abs.cmp(&a.length_abs));
        in_view.truncate(options.max_variants);
    }

    in_view.sort_by(|a, b| a.id.cmp(&b.id));
    in_view.dedup_by(|a, b| a.id == b.id);

    let mut variants = Vec::with_capacity(in_view.len());
    for segment in &in_view {
        let row = match segment.row {
            Some(row) => row,
            None => continue,
        };
        let x_start = scale.apply(segment.from as f64);
        let x_end = scale.apply(segment.to as f64);
        // Sub-pixel variants stay visible.
        let width = (x_end - x_start).max(1.0);
        let y_top = row as f32 * (options.variant_height + ROW_GAP) + 1.0;

        let light = options.profile == SourceProfile::PopulationDb
            && segment
                .allele_frequency
                .is_some_and(|af| af > options.common_af_threshold);
        let color_ix = ColorTable::index_for(segment.sv_type, light);
        arena.push_rect(x_start, y_top, width, options.variant_height, color_ix.as_f32());

        variants.push(PlacedSegment {
            segment: (*segment).clone(),
            screen_top: y_top,
        });
    }

    let rendered_count = variants.len();
    if rendered_count < visible_count {
        log::debug!(
            "{} of {} visible segments rendered",
            rendered_count,
            visible_count
        );
    }

    GeometryBatch {
        positions: arena.positions().to_vec(),
        colors: arena.colors().to_vec(),
        indices: arena.indices().to_vec(),
        variants,
        visible_count,
        rendered_count,
    }
}
