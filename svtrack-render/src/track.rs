//! Track-level state machine tying fetch, packing, and geometry together.
//!
//! The host owns data fetching and the draw loop; [`SvTrack`] owns the
//! per-chromosome segment store, the working set for the current view, and
//! the row assignments. Chromosome data is inserted once and never
//! re-fetched; panning across a boundary only rebuilds the working set.

use std::collections::HashMap;

use anyhow::{bail, Result};

use crate::arena::GeometryArena;
use crate::geometry::{build_geometry, GeometryBatch, LinearScale, RenderOptions};
use svtrack_core::{
    normalize_batch, AbsSpan, Filter, GenomeLayout, RawRecord, RowPacker, SampleSelector, Segment,
};

/// Current view: the absolute span on screen and its pixel mapping.
#[derive(Debug, Clone, Copy)]
pub struct Viewport {
    pub span: AbsSpan,
    pub scale: LinearScale,
}

impl Viewport {
    pub fn new(span: AbsSpan, scale: LinearScale) -> Self {
        Self { span, scale }
    }
}

/// Minimal host-facing surface of a renderable track.
pub trait Track {
    fn on_viewport_change(&mut self, viewport: Viewport);
    fn on_filter_change(&mut self, filter: Filter);
    fn render(&mut self, options: &RenderOptions) -> GeometryBatch;
}

/// Structural-variant track over one genome layout.
pub struct SvTrack {
    layout: GenomeLayout,
    selector: SampleSelector,
    filter: Filter,
    packer: RowPacker,
    arena: GeometryArena,
    /// Normalized segments per loaded chromosome, keyed by name.
    per_chromosome: HashMap<String, Vec<Segment>>,
    /// Segments of every visible chromosome, rows assigned.
    working: Vec<Segment>,
    /// Names of chromosomes intersecting the current viewport, axis order.
    visible: Vec<String>,
    viewport: Viewport,
}

impl SvTrack {
    pub fn new(layout: GenomeLayout, filter: Filter, selector: SampleSelector) -> Self {
        let span = AbsSpan::new(0, layout.total_length().saturating_sub(1));
        let viewport = Viewport::new(span, LinearScale::new([0.0, 1.0], [0.0, 1.0]));
        Self {
            layout,
            selector,
            filter,
            packer: RowPacker::new(),
            arena: GeometryArena::new(),
            per_chromosome: HashMap::new(),
            working: Vec::new(),
            visible: Vec::new(),
            viewport,
        }
    }

    pub fn layout(&self) -> &GenomeLayout {
        &self.layout
    }

    /// Normalize and store one chromosome's records. Each chromosome is
    /// inserted at most once; a repeat insert is ignored.
    ///
    /// If the chromosome is currently visible its segments join the
    /// working set immediately, placed below existing rows where needed.
    pub fn insert_chromosome(&mut self, name: &str, records: &[RawRecord]) -> Result<usize> {
        let offset = match self.layout.offset_of(name) {
            Some(offset) => offset,
            None => bail!("chromosome {name} is not in the genome layout"),
        };
        if self.per_chromosome.contains_key(name) {
            log::debug!("chromosome {name} already loaded, ignoring re-insert");
            return Ok(0);
        }

        let segments = normalize_batch(records, name, offset, &self.selector);
        let count = segments.len();
        log::debug!("loaded {count} segments for {name}");

        if self.visible.iter().any(|v| v == name) {
            self.working.extend(segments.iter().cloned());
            self.packer.assign_rows(&mut self.working, &self.filter);
        }
        self.per_chromosome.insert(name.to_string(), segments);
        Ok(count)
    }

    /// Visible chromosomes with no data yet; the host fetches these.
    pub fn missing_chromosomes(&self) -> Vec<String> {
        self.visible
            .iter()
            .filter(|name| !self.per_chromosome.contains_key(name.as_str()))
            .cloned()
            .collect()
    }

    /// Segments currently in the working set, with row assignments.
    pub fn working_set(&self) -> &[Segment] {
        &self.working
    }

    /// Rebuild the working set from the loaded chromosomes that are
    /// currently visible, then repack from scratch.
    fn rebuild_working(&mut self) {
        self.working.clear();
        for name in &self.visible {
            if let Some(segments) = self.per_chromosome.get(name) {
                self.working.extend(segments.iter().cloned());
            }
        }
        self.packer.reset_rows(&mut self.working);
        self.packer.assign_rows(&mut self.working, &self.filter);
    }
}

impl Track for SvTrack {
    fn on_viewport_change(&mut self, viewport: Viewport) {
        let visible = self.layout.chromosomes_in(viewport.span).to_vec();
        self.viewport = viewport;
        if visible != self.visible {
            self.visible = visible;
            self.rebuild_working();
        }
    }

    fn on_filter_change(&mut self, filter: Filter) {
        self.filter = filter;
        self.packer.reset_rows(&mut self.working);
        self.packer.assign_rows(&mut self.working, &self.filter);
    }

    fn render(&mut self, options: &RenderOptions) -> GeometryBatch {
        build_geometry(
            &self.working,
            &self.viewport.span,
            &self.viewport.scale,
            options,
            &mut self.arena,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use svtrack_core::record::GenericRecord;
    use svtrack_core::SourceProfile;

    fn layout() -> GenomeLayout {
        GenomeLayout::new([("chr1".to_string(), 1000), ("chr2".to_string(), 1000)])
    }

    fn record(id: &str, pos: u64, end: u64) -> RawRecord {
        RawRecord::Generic(GenericRecord {
            id: id.to_string(),
            alts: vec!["<DEL>".to_string()],
            sv_type: "DEL".to_string(),
            pos,
            end: Some(end),
            sv_len: None,
            samples: Vec::new(),
        })
    }

    fn track() -> SvTrack {
        SvTrack::new(
            layout(),
            Filter::new(SourceProfile::Generic),
            SampleSelector::First,
        )
    }

    #[test]
    fn test_insert_unknown_chromosome_fails() {
        let mut track = track();
        assert!(track.insert_chromosome("chrM", &[]).is_err());
    }

    #[test]
    fn test_reinsert_is_ignored() {
        let mut track = track();
        assert_eq!(track.insert_chromosome("chr1", &[record("a", 10, 50)]).unwrap(), 1);
        assert_eq!(track.insert_chromosome("chr1", &[record("b", 60, 90)]).unwrap(), 0);
    }

    #[test]
    fn test_viewport_change_builds_working_set() {
        let mut track = track();
        track.insert_chromosome("chr1", &[record("a", 10, 50)]).unwrap();
        track.insert_chromosome("chr2", &[record("b", 10, 50)]).unwrap();

        let scale = LinearScale::new([0.0, 1000.0], [0.0, 500.0]);
        track.on_viewport_change(Viewport::new(AbsSpan::new(0, 900), scale));
        assert_eq!(track.working_set().len(), 1);

        // Crossing the boundary pulls in chr2; chr2's 10..50 maps to
        // absolute 1010..1050.
        track.on_viewport_change(Viewport::new(AbsSpan::new(0, 1500), scale));
        assert_eq!(track.working_set().len(), 2);
        assert!(track.working_set().iter().all(|s| s.row.is_some()));
        assert_eq!(track.working_set()[1].from, 1010);
    }

    #[test]
    fn test_missing_chromosomes_reported() {
        let mut track = track();
        track.insert_chromosome("chr1", &[record("a", 10, 50)]).unwrap();
        let scale = LinearScale::new([0.0, 2000.0], [0.0, 500.0]);
        track.on_viewport_change(Viewport::new(AbsSpan::new(0, 1999), scale));
        assert_eq!(track.missing_chromosomes(), vec!["chr2".to_string()]);

        track.insert_chromosome("chr2", &[record("b", 10, 50)]).unwrap();
        assert!(track.missing_chromosomes().is_empty());
        // The late insert joined the working set without a viewport event.
        assert_eq!(track.working_set().len(), 2);
    }

    #[test]
    fn test_filter_change_repacks() {
        let mut track = track();
        track
            .insert_chromosome("chr1", &[record("a", 10, 50), record("b", 30, 80)])
            .unwrap();
        let scale = LinearScale::new([0.0, 1000.0], [0.0, 500.0]);
        track.on_viewport_change(Viewport::new(AbsSpan::new(0, 900), scale));
        assert!(track.working_set().iter().all(|s| s.row.is_some()));

        let mut narrow = Filter::new(SourceProfile::Generic);
        narrow.min_length = 45;
        track.on_filter_change(narrow);
        let rows: Vec<_> = track.working_set().iter().map(|s| s.row).collect();
        assert_eq!(rows, vec![None, Some(0)]);
    }

    #[test]
    fn test_render_uses_current_viewport() {
        let mut track = track();
        track
            .insert_chromosome("chr1", &[record("a", 10, 50), record("b", 500, 700)])
            .unwrap();
        let scale = LinearScale::new([0.0, 100.0], [0.0, 500.0]);
        track.on_viewport_change(Viewport::new(AbsSpan::new(0, 100), scale));

        let batch = track.render(&RenderOptions::default());
        assert_eq!(batch.rendered_count, 1);
        assert_eq!(batch.variants[0].segment.id, "a");
    }
}
