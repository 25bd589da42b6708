//! Genome-absolute coordinate math and tile spans.
//!
//! All chromosomes are laid end to end on one monotonic axis; tiles are
//! fixed-ratio chunks of that axis at a given zoom level. Everything here
//! is a pure function over an immutable [`GenomeLayout`].

use crate::types::GenomicPos;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Bins per tile at maximum zoom; matches the tileset convention of the
/// hosting viewer.
pub const TILE_BASE_SIZE: u64 = 1024;

/// Identifier of one tile: zoom level plus index along the axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TileId {
    pub zoom: u8,
    pub index: u64,
}

impl TileId {
    pub fn new(zoom: u8, index: u64) -> Self {
        Self { zoom, index }
    }
}

/// Half-open-ish span on the absolute axis (inclusive bounds, as the
/// culling tests are inclusive on both ends).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AbsSpan {
    pub start: GenomicPos,
    pub end: GenomicPos,
}

impl AbsSpan {
    pub fn new(start: GenomicPos, end: GenomicPos) -> Self {
        Self { start, end }
    }

    pub fn intersects(&self, from: GenomicPos, to: GenomicPos) -> bool {
        to >= self.start && from <= self.end
    }

    pub fn union(&self, other: &AbsSpan) -> AbsSpan {
        AbsSpan::new(self.start.min(other.start), self.end.max(other.end))
    }
}

/// Immutable chromosome table: lengths, cumulative offsets, name lookup.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenomeLayout {
    names: Vec<String>,
    lengths: Vec<u64>,
    offsets: Vec<u64>,
    index: HashMap<String, usize>,
    total_length: u64,
}

impl GenomeLayout {
    /// Build from ordered (name, length) pairs, e.g. a chrom.sizes file
    /// already parsed by the host.
    pub fn new<I, S>(chromosomes: I) -> Self
    where
        I: IntoIterator<Item = (S, u64)>,
        S: Into<String>,
    {
        let mut names = Vec::new();
        let mut lengths = Vec::new();
        let mut offsets = Vec::new();
        let mut index = HashMap::new();
        let mut cumulative = 0u64;

        for (name, length) in chromosomes {
            let name = name.into();
            index.insert(name.clone(), names.len());
            names.push(name);
            lengths.push(length);
            offsets.push(cumulative);
            cumulative += length;
        }

        Self {
            names,
            lengths,
            offsets,
            index,
            total_length: cumulative,
        }
    }

    pub fn total_length(&self) -> u64 {
        self.total_length
    }

    pub fn chromosome_count(&self) -> usize {
        self.names.len()
    }

    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.index.get(name).copied()
    }

    pub fn name(&self, index: usize) -> Option<&str> {
        self.names.get(index).map(String::as_str)
    }

    pub fn length_of(&self, name: &str) -> Option<u64> {
        self.index_of(name).map(|i| self.lengths[i])
    }

    /// Cumulative absolute offset of a chromosome's first base.
    pub fn offset_of(&self, name: &str) -> Option<GenomicPos> {
        self.index_of(name).map(|i| self.offsets[i])
    }

    /// Chromosome-relative position to genome-absolute.
    pub fn chrom_to_abs(&self, name: &str, pos: u64) -> Option<GenomicPos> {
        self.offset_of(name).map(|offset| offset + pos)
    }

    /// Genome-absolute position to (chromosome name, relative position).
    pub fn abs_to_chrom(&self, abs: GenomicPos) -> Option<(&str, u64)> {
        if self.names.is_empty() || abs >= self.total_length {
            return None;
        }
        // partition_point: first offset greater than abs.
        let i = self.offsets.partition_point(|&offset| offset <= abs) - 1;
        Some((self.names[i].as_str(), abs - self.offsets[i]))
    }

    /// Names of all chromosomes intersecting an absolute span, in axis
    /// order.
    pub fn chromosomes_in(&self, span: AbsSpan) -> &[String] {
        if self.names.is_empty() || span.start >= self.total_length {
            return &[];
        }
        let first = self.offsets.partition_point(|&offset| offset <= span.start) - 1;
        let end = span.end.min(self.total_length - 1);
        let last = self.offsets.partition_point(|&offset| offset <= end) - 1;
        &self.names[first..=last]
    }

    /// Deepest zoom level: tiles at `max_zoom` cover at most
    /// `TILE_BASE_SIZE` bases each.
    pub fn max_zoom(&self) -> u8 {
        if self.total_length <= TILE_BASE_SIZE {
            return 0;
        }
        (self.total_length as f64 / TILE_BASE_SIZE as f64)
            .log2()
            .ceil() as u8
    }

    /// Absolute span covered by one tile. Zoom level z splits the axis
    /// into 2^z tiles of equal width. Tile ids come from the host, so the
    /// width math stays in floating point rather than shifting, which
    /// would overflow for zoom >= 64.
    pub fn tile_span(&self, tile: TileId) -> AbsSpan {
        let tile_width = self.total_length as f64 / (tile.zoom as f64).exp2();
        let start = (tile.index as f64 * tile_width).floor() as u64;
        let end = (((tile.index + 1) as f64 * tile_width).ceil() as u64).min(self.total_length);
        AbsSpan::new(start, end)
    }

    /// Combined span of a contiguous tile range at one zoom level.
    pub fn tile_range_span(&self, zoom: u8, first: u64, last: u64) -> AbsSpan {
        self.tile_span(TileId::new(zoom, first))
            .union(&self.tile_span(TileId::new(zoom, last)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn layout() -> GenomeLayout {
        GenomeLayout::new([
            ("chr1".to_string(), 1000),
            ("chr2".to_string(), 2000),
            ("chr3".to_string(), 500),
        ])
    }

    #[test]
    fn test_offsets_and_total() {
        let layout = layout();
        assert_eq!(layout.total_length(), 3500);
        assert_eq!(layout.offset_of("chr1"), Some(0));
        assert_eq!(layout.offset_of("chr2"), Some(1000));
        assert_eq!(layout.offset_of("chr3"), Some(3000));
        assert_eq!(layout.offset_of("chrM"), None);
    }

    #[test]
    fn test_abs_chrom_roundtrip() {
        let layout = layout();
        assert_eq!(layout.chrom_to_abs("chr2", 500), Some(1500));
        assert_eq!(layout.abs_to_chrom(1500), Some(("chr2", 500)));
        assert_eq!(layout.abs_to_chrom(0), Some(("chr1", 0)));
        assert_eq!(layout.abs_to_chrom(999), Some(("chr1", 999)));
        assert_eq!(layout.abs_to_chrom(1000), Some(("chr2", 0)));
        assert_eq!(layout.abs_to_chrom(3499), Some(("chr3", 499)));
        assert_eq!(layout.abs_to_chrom(3500), None);
    }

    #[test]
    fn test_chromosomes_in_span() {
        let layout = layout();
        assert_eq!(layout.chromosomes_in(AbsSpan::new(0, 100)), &["chr1"]);
        assert_eq!(
            layout.chromosomes_in(AbsSpan::new(900, 1100)),
            &["chr1", "chr2"]
        );
        assert_eq!(
            layout.chromosomes_in(AbsSpan::new(0, 10_000)),
            &["chr1", "chr2", "chr3"]
        );
        assert_eq!(layout.chromosomes_in(AbsSpan::new(3200, 3400)), &["chr3"]);
        assert!(layout.chromosomes_in(AbsSpan::new(5000, 6000)).is_empty());
    }

    #[test]
    fn test_tile_spans_partition_the_axis() {
        let layout = layout();
        // Zoom 0 is the whole axis.
        assert_eq!(layout.tile_span(TileId::new(0, 0)), AbsSpan::new(0, 3500));

        // Zoom 2: four tiles of 875.
        let spans: Vec<_> = (0..4)
            .map(|i| layout.tile_span(TileId::new(2, i)))
            .collect();
        assert_eq!(spans[0].start, 0);
        assert_eq!(spans[3].end, 3500);
        for pair in spans.windows(2) {
            assert!(pair[0].end >= pair[1].start);
        }
    }

    #[test]
    fn test_tile_range_span() {
        let layout = layout();
        let span = layout.tile_range_span(2, 1, 2);
        assert_eq!(span.start, 875);
        assert_eq!(span.end, 2625);
    }

    #[test]
    fn test_tile_span_survives_out_of_range_zoom() {
        // A bogus host tile id far beyond max_zoom yields a degenerate but
        // valid span instead of panicking.
        let layout = layout();
        let span = layout.tile_span(TileId::new(200, 0));
        assert_eq!(span.start, 0);
        assert!(span.end <= layout.total_length());

        let span = layout.tile_span(TileId::new(64, 3));
        assert!(span.start <= span.end);
    }

    #[test]
    fn test_max_zoom() {
        let layout = GenomeLayout::new([("chr1".to_string(), 8 * TILE_BASE_SIZE)]);
        assert_eq!(layout.max_zoom(), 3);
        let small = GenomeLayout::new([("chr1".to_string(), 100)]);
        assert_eq!(small.max_zoom(), 0);
    }

    #[test]
    fn test_span_intersects() {
        let span = AbsSpan::new(100, 200);
        assert!(span.intersects(150, 160));
        assert!(span.intersects(50, 100));
        assert!(span.intersects(200, 300));
        assert!(!span.intersects(201, 300));
        assert!(!span.intersects(0, 99));
    }
}
