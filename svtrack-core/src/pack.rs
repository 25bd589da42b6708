//! Greedy first-fit row packing for display segments.
//!
//! Each eligible segment gets the lowest row whose occupied envelope leaves
//! room for its padded span. A row's envelope is the running union of every
//! span placed in it; gaps inside the envelope are deliberately never
//! reused, which keeps previously assigned rows stable when new segments
//! are appended.

use crate::types::{Filter, GenomicPos, Segment, SourceProfile};

/// Fixed coordinate margin around a segment for all overlap tests, so
/// touching rectangles never share a row.
pub const ROW_PADDING: u64 = 5;

/// Occupied span of one row, in padded genome-absolute coordinates.
/// Exists only for the duration of a packing pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct RowEnvelope {
    from: GenomicPos,
    to: GenomicPos,
}

/// Assigns display rows to segments under a filter.
#[derive(Debug, Default)]
pub struct RowPacker;

impl RowPacker {
    pub fn new() -> Self {
        Self
    }

    /// Assign a row to every unassigned segment that passes `filter`.
    ///
    /// Only segments with `row == None` are considered, so repeated calls
    /// place newly appended segments without disturbing earlier
    /// assignments. Fully deterministic for a fixed candidate set, filter,
    /// and input order. Infallible: a new row is always created as a last
    /// resort.
    pub fn assign_rows(&self, segments: &mut [Segment], filter: &Filter) {
        let mut rows: Vec<RowEnvelope> = Vec::new();

        let mut candidates: Vec<usize> = segments
            .iter()
            .enumerate()
            .filter(|(_, s)| s.row.is_none() && Self::passes(s, filter))
            .map(|(i, _)| i)
            .collect();
        // Stable: ties keep original record order for determinism.
        candidates.sort_by_key(|&i| segments[i].from);

        for i in candidates {
            Self::place(&mut segments[i], &mut rows);
        }
    }

    /// Clear all row assignments, required before repacking whenever the
    /// segment set identity or the filter changes.
    pub fn reset_rows(&self, segments: &mut [Segment]) {
        for segment in segments.iter_mut() {
            segment.row = None;
        }
    }

    fn passes(segment: &Segment, filter: &Filter) -> bool {
        if !filter.type_enabled(segment.sv_type) || !filter.length_ok(segment.span_length()) {
            return false;
        }
        match filter.profile {
            SourceProfile::MultiCaller => {
                // Unannotated calls are caller-agnostic confirmations and
                // always pass the caller check.
                let caller_ok = match &segment.caller_flags {
                    Some(flags) => flags.intersects(&filter.callers),
                    None => true,
                };
                caller_ok && segment.support_count >= filter.min_support
            }
            _ => true,
        }
    }

    fn place(segment: &mut Segment, rows: &mut Vec<RowEnvelope>) {
        let padded_from = segment.from.saturating_sub(ROW_PADDING);
        let padded_to = segment.to + ROW_PADDING;

        for (i, envelope) in rows.iter_mut().enumerate() {
            if padded_to < envelope.from {
                segment.row = Some(i as u32);
                envelope.from = padded_from;
                return;
            } else if padded_from > envelope.to {
                segment.row = Some(i as u32);
                envelope.to = padded_to;
                return;
            }
        }

        segment.row = Some(rows.len() as u32);
        rows.push(RowEnvelope {
            from: padded_from,
            to: padded_to,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{CallerSet, Segment, SvType};

    fn seg(id: &str, from: u64, to: u64) -> Segment {
        Segment::new(id, SvType::Deletion, from, to)
    }

    fn default_filter() -> Filter {
        Filter::new(SourceProfile::Generic)
    }

    #[test]
    fn test_overlapping_segments_split_rows() {
        // B starts inside A's padded span; C clears both (300 > 205 and
        // 300 > 255).
        let mut segments = vec![
            seg("A", 100, 200),
            seg("B", 150, 250),
            seg("C", 300, 400),
        ];
        RowPacker::new().assign_rows(&mut segments, &default_filter());
        assert_eq!(segments[0].row, Some(0));
        assert_eq!(segments[1].row, Some(1));
        assert_eq!(segments[2].row, Some(0));
    }

    #[test]
    fn test_padding_prevents_touching_rectangles() {
        // Gap of 5 is not enough: 205 is not > 205.
        let mut segments = vec![seg("A", 100, 200), seg("B", 205, 300)];
        RowPacker::new().assign_rows(&mut segments, &default_filter());
        assert_eq!(segments[0].row, Some(0));
        assert_eq!(segments[1].row, Some(1));

        // Gap of 11 clears both paddings.
        let mut segments = vec![seg("A", 100, 200), seg("B", 211, 300)];
        RowPacker::new().assign_rows(&mut segments, &default_filter());
        assert_eq!(segments[1].row, Some(0));
    }

    #[test]
    fn test_row_envelopes_are_per_pass() {
        // Distant segments share row 0; the row's envelope becomes their
        // union for the rest of the pass.
        let mut segments = vec![seg("A", 100, 200), seg("X", 995, 1105)];
        let packer = RowPacker::new();
        let filter = default_filter();
        packer.assign_rows(&mut segments, &filter);
        assert_eq!(segments[0].row, Some(0));
        assert_eq!(segments[1].row, Some(0));

        // A later pass starts from empty envelopes, so an appended segment
        // may land in row 0's old interior gap.
        segments.push(seg("Y", 500, 600));
        packer.assign_rows(&mut segments, &filter);
        assert_eq!(segments[2].row, Some(0));
    }

    #[test]
    fn test_non_overlap_within_rows() {
        // Deterministic pseudo-random set, then verify the invariant.
        let mut state: u64 = 0x2545_f491_4f6c_dd1d;
        let mut rng = move || {
            state ^= state << 13;
            state ^= state >> 7;
            state ^= state << 17;
            state
        };
        let mut segments: Vec<Segment> = (0..300)
            .map(|i| {
                let from = rng() % 100_000;
                let len = 1 + rng() % 5_000;
                seg(&format!("s{}", i), from, from + len)
            })
            .collect();
        RowPacker::new().assign_rows(&mut segments, &default_filter());

        for a in &segments {
            for b in &segments {
                if a.id == b.id || a.row != b.row {
                    continue;
                }
                assert!(a.row.is_some());
                let a_from = a.from.saturating_sub(ROW_PADDING);
                let a_to = a.to + ROW_PADDING;
                let b_from = b.from.saturating_sub(ROW_PADDING);
                let b_to = b.to + ROW_PADDING;
                assert!(
                    a_to < b_from || b_to < a_from,
                    "segments {} and {} overlap in row {:?}",
                    a.id,
                    b.id,
                    a.row
                );
            }
        }
    }

    #[test]
    fn test_packing_is_deterministic() {
        let mut first: Vec<Segment> = (0..50)
            .map(|i| seg(&format!("s{}", i), (i * 37) % 1000, (i * 37) % 1000 + 100))
            .collect();
        let mut second = first.clone();
        let packer = RowPacker::new();
        let filter = default_filter();

        packer.assign_rows(&mut first, &filter);
        packer.assign_rows(&mut second, &filter);
        let rows_a: Vec<_> = first.iter().map(|s| s.row).collect();
        let rows_b: Vec<_> = second.iter().map(|s| s.row).collect();
        assert_eq!(rows_a, rows_b);

        // Reset and repack reproduces the same assignment.
        packer.reset_rows(&mut first);
        assert!(first.iter().all(|s| s.row.is_none()));
        packer.assign_rows(&mut first, &filter);
        let rows_c: Vec<_> = first.iter().map(|s| s.row).collect();
        assert_eq!(rows_a, rows_c);
    }

    #[test]
    fn test_filter_relaxation_is_monotonic() {
        let mut segments: Vec<Segment> = (0..40)
            .map(|i| {
                let mut s = seg(&format!("s{}", i), i * 50, i * 50 + 10 + i * 20);
                if i % 2 == 0 {
                    s.sv_type = SvType::Duplication;
                }
                s
            })
            .collect();

        let mut narrow = default_filter();
        narrow.min_length = 200;
        narrow.show_duplications = false;
        let packer = RowPacker::new();
        packer.assign_rows(&mut segments, &narrow);
        let narrow_count = segments.iter().filter(|s| s.row.is_some()).count();

        packer.reset_rows(&mut segments);
        let wide = default_filter();
        packer.assign_rows(&mut segments, &wide);
        let wide_count = segments.iter().filter(|s| s.row.is_some()).count();

        assert!(wide_count >= narrow_count);
    }

    #[test]
    fn test_min_support_applies_to_unannotated_calls() {
        // No caller annotation passes the caller check, but the support
        // threshold still excludes it.
        let mut segments = vec![seg("u", 100, 300)];
        assert!(segments[0].caller_flags.is_none());
        assert_eq!(segments[0].support_count, 1);

        let mut filter = Filter::new(SourceProfile::MultiCaller);
        filter.min_support = 2;
        RowPacker::new().assign_rows(&mut segments, &filter);
        assert_eq!(segments[0].row, None);

        filter.min_support = 1;
        RowPacker::new().assign_rows(&mut segments, &filter);
        assert_eq!(segments[0].row, Some(0));
    }

    #[test]
    fn test_caller_toggles_for_multi_caller_profile() {
        let mut s = seg("c", 100, 300);
        s.caller_flags = Some(CallerSet::from_annotations(&["DELLY"]));
        s.support_count = 1;
        let mut segments = vec![s];

        let mut filter = Filter::new(SourceProfile::MultiCaller);
        filter.callers.delly = false;
        RowPacker::new().assign_rows(&mut segments, &filter);
        assert_eq!(segments[0].row, None);

        filter.callers.delly = true;
        RowPacker::new().assign_rows(&mut segments, &filter);
        assert_eq!(segments[0].row, Some(0));
    }

    #[test]
    fn test_caller_flags_ignored_for_other_profiles() {
        let mut s = seg("c", 100, 300);
        s.caller_flags = Some(CallerSet::from_annotations(&["DELLY"]));
        let mut segments = vec![s];

        let mut filter = Filter::new(SourceProfile::PopulationDb);
        filter.callers.delly = false;
        filter.min_support = 5;
        RowPacker::new().assign_rows(&mut segments, &filter);
        assert_eq!(segments[0].row, Some(0));
    }

    #[test]
    fn test_translocations_never_get_a_row() {
        let mut segments = vec![Segment::new("t", SvType::Translocation, 100, 300)];
        RowPacker::new().assign_rows(&mut segments, &default_filter());
        assert_eq!(segments[0].row, None);
    }

    #[test]
    fn test_assigned_rows_survive_incremental_packing() {
        let mut segments = vec![seg("A", 100, 200)];
        let packer = RowPacker::new();
        let filter = default_filter();
        packer.assign_rows(&mut segments, &filter);
        assert_eq!(segments[0].row, Some(0));

        // A newly loaded chromosome appends segments; A keeps its row.
        segments.push(seg("B", 150, 250));
        packer.assign_rows(&mut segments, &filter);
        assert_eq!(segments[0].row, Some(0));
        assert!(segments[1].row.is_some());
    }
}
