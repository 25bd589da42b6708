//! Segment normalization: one raw record in, zero or one canonical
//! [`Segment`] out.
//!
//! Each data-source convention gets its own normalization function,
//! dispatched by pattern match on [`RawRecord`]. Records that fail their
//! profile's schema are reported as [`NormalizeError`]s; the batch helper
//! logs and skips them so a bad record never aborts a chromosome load.

use crate::error::{NormalizeError, NormalizeResult};
use crate::record::*;
use crate::types::*;
use rayon::prelude::*;
use std::sync::atomic::{AtomicBool, Ordering};

/// Normalize one raw record into at most one segment.
///
/// `chrom_offset` is the cumulative absolute offset of `chrom` on the
/// concatenated genome axis. Returns `Ok(None)` for records that are valid
/// but yield nothing for this sample (no ALT allele, homozygous-reference
/// genotype, excluded translocations).
pub fn normalize(
    record: &RawRecord,
    chrom: &str,
    chrom_offset: GenomicPos,
    selector: &SampleSelector,
) -> NormalizeResult<Option<Segment>> {
    // Records without a single ALT allele are not calls; skipping them is
    // not an error.
    if record.alt_count() == 0 {
        return Ok(None);
    }

    match record {
        RawRecord::Generic(r) => normalize_generic(r, chrom, chrom_offset),
        RawRecord::PopulationDb(r) => normalize_population(r, chrom, chrom_offset),
        RawRecord::MultiCaller(r) => normalize_multi_caller(r, chrom, chrom_offset, selector),
        RawRecord::SampleSv(r) => normalize_sample_sv(r, chrom, chrom_offset, selector),
        RawRecord::CopyNumber(r) => normalize_copy_number(r, chrom, chrom_offset, selector),
    }
}

/// Normalize a whole chromosome's records, preserving file order.
///
/// Failed records are logged and skipped. A missing named sample is logged
/// once per batch; it typically repeats for every record of the file.
pub fn normalize_batch(
    records: &[RawRecord],
    chrom: &str,
    chrom_offset: GenomicPos,
    selector: &SampleSelector,
) -> Vec<Segment> {
    let missing_sample_logged = AtomicBool::new(false);

    records
        .par_iter()
        .filter_map(|record| match normalize(record, chrom, chrom_offset, selector) {
            Ok(segment) => segment,
            Err(err @ NormalizeError::SampleNotFound { .. }) => {
                if !missing_sample_logged.swap(true, Ordering::Relaxed) {
                    log::warn!("{}: {}", chrom, err);
                }
                None
            }
            Err(err) => {
                log::warn!("{}: skipping record: {}", chrom, err);
                None
            }
        })
        .collect()
}

fn parse_sv_type(code: &str, id: &str) -> NormalizeResult<SvType> {
    SvType::from_code(code).ok_or_else(|| NormalizeError::SchemaMismatch {
        id: id.to_string(),
        field: "SVTYPE",
    })
}

fn require<T>(value: Option<T>, id: &str, field: &'static str) -> NormalizeResult<T> {
    value.ok_or_else(|| NormalizeError::SchemaMismatch {
        id: id.to_string(),
        field,
    })
}

/// All called alleles are reference, e.g. "0/0", "0|0".
fn is_hom_ref(genotype: &str) -> bool {
    let mut tokens = genotype.split(['/', '|']).filter(|t| !t.is_empty());
    let mut any = false;
    for token in tokens.by_ref() {
        if token != "0" {
            return false;
        }
        any = true;
    }
    any
}

fn select_sample<'a>(
    samples: &'a [SampleCall],
    selector: &SampleSelector,
    id: &str,
) -> NormalizeResult<&'a SampleCall> {
    match selector {
        SampleSelector::First => require(samples.first(), id, "SAMPLES"),
        SampleSelector::Named(name) => samples
            .iter()
            .find(|s| &s.name == name)
            .ok_or_else(|| NormalizeError::SampleNotFound {
                id: id.to_string(),
                sample: name.clone(),
            }),
    }
}

fn display_pos(chrom: &str, pos: GenomicPos) -> String {
    format!("{}:{}", chrom, pos)
}

fn normalize_generic(
    r: &GenericRecord,
    chrom: &str,
    chrom_offset: GenomicPos,
) -> NormalizeResult<Option<Segment>> {
    let sv_type = parse_sv_type(&r.sv_type, &r.id)?;
    let len_abs = r.sv_len.map(i64::unsigned_abs);

    // END is the authoritative end when present; otherwise the reported
    // length stands in. Zero-length insertions get a displayed end.
    let to_rel = match (r.end, len_abs) {
        (Some(end), Some(len)) if sv_type == SvType::Insertion && end == r.pos => r.pos + len,
        (Some(end), _) => end,
        (None, Some(len)) => r.pos + len,
        (None, None) => {
            return Err(NormalizeError::SchemaMismatch {
                id: r.id.clone(),
                field: "END",
            })
        }
    };

    let genotype = r
        .samples
        .first()
        .map(|s| s.genotype.clone())
        .unwrap_or_else(|| "-".to_string());

    let mut segment = Segment::new(&r.id, sv_type, r.pos + chrom_offset, to_rel + chrom_offset);
    segment.from_display = display_pos(chrom, r.pos);
    segment.to_display = display_pos(chrom, to_rel);
    segment.length_abs = len_abs.unwrap_or_else(|| to_rel.saturating_sub(r.pos));
    segment.genotype = genotype;
    Ok(Some(segment))
}

fn normalize_population(
    r: &PopulationRecord,
    chrom: &str,
    chrom_offset: GenomicPos,
) -> NormalizeResult<Option<Segment>> {
    // Translocation entries are retained here: the source is display-only
    // and carries no breakend partner to resolve.
    let sv_type = parse_sv_type(&r.sv_type, &r.id)?;
    let end = require(r.end, &r.id, "END")?;
    let len_abs = r
        .sv_len
        .map(i64::unsigned_abs)
        .unwrap_or_else(|| end.saturating_sub(r.pos));

    // Insertions are stored as zero-length intervals; display them at their
    // reported length.
    let to_rel = if sv_type == SvType::Insertion {
        r.pos + len_abs
    } else {
        end
    };

    let mut segment = Segment::new(&r.id, sv_type, r.pos + chrom_offset, to_rel + chrom_offset);
    segment.from_display = display_pos(chrom, r.pos);
    segment.to_display = display_pos(chrom, to_rel);
    segment.length_abs = len_abs;
    segment.filter_status = r.filter_status.clone();
    segment.allele_frequency = r.allele_frequency;
    segment.allele_count = r.allele_count;
    segment.allele_number = r.allele_number;
    Ok(Some(segment))
}

fn normalize_multi_caller(
    r: &MultiCallerRecord,
    chrom: &str,
    chrom_offset: GenomicPos,
    selector: &SampleSelector,
) -> NormalizeResult<Option<Segment>> {
    // No breakend rendering for the multi-caller source.
    if r.sv_type == "BND" {
        log::debug!("{}: dropping translocation record", r.id);
        return Ok(None);
    }
    let sv_type = parse_sv_type(&r.sv_type, &r.id)?;

    let sample = select_sample(&r.samples, selector, &r.id)?;
    if is_hom_ref(&sample.genotype) {
        return Ok(None);
    }

    // END is chromosome-relative and only usable when it lives on this
    // chromosome; otherwise fall back to the merger's average length.
    let same_chrom = r.chr2.as_deref().map_or(true, |c| c == chrom);
    let to_rel = if same_chrom {
        require(r.end, &r.id, "END")?
    } else {
        r.pos + require(r.avg_len, &r.id, "AVGLEN")?.unsigned_abs()
    };

    let to_display = match (&r.chr2, r.end) {
        (Some(chr2), Some(end)) => display_pos(chr2, end),
        _ => display_pos(chrom, to_rel),
    };

    let (caller_flags, support_count) = match &r.callers {
        Some(callers) => {
            let flags = CallerSet::from_annotations(callers);
            (Some(flags), r.support.unwrap_or_else(|| flags.count().max(1)))
        }
        None => (None, r.support.unwrap_or(1)),
    };

    let mut segment = Segment::new(&r.id, sv_type, r.pos + chrom_offset, to_rel + chrom_offset);
    segment.from_display = display_pos(chrom, r.pos);
    segment.to_display = to_display;
    segment.length_abs = r
        .avg_len
        .map(i64::unsigned_abs)
        .unwrap_or_else(|| to_rel.saturating_sub(r.pos));
    segment.genotype = sample.genotype.clone();
    segment.filter_status = r.filter_status.clone();
    segment.caller_flags = caller_flags;
    segment.support_count = support_count;
    if let Some(cipos) = &r.confidence_interval_pos {
        segment.aux_info.insert("cipos".to_string(), cipos.clone());
    }
    if let Some(ciend) = &r.confidence_interval_end {
        segment.aux_info.insert("ciend".to_string(), ciend.clone());
    }
    if let Some(vec) = &r.support_vector {
        segment.aux_info.insert("supp_vec".to_string(), vec.clone());
    }
    Ok(Some(segment))
}

fn normalize_sample_sv(
    r: &SampleSvRecord,
    chrom: &str,
    chrom_offset: GenomicPos,
    selector: &SampleSelector,
) -> NormalizeResult<Option<Segment>> {
    if r.sv_type == "INS" {
        return Err(NormalizeError::UnsupportedVariantKind {
            id: r.id.clone(),
            kind: "insertion".to_string(),
            profile: "sample-sv",
        });
    }
    let sv_type = parse_sv_type(&r.sv_type, &r.id)?;

    let sample = select_sample(&r.samples, selector, &r.id)?;
    if is_hom_ref(&sample.genotype) {
        // Not a called variant for this sample.
        return Ok(None);
    }

    let end = require(r.end, &r.id, "END")?;

    let (caller_flags, support_count) = match &r.callers {
        Some(callers) => {
            let flags = CallerSet::from_annotations(callers);
            (Some(flags), flags.count().max(1))
        }
        None => (None, 1),
    };

    let mut segment = Segment::new(&r.id, sv_type, r.pos + chrom_offset, end + chrom_offset);
    segment.from_display = display_pos(chrom, r.pos);
    segment.to_display = display_pos(chrom, end);
    segment.length_abs = r
        .sv_len
        .map(i64::unsigned_abs)
        .unwrap_or_else(|| end.saturating_sub(r.pos));
    segment.genotype = sample.genotype.clone();
    segment.filter_status = r.filter_status.clone();
    segment.caller_flags = caller_flags;
    segment.support_count = support_count;

    // gnomAD presence annotations are display-only for this source.
    if let Some(af) = r.gnomad_allele_frequency {
        segment.aux_info.insert("gnomad_af".to_string(), af.to_string());
    }
    if let Some(ac) = r.gnomad_allele_count {
        segment.aux_info.insert("gnomad_ac".to_string(), ac.to_string());
    }
    if let Some(an) = r.gnomad_allele_number {
        segment.aux_info.insert("gnomad_an".to_string(), an.to_string());
    }
    if let Some(unrelated) = r.unrelated_count {
        segment
            .aux_info
            .insert("unrelated".to_string(), unrelated.to_string());
    }
    Ok(Some(segment))
}

fn normalize_copy_number(
    r: &CopyNumberRecord,
    chrom: &str,
    chrom_offset: GenomicPos,
    selector: &SampleSelector,
) -> NormalizeResult<Option<Segment>> {
    if r.sv_type == "INS" {
        return Err(NormalizeError::UnsupportedVariantKind {
            id: r.id.clone(),
            kind: "insertion".to_string(),
            profile: "copy-number",
        });
    }
    let sv_type = parse_sv_type(&r.sv_type, &r.id)?;

    let sample = select_sample(&r.samples, selector, &r.id)?;
    if is_hom_ref(&sample.genotype) {
        return Ok(None);
    }

    let end = require(r.end, &r.id, "END")?;

    let mut segment = Segment::new(&r.id, sv_type, r.pos + chrom_offset, end + chrom_offset);
    segment.from_display = display_pos(chrom, r.pos);
    segment.to_display = display_pos(chrom, end);
    segment.genotype = sample.genotype.clone();
    segment.filter_status = r.filter_status.clone();

    // Read-depth evidence travels as display text; missing values keep the
    // "-" sentinel so consumers need no special casing.
    let fmt_u64 = |v: Option<u64>| v.map(|x| x.to_string()).unwrap_or_else(|| "-".to_string());
    let fmt_f64 = |v: Option<f64>| v.map(|x| x.to_string()).unwrap_or_else(|| "-".to_string());
    segment
        .aux_info
        .insert("observed_reads".to_string(), fmt_u64(r.observed_reads));
    segment
        .aux_info
        .insert("expected_reads".to_string(), fmt_u64(r.expected_reads));
    segment
        .aux_info
        .insert("copy_ratio_log2".to_string(), fmt_f64(r.copy_ratio_log2));
    segment
        .aux_info
        .insert("p_value".to_string(), fmt_f64(r.p_value));
    Ok(Some(segment))
}
