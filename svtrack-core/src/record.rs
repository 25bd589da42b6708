//! Raw variant-call records, one tagged variant per data-source convention.
//!
//! The upstream fetcher parses indexed VCF lines into these shapes; the
//! normalizer in [`crate::normalize`] turns them into canonical
//! [`crate::types::Segment`]s. Each variant carries exactly the annotations
//! its convention defines, so missing-field handling is explicit per source.

use crate::types::GenomicPos;
use serde::{Deserialize, Serialize};

/// One sample column of a record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SampleCall {
    pub name: String,
    /// GT field, e.g. "0/1".
    pub genotype: String,
}

impl SampleCall {
    pub fn new(name: impl Into<String>, genotype: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            genotype: genotype.into(),
        }
    }
}

/// Raw variant record tagged with its data-source convention.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum RawRecord {
    Generic(GenericRecord),
    PopulationDb(PopulationRecord),
    MultiCaller(MultiCallerRecord),
    SampleSv(SampleSvRecord),
    CopyNumber(CopyNumberRecord),
}

impl RawRecord {
    pub fn id(&self) -> &str {
        match self {
            RawRecord::Generic(r) => &r.id,
            RawRecord::PopulationDb(r) => &r.id,
            RawRecord::MultiCaller(r) => &r.id,
            RawRecord::SampleSv(r) => &r.id,
            RawRecord::CopyNumber(r) => &r.id,
        }
    }

    pub fn alt_count(&self) -> usize {
        match self {
            RawRecord::Generic(r) => r.alts.len(),
            RawRecord::PopulationDb(r) => r.alts.len(),
            RawRecord::MultiCaller(r) => r.alts.len(),
            RawRecord::SampleSv(r) => r.alts.len(),
            RawRecord::CopyNumber(r) => r.alts.len(),
        }
    }
}

/// Minimal fallback convention: position + END + optional SVLEN.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenericRecord {
    pub id: String,
    pub alts: Vec<String>,
    /// SVTYPE code, e.g. "DEL".
    pub sv_type: String,
    pub pos: GenomicPos,
    #[serde(default)]
    pub end: Option<GenomicPos>,
    #[serde(default)]
    pub sv_len: Option<i64>,
    #[serde(default)]
    pub samples: Vec<SampleCall>,
}

/// Population-database convention (gnomAD-style): AF/AC/AN, no samples.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PopulationRecord {
    pub id: String,
    pub alts: Vec<String>,
    pub sv_type: String,
    pub pos: GenomicPos,
    #[serde(default)]
    pub end: Option<GenomicPos>,
    #[serde(default)]
    pub sv_len: Option<i64>,
    #[serde(default)]
    pub allele_frequency: Option<f64>,
    #[serde(default)]
    pub allele_count: Option<u64>,
    #[serde(default)]
    pub allele_number: Option<u64>,
    #[serde(default)]
    pub filter_status: Option<String>,
}

/// Multi-caller merge convention (parliament2-style).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MultiCallerRecord {
    pub id: String,
    pub alts: Vec<String>,
    pub sv_type: String,
    pub pos: GenomicPos,
    #[serde(default)]
    pub end: Option<GenomicPos>,
    /// Partner chromosome of the END coordinate.
    #[serde(default)]
    pub chr2: Option<String>,
    /// Average length reported by the merger; used when END lives on another
    /// chromosome and for zero-length insertions.
    #[serde(default)]
    pub avg_len: Option<i64>,
    /// CALLERS annotation; None means the call is caller-agnostic (e.g.
    /// genotyper-confirmed).
    #[serde(default)]
    pub callers: Option<Vec<String>>,
    /// SUPP annotation, number of supporting callers.
    #[serde(default)]
    pub support: Option<u32>,
    /// SUPP_VEC annotation, vector of supporting samples.
    #[serde(default)]
    pub support_vector: Option<String>,
    #[serde(default)]
    pub confidence_interval_pos: Option<String>,
    #[serde(default)]
    pub confidence_interval_end: Option<String>,
    #[serde(default)]
    pub filter_status: Option<String>,
    #[serde(default)]
    pub samples: Vec<SampleCall>,
}

/// Single-sample SV convention with caller flags and gnomAD presence checks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SampleSvRecord {
    pub id: String,
    pub alts: Vec<String>,
    pub sv_type: String,
    pub pos: GenomicPos,
    #[serde(default)]
    pub end: Option<GenomicPos>,
    #[serde(default)]
    pub sv_len: Option<i64>,
    #[serde(default)]
    pub callers: Option<Vec<String>>,
    #[serde(default)]
    pub filter_status: Option<String>,
    #[serde(default)]
    pub samples: Vec<SampleCall>,
    /// gnomAD presence annotations, display-only for this source.
    #[serde(default)]
    pub gnomad_allele_frequency: Option<f64>,
    #[serde(default)]
    pub gnomad_allele_count: Option<u64>,
    #[serde(default)]
    pub gnomad_allele_number: Option<u64>,
    /// Occurrences in the 20-unrelated-individuals panel.
    #[serde(default)]
    pub unrelated_count: Option<u32>,
}

/// Copy-number convention with read-depth evidence statistics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CopyNumberRecord {
    pub id: String,
    pub alts: Vec<String>,
    pub sv_type: String,
    pub pos: GenomicPos,
    #[serde(default)]
    pub end: Option<GenomicPos>,
    #[serde(default)]
    pub filter_status: Option<String>,
    #[serde(default)]
    pub samples: Vec<SampleCall>,
    #[serde(default)]
    pub observed_reads: Option<u64>,
    #[serde(default)]
    pub expected_reads: Option<u64>,
    #[serde(default)]
    pub copy_ratio_log2: Option<f64>,
    #[serde(default)]
    pub p_value: Option<f64>,
}
