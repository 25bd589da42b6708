use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Genome-absolute position on the concatenated chromosome axis.
pub type GenomicPos = u64;

/// Structural-variant class of a call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SvType {
    Deletion,
    Duplication,
    Insertion,
    Inversion,
    Translocation,
}

impl SvType {
    /// Parse the VCF SVTYPE code.
    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "DEL" => Some(SvType::Deletion),
            "DUP" => Some(SvType::Duplication),
            "INS" => Some(SvType::Insertion),
            "INV" => Some(SvType::Inversion),
            "BND" => Some(SvType::Translocation),
            _ => None,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            SvType::Deletion => "DEL",
            SvType::Duplication => "DUP",
            SvType::Insertion => "INS",
            SvType::Inversion => "INV",
            SvType::Translocation => "BND",
        }
    }
}

impl fmt::Display for SvType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SvType::Deletion => write!(f, "Deletion"),
            SvType::Duplication => write!(f, "Duplication"),
            SvType::Insertion => write!(f, "Insertion"),
            SvType::Inversion => write!(f, "Inversion"),
            SvType::Translocation => write!(f, "Translocation"),
        }
    }
}

/// SV callers tracked by multi-caller sources.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Caller {
    Delly,
    Lumpy,
    Breakdancer,
    Cnvnator,
    Breakseq2,
    Manta,
}

impl Caller {
    pub const ALL: [Caller; 6] = [
        Caller::Delly,
        Caller::Lumpy,
        Caller::Breakdancer,
        Caller::Cnvnator,
        Caller::Breakseq2,
        Caller::Manta,
    ];

    /// Does an INFO CALLERS entry name this caller?
    pub fn matches_annotation(&self, annotation: &str) -> bool {
        annotation.eq_ignore_ascii_case(self.name())
    }

    pub fn name(&self) -> &'static str {
        match self {
            Caller::Delly => "DELLY",
            Caller::Lumpy => "LUMPY",
            Caller::Breakdancer => "BREAKDANCER",
            Caller::Cnvnator => "CNVNATOR",
            Caller::Breakseq2 => "BREAKSEQ2",
            Caller::Manta => "MANTA",
        }
    }
}

impl fmt::Display for Caller {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Per-caller boolean set. Doubles as a segment's caller flags and as the
/// filter's per-caller toggles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallerSet {
    pub delly: bool,
    pub lumpy: bool,
    pub breakdancer: bool,
    pub cnvnator: bool,
    pub breakseq2: bool,
    pub manta: bool,
}

impl CallerSet {
    pub fn none() -> Self {
        Self {
            delly: false,
            lumpy: false,
            breakdancer: false,
            cnvnator: false,
            breakseq2: false,
            manta: false,
        }
    }

    pub fn all() -> Self {
        Self {
            delly: true,
            lumpy: true,
            breakdancer: true,
            cnvnator: true,
            breakseq2: true,
            manta: true,
        }
    }

    /// Derive flags from an INFO CALLERS annotation list.
    pub fn from_annotations<S: AsRef<str>>(annotations: &[S]) -> Self {
        let mut set = Self::none();
        for annotation in annotations {
            for caller in Caller::ALL {
                if caller.matches_annotation(annotation.as_ref()) {
                    set.set(caller, true);
                }
            }
        }
        set
    }

    pub fn get(&self, caller: Caller) -> bool {
        match caller {
            Caller::Delly => self.delly,
            Caller::Lumpy => self.lumpy,
            Caller::Breakdancer => self.breakdancer,
            Caller::Cnvnator => self.cnvnator,
            Caller::Breakseq2 => self.breakseq2,
            Caller::Manta => self.manta,
        }
    }

    pub fn set(&mut self, caller: Caller, value: bool) {
        match caller {
            Caller::Delly => self.delly = value,
            Caller::Lumpy => self.lumpy = value,
            Caller::Breakdancer => self.breakdancer = value,
            Caller::Cnvnator => self.cnvnator = value,
            Caller::Breakseq2 => self.breakseq2 = value,
            Caller::Manta => self.manta = value,
        }
    }

    /// True if any caller set in `self` is also enabled in `enabled`.
    pub fn intersects(&self, enabled: &CallerSet) -> bool {
        Caller::ALL
            .iter()
            .any(|&c| self.get(c) && enabled.get(c))
    }

    pub fn count(&self) -> u32 {
        Caller::ALL.iter().filter(|&&c| self.get(c)).count() as u32
    }
}

impl Default for CallerSet {
    fn default() -> Self {
        Self::all()
    }
}

/// The five source-specific record conventions the normalizer understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SourceProfile {
    /// Minimal fallback: position + end + optional length.
    Generic,
    /// Population database (gnomAD-style) with AF/AC/AN annotations.
    PopulationDb,
    /// Multi-caller merge (parliament2-style) with CALLERS/SUPP annotations.
    MultiCaller,
    /// Single-sample SV calls with caller flags and gnomAD presence checks.
    SampleSv,
    /// Copy-number calls with read-depth evidence statistics.
    CopyNumber,
}

impl fmt::Display for SourceProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SourceProfile::Generic => "generic",
            SourceProfile::PopulationDb => "population-db",
            SourceProfile::MultiCaller => "multi-caller",
            SourceProfile::SampleSv => "sample-sv",
            SourceProfile::CopyNumber => "copy-number",
        };
        write!(f, "{}", name)
    }
}

/// Which sample of a multi-sample record supplies the genotype.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SampleSelector {
    First,
    Named(String),
}

/// Canonical in-memory representation of one structural-variant call.
///
/// Created once per raw record by the normalizer and kept for the session.
/// `row` is the only field mutated after creation, and only by the row
/// packer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    pub id: String,
    pub sv_type: SvType,
    /// Genome-absolute start.
    pub from: GenomicPos,
    /// Genome-absolute end; `to >= from` except for malformed input.
    pub to: GenomicPos,
    /// Chromosome-relative start label, `chrom:pos`.
    pub from_display: String,
    /// Chromosome-relative end label.
    pub to_display: String,
    /// Absolute variant length.
    pub length_abs: u64,
    pub genotype: String,
    /// VCF FILTER field; None when the source does not track it.
    pub filter_status: Option<String>,
    /// None means the source carries no caller annotation; the packer treats
    /// such calls as passing caller filtering unconditionally.
    pub caller_flags: Option<CallerSet>,
    /// Number of callers corroborating the call; 1 when caller tracking is
    /// absent.
    pub support_count: u32,
    pub allele_frequency: Option<f64>,
    pub allele_count: Option<u64>,
    pub allele_number: Option<u64>,
    /// Source-specific display-only fields (evidence statistics, confidence
    /// intervals). Never consulted by packing or geometry.
    pub aux_info: HashMap<String, String>,
    /// Display row; None until assigned, or while excluded by the filter.
    pub row: Option<u32>,
}

impl Segment {
    pub fn new(id: impl Into<String>, sv_type: SvType, from: GenomicPos, to: GenomicPos) -> Self {
        Self {
            id: id.into(),
            sv_type,
            from,
            to,
            from_display: "-".to_string(),
            to_display: "-".to_string(),
            length_abs: to.saturating_sub(from),
            genotype: "-".to_string(),
            filter_status: None,
            caller_flags: None,
            support_count: 1,
            allele_frequency: None,
            allele_count: None,
            allele_number: None,
            aux_info: HashMap::new(),
            row: None,
        }
    }

    pub fn with_caller_flags(mut self, flags: CallerSet, support: u32) -> Self {
        self.caller_flags = Some(flags);
        self.support_count = support;
        self
    }

    pub fn with_genotype(mut self, genotype: impl Into<String>) -> Self {
        self.genotype = genotype.into();
        self
    }

    /// Displayed span length on the absolute axis.
    pub fn span_length(&self) -> u64 {
        self.to.saturating_sub(self.from)
    }
}

/// Immutable filter parameters for one packing pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Filter {
    pub min_length: u64,
    pub max_length: u64,
    pub show_deletions: bool,
    pub show_duplications: bool,
    pub show_insertions: bool,
    pub show_inversions: bool,
    pub callers: CallerSet,
    pub min_support: u32,
    pub profile: SourceProfile,
}

impl Filter {
    pub fn new(profile: SourceProfile) -> Self {
        Self {
            min_length: 1,
            max_length: u64::MAX,
            show_deletions: true,
            show_duplications: true,
            show_insertions: true,
            show_inversions: true,
            callers: CallerSet::all(),
            min_support: 1,
            profile,
        }
    }

    /// Type toggles only exist for the four interval-like classes;
    /// translocations never receive a row.
    pub fn type_enabled(&self, sv_type: SvType) -> bool {
        match sv_type {
            SvType::Deletion => self.show_deletions,
            SvType::Duplication => self.show_duplications,
            SvType::Insertion => self.show_insertions,
            SvType::Inversion => self.show_inversions,
            SvType::Translocation => false,
        }
    }

    pub fn length_ok(&self, span_length: u64) -> bool {
        span_length >= self.min_length && span_length <= self.max_length
    }
}
