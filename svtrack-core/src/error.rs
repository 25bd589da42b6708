//! Error taxonomy for segment normalization.
//!
//! Every condition here is recovered locally by skipping the offending
//! record; none aborts a chromosome batch.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum NormalizeError {
    /// The record lacks a field its declared profile requires.
    #[error("record {id}: missing required field {field}")]
    SchemaMismatch { id: String, field: &'static str },

    /// A named sample was requested but is absent from the record.
    #[error("sample {sample} not present in record {id}")]
    SampleNotFound { id: String, sample: String },

    /// The profile excludes this variant kind (e.g. insertions under the
    /// copy-number conventions).
    #[error("record {id}: {kind} calls are not supported by the {profile} profile")]
    UnsupportedVariantKind {
        id: String,
        kind: String,
        profile: &'static str,
    },
}

pub type NormalizeResult<T> = Result<T, NormalizeError>;
