/*!
 * Defines the [Error] and [Result] types shared by the codec, stores and loader.
*/

use thiserror::Error;

/// Which descriptor field changed between two records for the same `pmid`.
///
/// PCP distinguishes four codes here (`LOGCHANGETYPE`, `LOGCHANGESEM`,
/// `LOGCHANGEINDOM`, `LOGCHANGEUNITS`); they share the same payload shape and
/// recovery path, so they are carried as one [Error::DescriptorChanged]
/// variant parameterized over this enum instead of four near-identical
/// variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DescriptorField {
    /// The metric's value type changed.
    Type,
    /// The metric's semantics (counter, instant, discrete, ...) changed.
    Semantics,
    /// The metric's instance domain changed.
    Indom,
    /// The metric's units changed.
    Units,
}

impl std::fmt::Display for DescriptorField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            DescriptorField::Type => "type",
            DescriptorField::Semantics => "semantics",
            DescriptorField::Indom => "indom",
            DescriptorField::Units => "units",
        };
        f.write_str(s)
    }
}

/// Catalog error type.
#[derive(Error, Debug)]
pub enum Error {
    /// A record's framing or field sizes are malformed (short trailer,
    /// mismatched header/trailer length, label set exceeding
    /// [`crate::limits::DecodeLimits::max_label_json_len`], etc).
    #[error("malformed record: {0}")]
    MalformedRecord(String),

    /// A descriptor already present for `pmid` changed a field that must be
    /// invariant for the lifetime of the metric.
    #[error("metric {pmid} changed {field} across records")]
    DescriptorChanged {
        /// The metric whose descriptor conflicted.
        pmid: u32,
        /// Which field changed.
        field: DescriptorField,
    },

    /// No instance domain is registered under this id.
    #[error("instance domain {0} not found")]
    IndomNotFound(u32),

    /// The instance domain exists but has no snapshot at or before the
    /// requested timestamp, or no instance with the requested id/name.
    #[error("instance not found in indom {indom}")]
    InstanceNotFound {
        /// The instance domain searched.
        indom: u32,
    },

    /// No descriptor is registered under this metric id.
    #[error("metric {0} not found")]
    PmidNotFound(u32),

    /// No label set is registered for the given `(type, ident)` at or before
    /// the requested timestamp.
    #[error("no labels for type {label_type} ident {ident}")]
    NoLabels {
        /// The label type searched.
        label_type: u32,
        /// The identifier searched.
        ident: u32,
    },

    /// No text entry is registered for the given `(type, ident)`.
    #[error("no text for type {text_type} ident {ident}")]
    TextNotFound {
        /// The text type searched (oneline or help).
        text_type: u32,
        /// The identifier searched.
        ident: u32,
    },

    /// Propagated failure from the underlying archive file handle.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Catalog result type.
pub type Result<T> = std::result::Result<T, Error>;
