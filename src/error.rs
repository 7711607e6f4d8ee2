//! Error handling types and utilities.

/// A specialized Result type for symsearch operations.
///
/// This is an alias for `anyhow::Result`, used at the corpus-loading boundary
/// where context is added via `.context()` / `.with_context()`.
pub type Result<T> = anyhow::Result<T>;

/// Error returned when decoding a raw corpus into a search index fails.
///
/// Corpora are trusted to be well-formed relative to the documented encoding;
/// a structurally invalid corpus is a precondition violation and the builder
/// fails fast rather than emitting records with corrupt ids.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CorpusError {
    /// A kind tag outside the `'A'..` range of the kind enumeration.
    #[error("unit '{unit}': unknown kind tag '{tag}' for item {item}")]
    UnknownKindTag { unit: String, item: usize, tag: char },

    /// A path-table entry carrying a kind discriminant outside the enumeration.
    #[error("unit '{unit}': unknown kind {kind} in path table entry {entry}")]
    BadPathKind {
        unit: String,
        entry: usize,
        kind: usize,
    },

    /// A parent reference pointing past the end of the unit's path table.
    #[error("unit '{unit}': parent reference {reference} out of range for item {item}")]
    ParentOutOfRange {
        unit: String,
        item: usize,
        reference: usize,
    },

    /// A signature path id pointing past the end of the unit's path table.
    #[error("unit '{unit}': signature path id {id} out of range for item {item}")]
    TypePathOutOfRange {
        unit: String,
        item: usize,
        id: usize,
    },

    /// An alias entry referring to an item index the unit does not have.
    #[error("unit '{unit}': alias '{alias}' targets missing item {target}")]
    AliasOutOfRange {
        unit: String,
        alias: String,
        target: usize,
    },
}
