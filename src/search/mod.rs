//! The search core: corpus decoding, index construction, query parsing,
//! structural matching and ranking.
//!
//! A [`SearchIndex`] is built once from a [`RawCorpus`] and is immutable
//! afterwards; each call to [`exec_query`] is a pure function of the index
//! and a parsed query string.

// Module declarations
pub(crate) mod corpus;
pub(crate) mod distance;
pub(crate) mod engine;
pub(crate) mod index;
pub(crate) mod query;
pub(crate) mod rank;
pub(crate) mod scoring;

// Public re-exports (used via lib.rs)
pub use corpus::{RawCorpus, RawLibraryUnit, RawSignature, RawType, RawTypeList, parse_corpus};
pub use engine::exec_query;
pub use index::{PathRef, Record, SearchIndex, TypeNode, TypeSignature};
pub use query::{Fragment, ParseError, ParsedQuery, QueryElement, parse_query};
pub use rank::{MAX_RESULTS, QueryResults, ResultItem};
