pub mod error;
pub mod search;
pub mod types;

pub use error::{CorpusError, Result};
pub use search::{
    ParseError, ParsedQuery, QueryResults, RawCorpus, ResultItem, SearchIndex, exec_query,
    parse_corpus, parse_query,
};
pub use types::ItemKind;
