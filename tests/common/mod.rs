//! Shared fixtures for integration tests.
//!
//! The sample corpus holds two library units:
//!
//! - `alpha`: `struct Pattern`, `struct Match`, `fn search(Pattern) -> Match`,
//!   `fn compile(str) -> Pattern`, `mod text`, alias `grep` -> `search`
//! - `beta`: `struct Pattern` (a name collision with alpha's), `struct Pewter`
//!   (edit distance 3 from "pattern"), `fn build() -> Pattern`, aliases
//!   `grep` -> `Pattern` and `vec()` -> `Pewter`

use std::sync::Once;

use rstest::fixture;
use symsearch::{QueryResults, ResultItem, SearchIndex, exec_query, parse_corpus, parse_query};
use tracing_subscriber::EnvFilter;

static INIT: Once = Once::new();

/// Route query-engine debug logs through the test capture. Safe to call from
/// every test; only the first call installs the subscriber.
pub fn init_tracing() {
    INIT.call_once(|| {
        tracing_subscriber::fmt()
            .with_env_filter(
                EnvFilter::from_default_env().add_directive(tracing::Level::DEBUG.into()),
            )
            .with_test_writer()
            .with_ansi(false)
            .compact()
            .init();
    });
}

pub const SAMPLE_CORPUS: &str = r#"[
    ["alpha", {
        "doc": "Text search primitives.",
        "t": "DDFFA",
        "n": ["Pattern", "Match", "search", "compile", "text"],
        "q": [[0, "alpha"]],
        "d": ["A compiled pattern.", "One match position.", "Search a haystack.", "Compile a pattern.", "Text utilities."],
        "i": [0, 0, 0, 0, 0],
        "f": [0, 0, [[1], 2], [[3], 1], 0],
        "p": [[3, "Pattern"], [3, "Match"], [15, "str"]],
        "a": {"grep": [2]}
    }],
    ["beta", {
        "doc": "Alternate engine.",
        "t": "DDF",
        "n": ["Pattern", "Pewter", "build"],
        "q": [[0, "beta"]],
        "d": ["Another pattern type.", "A dull alloy.", "Build a pattern."],
        "i": [0, 0, 0],
        "f": [0, 0, [[], 1]],
        "p": [[3, "Pattern"]],
        "a": {"grep": [0], "vec()": [1]}
    }]
]"#;

#[fixture]
pub fn sample_index() -> SearchIndex {
    init_tracing();
    let corpus = parse_corpus(SAMPLE_CORPUS).expect("sample corpus should parse");
    SearchIndex::build(&corpus).expect("sample corpus should build")
}

/// Parse and evaluate a query with no unit filter.
#[allow(dead_code)]
pub fn run(index: &SearchIndex, query: &str, current_unit: &str) -> QueryResults {
    let parsed = parse_query(query);
    exec_query(index, &parsed, None, current_unit)
}

/// Names of a result bucket, in rank order.
#[allow(dead_code)]
pub fn names(bucket: &[ResultItem]) -> Vec<&str> {
    bucket.iter().map(|item| item.name.as_str()).collect()
}
