mod common;

use assert2::check;
use common::{names, run, sample_index};
use rstest::rstest;
use symsearch::{ItemKind, SearchIndex, exec_query, parse_corpus, parse_query};

// --- Name search ---

/// A plain name query surfaces exact hits from every unit, with the
/// preferred unit's record first.
#[rstest]
fn name_query_prefers_current_unit(sample_index: SearchIndex) {
    let results = run(&sample_index, "pattern", "beta");
    let others = names(&results.others);
    check!(others.starts_with(&["Pattern", "Pattern"]), "both Pattern records lead: {others:?}");
    check!(results.others[0].display_path == "beta::");
    check!(results.others[1].display_path == "alpha::");

    let results = run(&sample_index, "pattern", "alpha");
    check!(results.others[0].display_path == "alpha::");
}

/// "pattern" also buckets the function taking a `Pattern` argument and the
/// one returning it.
#[rstest]
fn name_query_fills_argument_and_return_buckets(sample_index: SearchIndex) {
    let results = run(&sample_index, "pattern", "alpha");
    check!(names(&results.in_args) == ["search"]);
    check!(names(&results.returned).contains(&"compile"));
    check!(names(&results.returned).contains(&"build"));
}

/// A symbol three edits away stays out: the budget for a 7-char query is 2.
#[rstest]
fn edit_budget_excludes_distant_symbols(sample_index: SearchIndex) {
    let results = run(&sample_index, "pattern", "alpha");
    check!(!names(&results.others).contains(&"Pewter"));
}

/// A two-typo query still lands within budget `floor(7/3) = 2`.
#[rstest]
fn typo_query_within_budget_finds_pattern(sample_index: SearchIndex) {
    let results = run(&sample_index, "paterrn", "alpha");
    check!(names(&results.others).contains(&"Pattern"));
}

/// A short prefix misses the edit budget but is admitted by substring hit.
#[rstest]
fn substring_hit_admits_beyond_edit_budget(sample_index: SearchIndex) {
    let results = run(&sample_index, "pat", "alpha");
    check!(names(&results.others).contains(&"Pattern"));
}

// --- Kind filters ---

/// A failing kind filter rejects the record from `in_args` even when the
/// argument type name matches exactly.
#[rstest]
fn kind_filter_rejects_argument_matches(sample_index: SearchIndex) {
    let results = run(&sample_index, "enum:pattern", "alpha");
    check!(results.others.is_empty());
    check!(results.in_args.is_empty());

    let results = run(&sample_index, "struct:pattern", "alpha");
    check!(names(&results.in_args) == ["search"]);
    check!(results.others.iter().all(|item| item.kind == ItemKind::Struct));
}

// --- Signature and return queries ---

/// `-> match` is a pure return query: only the function returning `Match`
/// lands in `others`.
#[rstest]
fn return_query_surfaces_only_the_function(sample_index: SearchIndex) {
    let results = run(&sample_index, "-> match", "alpha");
    check!(names(&results.others) == ["search"]);
    check!(results.in_args.is_empty());
    check!(results.returned.is_empty());
}

/// A full signature query must claim both positions exactly.
#[rstest]
fn signature_query_requires_both_positions(sample_index: SearchIndex) {
    let results = run(&sample_index, "pattern -> match", "alpha");
    check!(names(&results.others) == ["search"]);

    let results = run(&sample_index, "pattern -> pewter", "alpha");
    check!(results.others.is_empty());
}

// --- Qualified paths ---

/// Path-qualified queries restrict to the matching module and validate
/// every supplied segment against the record.
#[rstest]
fn qualified_path_restricts_and_validates(sample_index: SearchIndex) {
    let results = run(&sample_index, "alpha::pattern", "alpha");
    check!(names(&results.others) == ["Pattern"]);
    check!(results.others[0].display_path == "alpha::");

    // A fuzzy path segment passes the distance gate but fails the
    // required-keys validation.
    let results = run(&sample_index, "alpho::pattern", "alpha");
    check!(results.others.is_empty());
}

// --- Aliases ---

/// Alias hits are prepended to `others`, current unit first, and carry the
/// alias term that found them.
#[rstest]
fn aliases_prepend_current_unit_first(sample_index: SearchIndex) {
    let results = run(&sample_index, "grep", "alpha");
    check!(results.others.len() >= 2);
    check!(results.others[0].name == "search");
    check!(results.others[0].alias.as_deref() == Some("grep"));
    check!(results.others[1].name == "Pattern");
    check!(results.others[1].display_path == "beta::");

    let results = run(&sample_index, "grep", "beta");
    check!(results.others[0].name == "Pattern");
    check!(results.others[1].name == "search");
}

/// A unit filter consults only that unit's alias table.
#[rstest]
fn unit_filter_scopes_alias_lookup(sample_index: SearchIndex) {
    let parsed = parse_query("grep");
    let results = exec_query(&sample_index, &parsed, Some("beta"), "alpha");
    let aliased: Vec<_> = results
        .others
        .iter()
        .filter(|item| item.alias.is_some())
        .collect();
    check!(aliased.len() == 1);
    check!(aliased[0].name == "Pattern");
}

/// A parse error is dropped when the verbatim query text still hits an
/// alias.
#[rstest]
fn alias_hit_clears_parse_error(sample_index: SearchIndex) {
    let parsed = parse_query("vec()");
    check!(parsed.error.is_some());
    let results = exec_query(&sample_index, &parsed, None, "alpha");
    check!(results.error.is_none());
    check!(results.others[0].name == "Pewter");
    check!(results.others[0].alias.as_deref() == Some("vec()"));

    // Without an alias hit the error survives.
    let results = exec_query(&sample_index, &parse_query("map()"), None, "alpha");
    check!(results.error.is_some());
    check!(results.others.is_empty());
}

// --- Ranking and deduplication ---

/// Exact word matches rank ahead of fuzzy ones.
#[rstest]
fn exact_word_outranks_fuzzy(sample_index: SearchIndex) {
    let results = run(&sample_index, "match", "alpha");
    check!(results.others[0].name == "Match");
}

/// Records collapsing to the same display path, name and kind keep only
/// their best-ranked occurrence.
#[test]
fn duplicate_records_collapse() {
    let corpus = parse_corpus(
        r#"[["dup", {
            "t": "DD",
            "n": ["Pattern", "Pattern"],
            "q": [[0, "dup"]],
            "d": ["First.", "Second."],
            "i": [0, 0],
            "f": [0, 0]
        }]]"#,
    )
    .unwrap();
    let index = SearchIndex::build(&corpus).unwrap();
    let results = run(&index, "pattern", "dup");
    check!(names(&results.others) == ["Pattern"]);
}

/// Deprecated records rank after live ones at equal distance.
#[test]
fn deprecated_records_rank_last() {
    let corpus = parse_corpus(
        r#"[["d", {
            "t": "DD",
            "n": ["Finder", "Finder"],
            "q": [[0, "d::old"], [1, "d::new"]],
            "d": ["", ""],
            "i": [0, 0],
            "f": [0, 0],
            "c": [0]
        }]]"#,
    )
    .unwrap();
    let index = SearchIndex::build(&corpus).unwrap();
    let results = run(&index, "finder", "d");
    check!(results.others.len() == 2);
    check!(!results.others[0].deprecated);
    check!(results.others[1].deprecated);
}

// --- Links ---

/// Generated hrefs follow the per-kind layout of rendered documentation.
#[rstest]
fn hrefs_follow_documentation_layout(sample_index: SearchIndex) {
    let results = run(&sample_index, "search", "alpha");
    let hit = &results.others[0];
    check!(hit.href == "../alpha/fn.search.html");

    let results = run(&sample_index, "text", "alpha");
    let hit = results.others.iter().find(|i| i.kind == ItemKind::Module).unwrap();
    check!(hit.href == "../alpha/text/index.html");
    check!(hit.display_path == "alpha::");
}
