use assert2::check;
use rstest::rstest;
use symsearch::{ItemKind, parse_query};

/// A path with a generic parses into one element carrying the full path and
/// a nested generic, without forcing literal mode.
#[test]
fn path_with_generic() {
    let parsed = parse_query("foo::bar<Baz>");
    check!(parsed.error.is_none());
    check!(parsed.elems.len() == 1);
    let elem = &parsed.elems[0];
    check!(elem.full_path == ["foo", "bar"]);
    check!(elem.path_last == "bar");
    check!(elem.generics.len() == 1);
    check!(elem.generics[0].name == "baz");
    check!(elem.type_filter.is_none());
    check!(!parsed.literal_search);
}

/// Quoting forces literal mode; a second element after the quoted one is a
/// parse error.
#[test]
fn quoted_query_is_literal_and_exclusive() {
    let parsed = parse_query("\"exact\"");
    check!(parsed.error.is_none());
    check!(parsed.literal_search);
    check!(parsed.elems.len() == 1);
    check!(parsed.elems[0].name == "exact");

    let parsed = parse_query("\"exact\" extra");
    check!(parsed.error.is_some());
}

/// Kind filters resolve by name; unknown filter names are parse errors that
/// cite the bad filter.
#[rstest]
#[case("fn:foo", Some(ItemKind::Function))]
#[case("struct:foo", Some(ItemKind::Struct))]
#[case("const:foo", Some(ItemKind::Constant))]
fn filters_resolve(#[case] input: &str, #[case] expected: Option<ItemKind>) {
    let parsed = parse_query(input);
    check!(parsed.error.is_none(), "{input}: {:?}", parsed.error);
    check!(parsed.elems[0].name == "foo");
    check!(parsed.elems[0].type_filter == expected);
}

#[test]
fn unknown_filter_is_an_error() {
    let parsed = parse_query("bogus:foo");
    check!(parsed.error.is_some());
    let rendered = format!("{}", parsed.error.unwrap());
    check!(rendered.contains("bogus"), "error cites the filter: {rendered}");
}

/// The return arrow splits subject and returned elements; an empty returned
/// list is a parse error.
#[test]
fn return_arrow_splits_elements() {
    let parsed = parse_query("a -> b");
    check!(parsed.error.is_none());
    check!(parsed.elems.len() == 1);
    check!(parsed.elems[0].name == "a");
    check!(parsed.returned.len() == 1);
    check!(parsed.returned[0].name == "b");
    check!(parsed.found_elems == 2);
    // More than one total element forces literal matching.
    check!(parsed.literal_search);

    let parsed = parse_query("a ->");
    check!(parsed.error.is_some());
}
