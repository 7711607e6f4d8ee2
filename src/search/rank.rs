//! Ranking, deduplication and alias injection for scored buckets.

use crate::search::distance::EditDistance;
use crate::search::engine::Candidate;
use crate::search::index::{Record, SearchIndex};
use crate::search::query::{ParseError, ParsedQuery};
use crate::search::scoring::validate_result;
use crate::types::ItemKind;
use ahash::{AHashMap, AHashSet};
use std::cmp::Ordering;

/// Hard cap per result bucket.
pub const MAX_RESULTS: usize = 200;

/// One display-ready search hit.
#[derive(Debug, Clone)]
pub struct ResultItem {
    pub id: usize,
    /// Qualifying path prefix, `::`-terminated (empty for unit roots,
    /// primitives and keywords).
    pub display_path: String,
    pub name: String,
    pub kind: ItemKind,
    pub desc: String,
    pub deprecated: bool,
    /// Relative link into rendered documentation.
    pub href: String,
    /// The alias term this hit was found under, when it came from the
    /// alias table rather than matching.
    pub alias: Option<String>,
    pub dist: f64,
}

/// The three ranked buckets of one query evaluation.
#[derive(Debug, Clone, Default)]
pub struct QueryResults {
    pub others: Vec<ResultItem>,
    pub in_args: Vec<ResultItem>,
    pub returned: Vec<ResultItem>,
    pub error: Option<ParseError>,
}

struct Entry<'a> {
    cand: Candidate,
    word: &'a str,
    record: &'a Record,
    demoted: bool,
}

/// Sort one bucket, demote invalid name matches, then deduplicate and cap.
///
/// `is_type` marks the structural buckets (arguments/returns), which skip
/// the required-keys validation.
pub(crate) fn sort_results(
    index: &SearchIndex,
    parsed: &ParsedQuery,
    bucket: AHashMap<usize, Candidate>,
    is_type: bool,
    preferred_unit: &str,
) -> Vec<ResultItem> {
    let mut entries: Vec<Entry<'_>> = bucket
        .into_values()
        .map(|cand| Entry {
            word: index.search_word(cand.id),
            record: &index.records()[cand.id],
            cand,
            demoted: false,
        })
        .collect();
    if entries.is_empty() {
        return Vec::new();
    }

    let user_query = parsed.user_query.as_str();
    entries.sort_by(|a, b| {
        // Exact word match first.
        let ord = (a.word != user_query).cmp(&(b.word != user_query));
        if ord != Ordering::Equal {
            return ord;
        }
        // A substring hit anywhere beats none.
        let ord = (a.cand.index < 0).cmp(&(b.cand.index < 0));
        if ord != Ordering::Equal {
            return ord;
        }
        let ord = a.cand.path_dist.total_cmp(&b.cand.path_dist);
        if ord != Ordering::Equal {
            return ord;
        }
        // Earlier substring position first.
        let ord = a.cand.index.cmp(&b.cand.index);
        if ord != Ordering::Equal {
            return ord;
        }
        let ord = a.cand.dist.total_cmp(&b.cand.dist);
        if ord != Ordering::Equal {
            return ord;
        }
        let ord = a.record.deprecated.cmp(&b.record.deprecated);
        if ord != Ordering::Equal {
            return ord;
        }
        let a_foreign = index.unit_name(a.record) != preferred_unit;
        let b_foreign = index.unit_name(b.record) != preferred_unit;
        let ord = a_foreign.cmp(&b_foreign);
        if ord != Ordering::Equal {
            return ord;
        }
        let ord = a.word.len().cmp(&b.word.len());
        if ord != Ordering::Equal {
            return ord;
        }
        let ord = a.word.cmp(b.word);
        if ord != Ordering::Equal {
            return ord;
        }
        // Primitives and keywords outrank ordinary items.
        let a_special = a.record.kind.is_primitive_or_keyword();
        let b_special = b.record.kind.is_primitive_or_keyword();
        let ord = (!a_special).cmp(&(!b_special));
        if ord != Ordering::Equal {
            return ord;
        }
        let ord = a.record.desc.is_empty().cmp(&b.record.desc.is_empty());
        if ord != Ordering::Equal {
            return ord;
        }
        let ord = a.record.kind.cmp(&b.record.kind);
        if ord != Ordering::Equal {
            return ord;
        }
        a.record.path.cmp(&b.record.path)
    });

    // A single-element query with a qualified path constrains pure name
    // matches: every supplied segment must be reflected somewhere in the
    // record, or the match is a coincidence and is dropped.
    if !is_type
        && let [elem] = parsed.elems.as_slice()
        && elem.full_path.len() > 1
    {
        let mut edit = EditDistance::new();
        let limit = query_edit_limit(parsed);
        for entry in &mut entries {
            if entry.cand.dont_validate {
                continue;
            }
            let name = entry.record.name.to_lowercase();
            let path = entry.record.path.to_lowercase();
            if !validate_result(
                &mut edit,
                &name,
                &path,
                &elem.full_path,
                entry.record.parent.as_ref(),
                limit,
            ) {
                entry.demoted = true;
            }
        }
    }

    let mut seen: AHashSet<String> = AHashSet::new();
    let mut out = Vec::new();
    for entry in entries {
        if entry.demoted {
            continue;
        }
        let (display_path, href) = build_href_and_path(index, entry.record);
        let key = format!(
            "{display_path}{}|{}",
            entry.record.name,
            entry.record.kind.tag_name()
        );
        if !seen.insert(key) {
            continue;
        }
        out.push(ResultItem {
            id: entry.record.id,
            display_path,
            name: entry.record.name.clone(),
            kind: entry.record.kind,
            desc: entry.record.desc.clone(),
            deprecated: entry.record.deprecated,
            href,
            alias: None,
            dist: entry.cand.dist,
        });
        if out.len() >= MAX_RESULTS {
            break;
        }
    }
    out
}

fn query_edit_limit(parsed: &ParsedQuery) -> usize {
    let query_len: usize = parsed
        .elems
        .iter()
        .chain(&parsed.returned)
        .map(|elem| elem.name.len())
        .sum();
    query_len / 3
}

/// Compute a record's display-path prefix and documentation link.
pub(crate) fn build_href_and_path(index: &SearchIndex, record: &Record) -> (String, String) {
    let root = &index.root_path;
    let name = &record.name;
    let mut path = record.path.clone();
    let tag = record.kind.tag_name();

    match record.kind {
        ItemKind::Module => {
            let href = format!("{root}{}/{name}/index.html", path.replace("::", "/"));
            (format!("{path}::"), href)
        }
        ItemKind::Import => {
            let href = format!("{root}{}/index.html#reexport.{name}", path.replace("::", "/"));
            (format!("{path}::"), href)
        }
        ItemKind::Primitive | ItemKind::Keyword => {
            let href = format!("{root}{}/{tag}.{name}.html", path.replace("::", "/"));
            (String::new(), href)
        }
        ItemKind::ExternCrate => (String::new(), format!("{root}{name}/index.html")),
        _ => {
            if let Some(parent) = &record.parent {
                let mut anchor = format!("#{tag}.{name}");
                let mut page_kind = parent.kind.tag_name();
                let mut page_name = parent.name.clone();
                let display_path;
                if parent.kind == ItemKind::Primitive {
                    display_path = format!("{}::", parent.name);
                } else if record.kind == ItemKind::StructField && parent.kind == ItemKind::Variant {
                    // A field inside an enum variant lives on the enum's
                    // page. The enum name is the last path segment.
                    let enum_name = match path.rfind("::") {
                        Some(idx) => {
                            let enum_name = path[idx + 2..].to_owned();
                            path.truncate(idx);
                            enum_name
                        }
                        None => std::mem::take(&mut path),
                    };
                    display_path = format!("{path}::{enum_name}::{}::", parent.name);
                    anchor = format!("#variant.{}.field.{name}", parent.name);
                    page_kind = "enum";
                    page_name = enum_name;
                } else {
                    display_path = format!("{path}::{}::", parent.name);
                }
                let href = format!(
                    "{root}{}/{page_kind}.{page_name}.html{anchor}",
                    path.replace("::", "/")
                );
                (display_path, href)
            } else {
                let href = format!("{root}{}/{tag}.{name}.html", path.replace("::", "/"));
                (format!("{path}::"), href)
            }
        }
    }
}

/// Look the literal query text up in the alias tables and prepend the hits
/// to `others`, under the cap. The preferred unit's aliases come first,
/// then the remaining units'; within each group hits are ordered by record
/// path, then id.
pub(crate) fn handle_aliases(
    index: &SearchIndex,
    ret: &mut QueryResults,
    query: &str,
    filter_unit: Option<&str>,
    current_unit: &str,
) {
    let lower_query = query.to_lowercase();
    let mut preferred: Vec<usize> = Vec::new();
    let mut rest: Vec<usize> = Vec::new();

    match filter_unit {
        Some(unit) => {
            if let Some(targets) = index
                .aliases
                .get(unit)
                .and_then(|unit_aliases| unit_aliases.get(&lower_query))
            {
                rest.extend(targets);
            }
        }
        None => {
            for (unit, unit_aliases) in &index.aliases {
                if let Some(targets) = unit_aliases.get(&lower_query) {
                    if unit == current_unit {
                        preferred.extend(targets);
                    } else {
                        rest.extend(targets);
                    }
                }
            }
        }
    }

    let by_path = |a: &usize, b: &usize| {
        let pa = &index.records()[*a].path;
        let pb = &index.records()[*b].path;
        pa.cmp(pb).then(a.cmp(b))
    };
    preferred.sort_by(by_path);
    rest.sort_by(by_path);
    preferred.extend(rest);
    if preferred.is_empty() {
        return;
    }

    let hits: Vec<ResultItem> = preferred
        .into_iter()
        .map(|id| {
            let record = &index.records()[id];
            let (display_path, href) = build_href_and_path(index, record);
            ResultItem {
                id,
                display_path,
                name: record.name.clone(),
                kind: record.kind,
                desc: record.desc.clone(),
                deprecated: record.deprecated,
                href,
                alias: Some(query.to_owned()),
                dist: 0.0,
            }
        })
        .collect();
    ret.others.splice(0..0, hits);
    ret.others.truncate(MAX_RESULTS);
}
