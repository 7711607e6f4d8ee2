//! Structural matching of type signatures against query elements.
//!
//! Every function here is total: a record that cannot match is scored with
//! the sentinel distance `limit + 1`, never an error. Distances are `f64`
//! because generic unification averages a unification score with a raw name
//! distance, which may be half-integral.

use crate::search::distance::EditDistance;
use crate::search::index::{PathRef, Record, TypeNode};
use crate::search::query::QueryElement;
use crate::types::{ItemKind, passes_filter};
use ahash::AHashMap;

/// The "no match within budget" score.
pub(crate) fn sentinel(limit: usize) -> f64 {
    (limit + 1) as f64
}

/// Filter admissibility for a type node's (possibly absent) kind.
/// A kindless node passes only when there is no filter.
fn kind_passes(filter: Option<ItemKind>, kind: Option<ItemKind>) -> bool {
    match filter {
        None => true,
        Some(_) => kind.is_some_and(|k| passes_filter(filter, k)),
    }
}

/// Score one type node against one query element.
///
/// Anonymous placeholders degrade to searching inside their generics. In
/// literal mode only exact name matches count (with a fallback scan of the
/// node's own generics for generic-less elements); in fuzzy mode a bare-name
/// element may also match inside the node's generics, and an element with
/// generics of its own goes through unification, averaging the unification
/// score with the raw name distance.
pub(crate) fn check_type(
    edit: &mut EditDistance,
    node: &TypeNode,
    elem: &QueryElement,
    literal: bool,
    limit: usize,
) -> f64 {
    let Some(name) = &node.name else {
        if !node.generics.is_empty() {
            return check_if_in_generics(edit, node, elem, limit);
        }
        return sentinel(limit);
    };

    let dist = if kind_passes(elem.type_filter, node.kind) {
        edit.distance(name, &elem.name, limit) as f64
    } else {
        sentinel(limit)
    };

    if literal {
        if dist != 0.0 {
            // A generic-less element may still hit one of the node's own
            // generics exactly.
            if elem.generics.is_empty()
                && node.generics.iter().any(|g| {
                    g.name.as_deref() == Some(elem.name.as_str())
                        && kind_passes(elem.type_filter, g.kind)
                })
            {
                return 0.0;
            }
            return sentinel(limit);
        }
        if !elem.generics.is_empty() {
            return check_generics(edit, node, elem, sentinel(limit), limit);
        }
        return 0.0;
    }

    if !node.generics.is_empty() {
        if elem.generics.is_empty() {
            if dist == 0.0 {
                return 0.0;
            }
            return dist.min(check_if_in_generics(edit, node, elem, limit));
        }
        if dist > limit as f64 {
            return check_if_in_generics(edit, node, elem, limit);
        }
        let unified = check_generics(edit, node, elem, dist, limit);
        if unified > limit as f64 {
            return sentinel(limit);
        }
        return (unified + dist) / 2.0;
    }
    if !elem.generics.is_empty() {
        return sentinel(limit);
    }
    dist
}

/// Unify a node's generic list with an element's.
///
/// The node must supply at least as many generics as the element asks for.
/// Node generics form a multiset keyed by name; element generics with an
/// explicit kind filter consume first, then the unfiltered ones. Each must
/// find and remove one compatible entry or the whole node is rejected.
pub(crate) fn check_generics(
    edit: &mut EditDistance,
    node: &TypeNode,
    elem: &QueryElement,
    default_dist: f64,
    limit: usize,
) -> f64 {
    if node.generics.is_empty() {
        return if elem.generics.is_empty() {
            default_dist
        } else {
            sentinel(limit)
        };
    }
    if node.generics[0].name.is_none() {
        // A leading placeholder wraps the real arguments one level down.
        return check_generics(edit, &node.generics[0], elem, default_dist, limit);
    }
    if !elem.generics.is_empty() && node.generics.len() >= elem.generics.len() {
        // Multiset of consumable node generics. Anonymous entries have no
        // name to consume by and are skipped here.
        let mut pool: AHashMap<&str, Vec<Option<ItemKind>>> = AHashMap::new();
        for entry in &node.generics {
            if let Some(name) = &entry.name {
                pool.entry(name.as_str()).or_default().push(entry.kind);
            }
        }
        let mut consume = |generic: &QueryElement| -> bool {
            let Some(kinds) = pool.get_mut(generic.name.as_str()) else {
                return false;
            };
            let Some(found) = kinds
                .iter()
                .position(|&kind| kind_passes(generic.type_filter, kind))
            else {
                return false;
            };
            kinds.remove(found);
            if kinds.is_empty() {
                pool.remove(generic.name.as_str());
            }
            true
        };
        for generic in elem.generics.iter().filter(|g| g.type_filter.is_some()) {
            if !consume(generic) {
                return sentinel(limit);
            }
        }
        for generic in elem.generics.iter().filter(|g| g.type_filter.is_none()) {
            if !consume(generic) {
                return sentinel(limit);
            }
        }
        return 0.0;
    }
    sentinel(limit)
}

/// Best score an element reaches anywhere inside a node's generics.
pub(crate) fn check_if_in_generics(
    edit: &mut EditDistance,
    node: &TypeNode,
    elem: &QueryElement,
    limit: usize,
) -> f64 {
    let mut dist = sentinel(limit);
    for entry in &node.generics {
        dist = check_type(edit, entry, elem, true, limit).min(dist);
        if dist == 0.0 {
            break;
        }
    }
    dist
}

/// Best `(distance, position)` over a list of signature positions, skipping
/// positions already claimed by other query elements. In literal mode only
/// exact hits survive.
fn scan_positions(
    edit: &mut EditDistance,
    nodes: &[TypeNode],
    elem: &QueryElement,
    literal: bool,
    limit: usize,
    skip: &[usize],
) -> (f64, Option<usize>) {
    let mut dist = sentinel(limit);
    let mut position = None;
    for (i, node) in nodes.iter().enumerate() {
        if skip.contains(&i) {
            continue;
        }
        let type_dist = check_type(edit, node, elem, literal, limit);
        if type_dist == 0.0 {
            return (0.0, Some(i));
        }
        if type_dist < dist {
            dist = type_dist;
            position = Some(i);
        }
    }
    if literal {
        return (sentinel(limit), position);
    }
    (dist, position)
}

/// Best match for an element among a record's input parameter types.
pub(crate) fn find_arg(
    edit: &mut EditDistance,
    record: &Record,
    elem: &QueryElement,
    literal: bool,
    limit: usize,
    skip: &[usize],
) -> (f64, Option<usize>) {
    match &record.signature {
        Some(sig) if !sig.inputs.is_empty() => {
            scan_positions(edit, &sig.inputs, elem, literal, limit, skip)
        }
        _ => (sentinel(limit), None),
    }
}

/// Best match for an element among a record's output (return) types.
pub(crate) fn check_returned(
    edit: &mut EditDistance,
    record: &Record,
    elem: &QueryElement,
    literal: bool,
    limit: usize,
    skip: &[usize],
) -> (f64, Option<usize>) {
    match &record.signature {
        Some(sig) if !sig.output.is_empty() => {
            scan_positions(edit, &sig.output, elem, literal, limit, skip)
        }
        _ => (sentinel(limit), None),
    }
}

/// Score the query's qualifying path segments against a record's path.
///
/// The record's path segments (parent name appended, when any) are scanned
/// with a sliding window; each window position scores the rounded mean of
/// the per-segment edit distances, and the best window wins.
pub(crate) fn check_path(
    edit: &mut EditDistance,
    contains: &[String],
    record: &Record,
    limit: usize,
) -> f64 {
    if contains.is_empty() {
        return 0.0;
    }
    let mut best = sentinel(limit);
    let mut path: Vec<String> = record.path.split("::").map(str::to_lowercase).collect();
    if let Some(parent) = &record.parent {
        path.push(parent.name.to_lowercase());
    }
    if contains.len() > path.len() {
        return sentinel(limit);
    }
    for window in path.windows(contains.len()) {
        let mut total = 0;
        let mut aborted = false;
        for (segment, key) in window.iter().zip(contains) {
            let dist = edit.distance(segment, key, limit);
            if dist > limit {
                aborted = true;
                break;
            }
            total += dist;
        }
        if !aborted {
            best = best.min((total as f64 / contains.len() as f64).round());
        }
    }
    best
}

/// The required-keys rule for pure name matches: every path segment the
/// query supplied must appear as a substring of the record's name, its path,
/// or its parent's name, or be within the edit budget of the name.
pub(crate) fn validate_result(
    edit: &mut EditDistance,
    name: &str,
    path: &str,
    keys: &[String],
    parent: Option<&PathRef>,
    limit: usize,
) -> bool {
    keys.iter().all(|key| {
        name.contains(key.as_str())
            || path.contains(key.as_str())
            || parent.is_some_and(|p| p.name.to_lowercase().contains(key.as_str()))
            || edit.distance(name, key, limit) <= limit
    })
}
