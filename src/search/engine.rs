//! Query evaluation: one pass over every record, scoring name, argument and
//! return matches into three buckets, then ranking each bucket.

use crate::search::distance::EditDistance;
use crate::search::index::{Record, SearchIndex};
use crate::search::query::{ParsedQuery, QueryElement};
use crate::search::rank::{QueryResults, handle_aliases, sort_results};
use crate::search::scoring::{check_path, check_returned, find_arg};
use crate::types::passes_filter;
use ahash::AHashMap;

/// A bucket entry before ranking. `index` is the substring hit position in
/// the record's word or normalized name, `-1` when there is none.
#[derive(Debug, Clone)]
pub(crate) struct Candidate {
    pub(crate) id: usize,
    pub(crate) index: isize,
    pub(crate) dist: f64,
    pub(crate) path_dist: f64,
    /// Literal-mode insertions are final: later re-insertions never replace
    /// them, and they skip the post-sort key validation.
    pub(crate) dont_validate: bool,
}

type Bucket = AHashMap<usize, Candidate>;

struct Evaluator<'a> {
    index: &'a SearchIndex,
    parsed: &'a ParsedQuery,
    filter_unit: Option<&'a str>,
    limit: usize,
    edit: EditDistance,
}

/// Evaluate a parsed query against the index.
///
/// `filter_unit` restricts structural matches (and alias lookup) to one
/// library unit; `current_unit` is the preferred unit for ranking. A query
/// carrying a parse error skips matching but still consults the alias
/// table, and the error is dropped when aliases produced results.
pub fn exec_query(
    index: &SearchIndex,
    parsed: &ParsedQuery,
    filter_unit: Option<&str>,
    current_unit: &str,
) -> QueryResults {
    let start = std::time::Instant::now();
    let mut others = Bucket::new();
    let mut in_args = Bucket::new();
    let mut returned = Bucket::new();

    if parsed.error.is_none() {
        let query_len: usize = parsed
            .elems
            .iter()
            .chain(&parsed.returned)
            .map(|elem| elem.name.len())
            .sum();
        let mut eval = Evaluator {
            index,
            parsed,
            filter_unit,
            limit: query_len / 3,
            edit: EditDistance::new(),
        };
        eval.run(&mut others, &mut in_args, &mut returned);
    }

    let mut ret = QueryResults {
        in_args: sort_results(index, parsed, in_args, true, current_unit),
        returned: sort_results(index, parsed, returned, true, current_unit),
        others: sort_results(index, parsed, others, false, current_unit),
        error: parsed.error.clone(),
    };
    let alias_query = parsed.original.replace('"', "");
    handle_aliases(index, &mut ret, &alias_query, filter_unit, current_unit);
    if ret.error.is_some() && !ret.others.is_empty() {
        ret.error = None;
    }
    tracing::debug!(
        query = %parsed.user_query,
        others = ret.others.len(),
        in_args = ret.in_args.len(),
        returned = ret.returned.len(),
        elapsed = ?start.elapsed(),
        "evaluated query"
    );
    ret
}

impl Evaluator<'_> {
    fn run(&mut self, others: &mut Bucket, in_args: &mut Bucket, returned: &mut Bucket) {
        if self.parsed.found_elems == 1 {
            if self.parsed.elems.len() == 1 {
                let elem = &self.parsed.elems[0];
                for id in 0..self.index.records().len() {
                    self.handle_single_arg(id, elem, others, in_args, returned);
                }
            } else if self.parsed.returned.len() == 1 {
                let elem = &self.parsed.returned[0];
                for id in 0..self.index.records().len() {
                    let record = &self.index.records()[id];
                    if self.excluded(record) {
                        continue;
                    }
                    let (dist, _) = check_returned(
                        &mut self.edit,
                        record,
                        elem,
                        self.parsed.literal_search,
                        self.limit,
                        &[],
                    );
                    self.add_into_results(others, id, -1, dist, 0.0);
                }
            }
        } else if self.parsed.found_elems > 0 {
            for id in 0..self.index.records().len() {
                self.handle_args(id, others);
            }
        }
    }

    fn excluded(&self, record: &Record) -> bool {
        self.filter_unit
            .is_some_and(|unit| self.index.unit_name(record) != unit)
    }

    fn add_into_results(
        &self,
        results: &mut Bucket,
        id: usize,
        index: isize,
        dist: f64,
        path_dist: f64,
    ) {
        let in_bounds = dist <= self.limit as f64 || index != -1;
        if dist == 0.0 || (!self.parsed.literal_search && in_bounds) {
            if let Some(existing) = results.get(&id)
                && (existing.dont_validate || existing.dist <= dist)
            {
                return;
            }
            results.insert(
                id,
                Candidate {
                    id,
                    index,
                    dist,
                    path_dist,
                    dont_validate: self.parsed.literal_search,
                },
            );
        }
    }

    /// Single subject element: every record is scored against the argument
    /// list, the return list, and (when the record's kind passes the filter)
    /// its own name and path.
    fn handle_single_arg(
        &mut self,
        id: usize,
        elem: &QueryElement,
        others: &mut Bucket,
        in_args: &mut Bucket,
        returned: &mut Bucket,
    ) {
        let record = &self.index.records()[id];
        if self.excluded(record) {
            return;
        }
        let literal = self.parsed.literal_search;
        let (arg_dist, _) = find_arg(&mut self.edit, record, elem, literal, self.limit, &[]);
        let (ret_dist, _) = check_returned(&mut self.edit, record, elem, literal, self.limit, &[]);
        self.add_into_results(in_args, id, -1, arg_dist, 0.0);
        self.add_into_results(returned, id, -1, ret_dist, 0.0);

        if !passes_filter(elem.type_filter, record.kind) {
            return;
        }
        let word = self.index.search_word(id);
        let row_index = record.normalized_name.find(&elem.path_last);
        let word_index = word.find(&elem.path_last);
        let index = match (row_index, word_index) {
            (None, w) => w,
            (r, None) => r,
            (Some(r), Some(w)) => Some(r.min(w)),
        }
        .map_or(-1, |i| i as isize);

        let mut path_dist = 0.0;
        if elem.full_path.len() > 1 {
            path_dist = check_path(&mut self.edit, &elem.path_without_last, record, self.limit);
            if path_dist > self.limit as f64 {
                return;
            }
        }
        if literal {
            if word == elem.name {
                self.add_into_results(others, id, index, 0.0, path_dist);
            }
            return;
        }
        let dist = self.edit.distance(word, &elem.path_last, self.limit) as f64;
        if index == -1 && dist + path_dist > self.limit as f64 {
            return;
        }
        self.add_into_results(others, id, index, dist, path_dist);
    }

    /// Signature query: every subject element must claim a distinct input
    /// position and every returned element a distinct output position, each
    /// within distance 1. The record scores the rounded mean.
    fn handle_args(&mut self, id: usize, others: &mut Bucket) {
        let record = &self.index.records()[id];
        if self.excluded(record) {
            return;
        }
        let literal = self.parsed.literal_search;
        let mut total = 0.0;
        let mut count = 0usize;

        let mut claim = |edit: &mut EditDistance,
                         elems: &[QueryElement],
                         returned: bool|
         -> bool {
            let mut skip: Vec<usize> = Vec::new();
            for elem in elems {
                let (dist, position) = if returned {
                    check_returned(edit, record, elem, literal, self.limit, &skip)
                } else {
                    find_arg(edit, record, elem, literal, self.limit, &skip)
                };
                if dist <= 1.0 {
                    count += 1;
                    total += dist;
                    if let Some(position) = position {
                        skip.push(position);
                    }
                } else {
                    return false;
                }
            }
            true
        };
        if !claim(&mut self.edit, &self.parsed.elems, false) {
            return;
        }
        if !claim(&mut self.edit, &self.parsed.returned, true) {
            return;
        }
        if count == 0 {
            return;
        }
        let dist = (total / count as f64).round();
        self.add_into_results(others, id, 0, dist, 0.0);
    }
}
