//! Bounded fuzzy string matching.
//!
//! Damerau-Levenshtein distance (substitution, insertion, deletion and
//! adjacent transposition all cost 1) with an early-exit budget: callers pass
//! a `limit` and get back either the true distance, or `limit + 1` as a
//! "no match within budget" sentinel. The true distance is never reported
//! above the budget.

/// Stand-in for "infinitely far" in row initialization. Half of `usize::MAX`
/// so the `+ 1` in the transposition step cannot overflow.
const FAR: usize = usize::MAX / 2;

/// Reusable scratch state for bounded edit-distance computations.
///
/// Holds three rolling rows (no full matrix is materialized) plus two
/// character buffers, all reused across calls so the hot loop never
/// allocates. The computation itself is a pure function of its inputs.
#[derive(Debug, Default)]
pub(crate) struct EditDistance {
    current: Vec<usize>,
    prev: Vec<usize>,
    prev_prev: Vec<usize>,
    longer: Vec<char>,
    shorter: Vec<char>,
}

impl EditDistance {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Distance between `a` and `b`, capped at `limit + 1`.
    ///
    /// Symmetric in `a` and `b`. Returns the exact Damerau-Levenshtein
    /// distance when it is `<= limit`, and exactly `limit + 1` otherwise.
    pub(crate) fn distance(&mut self, a: &str, b: &str, limit: usize) -> usize {
        self.longer.clear();
        self.longer.extend(a.chars());
        self.shorter.clear();
        self.shorter.extend(b.chars());
        if self.longer.len() < self.shorter.len() {
            std::mem::swap(&mut self.longer, &mut self.shorter);
        }

        // The length difference is a lower bound on the distance.
        let min_dist = self.longer.len() - self.shorter.len();
        if min_dist > limit {
            return limit + 1;
        }

        // Shared prefixes and suffixes never contribute to the distance.
        let mut start = 0;
        let mut a_end = self.longer.len();
        let mut b_end = self.shorter.len();
        while start < b_end && self.longer[start] == self.shorter[start] {
            start += 1;
        }
        while b_end > start && self.longer[a_end - 1] == self.shorter[b_end - 1] {
            a_end -= 1;
            b_end -= 1;
        }
        if b_end == start {
            return min_dist;
        }

        let a = &self.longer[start..a_end];
        let b = &self.shorter[start..b_end];
        let a_len = a.len();
        let b_len = b.len();

        self.current.clear();
        self.current.resize(b_len + 1, 0);
        self.prev.clear();
        self.prev.extend(0..=b_len);
        self.prev_prev.clear();
        self.prev_prev.resize(b_len + 1, FAR);

        for i in 1..=a_len {
            self.current[0] = i;
            let a_idx = i - 1;
            for j in 1..=b_len {
                let b_idx = j - 1;
                let substitution_cost = usize::from(a[a_idx] != b[b_idx]);
                self.current[j] = (self.prev[j] + 1)
                    .min(self.current[j - 1] + 1)
                    .min(self.prev[j - 1] + substitution_cost);
                if i > 1 && j > 1 && a[a_idx] == b[b_idx - 1] && a[a_idx - 1] == b[b_idx] {
                    self.current[j] = self.current[j].min(self.prev_prev[j - 2] + 1);
                }
            }
            std::mem::swap(&mut self.prev_prev, &mut self.prev);
            std::mem::swap(&mut self.prev, &mut self.current);
        }

        let distance = self.prev[b_len];
        if distance <= limit { distance } else { limit + 1 }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert2::check;
    use rstest::rstest;

    #[rstest]
    #[case("", "", 0)]
    #[case("abc", "abc", 0)]
    #[case("abc", "abd", 1)]
    #[case("abc", "ab", 1)]
    #[case("abc", "acb", 1)] // adjacent transposition costs 1
    #[case("paterrn", "pattern", 2)]
    #[case("kitten", "sitting", 3)]
    #[case("search", "sraech", 2)] // two disjoint transpositions
    fn exact_within_budget(#[case] a: &str, #[case] b: &str, #[case] expected: usize) {
        let mut engine = EditDistance::new();
        check!(engine.distance(a, b, 10) == expected);
        check!(engine.distance(b, a, 10) == expected);
    }

    #[rstest]
    #[case("abcdefgh", "", 3)]
    #[case("kitten", "sitting", 2)]
    #[case("completely", "different", 4)]
    fn sentinel_over_budget(#[case] a: &str, #[case] b: &str, #[case] limit: usize) {
        let mut engine = EditDistance::new();
        check!(engine.distance(a, b, limit) == limit + 1);
        check!(engine.distance(b, a, limit) == limit + 1);
    }

    #[test]
    fn identical_is_zero_at_any_budget() {
        let mut engine = EditDistance::new();
        for s in ["", "x", "needle", "a_very_long_identifier"] {
            check!(engine.distance(s, s, 0) == 0);
        }
    }

    #[test]
    fn empty_after_strip_is_length_difference() {
        let mut engine = EditDistance::new();
        // "vec" is a prefix of "vecdeque"; everything strips, residual is 5.
        check!(engine.distance("vecdeque", "vec", 5) == 5);
        check!(engine.distance("vecdeque", "vec", 4) == 5);
    }

    #[test]
    fn scratch_state_is_reusable() {
        let mut engine = EditDistance::new();
        let first = engine.distance("pattern", "paterrn", 3);
        let _ = engine.distance("much_longer_string_here", "x", 2);
        check!(engine.distance("pattern", "paterrn", 3) == first);
    }
}
