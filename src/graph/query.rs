//! Relation queries.
//!
//! Queries consult pseudo times first (constant time on a shared chain),
//! then absolute bounds, and at search effort a depth-first walk over the
//! metagraph's cross-chain connections. They never fail: anything
//! underivable is `unknown`.

use rustc_hash::{FxHashMap, FxHashSet};

use crate::abstime::AbsTime;
use crate::node::{ChainId, PointId};
use crate::pred::{test_answer, Pred, Stem, Strictness};

use super::{TimeArg, TimeGraph};

/// How hard a query should work: `Direct` uses constant-time lookups only,
/// `Search` adds cross-chain path search and duration search.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Effort {
    #[default]
    Direct,
    Search,
}

impl Effort {
    pub fn searches(self) -> bool {
        matches!(self, Effort::Search)
    }
}

/// A query argument resolved against the registries.
#[derive(Debug, Clone)]
pub(crate) enum QueryTerm {
    Event {
        name: String,
        start: Option<PointId>,
        end: Option<PointId>,
    },
    Point(PointId),
    Abs(AbsTime),
    Missing,
}

/// One endpoint of a query term.
#[derive(Debug, Clone, Copy)]
pub(crate) enum EndTerm {
    Pt(PointId),
    Abs(AbsTime),
    Missing,
}

impl TimeGraph {
    /// The most strict relation derivable between `a1` and `a2`.
    pub fn relation(&self, a1: impl Into<TimeArg>, a2: impl Into<TimeArg>, effort: Effort) -> Pred {
        let t1 = self.resolve_query(a1.into());
        let t2 = self.resolve_query(a2.into());
        match (&t1, &t2) {
            (QueryTerm::Abs(x), QueryTerm::Abs(y)) => x.compare(y),
            (QueryTerm::Missing, _) | (_, QueryTerm::Missing) => Pred::unknown(),
            (QueryTerm::Abs(_), _) | (_, QueryTerm::Abs(_)) => {
                self.find_absolute_reln(&t1, &t2, effort)
            }
            _ => self.find_relation(&t1, &t2, effort),
        }
    }

    pub(crate) fn resolve_query(&self, arg: TimeArg) -> QueryTerm {
        match arg {
            TimeArg::Name(n) => {
                if let Some(ev) = self.events.get(&n) {
                    QueryTerm::Event {
                        start: self.names.get(&ev.start).copied(),
                        end: self.names.get(&ev.end).copied(),
                        name: n,
                    }
                } else if let Some(&p) = self.names.get(&n) {
                    QueryTerm::Point(p)
                } else {
                    QueryTerm::Missing
                }
            }
            TimeArg::Point(id) => {
                // Chase collapses through the name registry.
                let resolved = self
                    .names
                    .get(&self.pt(id).name)
                    .copied()
                    .unwrap_or(id);
                QueryTerm::Point(resolved)
            }
            TimeArg::Abs(a) => QueryTerm::Abs(a),
            TimeArg::Seconds(_) => QueryTerm::Missing,
        }
    }

    pub(crate) fn start_term(&self, t: &QueryTerm) -> EndTerm {
        match t {
            QueryTerm::Event { start, .. } => match start {
                Some(p) => EndTerm::Pt(*p),
                None => EndTerm::Missing,
            },
            QueryTerm::Point(p) => EndTerm::Pt(*p),
            QueryTerm::Abs(a) => EndTerm::Abs(*a),
            QueryTerm::Missing => EndTerm::Missing,
        }
    }

    pub(crate) fn end_term(&self, t: &QueryTerm) -> EndTerm {
        match t {
            QueryTerm::Event { end, .. } => match end {
                Some(p) => EndTerm::Pt(*p),
                None => EndTerm::Missing,
            },
            QueryTerm::Point(p) => EndTerm::Pt(*p),
            QueryTerm::Abs(a) => EndTerm::Abs(*a),
            QueryTerm::Missing => EndTerm::Missing,
        }
    }

    /// Relation between two endpoints, which may be points or absolute
    /// times.
    fn find_point(&self, e1: EndTerm, e2: EndTerm, effort: Effort) -> Pred {
        match (e1, e2) {
            (EndTerm::Pt(p), EndTerm::Pt(q)) => {
                if p == q {
                    Pred::same_time()
                } else {
                    self.find_reln(p, q, effort)
                }
            }
            (EndTerm::Abs(a), EndTerm::Abs(b)) => a.compare(&b),
            (EndTerm::Abs(a), EndTerm::Pt(q)) => self.abs_relation(&a, q),
            (EndTerm::Pt(p), EndTerm::Abs(b)) => self.abs_relation(&b, p).inverse(),
            _ => Pred::unknown(),
        }
    }

    /// Relation between an absolute time and a point, read off the point's
    /// bounds.
    fn abs_relation(&self, abs: &AbsTime, p: PointId) -> Pred {
        let res1 = abs.compare(&self.pt(p).absolute_min);
        let res2 = abs.compare(&self.pt(p).absolute_max);
        if test_answer(Stem::Equal, res1) && test_answer(Stem::Equal, res2) {
            Pred::same_time()
        } else if test_answer(Stem::Before, res1) {
            if res1.is_equiv() {
                Pred::of(Stem::Before)
            } else {
                res1
            }
        } else if test_answer(Stem::After, res2) {
            if res2.is_equiv() {
                Pred::of(Stem::After)
            } else {
                res2
            }
        } else {
            Pred::unknown()
        }
    }

    /// Interval relation when at least one side involves an absolute time.
    fn find_absolute_reln(&self, t1: &QueryTerm, t2: &QueryTerm, effort: Effort) -> Pred {
        let a1start = self.start_term(t1);
        let a1end = self.end_term(t1);
        let a2start = self.start_term(t2);
        let a2end = self.end_term(t2);
        let res1 = self.find_point(a1start, a2end, effort);
        let res2 = self.find_point(a1end, a2start, effort);

        // Start and end both equal: the same time.
        if test_answer(Stem::Equal, res1) && test_answer(Stem::Equal, res2) {
            return Pred::same_time();
        }
        // Start of the first after the end of the second: after.
        if test_answer(Stem::After, res1) {
            return if res1.is_equiv() {
                Pred::of(Stem::After)
            } else {
                res1
            };
        }
        // End of the first before the start of the second: before.
        if test_answer(Stem::Before, res2) {
            return if res2.is_equiv() {
                Pred::of(Stem::Before)
            } else {
                res2
            };
        }
        Pred::unknown()
    }

    /// Interval relation between events and points, decided from the four
    /// endpoint relations with strictness carried through.
    fn find_relation(&self, t1: &QueryTerm, t2: &QueryTerm, effort: Effort) -> Pred {
        match (t1, t2) {
            (QueryTerm::Point(p), QueryTerm::Point(q)) if p == q => return Pred::same_time(),
            (QueryTerm::Event { name: n1, .. }, QueryTerm::Event { name: n2, .. })
                if n1 == n2 =>
            {
                return Pred::same_time()
            }
            _ => {}
        }
        let is1 = matches!(t1, QueryTerm::Event { .. });
        let is2 = matches!(t2, QueryTerm::Event { .. });
        let a1start = self.start_term(t1);
        let a1end = self.end_term(t1);
        let a2start = self.start_term(t2);
        let a2end = self.end_term(t2);

        let mut result = Pred::unknown();

        // End of the first before the start of the second: before. Two bare
        // points are fully decided by this one comparison.
        let e1s2 = self.find_point(a1end, a2start, effort);
        if test_answer(Stem::Before, e1s2) || (!is1 && !is2) {
            result = if e1s2.is_equiv() && (is1 || is2) {
                Pred::before(Strictness::Equal)
            } else {
                e1s2
            };
        }

        // Start of the first after the end of the second: after.
        if result.is_unknown() && (is1 || is2) {
            let s1e2 = self.find_point(a1start, a2end, effort);
            if test_answer(Stem::After, s1e2) {
                result = if s1e2.is_equiv() {
                    Pred::after(Strictness::Equal)
                } else {
                    s1e2
                };
            }

            if result.is_unknown() {
                let s1s2 = self.find_point(a1start, a2start, effort);
                let e1e2 = self.find_point(a1end, a2end, effort);
                if test_answer(Stem::Equal, s1s2) && test_answer(Stem::Equal, e1e2) {
                    result = Pred::same_time();
                } else {
                    let strict1 = if s1s2.is_equiv() {
                        Strictness::Equal
                    } else {
                        s1s2.strict1
                    };
                    let strict2 = if e1e2.is_equiv() {
                        Strictness::Equal
                    } else {
                        e1e2.strict1
                    };
                    // Starts after: during or overlapped-by, by the ends.
                    if test_answer(Stem::After, s1s2) {
                        if test_answer(Stem::Before, e1e2) {
                            result = Pred::build(Stem::During, strict1, strict2);
                        } else if test_answer(Stem::After, e1e2) {
                            result = Pred::build(Stem::OverlappedBy, strict1, strict2);
                        }
                    } else if test_answer(Stem::Before, s1s2) {
                        if test_answer(Stem::Before, e1e2) {
                            result = Pred::build(Stem::Overlaps, strict1, strict2);
                        } else if test_answer(Stem::After, e1e2) {
                            result = Pred::build(Stem::Contains, strict1, strict2);
                        }
                    }
                }
            }
        }
        result
    }

    /// Point relation: pseudo times, then absolute bounds, then path search.
    ///
    /// An equality read off the absolute bounds is kept as a backup while
    /// the search looks for an actual temporal order.
    pub(crate) fn find_reln(&self, p: PointId, q: PointId, effort: Effort) -> Pred {
        let mut result = Pred::unknown();
        let mut backup = Pred::unknown();
        if self.same_point(p, q) {
            result = Pred::same_time();
        } else if self.pt(p).chain == self.pt(q).chain {
            result = self.pt(p).find_pseudo(self.pt(q));
        }
        if result.is_unknown() {
            result = self.compare_absolute_times(p, q);
            if result.is_equiv() && effort.searches() {
                backup = result;
                result = Pred::unknown();
            }
        }
        if result.is_unknown() && effort.searches() {
            if let Some(strict) = self.search_path(p, q) {
                result = Pred::before(path_strictness(strict));
            } else if let Some(strict) = self.search_path(q, p) {
                result = Pred::after(path_strictness(strict));
            }
        }
        if result.is_unknown() && !backup.is_unknown() {
            result = backup;
        }
        result
    }

    /// Relation between two points read off their absolute bounds alone.
    pub(crate) fn compare_absolute_times(&self, p: PointId, q: PointId) -> Pred {
        let (min1, max1) = (self.pt(p).absolute_min, self.pt(p).absolute_max);
        let (min2, max2) = (self.pt(q).absolute_min, self.pt(q).absolute_max);
        let test1 = max2.compare(&min1);
        let test2 = max1.compare(&min2);
        let test3 = min1.compare(&min2);
        let test4 = max1.compare(&max2);

        // Max of p before min of q: p is before q.
        if test_answer(Stem::Before, test2) {
            if test2.is_equiv() {
                Pred::of(Stem::Before)
            } else {
                test2
            }
        // Max of q before min of p: p is after q.
        } else if test_answer(Stem::Before, test1) {
            if test1.is_equiv() || !test1.strict1.is_strict() {
                Pred::of(Stem::After)
            } else {
                Pred::after(Strictness::Strict)
            }
        // Both bounds coincide: the same time.
        } else if test_answer(Stem::Equal, test3) && test_answer(Stem::Equal, test4) {
            Pred::same_time()
        } else {
            Pred::unknown()
        }
    }

    // ------------------------------------------------------------------
    // Path search over the metagraph
    // ------------------------------------------------------------------

    /// Search for a before-path from `p` to `q` across chains. `Some(strict)`
    /// reports whether a strict leg occurs on the best path found.
    pub(crate) fn search_path(&self, p: PointId, q: PointId) -> Option<bool> {
        let mut rel_table = FxHashMap::default();
        let mut visited = FxHashSet::default();
        visited.insert(self.pt(p).chain);
        self.search_meta(p, q, &visited, None, &mut rel_table)
    }

    /// Depth-first search over the outgoing cross-chain connections of
    /// `tp1`'s chain.
    ///
    /// A strict path returns immediately; a non-strict one is remembered in
    /// the hope that a strict alternative turns up. `visited` is path-local;
    /// `rel_table` memoises results per origin point for this search only.
    fn search_meta(
        &self,
        tp1: PointId,
        tp2: PointId,
        visited: &FxHashSet<ChainId>,
        sofar: Option<bool>,
        rel_table: &mut FxHashMap<PointId, Option<bool>>,
    ) -> Option<bool> {
        if let Some(&memo) = rel_table.get(&tp1) {
            return memo;
        }
        let chain1 = self.pt(tp1).chain;
        let chain2 = self.pt(tp2).chain;
        let mut saved: Option<bool> = None;

        let connections: Vec<_> = self.meta_ref(chain1).connections.iter().collect();
        for l in connections {
            let from_pt = self.lk(l).from;
            let to_pt = self.lk(l).to;

            // The link is usable only if tp1 is at or before its origin.
            let path1 = self.pt(tp1).find_pseudo(self.pt(from_pt));
            if !test_answer(Stem::Before, path1) {
                continue;
            }
            let newsofar =
                sofar.unwrap_or(false) || path1.strict1.is_strict() || self.lk(l).strict;

            let to_chain = self.pt(to_pt).chain;
            let res = if to_chain == chain2 {
                // Landed on the target chain: does the link's endpoint reach
                // tp2 within it?
                let path = self.pt(to_pt).find_pseudo(self.pt(tp2));
                if test_answer(Stem::Before, path) {
                    Some(newsofar || path.strict1.is_strict())
                } else {
                    None
                }
            } else if !visited.contains(&to_chain) {
                let mut deeper = visited.clone();
                deeper.insert(to_chain);
                self.search_meta(to_pt, tp2, &deeper, Some(newsofar), rel_table)
            } else {
                None
            };

            match res {
                Some(true) => return Some(true),
                Some(false) => saved = Some(false),
                None => {}
            }
        }
        rel_table.insert(tp1, saved);
        saved
    }
}

/// Strictness suffix for a path answer: non-strict paths stay bare.
fn path_strictness(strict: bool) -> Strictness {
    if strict {
        Strictness::Strict
    } else {
        Strictness::Unknown
    }
}
