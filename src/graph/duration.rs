//! Elapsed-time queries.
//!
//! The duration between two points starts from what their absolute bounds
//! imply; when that range is loose and the caller asked for search effort, a
//! depth-first walk over descendant links sums per-link bounds and keeps the
//! tightest range found over all paths.

use rustc_hash::FxHashSet;

use crate::abstime::{combine_durations, get_best_duration, AbsTime, DurationRange};
use crate::node::{LinkId, PointId};
use crate::pred::Stem;

use super::query::EndTerm;
use super::{Effort, TimeArg, TimeGraph};

impl TimeGraph {
    /// Minimum and maximum seconds elapsed between the end of `a1` and the
    /// start of `a2`. Missing data degrades to `(0, +inf)`.
    pub fn elapsed(
        &self,
        a1: impl Into<TimeArg>,
        a2: impl Into<TimeArg>,
        effort: Effort,
    ) -> (f64, f64) {
        let t1 = self.resolve_query(a1.into());
        let t2 = self.resolve_query(a2.into());
        let e1 = self.end_term(&t1);
        let s2 = self.start_term(&t2);
        match (e1, s2) {
            (EndTerm::Pt(p), EndTerm::Pt(q)) => self.calc_duration(p, q, effort),
            (EndTerm::Missing, _) | (_, EndTerm::Missing) => (0.0, f64::INFINITY),
            (a, b) => self.duration_between_terms(a, b),
        }
    }

    /// Duration between two points. If the second point is derivably before
    /// the first, the pair is reversed.
    pub(crate) fn calc_duration(&self, p: PointId, q: PointId, effort: Effort) -> (f64, f64) {
        let (p, q) = if self.compare_absolute_times(p, q).stem == Stem::After {
            (q, p)
        } else {
            (p, q)
        };
        let mut durans = self.duration_between(p, q);
        if (durans.0 == 0.0 || durans.1 == 0.0 || durans.1.is_infinite()) && effort.searches() {
            let mut visited = FxHashSet::default();
            visited.insert(p);
            let searched = self.search_for_duration(p, q, None, &mut visited);
            if let Some(best) = get_best_duration(Some(durans), searched) {
                durans = best;
            }
        }
        normalize(durans)
    }

    /// The duration range implied by two points' absolute bounds.
    pub(crate) fn duration_between(&self, p: PointId, q: PointId) -> DurationRange {
        let (min1, max1) = (self.pt(p).absolute_min, self.pt(p).absolute_max);
        let (min2, max2) = (self.pt(q).absolute_min, self.pt(q).absolute_max);
        (max1.calc_duration_min(&min2), min1.calc_duration_max(&max2))
    }

    fn duration_between_terms(&self, a: EndTerm, b: EndTerm) -> (f64, f64) {
        let Some((min1, max1)) = self.bounds_of(a) else {
            return (0.0, f64::INFINITY);
        };
        let Some((min2, max2)) = self.bounds_of(b) else {
            return (0.0, f64::INFINITY);
        };
        normalize((max1.calc_duration_min(&min2), min1.calc_duration_max(&max2)))
    }

    fn bounds_of(&self, t: EndTerm) -> Option<(AbsTime, AbsTime)> {
        match t {
            EndTerm::Pt(p) => Some((self.pt(p).absolute_min, self.pt(p).absolute_max)),
            EndTerm::Abs(a) => Some((a, a)),
            EndTerm::Missing => None,
        }
    }

    /// Best duration range along any descendant path from `tp1` to `tp2`,
    /// without revisiting points on the current path.
    fn search_for_duration(
        &self,
        tp1: PointId,
        tp2: PointId,
        dur: Option<DurationRange>,
        visited: &mut FxHashSet<PointId>,
    ) -> Option<DurationRange> {
        let mut usedur = None;
        let links: Vec<LinkId> = self
            .pt(tp1)
            .descendants
            .iter()
            .chain(self.pt(tp1).xdescendants.iter())
            .collect();
        for l in links {
            let to_pt = self.lk(l).to;
            if visited.contains(&to_pt) {
                continue;
            }
            let linkdur = self.link_duration(l);
            let curdur = match dur {
                Some(d) => combine_durations(d, linkdur),
                None => linkdur,
            };
            if self.same_point(to_pt, tp2) {
                usedur = get_best_duration(usedur, Some(curdur));
            } else {
                visited.insert(to_pt);
                let deeper = self.search_for_duration(to_pt, tp2, Some(curdur), visited);
                usedur = get_best_duration(usedur, deeper);
                visited.remove(&to_pt);
            }
        }
        usedur
    }

    /// A link's duration range: the tighter of its stored bounds and what
    /// the endpoint absolute times imply.
    fn link_duration(&self, l: LinkId) -> DurationRange {
        let (from, to) = (self.lk(l).from, self.lk(l).to);
        let absdur = self.duration_between(from, to);
        let stored = (self.lk(l).duration_min, self.lk(l).duration_max);
        get_best_duration(Some(absdur), Some(stored)).unwrap_or((0.0, f64::INFINITY))
    }
}

/// Clamp a duration answer into `0 <= min <= max <= +inf`; a degenerate
/// zero maximum reads as "no information".
fn normalize((durmin, durmax): DurationRange) -> (f64, f64) {
    let durmin = if durmin.is_finite() && durmin > 0.0 {
        durmin
    } else {
        0.0
    };
    let durmax = if durmax > 0.0 { durmax } else { f64::INFINITY };
    (durmin, durmax.max(durmin))
}
