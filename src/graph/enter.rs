//! Entry of temporal assertions.
//!
//! `enter` rewrites high-level interval predicates into point-level
//! primitives (equal, before, between), placing new points so that the
//! number of chains stays small: an existing chain is extended whenever the
//! reference point is terminal in it, and a fresh chain is started only when
//! no such placement exists.

use crate::abstime::AbsTime;
use crate::error::{Result, TimegraphError};
use crate::node::PointId;
use crate::pred::{Pred, Stem, Strictness};

use super::TimeGraph;

/// A polymorphic argument to [`TimeGraph::enter`]: a point or event name, a
/// point reference, an absolute time, or a seconds count for
/// duration-constrained predicates. Events are referred to by name.
#[derive(Debug, Clone)]
pub enum TimeArg {
    Name(String),
    Point(PointId),
    Abs(AbsTime),
    Seconds(f64),
}

impl From<&str> for TimeArg {
    fn from(name: &str) -> TimeArg {
        TimeArg::Name(name.to_string())
    }
}

impl From<PointId> for TimeArg {
    fn from(id: PointId) -> TimeArg {
        TimeArg::Point(id)
    }
}

impl From<String> for TimeArg {
    fn from(name: String) -> TimeArg {
        TimeArg::Name(name)
    }
}

impl From<AbsTime> for TimeArg {
    fn from(abs: AbsTime) -> TimeArg {
        TimeArg::Abs(abs)
    }
}

impl From<f64> for TimeArg {
    fn from(secs: f64) -> TimeArg {
        TimeArg::Seconds(secs)
    }
}

/// An argument resolved against the registries: events widen to their
/// endpoint names, bare names denote (possibly still unseen) points.
#[derive(Debug, Clone)]
enum Operand {
    Span { start: String, end: String },
    Abs(AbsTime),
    Seconds(f64),
}

impl Operand {
    fn span(self, what: &str) -> Result<(String, String)> {
        match self {
            Operand::Span { start, end } => Ok((start, end)),
            other => Err(TimegraphError::InvalidArgument(format!(
                "{} requires a point or event, got {:?}",
                what, other
            ))),
        }
    }
}

impl TimeGraph {
    /// Enter the assertion `a1 reln a2`, where `reln` is a predicate string
    /// such as `before`, `before-1`, `during-0-1`, or `same-time`.
    ///
    /// Returns whether the assertion was applied. An assertion that
    /// contradicts the relation already derivable between its endpoints is
    /// weakened to equality rather than rejected.
    pub fn enter(
        &mut self,
        a1: impl Into<TimeArg>,
        reln: &str,
        a2: impl Into<TimeArg>,
    ) -> Result<bool> {
        self.enter_parts(a1.into(), reln, a2.into(), None)
    }

    /// Three-argument form of [`enter`](Self::enter): `between` takes two
    /// reference arguments, duration-constrained predicates take a seconds
    /// count, and `before`/`after` accept a second reference bounding the
    /// other side.
    pub fn enter3(
        &mut self,
        a1: impl Into<TimeArg>,
        reln: &str,
        a2: impl Into<TimeArg>,
        a3: impl Into<TimeArg>,
    ) -> Result<bool> {
        self.enter_parts(a1.into(), reln, a2.into(), Some(a3.into()))
    }

    fn enter_parts(
        &mut self,
        a1: TimeArg,
        reln: &str,
        a2: TimeArg,
        a3: Option<TimeArg>,
    ) -> Result<bool> {
        let pred: Pred = reln.parse()?;
        if pred.stem == Stem::Unknown {
            return Err(TimegraphError::UnsupportedPredicate(reln.to_string()));
        }
        let r1 = self.resolve_arg(a1);
        let r2 = self.resolve_arg(a2);
        let r3 = a3.map(|a| self.resolve_arg(a));
        let accepted = self.dispatch(pred, r1, r2, r3)?;
        if accepted {
            self.entries += 1;
        }
        Ok(accepted)
    }

    fn resolve_arg(&self, arg: TimeArg) -> Operand {
        match arg {
            TimeArg::Name(n) => match self.events.get(&n) {
                Some(ev) => Operand::Span {
                    start: ev.start.clone(),
                    end: ev.end.clone(),
                },
                None => Operand::Span {
                    start: n.clone(),
                    end: n,
                },
            },
            TimeArg::Point(id) => {
                let name = self.pt(id).name.clone();
                Operand::Span {
                    start: name.clone(),
                    end: name,
                }
            }
            TimeArg::Abs(a) => Operand::Abs(a),
            TimeArg::Seconds(s) => Operand::Seconds(s),
        }
    }

    fn dispatch(
        &mut self,
        pred: Pred,
        a1: Operand,
        a2: Operand,
        a3: Option<Operand>,
    ) -> Result<bool> {
        let (stem, s1, s2) = pred.split();
        if stem.is_equiv() {
            return self.enter_equal(a1, a2);
        }
        if stem.is_constrained() {
            return self.enter_constrained(stem, a1, a2, a3, s1);
        }
        match stem {
            Stem::Before => match a3 {
                // Between two references: a1 after a3, before a2.
                Some(lo) => self.enter_between_refs(a1, lo, a2, Strictness::Unknown, s1),
                None => self.enter_before(a1, a2, s1),
            },
            Stem::After => match a3 {
                Some(hi) => self.enter_between_refs(a1, a2, hi, s1, Strictness::Unknown),
                None => self.enter_after(a1, a2, s1),
            },
            Stem::During => self.enter_during(a1, a2, s1, s2),
            Stem::Contains => self.enter_contains(a1, a2, s1, s2),
            Stem::Overlaps => self.enter_overlaps(a1, a2, s1, s2),
            Stem::OverlappedBy => self.enter_overlapped_by(a1, a2, s1, s2),
            Stem::Between => {
                let a3 = a3.ok_or_else(|| {
                    TimegraphError::InvalidArgument(
                        "between requires two reference arguments".into(),
                    )
                })?;
                self.enter_between_refs(a1, a2, a3, s1, s2)
            }
            _ => Err(TimegraphError::UnsupportedPredicate(
                stem.as_str().to_string(),
            )),
        }
    }

    fn enter_equal(&mut self, a1: Operand, a2: Operand) -> Result<bool> {
        match (a1, a2) {
            (Operand::Span { start: s1, end: e1 }, Operand::Span { start: s2, end: e2 }) => {
                self.add_equal(&s1, &s2)?;
                if !(s1 == e1 && s2 == e2) {
                    self.add_equal(&e1, &e2)?;
                }
                Ok(true)
            }
            (Operand::Span { start, end }, Operand::Abs(t))
            | (Operand::Abs(t), Operand::Span { start, end }) => {
                self.add_absolute_min(&start, t);
                self.add_absolute_max(&start, t);
                if end != start {
                    self.add_absolute_min(&end, t);
                    self.add_absolute_max(&end, t);
                }
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    fn enter_before(&mut self, a1: Operand, a2: Operand, s1: Strictness) -> Result<bool> {
        match (a1, a2) {
            (Operand::Span { end, .. }, Operand::Span { start, .. }) => {
                self.add_before(&end, &start, s1)
            }
            (Operand::Span { end, .. }, Operand::Abs(t)) => {
                self.add_absolute_max(&end, t);
                Ok(true)
            }
            (Operand::Abs(t), Operand::Span { start, .. }) => {
                self.add_absolute_min(&start, t);
                Ok(true)
            }
            (Operand::Abs(_), Operand::Abs(_)) => Ok(false),
            _ => Err(TimegraphError::InvalidArgument(
                "before requires points, events, or absolute times".into(),
            )),
        }
    }

    fn enter_after(&mut self, a1: Operand, a2: Operand, s1: Strictness) -> Result<bool> {
        match (a1, a2) {
            (Operand::Span { start, .. }, Operand::Span { end, .. }) => {
                self.add_before(&end, &start, s1)
            }
            (Operand::Span { start, .. }, Operand::Abs(t)) => {
                self.add_absolute_min(&start, t);
                Ok(true)
            }
            (Operand::Abs(t), Operand::Span { end, .. }) => {
                self.add_absolute_max(&end, t);
                Ok(true)
            }
            (Operand::Abs(_), Operand::Abs(_)) => Ok(false),
            _ => Err(TimegraphError::InvalidArgument(
                "after requires points, events, or absolute times".into(),
            )),
        }
    }

    fn enter_during(
        &mut self,
        a1: Operand,
        a2: Operand,
        s1: Strictness,
        s2: Strictness,
    ) -> Result<bool> {
        match (a1, a2) {
            (Operand::Span { start: s, end: e }, Operand::Span { start: bs, end: be }) => {
                self.add_between(&s, &bs, &be, s1, Strictness::Unknown)?;
                self.add_between(&e, &s, &be, Strictness::Unknown, s2)?;
                Ok(true)
            }
            (Operand::Span { start, end }, Operand::Abs(t)) => {
                self.add_absolute_min(&start, t);
                self.add_absolute_max(&end, t);
                Ok(true)
            }
            (Operand::Abs(t), Operand::Span { start, end }) => {
                self.add_absolute_max(&start, t);
                self.add_absolute_min(&end, t);
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    fn enter_contains(
        &mut self,
        a1: Operand,
        a2: Operand,
        s1: Strictness,
        s2: Strictness,
    ) -> Result<bool> {
        match (a1, a2) {
            (Operand::Span { start: s, end: e }, Operand::Span { start: bs, end: be }) => {
                self.add_before(&s, &bs, s1)?;
                self.add_before(&be, &e, s2)?;
                Ok(true)
            }
            (Operand::Span { start, end }, Operand::Abs(t)) => {
                self.add_absolute_max(&start, t);
                self.add_absolute_min(&end, t);
                Ok(true)
            }
            (Operand::Abs(t), Operand::Span { start, end }) => {
                self.add_absolute_min(&start, t);
                self.add_absolute_max(&end, t);
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    fn enter_overlaps(
        &mut self,
        a1: Operand,
        a2: Operand,
        s1: Strictness,
        s2: Strictness,
    ) -> Result<bool> {
        match (a1, a2) {
            (Operand::Span { start: s, end: e }, Operand::Span { start: bs, end: be }) => {
                self.add_between(&e, &bs, &be, Strictness::Unknown, s2)?;
                self.add_before(&s, &bs, s1)?;
                Ok(true)
            }
            (Operand::Span { start, end }, Operand::Abs(t)) => {
                // a1 starts before the span of t and ends inside it.
                self.add_absolute_max(&start, t);
                self.add_absolute_min(&end, t);
                self.add_absolute_max(&end, t);
                Ok(true)
            }
            (Operand::Abs(t), Operand::Span { start, end }) => {
                // t overlaps a2: a2 starts inside t and ends after it.
                self.add_absolute_min(&start, t);
                self.add_absolute_max(&start, t);
                self.add_absolute_min(&end, t);
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    fn enter_overlapped_by(
        &mut self,
        a1: Operand,
        a2: Operand,
        s1: Strictness,
        s2: Strictness,
    ) -> Result<bool> {
        match (a1, a2) {
            (Operand::Span { start: s, end: e }, Operand::Span { start: bs, end: be }) => {
                self.add_between(&s, &bs, &be, s1, Strictness::Unknown)?;
                self.add_before(&be, &e, s2)?;
                Ok(true)
            }
            (Operand::Span { start, end }, Operand::Abs(t)) => {
                // a1 starts inside the span of t and ends after it.
                self.add_absolute_min(&start, t);
                self.add_absolute_max(&start, t);
                self.add_absolute_min(&end, t);
                Ok(true)
            }
            (Operand::Abs(t), Operand::Span { start, end }) => {
                // t overlapped by a2: a2 starts before t and ends inside it.
                self.add_absolute_max(&start, t);
                self.add_absolute_min(&end, t);
                self.add_absolute_max(&end, t);
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    /// Place `x` between the references `lo` and `hi`, with either
    /// reference allowed to be an absolute time.
    ///
    /// A bare point sits directly between `lo.end` and `hi.start`; an event
    /// contributes both endpoints, its start after `lo` and its end before
    /// `hi`, so the whole interval lands between the references.
    fn enter_between_refs(
        &mut self,
        x: Operand,
        lo: Operand,
        hi: Operand,
        s1: Strictness,
        s2: Strictness,
    ) -> Result<bool> {
        enum Ref {
            Name(String),
            Abs(AbsTime),
        }
        let to_ref = |op: Operand, end_side: bool| match op {
            Operand::Span { start, end } => Ok(Ref::Name(if end_side { end } else { start })),
            Operand::Abs(t) => Ok(Ref::Abs(t)),
            _ => Err(TimegraphError::InvalidArgument(
                "between references must be points, events, or absolute times".into(),
            )),
        };
        let (x_start, x_end) = x.span("between")?;
        let lo_ref = to_ref(lo, true)?;
        let hi_ref = to_ref(hi, false)?;
        match (lo_ref, hi_ref) {
            (Ref::Name(lo_name), Ref::Name(hi_name)) => {
                if x_start == x_end {
                    self.add_between(&x_end, &lo_name, &hi_name, s1, s2)?;
                } else {
                    self.add_between(&x_start, &lo_name, &hi_name, s1, Strictness::Unknown)?;
                    self.add_between(&x_end, &x_start, &hi_name, Strictness::Unknown, s2)?;
                }
            }
            (Ref::Abs(t), Ref::Name(hi_name)) => {
                self.add_absolute_min(&x_start, t);
                self.add_before(&x_end, &hi_name, s2)?;
            }
            (Ref::Name(lo_name), Ref::Abs(t)) => {
                self.add_absolute_max(&x_end, t);
                self.add_before(&lo_name, &x_start, s1)?;
            }
            (Ref::Abs(t1), Ref::Abs(t2)) => {
                self.add_absolute_min(&x_start, t1);
                self.add_absolute_max(&x_end, t2);
            }
        }
        Ok(true)
    }

    fn enter_constrained(
        &mut self,
        stem: Stem,
        a1: Operand,
        a2: Operand,
        a3: Option<Operand>,
        s1: Strictness,
    ) -> Result<bool> {
        let d = match a3 {
            Some(Operand::Seconds(s)) if s >= 0.0 => s,
            _ => {
                return Err(TimegraphError::InvalidArgument(format!(
                    "{} requires a nonnegative seconds argument",
                    stem.as_str()
                )))
            }
        };
        let (start1, end1) = a1.span(stem.as_str())?;
        let (start2, end2) = a2.span(stem.as_str())?;
        // The before-forms constrain a1.end -> a2.start, the after-forms
        // a2.end -> a1.start.
        let (from, to) = if stem.is_constrained_before() {
            (end1, start2)
        } else {
            (end2, start1)
        };
        // Sequence first, then the duration constraint on the same link.
        self.add_before(&from, &to, s1)?;
        match stem {
            Stem::AtLeastBefore | Stem::AtLeastAfter => {
                self.add_duration_min(&from, &to, d)?;
            }
            Stem::AtMostBefore | Stem::AtMostAfter => {
                self.add_duration_max(&from, &to, d)?;
            }
            Stem::ExactlyBefore | Stem::ExactlyAfter => {
                self.add_duration_min(&from, &to, d)?;
                self.add_duration_max(&from, &to, d)?;
            }
            _ => {}
        }
        Ok(true)
    }

    // ------------------------------------------------------------------
    // Point-level primitives
    // ------------------------------------------------------------------

    /// Assert that two named points are the same instant.
    ///
    /// A fresh name becomes an alias of the existing point. Two existing
    /// points on one chain collapse the whole in-chain path between them
    /// into the earlier point; across chains the second point's links and
    /// bounds move onto the first.
    pub(crate) fn add_equal(&mut self, n1: &str, n2: &str) -> Result<bool> {
        if n1 == n2 {
            return Ok(true);
        }
        let p_opt = self.names.get(n1).copied();
        let q_opt = self.names.get(n2).copied();
        match (p_opt, q_opt) {
            (None, None) => {
                let p = self.add_single(n1);
                self.alias(n2, p);
            }
            (Some(p), None) => self.alias(n2, p),
            (None, Some(q)) => self.alias(n1, q),
            (Some(p), Some(q)) => {
                if self.same_point(p, q) {
                    return Ok(true);
                }
                if self.pt(p).chain == self.pt(q).chain {
                    let (early, late) = if self.pt(p).pseudo < self.pt(q).pseudo {
                        (p, q)
                    } else {
                        (q, p)
                    };
                    self.collapse_chain_path(early, late);
                } else {
                    self.collapse_cross(p, q);
                }
            }
        }
        Ok(true)
    }

    fn alias(&mut self, name: &str, p: PointId) {
        self.names.insert(name.to_string(), p);
        self.pt_mut(p).alternate_names.push(name.to_string());
    }

    /// Collapse every point on the in-chain path `(survivor, until]` into
    /// `survivor`, tightening its pseudo bounds and absolute bounds to the
    /// strictest of the merged points.
    fn collapse_chain_path(&mut self, survivor: PointId, until: PointId) {
        let mut path = Vec::new();
        let mut cur = survivor;
        while !self.same_point(cur, until) {
            let Some(link) = self.pt(cur).descendants.first() else {
                break;
            };
            cur = self.lk(link).to;
            path.push(cur);
            if path.len() > self.points.len() {
                break;
            }
        }
        for m in path {
            let (m_min, m_max) = (self.pt(m).min_pseudo, self.pt(m).max_pseudo);
            {
                let s = self.pt_mut(survivor);
                s.min_pseudo = s.min_pseudo.max(m_min);
                s.max_pseudo = s.max_pseudo.min(m_max);
            }
            let abs_min = self.pt(m).absolute_min;
            let abs_max = self.pt(m).absolute_max;
            self.copy_links(m, survivor);
            self.update_absolute_min(survivor, abs_min);
            self.update_absolute_max(survivor, abs_max);
            self.remap_name(m, survivor);
        }
    }

    /// Merge `q` (on another chain) into `survivor`: links are
    /// re-partitioned against the surviving chain, bounds merged, and the
    /// abandoned chain's first pointer advanced past `q`.
    fn collapse_cross(&mut self, survivor: PointId, q: PointId) {
        let q_chain = self.pt(q).chain;
        if self.meta_ref(q_chain).first == Some(q) {
            let next = self.pt(q).descendants.first().map(|l| self.lk(l).to);
            self.meta_mut(q_chain).first = next;
        }
        let abs_min = self.pt(q).absolute_min;
        let abs_max = self.pt(q).absolute_max;
        self.copy_links(q, survivor);
        self.update_absolute_min(survivor, abs_min);
        self.update_absolute_max(survivor, abs_max);
        self.remap_name(q, survivor);
    }

    fn remap_name(&mut self, dead: PointId, survivor: PointId) {
        let dead_name = self.pt(dead).name.clone();
        let alts: Vec<String> = self.pt_mut(dead).alternate_names.drain(..).collect();
        self.names.insert(dead_name.clone(), survivor);
        self.pt_mut(survivor).alternate_names.push(dead_name);
        for alt in alts {
            self.names.insert(alt.clone(), survivor);
            self.pt_mut(survivor).alternate_names.push(alt);
        }
        self.pt_mut(dead).collapsed = true;
    }

    /// Assert that point `n1` is before point `n2`, creating missing points
    /// adjacent on an existing chain where possible.
    pub(crate) fn add_before(&mut self, n1: &str, n2: &str, strict: Strictness) -> Result<bool> {
        let strict_b = strict.is_strict();
        let p_opt = self.names.get(n1).copied();
        let q_opt = self.names.get(n2).copied();
        match (p_opt, q_opt) {
            (Some(p), Some(q)) => {
                if self.same_point(p, q) {
                    return Ok(true);
                }
                if self.check_inconsistent(p, q) {
                    log::warn!(
                        "assertion {} before {} contradicts the derivable order; \
                         weakening to equal",
                        n1,
                        n2
                    );
                    return self.add_equal(n1, n2);
                }
                self.link_before(p, q, strict_b);
            }
            (Some(p), None) => {
                let q = if self.pt(p).last_in_chain() {
                    let chain = self.pt(p).chain;
                    let pseudo = self.pt(p).pseudo_after(&self.config);
                    self.new_point_on_chain(n2, chain, pseudo)
                } else {
                    self.add_single(n2)
                };
                self.link_before(p, q, strict_b);
            }
            (None, Some(q)) => {
                let p = if self.pt(q).first_in_chain() {
                    let chain = self.pt(q).chain;
                    let pseudo = self.pt(q).pseudo_before(&self.config);
                    self.new_point_on_chain(n1, chain, pseudo)
                } else {
                    self.add_single(n1)
                };
                self.link_before(p, q, strict_b);
            }
            (None, None) => {
                let p = self.add_single(n1);
                let chain = self.pt(p).chain;
                let pseudo = self.pt(p).pseudo_after(&self.config);
                let q = self.new_point_on_chain(n2, chain, pseudo);
                self.link_before(p, q, strict_b);
            }
        }
        Ok(true)
    }

    /// Link `p` before `q`: add the edge, flow absolute bounds across it,
    /// and record strictness on a shared chain.
    pub(crate) fn link_before(&mut self, p: PointId, q: PointId, strict: bool) {
        if self.same_point(p, q) {
            return;
        }
        let same_chain = self.pt(p).chain == self.pt(q).chain;
        if same_chain && self.pt(q).pseudo < self.pt(p).pseudo {
            log::warn!(
                "ignoring backward ordering of {} before {}",
                self.pt(p).name,
                self.pt(q).name
            );
            return;
        }
        self.add_link(p, q, strict);
        let p_min = self.pt(p).absolute_min;
        self.update_absolute_min(q, p_min);
        let q_max = self.pt(q).absolute_max;
        self.update_absolute_max(p, q_max);
        if same_chain && strict {
            self.add_strictness(p, q);
        }
    }

    /// Whether the relation already derivable between `p` and `q` orders
    /// them opposite to a new `p` before `q` assertion.
    fn check_inconsistent(&self, p: PointId, q: PointId) -> bool {
        self.find_reln(p, q, super::Effort::Search).stem == Stem::After
    }

    /// Assert `lo <= mid <= hi`, placing a fresh middle point on an existing
    /// chain whenever the references allow it.
    pub(crate) fn add_between(
        &mut self,
        mid: &str,
        lo: &str,
        hi: &str,
        s1: Strictness,
        s2: Strictness,
    ) -> Result<bool> {
        let lo_id = self.ensure_point(lo);
        let hi_id = self.ensure_point(hi);
        if self.names.get(mid).is_none() {
            let lo_chain = self.pt(lo_id).chain;
            let hi_chain = self.pt(hi_id).chain;
            if lo_chain == hi_chain
                && self.pt(lo_id).pseudo < self.pt(hi_id).pseudo
                && self.adjacent(lo_id, hi_id)
            {
                let pseudo = self.pseudo_between(lo_id, hi_id);
                self.new_point_on_chain(mid, lo_chain, pseudo);
            } else if self.pt(lo_id).last_in_chain() {
                let pseudo = self.pt(lo_id).pseudo_after(&self.config);
                self.new_point_on_chain(mid, lo_chain, pseudo);
            } else if self.pt(hi_id).first_in_chain() {
                let pseudo = self.pt(hi_id).pseudo_before(&self.config);
                self.new_point_on_chain(mid, hi_chain, pseudo);
            } else {
                self.add_single(mid);
            }
        }
        let mid_id = self.ensure_point(mid);
        self.link_before(lo_id, mid_id, s1.is_strict());
        self.link_before(mid_id, hi_id, s2.is_strict());
        Ok(true)
    }

    /// Whether `hi` is the immediate in-chain successor of `lo`.
    fn adjacent(&self, lo: PointId, hi: PointId) -> bool {
        match self.pt(lo).descendants.first() {
            Some(l) => self.same_point(self.lk(l).to, hi),
            None => false,
        }
    }

    /// Tighten the lower absolute bound of the named point, creating it on a
    /// fresh chain when the name is new.
    pub fn add_absolute_min(&mut self, name: &str, abs: AbsTime) {
        let p = self.ensure_point(name);
        self.update_absolute_min(p, abs);
    }

    /// Tighten the upper absolute bound of the named point, creating it on a
    /// fresh chain when the name is new.
    pub fn add_absolute_max(&mut self, name: &str, abs: AbsTime) {
        let p = self.ensure_point(name);
        self.update_absolute_max(p, abs);
    }
}
