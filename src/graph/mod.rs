//! Core timegraph implementation.
//!
//! This module defines the main [`TimeGraph`] type: the arenas owning every
//! point, link, and chain, the name registries, and the low-level chain and
//! propagation machinery. Entry and query operations live in the sibling
//! modules.

use std::fmt::Write as _;

use rustc_hash::FxHashMap;

use crate::abstime::{combine_min_duration, AbsTime};
use crate::config::{Config, GraphStats};
use crate::link::{InsertOutcome, LinkKey, TimeLink, TimeLinkList};
use crate::node::{ChainId, EventPoint, LinkId, MetaNode, PointId, TimePoint};

mod duration;
mod enter;
mod query;

pub use enter::TimeArg;
pub use query::Effort;

/// Which of a point's four link lists an operation targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum LinkKind {
    Ancestors,
    Descendants,
    XAncestors,
    XDescendants,
}

impl LinkKind {
    fn is_descendant(self) -> bool {
        matches!(self, LinkKind::Descendants | LinkKind::XDescendants)
    }

    /// The list holding the same link at the other endpoint.
    fn opposite(self) -> LinkKind {
        match self {
            LinkKind::Ancestors => LinkKind::Descendants,
            LinkKind::Descendants => LinkKind::Ancestors,
            LinkKind::XAncestors => LinkKind::XDescendants,
            LinkKind::XDescendants => LinkKind::XAncestors,
        }
    }
}

/// An incremental graph of time points and events.
///
/// Points are grouped into totally-ordered chains; pseudo times make
/// same-chain comparisons constant-time, and a metagraph of cross-chain
/// links supports path search between chains. Assertions are entered with
/// [`enter`](TimeGraph::enter) and queried with
/// [`relation`](TimeGraph::relation) and [`elapsed`](TimeGraph::elapsed).
///
/// # Example
///
/// ```rust
/// use timegraph::{Effort, TimeGraph};
///
/// let mut tg = TimeGraph::new();
/// tg.register_event("e1");
/// tg.register_event("e2");
/// tg.enter("e1", "before-1", "e2").unwrap();
/// assert_eq!(tg.relation("e1", "e2", Effort::Search).to_string(), "before-1");
/// ```
pub struct TimeGraph {
    config: Config,
    points: Vec<TimePoint>,
    links: Vec<TimeLink>,
    chains: Vec<MetaNode>,
    names: FxHashMap<String, PointId>,
    events: FxHashMap<String, EventPoint>,
    entries: u64,
}

impl Default for TimeGraph {
    fn default() -> Self {
        Self::new()
    }
}

impl TimeGraph {
    pub fn new() -> TimeGraph {
        TimeGraph::with_config(Config::default())
    }

    pub fn with_config(config: Config) -> TimeGraph {
        TimeGraph {
            config,
            points: Vec::new(),
            links: Vec::new(),
            chains: Vec::new(),
            names: FxHashMap::default(),
            events: FxHashMap::default(),
            entries: 0,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Resolve a name (primary or alternate) to its point.
    pub fn time_point(&self, name: &str) -> Option<PointId> {
        self.names.get(name).copied()
    }

    /// The event registered under `name`, if any.
    pub fn event_point(&self, name: &str) -> Option<&EventPoint> {
        self.events.get(name)
    }

    pub fn point(&self, id: PointId) -> Option<&TimePoint> {
        self.points.get(id.0 as usize)
    }

    pub fn meta(&self, id: ChainId) -> Option<&MetaNode> {
        self.chains.get(id.0 as usize)
    }

    pub fn link(&self, id: LinkId) -> Option<&TimeLink> {
        self.links.get(id.0 as usize)
    }

    /// Name of the start point of `name` (the event's start, or the point
    /// itself).
    pub fn start_of(&self, name: &str) -> Option<&str> {
        if let Some(ev) = self.events.get(name) {
            Some(&ev.start)
        } else {
            self.names
                .get(name)
                .map(|&id| self.pt(id).name.as_str())
        }
    }

    /// Name of the end point of `name` (the event's end, or the point
    /// itself).
    pub fn end_of(&self, name: &str) -> Option<&str> {
        if let Some(ev) = self.events.get(name) {
            Some(&ev.end)
        } else {
            self.names
                .get(name)
                .map(|&id| self.pt(id).name.as_str())
        }
    }

    /// Ids of all live (non-collapsed) points.
    pub fn point_ids(&self) -> impl Iterator<Item = PointId> + '_ {
        (0..self.points.len() as u32)
            .map(PointId)
            .filter(|&id| !self.pt(id).collapsed)
    }

    /// Ids of all chains.
    pub fn chain_ids(&self) -> impl Iterator<Item = ChainId> + '_ {
        (0..self.chains.len() as u32).map(ChainId)
    }

    pub fn stats(&self) -> GraphStats {
        GraphStats {
            points: self.points.iter().filter(|p| !p.collapsed).count(),
            chains: self.chains.len(),
            events: self.events.len(),
            entries: self.entries,
        }
    }

    // ------------------------------------------------------------------
    // Arena access
    // ------------------------------------------------------------------

    pub(crate) fn pt(&self, id: PointId) -> &TimePoint {
        &self.points[id.0 as usize]
    }

    pub(crate) fn pt_mut(&mut self, id: PointId) -> &mut TimePoint {
        &mut self.points[id.0 as usize]
    }

    pub(crate) fn lk(&self, id: LinkId) -> &TimeLink {
        &self.links[id.0 as usize]
    }

    pub(crate) fn lk_mut(&mut self, id: LinkId) -> &mut TimeLink {
        &mut self.links[id.0 as usize]
    }

    pub(crate) fn meta_ref(&self, id: ChainId) -> &MetaNode {
        &self.chains[id.0 as usize]
    }

    fn meta_mut(&mut self, id: ChainId) -> &mut MetaNode {
        &mut self.chains[id.0 as usize]
    }

    fn list(&self, owner: PointId, kind: LinkKind) -> &TimeLinkList {
        let p = self.pt(owner);
        match kind {
            LinkKind::Ancestors => &p.ancestors,
            LinkKind::Descendants => &p.descendants,
            LinkKind::XAncestors => &p.xancestors,
            LinkKind::XDescendants => &p.xdescendants,
        }
    }

    fn list_mut(&mut self, owner: PointId, kind: LinkKind) -> &mut TimeLinkList {
        let p = self.pt_mut(owner);
        match kind {
            LinkKind::Ancestors => &mut p.ancestors,
            LinkKind::Descendants => &mut p.descendants,
            LinkKind::XAncestors => &mut p.xancestors,
            LinkKind::XDescendants => &mut p.xdescendants,
        }
    }

    /// Two ids denote the same point when they coincide in chain and pseudo
    /// time (collapse can leave several ids at one position).
    pub(crate) fn same_point(&self, p: PointId, q: PointId) -> bool {
        p == q || (self.pt(p).chain == self.pt(q).chain && self.pt(p).pseudo == self.pt(q).pseudo)
    }

    pub(crate) fn link_key(&self, id: LinkId) -> LinkKey {
        let l = self.lk(id);
        self.endpoint_key(l.from, l.to)
    }

    fn endpoint_key(&self, from: PointId, to: PointId) -> LinkKey {
        let f = self.pt(from);
        let t = self.pt(to);
        (f.chain.0, f.pseudo, t.chain.0, t.pseudo)
    }

    // ------------------------------------------------------------------
    // Point and chain creation
    // ------------------------------------------------------------------

    fn newchain(&mut self) -> ChainId {
        let id = ChainId(self.chains.len() as u32);
        self.chains.push(MetaNode::new(id));
        id
    }

    /// Add a single point on a fresh chain. Returns the existing point if
    /// the name is already known.
    pub fn add_single(&mut self, name: &str) -> PointId {
        if let Some(&id) = self.names.get(name) {
            return id;
        }
        let chain = self.newchain();
        self.new_point_on_chain(name, chain, self.config.pseudo_init)
    }

    pub(crate) fn new_point_on_chain(
        &mut self,
        name: &str,
        chain: ChainId,
        pseudo: i64,
    ) -> PointId {
        let id = PointId(self.points.len() as u32);
        self.points.push(TimePoint::new(name, chain, pseudo));
        self.names.insert(name.to_string(), id);
        self.update_first(id);
        id
    }

    pub(crate) fn ensure_point(&mut self, name: &str) -> PointId {
        match self.names.get(name) {
            Some(&id) => id,
            None => self.add_single(name),
        }
    }

    /// Register an event, creating its start and end points on a fresh chain
    /// (start non-strictly before end) when they do not already exist.
    pub fn register_event(&mut self, name: &str) -> &EventPoint {
        if !self.events.contains_key(name) {
            let ev = EventPoint::new(name);
            let start = self.ensure_point(&ev.start);
            let end = match self.names.get(&ev.end) {
                Some(&id) => id,
                None => {
                    let chain = self.pt(start).chain;
                    let pseudo = self.pt(start).pseudo_after(&self.config);
                    self.new_point_on_chain(&ev.end, chain, pseudo)
                }
            };
            self.add_link(start, end, false);
            self.events.insert(name.to_string(), ev);
        }
        &self.events[name]
    }

    /// Keep the chain's `first` pointer on its earliest point.
    pub(crate) fn update_first(&mut self, p: PointId) {
        let chain = self.pt(p).chain;
        let pseudo = self.pt(p).pseudo;
        match self.meta_ref(chain).first {
            None => self.meta_mut(chain).first = Some(p),
            Some(cur) => {
                if pseudo < self.pt(cur).pseudo {
                    self.meta_mut(chain).first = Some(p);
                }
            }
        }
    }

    /// Renumber the pseudo times of a chain, first point back to the
    /// configured initial value and each successor one step later.
    ///
    /// Only the first descendant link needs following: in-chain lists are
    /// ordered, and extra links are transitive edges.
    pub(crate) fn renumber(&mut self, chain: ChainId) {
        let Some(first) = self.meta_ref(chain).first else {
            return;
        };
        log::debug!("renumbering chain {}", chain);
        self.pt_mut(first).pseudo = self.config.pseudo_init;
        let mut cur = first;
        while let Some(link) = self.pt(cur).descendants.first() {
            let next = self.lk(link).to;
            let after = self.pt(cur).pseudo_after(&self.config);
            self.pt_mut(next).pseudo = after;
            cur = next;
        }
    }

    /// Pseudo time for a new point between `y1` and `y2` (same chain,
    /// `y1` earlier), renumbering the chain when the gap is too tight.
    pub(crate) fn pseudo_between(&mut self, y1: PointId, y2: PointId) -> i64 {
        let mut p1 = self.pt(y1).pseudo;
        let mut p2 = self.pt(y2).pseudo;
        if (p2 - p1).abs() < self.config.renumber_gap {
            self.renumber(self.pt(y1).chain);
            p1 = self.pt(y1).pseudo;
            p2 = self.pt(y2).pseudo;
        }
        if p1 == self.config.pseudo_init {
            p1 = 0;
        }
        if p2 == self.config.pseudo_init {
            p2 = 0;
        }
        ((p2 - p1) * 9).div_euclid(10) + p1
    }

    // ------------------------------------------------------------------
    // Links
    // ------------------------------------------------------------------

    /// Add a directed link from `p` to `q`, partitioned onto in-chain or
    /// cross-chain lists. Idempotent: an existing link with the same
    /// endpoints absorbs the new strictness. Backward in-chain links are
    /// refused.
    pub(crate) fn add_link(&mut self, p: PointId, q: PointId, strict: bool) -> Option<LinkId> {
        if self.same_point(p, q) {
            return None;
        }
        let same_chain = self.pt(p).chain == self.pt(q).chain;
        if same_chain && self.pt(q).pseudo < self.pt(p).pseudo {
            log::warn!(
                "refusing backward in-chain link {} -> {}",
                self.pt(p).name,
                self.pt(q).name
            );
            return None;
        }
        let key = self.endpoint_key(p, q);
        let kind = if same_chain {
            LinkKind::Descendants
        } else {
            LinkKind::XDescendants
        };
        if let Some(existing) = self.find_in_list(p, kind, key) {
            if strict {
                self.lk_mut(existing).strict = true;
            }
            return Some(existing);
        }
        let id = LinkId(self.links.len() as u32);
        self.links.push(TimeLink::new(p, q, strict));
        if same_chain {
            self.list_insert(p, LinkKind::Descendants, id);
            self.list_insert(q, LinkKind::Ancestors, id);
        } else {
            self.list_insert(p, LinkKind::XDescendants, id);
            self.list_insert(q, LinkKind::XAncestors, id);
            self.add_meta_link(id);
        }
        Some(id)
    }

    fn find_in_list(&self, owner: PointId, kind: LinkKind, key: LinkKey) -> Option<LinkId> {
        self.list(owner, kind)
            .find_by_key(key, |l| self.link_key(l))
    }

    fn list_insert(&mut self, owner: PointId, kind: LinkKind, id: LinkId) {
        let key = self.link_key(id);
        let mut taken = std::mem::take(self.list_mut(owner, kind));
        let outcome = taken.insert_with(id, key, |l| self.link_key(l));
        *self.list_mut(owner, kind) = taken;
        if let InsertOutcome::Duplicate(existing) = outcome {
            if self.lk(id).strict {
                self.lk_mut(existing).strict = true;
            }
        }
    }

    /// Record a cross-chain link in its origin chain's connection list.
    fn add_meta_link(&mut self, id: LinkId) {
        let from_chain = self.pt(self.lk(id).from).chain;
        let to_chain = self.pt(self.lk(id).to).chain;
        if from_chain == to_chain {
            return;
        }
        let key = self.link_key(id);
        let mut taken = std::mem::take(&mut self.meta_mut(from_chain).connections);
        let outcome = taken.insert_with(id, key, |l| self.link_key(l));
        self.meta_mut(from_chain).connections = taken;
        if let InsertOutcome::Duplicate(existing) = outcome {
            if self.lk(id).strict {
                self.lk_mut(existing).strict = true;
            }
        }
    }

    fn remove_meta_link(&mut self, id: LinkId) {
        let from_chain = self.pt(self.lk(id).from).chain;
        let to_chain = self.pt(self.lk(id).to).chain;
        if from_chain != to_chain {
            self.meta_mut(from_chain).connections.remove(id);
        }
    }

    /// Rewire all of `from_pt`'s links of the given kind onto `to_pt`,
    /// re-partitioning them by chain and carrying duration bounds along.
    fn update_links(&mut self, from_pt: PointId, to_pt: PointId, kind: LinkKind) {
        let ids: Vec<LinkId> = self.list(from_pt, kind).iter().collect();
        *self.list_mut(from_pt, kind) = TimeLinkList::new();
        for id in ids {
            let (other, strict, dmin, dmax) = {
                let l = self.lk(id);
                let other = if kind.is_descendant() { l.to } else { l.from };
                (other, l.strict, l.duration_min, l.duration_max)
            };
            self.remove_meta_link(id);
            self.list_mut(other, kind.opposite()).remove(id);
            // A link between the merged pair would become a self-link.
            if self.same_point(other, to_pt) {
                continue;
            }
            if kind.is_descendant() {
                self.add_link(to_pt, other, strict);
                self.new_duration_min(to_pt, other, dmin);
                self.new_duration_max(to_pt, other, dmax);
            } else {
                self.add_link(other, to_pt, strict);
                self.new_duration_min(other, to_pt, dmin);
                self.new_duration_max(other, to_pt, dmax);
            }
        }
    }

    /// Move every link of `from_pt` onto `to_pt`.
    pub(crate) fn copy_links(&mut self, from_pt: PointId, to_pt: PointId) {
        self.update_links(from_pt, to_pt, LinkKind::Ancestors);
        self.update_links(from_pt, to_pt, LinkKind::XAncestors);
        self.update_links(from_pt, to_pt, LinkKind::Descendants);
        self.update_links(from_pt, to_pt, LinkKind::XDescendants);
    }

    /// The link from `p` to `q`, created (strict) if absent.
    pub(crate) fn find_link(&mut self, p: PointId, q: PointId) -> Option<LinkId> {
        let kind = if self.pt(p).chain == self.pt(q).chain {
            LinkKind::Descendants
        } else {
            LinkKind::XDescendants
        };
        let key = self.endpoint_key(p, q);
        if let Some(id) = self.find_in_list(p, kind, key) {
            return Some(id);
        }
        self.add_link(p, q, true)
    }

    // ------------------------------------------------------------------
    // Strictness propagation
    // ------------------------------------------------------------------

    /// Record that `p` is strictly before `q` on their shared chain:
    /// `q` (and everything after it) can be no earlier than `p`, and `p`
    /// (and everything before it) no later than `q`.
    pub(crate) fn add_strictness(&mut self, p: PointId, q: PointId) {
        let floor = self.pt(p).pseudo;
        let ceil = self.pt(q).pseudo;
        self.tighten_min_pseudo(q, floor);
        self.tighten_max_pseudo(p, ceil);
    }

    fn tighten_min_pseudo(&mut self, start: PointId, floor: i64) {
        let mut work = vec![start];
        while let Some(x) = work.pop() {
            if self.pt(x).min_pseudo >= floor {
                continue;
            }
            self.pt_mut(x).min_pseudo = floor;
            let next: Vec<PointId> = self
                .pt(x)
                .descendants
                .iter()
                .map(|l| self.lk(l).to)
                .collect();
            work.extend(next);
        }
    }

    fn tighten_max_pseudo(&mut self, start: PointId, ceil: i64) {
        let mut work = vec![start];
        while let Some(x) = work.pop() {
            if self.pt(x).max_pseudo <= ceil {
                continue;
            }
            self.pt_mut(x).max_pseudo = ceil;
            let next: Vec<PointId> = self
                .pt(x)
                .ancestors
                .iter()
                .map(|l| self.lk(l).from)
                .collect();
            work.extend(next);
        }
    }

    // ------------------------------------------------------------------
    // Absolute-bound propagation
    // ------------------------------------------------------------------

    /// Tighten the lower absolute bound of `p`, propagating forward while
    /// the merge keeps tightening.
    pub(crate) fn update_absolute_min(&mut self, p: PointId, abs: AbsTime) {
        let new = {
            let pt = self.pt(p);
            pt.absolute_min.merge_abs_min(&abs, &pt.absolute_max)
        };
        if new != self.pt(p).absolute_min {
            self.pt_mut(p).absolute_min = new;
            self.prop_absmin(p);
        }
    }

    /// Tighten the upper absolute bound of `p`, propagating backward while
    /// the merge keeps tightening.
    pub(crate) fn update_absolute_max(&mut self, p: PointId, abs: AbsTime) {
        let new = {
            let pt = self.pt(p);
            pt.absolute_max.merge_abs_max(&abs, &pt.absolute_min)
        };
        if new != self.pt(p).absolute_max {
            self.pt_mut(p).absolute_max = new;
            self.prop_absmax(p);
        }
    }

    /// Forward propagation of a tightened lower bound: to the first in-chain
    /// descendant (the rest of the chain follows transitively) and to every
    /// cross-chain descendant.
    fn prop_absmin(&mut self, start: PointId) {
        let mut work = vec![start];
        while let Some(x) = work.pop() {
            let mut targets: Vec<LinkId> = Vec::new();
            if let Some(first) = self.pt(x).descendants.first() {
                targets.push(first);
            }
            targets.extend(self.pt(x).xdescendants.iter());
            for l in targets {
                let (from, to) = (self.lk(l).from, self.lk(l).to);
                let durabs = self
                    .pt(from)
                    .absolute_max
                    .calc_duration_min(&self.pt(to).absolute_min);
                let usedur = combine_min_duration(self.lk(l).duration_min, durabs);
                let new = self.pt(from).absolute_min.re_calc_abs_min(
                    &self.pt(to).absolute_min,
                    &self.pt(to).absolute_max,
                    usedur,
                );
                if new != self.pt(to).absolute_min {
                    self.pt_mut(to).absolute_min = new;
                    work.push(to);
                }
            }
        }
    }

    /// Backward propagation of a tightened upper bound, the dual of
    /// [`prop_absmin`](Self::prop_absmin).
    fn prop_absmax(&mut self, start: PointId) {
        let mut work = vec![start];
        while let Some(x) = work.pop() {
            let mut targets: Vec<LinkId> = Vec::new();
            if let Some(first) = self.pt(x).ancestors.first() {
                targets.push(first);
            }
            targets.extend(self.pt(x).xancestors.iter());
            for l in targets {
                let (from, to) = (self.lk(l).from, self.lk(l).to);
                let durabs = self
                    .pt(from)
                    .absolute_max
                    .calc_duration_min(&self.pt(to).absolute_min);
                let usedur = combine_min_duration(self.lk(l).duration_min, durabs);
                let new = self.pt(to).absolute_max.re_calc_abs_max(
                    &self.pt(from).absolute_max,
                    &self.pt(from).absolute_min,
                    usedur,
                );
                if new != self.pt(from).absolute_max {
                    self.pt_mut(from).absolute_max = new;
                    work.push(from);
                }
            }
        }
    }

    // ------------------------------------------------------------------
    // Durations on links
    // ------------------------------------------------------------------

    /// Assert a minimum elapsed time between two named points.
    pub fn add_duration_min(&mut self, name1: &str, name2: &str, d: f64) -> crate::Result<()> {
        let (p, q) = self.require_pair(name1, name2)?;
        self.new_duration_min(p, q, d);
        Ok(())
    }

    /// Assert a maximum elapsed time between two named points.
    pub fn add_duration_max(&mut self, name1: &str, name2: &str, d: f64) -> crate::Result<()> {
        let (p, q) = self.require_pair(name1, name2)?;
        self.new_duration_max(p, q, d);
        Ok(())
    }

    fn require_pair(&self, name1: &str, name2: &str) -> crate::Result<(PointId, PointId)> {
        let p = self
            .names
            .get(name1)
            .copied()
            .ok_or_else(|| crate::TimegraphError::MissingPoint(name1.to_string()))?;
        let q = self
            .names
            .get(name2)
            .copied()
            .ok_or_else(|| crate::TimegraphError::MissingPoint(name2.to_string()))?;
        Ok((p, q))
    }

    pub(crate) fn new_duration_min(&mut self, p: PointId, q: PointId, d: f64) {
        if let Some(l) = self.find_link(p, q) {
            self.update_duration_min(l, d);
        }
    }

    pub(crate) fn new_duration_max(&mut self, p: PointId, q: PointId, d: f64) {
        if let Some(l) = self.find_link(p, q) {
            self.update_duration_max(l, d);
        }
    }

    /// Tighten a link's minimum duration. A positive minimum makes the link
    /// strict, which on a single chain also tightens the pseudo bounds; the
    /// new minimum then shifts the absolute bounds of both endpoints.
    pub(crate) fn update_duration_min(&mut self, l: LinkId, d: f64) {
        if d.is_nan() || d < 0.0 {
            return;
        }
        let (from, to) = (self.lk(l).from, self.lk(l).to);
        if d > 0.0 && !self.lk(l).strict {
            self.lk_mut(l).strict = true;
            if self.pt(from).chain == self.pt(to).chain {
                self.add_strictness(from, to);
            }
        }
        if d > self.lk(l).duration_min {
            self.lk_mut(l).duration_min = d;
            let sub = self.pt(to).absolute_max.calc_sub_dur(d);
            self.update_absolute_max(from, sub);
            let add = self.pt(from).absolute_min.calc_add_dur(d);
            self.update_absolute_min(to, add);
        }
    }

    pub(crate) fn update_duration_max(&mut self, l: LinkId, d: f64) {
        if d >= 0.0 && d < self.lk(l).duration_max {
            self.lk_mut(l).duration_max = d;
        }
    }

    // ------------------------------------------------------------------
    // Formatting
    // ------------------------------------------------------------------

    /// Human-readable dump of every live point, in name order.
    pub fn format(&self, verbose: bool) -> String {
        let mut ids: Vec<PointId> = (0..self.points.len() as u32)
            .map(PointId)
            .filter(|&id| !self.pt(id).collapsed)
            .collect();
        ids.sort_by(|&a, &b| self.pt(a).name.cmp(&self.pt(b).name));

        let mut out = String::new();
        for (i, id) in ids.iter().enumerate() {
            if i > 0 {
                out.push('\n');
            }
            self.format_point(&mut out, *id, verbose);
        }
        out
    }

    fn format_point(&self, out: &mut String, id: PointId, verbose: bool) {
        let p = self.pt(id);
        let _ = writeln!(out, "Node {}", p.name);
        let _ = writeln!(out, "Chain {}", p.chain);
        let _ = writeln!(out, "Pseudo {}", p.pseudo);
        let _ = writeln!(out, "Min-pseudo {}", fmt_pseudo(p.min_pseudo));
        let _ = writeln!(out, "Max-pseudo {}", fmt_pseudo(p.max_pseudo));
        let _ = writeln!(out, "Absolute-min {}", fmt_abs(&p.absolute_min));
        let _ = writeln!(out, "Absolute-max {}", fmt_abs(&p.absolute_max));
        if verbose {
            self.format_list(out, "Ancestors", &p.ancestors, false);
            self.format_list(out, "Descendants", &p.descendants, true);
            self.format_list(out, "XAncestors", &p.xancestors, false);
            self.format_list(out, "XDescendants", &p.xdescendants, true);
        }
    }

    fn format_list(&self, out: &mut String, label: &str, list: &TimeLinkList, to_side: bool) {
        if list.is_empty() {
            return;
        }
        let _ = writeln!(out, "{}", label);
        for l in list.iter() {
            let end = if to_side { self.lk(l).to } else { self.lk(l).from };
            let _ = writeln!(out, "  {}", self.pt(end).name);
        }
    }
}

fn fmt_pseudo(p: i64) -> String {
    if p == i64::MIN {
        "-inf".to_string()
    } else if p == i64::MAX {
        "inf".to_string()
    } else {
        p.to_string()
    }
}

fn fmt_abs(abs: &AbsTime) -> String {
    if abs.is_fully_unknown() {
        "unknown".to_string()
    } else {
        abs.to_string()
    }
}
