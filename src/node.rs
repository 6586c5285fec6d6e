//! Graph nodes: time points, chain meta-nodes, and events.
//!
//! All cross-references inside the graph are stable arena indices owned by
//! [`TimeGraph`](crate::TimeGraph); nodes never hold pointers to each other.

use smallvec::SmallVec;
use std::fmt;

use crate::abstime::AbsTime;
use crate::config::Config;
use crate::link::TimeLinkList;
use crate::pred::{Pred, Stem, Strictness};

/// Index of a time point in the graph's point arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PointId(pub(crate) u32);

/// Index of a chain (meta-node) in the graph's chain arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ChainId(pub(crate) u32);

/// Index of a link in the graph's link arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LinkId(pub(crate) u32);

impl fmt::Display for ChainId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A node corresponding to a particular instant in the timegraph.
#[derive(Debug)]
pub struct TimePoint {
    /// Primary name of the point.
    pub name: String,
    /// Chain this point belongs to.
    pub chain: ChainId,
    /// Pseudo time within the chain; strictly increasing along it.
    pub pseudo: i64,
    /// Pseudo time of the earliest point this one could still equal.
    pub min_pseudo: i64,
    /// Pseudo time of the latest point this one could still equal.
    pub max_pseudo: i64,
    /// Lower symbolic bound on the point's wall-clock time.
    pub absolute_min: AbsTime,
    /// Upper symbolic bound on the point's wall-clock time.
    pub absolute_max: AbsTime,
    /// In-chain links arriving at this point.
    pub ancestors: TimeLinkList,
    /// In-chain links leaving this point.
    pub descendants: TimeLinkList,
    /// Cross-chain links arriving at this point.
    pub xancestors: TimeLinkList,
    /// Cross-chain links leaving this point.
    pub xdescendants: TimeLinkList,
    /// Names of points collapsed into this one.
    pub alternate_names: SmallVec<[String; 2]>,
    /// Whether this point has been collapsed into another.
    pub collapsed: bool,
}

impl TimePoint {
    pub fn new(name: impl Into<String>, chain: ChainId, pseudo: i64) -> TimePoint {
        TimePoint {
            name: name.into(),
            chain,
            pseudo,
            min_pseudo: i64::MIN,
            max_pseudo: i64::MAX,
            absolute_min: AbsTime::unknown(),
            absolute_max: AbsTime::unknown(),
            ancestors: TimeLinkList::new(),
            descendants: TimeLinkList::new(),
            xancestors: TimeLinkList::new(),
            xdescendants: TimeLinkList::new(),
            alternate_names: SmallVec::new(),
            collapsed: false,
        }
    }

    /// Pseudo time for a new point placed immediately before this one.
    pub fn pseudo_before(&self, config: &Config) -> i64 {
        let cur = if self.pseudo == config.pseudo_init {
            0
        } else {
            self.pseudo
        };
        cur - config.pseudo_step
    }

    /// Pseudo time for a new point placed immediately after this one.
    pub fn pseudo_after(&self, config: &Config) -> i64 {
        let cur = if self.pseudo == config.pseudo_init {
            config.pseudo_step
        } else {
            self.pseudo
        };
        cur + config.pseudo_step
    }

    /// Whether a point with pseudo time `other_pseudo` on this chain could
    /// still be equal to this one, given the strictness bounds.
    pub fn possibly_equal(&self, other_pseudo: i64) -> bool {
        other_pseudo > self.min_pseudo && other_pseudo < self.max_pseudo
    }

    /// The most strict relation between this point and `other` derivable
    /// from pseudo times alone. Only meaningful on the same chain.
    pub fn find_pseudo(&self, other: &TimePoint) -> Pred {
        let p1 = self.pseudo;
        let p2 = other.pseudo;
        if p1 == p2 {
            Pred::same_time()
        } else if p1 < p2 {
            if self.possibly_equal(p2) {
                Pred::of(Stem::Before)
            } else {
                Pred::before(Strictness::Strict)
            }
        } else if self.possibly_equal(p2) {
            Pred::of(Stem::After)
        } else {
            Pred::after(Strictness::Strict)
        }
    }

    pub fn first_in_chain(&self) -> bool {
        self.ancestors.is_empty()
    }

    pub fn last_in_chain(&self) -> bool {
        self.descendants.is_empty()
    }
}

/// A node in the metagraph connecting time chains.
#[derive(Debug)]
pub struct MetaNode {
    /// Identity of the chain.
    pub chain_number: ChainId,
    /// Earliest point in the chain, if any remain.
    pub first: Option<PointId>,
    /// Outgoing cross-chain links from any member of the chain.
    pub connections: TimeLinkList,
}

impl MetaNode {
    pub fn new(chain_number: ChainId) -> MetaNode {
        MetaNode {
            chain_number,
            first: None,
            // Each chain gets its own list; the connection set is never
            // shared between chains.
            connections: TimeLinkList::new(),
        }
    }
}

/// An interval: a pair of time-point names for its start and end.
#[derive(Debug, Clone)]
pub struct EventPoint {
    /// The symbol denoting the event.
    pub name: String,
    /// Name of the start time point.
    pub start: String,
    /// Name of the end time point.
    pub end: String,
}

impl EventPoint {
    pub fn new(name: impl Into<String>) -> EventPoint {
        let name = name.into();
        let start = format!("{}start", name);
        let end = format!("{}end", name);
        EventPoint { name, start, end }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cfg() -> Config {
        Config::default()
    }

    #[test]
    fn test_pseudo_before_after() {
        let p = TimePoint::new("p", ChainId(0), 1);
        assert_eq!(p.pseudo_before(&cfg()), -1000);
        assert_eq!(p.pseudo_after(&cfg()), 2000);

        let p = TimePoint::new("p", ChainId(0), 3000);
        assert_eq!(p.pseudo_before(&cfg()), 2000);
        assert_eq!(p.pseudo_after(&cfg()), 4000);
    }

    #[test]
    fn test_find_pseudo() {
        let a = TimePoint::new("a", ChainId(0), 1);
        let b = TimePoint::new("b", ChainId(0), 2000);
        assert_eq!(a.find_pseudo(&b).to_string(), "before");
        assert_eq!(b.find_pseudo(&a).to_string(), "after");
        assert_eq!(a.find_pseudo(&a).to_string(), "same-time");
    }

    #[test]
    fn test_find_pseudo_strict() {
        let mut a = TimePoint::new("a", ChainId(0), 1);
        let b = TimePoint::new("b", ChainId(0), 2000);
        a.max_pseudo = 2000;
        assert_eq!(a.find_pseudo(&b).to_string(), "before-1");
    }

    #[test]
    fn test_event_point_names() {
        let ev = EventPoint::new("e1");
        assert_eq!(ev.start, "e1start");
        assert_eq!(ev.end, "e1end");
    }
}
