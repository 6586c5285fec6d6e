//! Links between time points and the ordered lists that hold them.

use smallvec::SmallVec;

use crate::node::{LinkId, PointId};

/// A directed edge between two time points.
///
/// `duration_min`/`duration_max` bound the seconds elapsed from `from` to
/// `to`; they start at `(0, +inf)` and only tighten.
#[derive(Debug)]
pub struct TimeLink {
    pub from: PointId,
    pub to: PointId,
    /// `<` rather than `<=`.
    pub strict: bool,
    pub duration_min: f64,
    pub duration_max: f64,
}

impl TimeLink {
    pub fn new(from: PointId, to: PointId, strict: bool) -> TimeLink {
        TimeLink {
            from,
            to,
            strict,
            duration_min: 0.0,
            duration_max: f64::INFINITY,
        }
    }
}

/// Sort key identifying a link: (from chain, from pseudo, to chain, to
/// pseudo). Computed fresh from the arenas at every insertion so that
/// renumbering cannot leave stale keys behind.
pub type LinkKey = (u32, i64, u32, i64);

/// Outcome of an ordered insertion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertOutcome {
    Inserted,
    /// A link with the same key already exists; insertion is idempotent and
    /// the caller merges strictness onto the returned link.
    Duplicate(LinkId),
}

/// A list of link ids kept sorted by [`LinkKey`].
#[derive(Debug, Default)]
pub struct TimeLinkList {
    items: SmallVec<[LinkId; 4]>,
}

impl TimeLinkList {
    pub fn new() -> TimeLinkList {
        TimeLinkList::default()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// The link with the smallest key (for in-chain lists, the nearest
    /// neighbour).
    pub fn first(&self) -> Option<LinkId> {
        self.items.first().copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = LinkId> + '_ {
        self.items.iter().copied()
    }

    pub fn contains(&self, id: LinkId) -> bool {
        self.items.contains(&id)
    }

    /// Insert `id` at its sorted position. Equal keys collapse to the
    /// already-present link.
    pub fn insert_with<F>(&mut self, id: LinkId, key: LinkKey, key_of: F) -> InsertOutcome
    where
        F: Fn(LinkId) -> LinkKey,
    {
        match self.items.binary_search_by(|&l| key_of(l).cmp(&key)) {
            Ok(pos) => InsertOutcome::Duplicate(self.items[pos]),
            Err(pos) => {
                self.items.insert(pos, id);
                InsertOutcome::Inserted
            }
        }
    }

    /// Find the link whose key equals `key`, if any.
    pub fn find_by_key<F>(&self, key: LinkKey, key_of: F) -> Option<LinkId>
    where
        F: Fn(LinkId) -> LinkKey,
    {
        self.items
            .binary_search_by(|&l| key_of(l).cmp(&key))
            .ok()
            .map(|pos| self.items[pos])
    }

    /// Remove `id` by identity, if present.
    pub fn remove(&mut self, id: LinkId) {
        self.items.retain(|&mut l| l != id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Stand-in arena: key per link id, indexed by position.
    fn keys() -> Vec<LinkKey> {
        vec![
            (0, 1, 1, 1),
            (0, 1, 1, 2000),
            (0, 2000, 1, 1),
            (1, 1, 0, 1),
        ]
    }

    #[test]
    fn test_sorted_insertion() {
        let keys = keys();
        let key_of = |l: LinkId| keys[l.0 as usize];
        let mut list = TimeLinkList::new();
        for i in [2u32, 0, 3, 1] {
            let id = LinkId(i);
            assert_eq!(
                list.insert_with(id, key_of(id), key_of),
                InsertOutcome::Inserted
            );
        }
        let order: Vec<u32> = list.iter().map(|l| l.0).collect();
        assert_eq!(order, vec![0, 1, 2, 3]);
        assert_eq!(list.first(), Some(LinkId(0)));
    }

    #[test]
    fn test_duplicate_key_is_idempotent() {
        let keys = keys();
        let key_of = |l: LinkId| keys[l.0 as usize];
        let mut list = TimeLinkList::new();
        list.insert_with(LinkId(1), key_of(LinkId(1)), key_of);
        // A different id with the same key collapses onto the first.
        let outcome = list.insert_with(LinkId(3), key_of(LinkId(1)), key_of);
        assert_eq!(outcome, InsertOutcome::Duplicate(LinkId(1)));
        assert_eq!(list.len(), 1);
    }

    #[test]
    fn test_remove_by_identity() {
        let keys = keys();
        let key_of = |l: LinkId| keys[l.0 as usize];
        let mut list = TimeLinkList::new();
        for i in 0..3u32 {
            let id = LinkId(i);
            list.insert_with(id, key_of(id), key_of);
        }
        list.remove(LinkId(1));
        assert_eq!(list.len(), 2);
        assert!(!list.contains(LinkId(1)));
        list.remove(LinkId(1));
        assert_eq!(list.len(), 2);
    }
}
