//! Temporal predicate algebra.
//!
//! Predicates arrive and leave the graph as strings of the form `stem`,
//! `stem-s1`, or `stem-s1-s2`, where the `0`/`1` suffixes encode the
//! strictness of the underlying point relations. Internally they are the
//! typed [`Pred`] value so dispatch and strictness bookkeeping never touch
//! string parsing.

use std::fmt;
use std::str::FromStr;

use crate::error::TimegraphError;

/// Predicate stem.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stem {
    Equal,
    SameTime,
    At,
    Exactly,
    Before,
    After,
    During,
    Contains,
    Overlaps,
    OverlappedBy,
    Between,
    AtMostBefore,
    AtLeastBefore,
    ExactlyBefore,
    AtMostAfter,
    AtLeastAfter,
    ExactlyAfter,
    Unknown,
}

impl Stem {
    pub fn as_str(self) -> &'static str {
        match self {
            Stem::Equal => "equal",
            Stem::SameTime => "same-time",
            Stem::At => "at",
            Stem::Exactly => "exactly",
            Stem::Before => "before",
            Stem::After => "after",
            Stem::During => "during",
            Stem::Contains => "contains",
            Stem::Overlaps => "overlaps",
            Stem::OverlappedBy => "overlapped-by",
            Stem::Between => "between",
            Stem::AtMostBefore => "at-most-before",
            Stem::AtLeastBefore => "at-least-before",
            Stem::ExactlyBefore => "exactly-before",
            Stem::AtMostAfter => "at-most-after",
            Stem::AtLeastAfter => "at-least-after",
            Stem::ExactlyAfter => "exactly-after",
            Stem::Unknown => "unknown",
        }
    }

    fn parse(s: &str) -> Option<Stem> {
        Some(match s {
            "equal" => Stem::Equal,
            "same-time" => Stem::SameTime,
            "at" => Stem::At,
            "exactly" => Stem::Exactly,
            "before" => Stem::Before,
            "after" => Stem::After,
            "during" => Stem::During,
            "contains" => Stem::Contains,
            "overlaps" => Stem::Overlaps,
            "overlapped-by" => Stem::OverlappedBy,
            "between" => Stem::Between,
            "at-most-before" => Stem::AtMostBefore,
            "at-least-before" => Stem::AtLeastBefore,
            "exactly-before" => Stem::ExactlyBefore,
            "at-most-after" => Stem::AtMostAfter,
            "at-least-after" => Stem::AtLeastAfter,
            "exactly-after" => Stem::ExactlyAfter,
            "unknown" => Stem::Unknown,
            _ => return None,
        })
    }

    /// Equivalence-class stems (`equal`, `same-time`, `at`, `exactly`).
    pub fn is_equiv(self) -> bool {
        matches!(self, Stem::Equal | Stem::SameTime | Stem::At | Stem::Exactly)
    }

    pub fn is_sequence(self) -> bool {
        matches!(self, Stem::Before | Stem::After)
    }

    pub fn is_containment(self) -> bool {
        matches!(
            self,
            Stem::During | Stem::Contains | Stem::Overlaps | Stem::OverlappedBy
        )
    }

    /// Duration-constrained sequence stems; these take a seconds argument.
    pub fn is_constrained(self) -> bool {
        matches!(
            self,
            Stem::AtMostBefore
                | Stem::AtLeastBefore
                | Stem::ExactlyBefore
                | Stem::AtMostAfter
                | Stem::AtLeastAfter
                | Stem::ExactlyAfter
        )
    }

    pub fn is_constrained_before(self) -> bool {
        matches!(
            self,
            Stem::AtMostBefore | Stem::AtLeastBefore | Stem::ExactlyBefore
        )
    }

    /// Stem inverse: before/after, during/contains, overlaps/overlapped-by.
    /// Stems without an inverse map to themselves.
    pub fn inverse(self) -> Stem {
        match self {
            Stem::Before => Stem::After,
            Stem::After => Stem::Before,
            Stem::During => Stem::Contains,
            Stem::Contains => Stem::During,
            Stem::Overlaps => Stem::OverlappedBy,
            Stem::OverlappedBy => Stem::Overlaps,
            other => other,
        }
    }
}

/// Strictness of a point relation.
///
/// `Equal` is the `-0` suffix (touching allowed), `Strict` the `-1` suffix,
/// and `Unknown` the absence of a suffix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Strictness {
    /// Equality is still possible (`<=`).
    Equal,
    /// Strict ordering (`<`).
    Strict,
    /// Strictness not asserted or not derivable.
    #[default]
    Unknown,
}

impl Strictness {
    pub fn is_strict(self) -> bool {
        matches!(self, Strictness::Strict)
    }

    pub fn from_bool(strict: bool) -> Strictness {
        if strict {
            Strictness::Strict
        } else {
            Strictness::Equal
        }
    }

    fn parse_suffix(s: &str) -> Option<Strictness> {
        match s {
            "0" => Some(Strictness::Equal),
            "1" => Some(Strictness::Strict),
            _ => None,
        }
    }

    fn suffix(self) -> Option<&'static str> {
        match self {
            Strictness::Equal => Some("0"),
            Strictness::Strict => Some("1"),
            Strictness::Unknown => None,
        }
    }
}

/// Combine the strictness of two path legs: strict if either leg is strict.
pub fn combine_strict(s1: Strictness, s2: Strictness) -> Strictness {
    if s1.is_strict() || s2.is_strict() {
        Strictness::Strict
    } else if s1 == Strictness::Equal || s2 == Strictness::Equal {
        Strictness::Equal
    } else {
        Strictness::Unknown
    }
}

/// A temporal predicate: stem plus up to two strictness suffixes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Pred {
    pub stem: Stem,
    pub strict1: Strictness,
    pub strict2: Strictness,
}

impl Pred {
    /// Build a predicate from its parts.
    pub fn build(stem: Stem, strict1: Strictness, strict2: Strictness) -> Pred {
        Pred {
            stem,
            strict1,
            strict2,
        }
    }

    /// A bare stem with no strictness suffixes.
    pub fn of(stem: Stem) -> Pred {
        Pred::build(stem, Strictness::Unknown, Strictness::Unknown)
    }

    pub fn unknown() -> Pred {
        Pred::of(Stem::Unknown)
    }

    pub fn same_time() -> Pred {
        Pred::of(Stem::SameTime)
    }

    pub fn before(strict: Strictness) -> Pred {
        Pred::build(Stem::Before, strict, Strictness::Unknown)
    }

    pub fn after(strict: Strictness) -> Pred {
        Pred::build(Stem::After, strict, Strictness::Unknown)
    }

    /// Decompose into `(stem, strict1, strict2)`.
    pub fn split(self) -> (Stem, Strictness, Strictness) {
        (self.stem, self.strict1, self.strict2)
    }

    pub fn is_unknown(self) -> bool {
        self.stem == Stem::Unknown
    }

    pub fn is_equiv(self) -> bool {
        self.stem.is_equiv()
    }

    pub fn is_strict_before(self) -> bool {
        self.stem == Stem::Before && self.strict1.is_strict()
    }

    /// Predicate inverse; strictness suffixes are preserved.
    pub fn inverse(self) -> Pred {
        Pred::build(self.stem.inverse(), self.strict1, self.strict2)
    }
}

/// Whether `answer` is compatible with the point relation named by `stem`.
///
/// An equivalence answer is compatible with `equal`, `before`, and `after`;
/// a `before` variant only with `before`, and dually for `after`.
pub fn test_answer(stem: Stem, answer: Pred) -> bool {
    if answer.stem.is_equiv() {
        return stem.is_equiv() || stem == Stem::Before || stem == Stem::After;
    }
    match stem {
        Stem::Before => answer.stem == Stem::Before,
        Stem::After => answer.stem == Stem::After,
        _ => false,
    }
}

impl fmt::Display for Pred {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.stem.as_str())?;
        if self.strict2 != Strictness::Unknown {
            // Two-suffix form; an unspecified first slot prints as touching.
            let s1 = self.strict1.suffix().unwrap_or("0");
            let s2 = self.strict2.suffix().unwrap_or("0");
            write!(f, "-{}-{}", s1, s2)
        } else if let Some(s1) = self.strict1.suffix() {
            write!(f, "-{}", s1)
        } else {
            Ok(())
        }
    }
}

impl FromStr for Pred {
    type Err = TimegraphError;

    fn from_str(s: &str) -> Result<Pred, TimegraphError> {
        if let Some(stem) = Stem::parse(s) {
            return Ok(Pred::of(stem));
        }
        // Strip up to two trailing strictness suffixes; the last stripped
        // suffix is the earliest slot.
        if let Some((head, tail)) = s.rsplit_once('-') {
            if let Some(last) = Strictness::parse_suffix(tail) {
                if let Some(stem) = Stem::parse(head) {
                    return Ok(Pred::build(stem, last, Strictness::Unknown));
                }
                if let Some((head2, tail2)) = head.rsplit_once('-') {
                    if let Some(first) = Strictness::parse_suffix(tail2) {
                        if let Some(stem) = Stem::parse(head2) {
                            return Ok(Pred::build(stem, first, last));
                        }
                    }
                }
            }
        }
        Err(TimegraphError::UnsupportedPredicate(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_bare_stem() {
        let p: Pred = "before".parse().unwrap();
        assert_eq!(p.stem, Stem::Before);
        assert_eq!(p.strict1, Strictness::Unknown);
        assert_eq!(p.to_string(), "before");
    }

    #[test]
    fn test_parse_one_suffix() {
        let p: Pred = "before-1".parse().unwrap();
        assert_eq!(p.stem, Stem::Before);
        assert_eq!(p.strict1, Strictness::Strict);
        assert_eq!(p.to_string(), "before-1");
    }

    #[test]
    fn test_parse_two_suffixes() {
        let p: Pred = "during-0-1".parse().unwrap();
        assert_eq!(p.stem, Stem::During);
        assert_eq!(p.strict1, Strictness::Equal);
        assert_eq!(p.strict2, Strictness::Strict);
        assert_eq!(p.to_string(), "during-0-1");
    }

    #[test]
    fn test_parse_dashed_stems() {
        let p: Pred = "at-least-before".parse().unwrap();
        assert_eq!(p.stem, Stem::AtLeastBefore);
        let p: Pred = "overlapped-by-1".parse().unwrap();
        assert_eq!(p.stem, Stem::OverlappedBy);
        assert_eq!(p.strict1, Strictness::Strict);
    }

    #[test]
    fn test_parse_unknown_stem() {
        assert!("sometime".parse::<Pred>().is_err());
        assert!("before-2".parse::<Pred>().is_err());
    }

    #[test]
    fn test_inverse() {
        let p: Pred = "before-1".parse().unwrap();
        assert_eq!(p.inverse().to_string(), "after-1");
        let p: Pred = "during-0-1".parse().unwrap();
        assert_eq!(p.inverse().to_string(), "contains-0-1");
        assert_eq!(Pred::unknown().inverse(), Pred::unknown());
    }

    #[test]
    fn test_test_answer() {
        assert!(test_answer(Stem::Before, Pred::same_time()));
        assert!(test_answer(Stem::Before, Pred::before(Strictness::Strict)));
        assert!(!test_answer(Stem::Before, Pred::after(Strictness::Equal)));
        assert!(test_answer(Stem::Equal, Pred::of(Stem::Equal)));
        assert!(!test_answer(Stem::Equal, Pred::before(Strictness::Equal)));
        assert!(!test_answer(Stem::After, Pred::unknown()));
    }

    #[test]
    fn test_combine_strict() {
        assert_eq!(
            combine_strict(Strictness::Equal, Strictness::Strict),
            Strictness::Strict
        );
        assert_eq!(
            combine_strict(Strictness::Equal, Strictness::Unknown),
            Strictness::Equal
        );
        assert_eq!(
            combine_strict(Strictness::Unknown, Strictness::Unknown),
            Strictness::Unknown
        );
    }
}
