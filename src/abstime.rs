//! Symbolic absolute-time bounds.
//!
//! An [`AbsTime`] is a six-slot year/month/day/hour/minute/second record in
//! which every slot is either a concrete integer or unknown. Unknown slots
//! are interpreted by role: a lower bound fills them with the earliest valid
//! value, an upper bound with the latest, so `1997-?-?` used as a pair of
//! bounds covers the whole of 1997.

use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, Duration as ChronoDuration, NaiveDate, NaiveDateTime, Timelike, Utc};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use crate::error::{Result, TimegraphError};
use crate::pred::{Pred, Stem, Strictness};

/// Latest year an upper-bound default may assume.
static CURRENT_YEAR: Lazy<i32> = Lazy::new(|| Utc::now().year());

/// Earliest valid value per slot.
const SLOT_LOWER: [i32; 6] = [1, 1, 1, 0, 0, 0];

/// Slot names for diagnostics and the record literal form.
const SLOT_NAMES: [&str; 6] = ["year", "month", "day", "hour", "minute", "second"];

/// An inclusive duration range in seconds.
pub type DurationRange = (f64, f64);

/// A symbolic instant used as a lower or upper bound on a point's wall-clock
/// time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AbsTime {
    slots: [Option<i32>; 6],
}

impl AbsTime {
    /// The fully-unknown bound; every point starts with a pair of these.
    pub fn unknown() -> AbsTime {
        AbsTime { slots: [None; 6] }
    }

    /// Build from raw slots, validating concrete values.
    pub fn new(slots: [Option<i32>; 6]) -> Result<AbsTime> {
        let ranges: [(i32, i32); 6] = [
            (1, 9999),
            (1, 12),
            (1, 31),
            (0, 23),
            (0, 59),
            (0, 59),
        ];
        for (i, slot) in slots.iter().enumerate() {
            if let Some(v) = slot {
                let (lo, hi) = ranges[i];
                if *v < lo || *v > hi {
                    return Err(TimegraphError::InvalidAbsTime(format!(
                        "{} out of range: {}",
                        SLOT_NAMES[i], v
                    )));
                }
            }
        }
        Ok(AbsTime { slots })
    }

    /// Build a fully-concrete instant.
    pub fn from_ymdhms(y: i32, mo: i32, d: i32, h: i32, mi: i32, s: i32) -> Result<AbsTime> {
        AbsTime::new([Some(y), Some(mo), Some(d), Some(h), Some(mi), Some(s)])
    }

    /// Parse the six-slot literal form: each item a digit string or a
    /// variable symbol such as `"?y"`.
    pub fn from_slots<S: AsRef<str>>(items: &[S]) -> Result<AbsTime> {
        if items.len() != 6 {
            return Err(TimegraphError::InvalidAbsTime(format!(
                "expected 6 slots, got {}",
                items.len()
            )));
        }
        let mut slots = [None; 6];
        for (i, item) in items.iter().enumerate() {
            slots[i] = parse_slot(item.as_ref())?;
        }
        AbsTime::new(slots)
    }

    /// Parse the record literal form:
    /// `["$", "date+time", ":year", Y, ":month", M, ":day", D, ":hour", H,
    /// ":minute", Mi, ":sec", S]`.
    pub fn from_record<S: AsRef<str>>(tokens: &[S]) -> Result<AbsTime> {
        if tokens.len() != 14
            || tokens[0].as_ref() != "$"
            || tokens[1].as_ref() != "date+time"
        {
            return Err(TimegraphError::InvalidAbsTime(
                "malformed date+time record".into(),
            ));
        }
        let mut slots = [None; 6];
        for i in 0..6 {
            let key = tokens[2 + 2 * i].as_ref();
            let expected = SLOT_NAMES[i];
            let ok = key.strip_prefix(':').map(|k| {
                k == expected || (expected == "second" && k == "sec")
            });
            if ok != Some(true) {
                return Err(TimegraphError::InvalidAbsTime(format!(
                    "unexpected record key: {}",
                    key
                )));
            }
            slots[i] = parse_slot(tokens[3 + 2 * i].as_ref())?;
        }
        AbsTime::new(slots)
    }

    /// The record literal form of this bound; unknown slots become
    /// variable symbols.
    pub fn to_record(&self) -> Vec<String> {
        let vars = ["?y", "?mo", "?d", "?h", "?mi", "?s"];
        let keys = [":year", ":month", ":day", ":hour", ":minute", ":sec"];
        let mut out = vec!["$".to_string(), "date+time".to_string()];
        for i in 0..6 {
            out.push(keys[i].to_string());
            out.push(match self.slots[i] {
                Some(v) => v.to_string(),
                None => vars[i].to_string(),
            });
        }
        out
    }

    pub fn is_fully_known(&self) -> bool {
        self.slots.iter().all(|s| s.is_some())
    }

    pub fn is_fully_unknown(&self) -> bool {
        self.slots.iter().all(|s| s.is_none())
    }

    /// Slot-wise lexicographic comparison.
    ///
    /// The first differing concrete pair decides the order strictly; a pair
    /// with an unknown member reached before any decision leaves the order
    /// unknown; all slots concrete and equal means equality.
    pub fn compare(&self, other: &AbsTime) -> Pred {
        for i in 0..6 {
            match (self.slots[i], other.slots[i]) {
                (Some(a), Some(b)) => {
                    if a < b {
                        return Pred::before(Strictness::Strict);
                    }
                    if a > b {
                        return Pred::after(Strictness::Strict);
                    }
                }
                _ => return Pred::unknown(),
            }
        }
        Pred::of(Stem::Equal)
    }

    /// Tighten a lower bound with `new`, staying at or below `current_max`.
    ///
    /// Slot-wise maximum: a concrete slot beats an unknown one. If the
    /// merged bound would cross `current_max` the merge is refused.
    pub fn merge_abs_min(&self, new: &AbsTime, current_max: &AbsTime) -> AbsTime {
        let mut merged = *self;
        for i in 0..6 {
            merged.slots[i] = match (self.slots[i], new.slots[i]) {
                (Some(a), Some(b)) => Some(a.max(b)),
                (Some(a), None) => Some(a),
                (None, b) => b,
            };
        }
        let cmp = merged.compare(current_max);
        if cmp.stem == Stem::After && cmp.strict1.is_strict() {
            log::warn!("refusing absolute-min merge past the upper bound");
            return *self;
        }
        merged
    }

    /// Tighten an upper bound with `new`, staying at or above `current_min`.
    pub fn merge_abs_max(&self, new: &AbsTime, current_min: &AbsTime) -> AbsTime {
        let mut merged = *self;
        for i in 0..6 {
            merged.slots[i] = match (self.slots[i], new.slots[i]) {
                (Some(a), Some(b)) => Some(a.min(b)),
                (Some(a), None) => Some(a),
                (None, b) => b,
            };
        }
        let cmp = merged.compare(current_min);
        if cmp.stem == Stem::Before && cmp.strict1.is_strict() {
            log::warn!("refusing absolute-max merge past the lower bound");
            return *self;
        }
        merged
    }

    /// Minimum seconds elapsed from a point at or before `self` to a point
    /// at or after `other`. Unknown slots are filled conservatively (late
    /// here, early there), so the result degrades to 0.
    pub fn calc_duration_min(&self, other: &AbsTime) -> f64 {
        let from = self.filled_secs(Role::Upper);
        let to = other.filled_secs(Role::Lower);
        (to - from).max(0.0)
    }

    /// Maximum seconds elapsed from a point at or after `self` to a point at
    /// or before `other`. An unknown year on either side makes the answer
    /// unbounded.
    pub fn calc_duration_max(&self, other: &AbsTime) -> f64 {
        if self.slots[0].is_none() || other.slots[0].is_none() {
            return f64::INFINITY;
        }
        let from = self.filled_secs(Role::Lower);
        let to = other.filled_secs(Role::Upper);
        (to - from).max(0.0)
    }

    /// Shift forward by `secs`. Partially-unknown bounds are returned
    /// unchanged, which keeps them sound (if loose).
    pub fn calc_add_dur(&self, secs: f64) -> AbsTime {
        if !secs.is_finite() || secs <= 0.0 {
            return *self;
        }
        self.shifted(secs.floor() as i64)
    }

    /// Shift backward by `secs`; the counterpart of [`calc_add_dur`].
    ///
    /// [`calc_add_dur`]: AbsTime::calc_add_dur
    pub fn calc_sub_dur(&self, secs: f64) -> AbsTime {
        if !secs.is_finite() || secs <= 0.0 {
            return *self;
        }
        self.shifted(-(secs.floor() as i64))
    }

    /// Tighten `target` (a neighbour's lower bound) knowing the neighbour is
    /// at least `dur` seconds after `self`.
    pub fn re_calc_abs_min(&self, target: &AbsTime, target_max: &AbsTime, dur: f64) -> AbsTime {
        target.merge_abs_min(&self.calc_add_dur(dur), target_max)
    }

    /// Tighten `target` (a neighbour's upper bound) knowing the neighbour is
    /// at least `dur` seconds before `self`.
    pub fn re_calc_abs_max(&self, target: &AbsTime, target_min: &AbsTime, dur: f64) -> AbsTime {
        target.merge_abs_max(&self.calc_sub_dur(dur), target_min)
    }

    fn shifted(&self, secs: i64) -> AbsTime {
        if !self.is_fully_known() {
            return *self;
        }
        let Some(dt) = self.to_naive() else {
            return *self;
        };
        let Some(delta) = ChronoDuration::try_seconds(secs) else {
            return *self;
        };
        match dt.checked_add_signed(delta) {
            Some(shifted) => AbsTime::from_naive(&shifted),
            None => *self,
        }
    }

    fn to_naive(&self) -> Option<NaiveDateTime> {
        let s = self.slots;
        NaiveDate::from_ymd_opt(s[0]?, s[1]? as u32, s[2]? as u32)?.and_hms_opt(
            s[3]? as u32,
            s[4]? as u32,
            s[5]? as u32,
        )
    }

    fn from_naive(dt: &NaiveDateTime) -> AbsTime {
        AbsTime {
            slots: [
                Some(dt.year()),
                Some(dt.month() as i32),
                Some(dt.day() as i32),
                Some(dt.hour() as i32),
                Some(dt.minute() as i32),
                Some(dt.second() as i32),
            ],
        }
    }

    fn filled_secs(&self, role: Role) -> f64 {
        let y = self.slots[0].unwrap_or(match role {
            Role::Lower => SLOT_LOWER[0],
            Role::Upper => *CURRENT_YEAR,
        });
        let upper = [0, 12, 31, 23, 59, 59];
        let pick = |i: usize| {
            self.slots[i].unwrap_or(match role {
                Role::Lower => SLOT_LOWER[i],
                Role::Upper => upper[i],
            })
        };
        let mo = pick(1) as u32;
        let d = (pick(2) as u32).min(days_in_month(y, mo));
        let datetime = NaiveDate::from_ymd_opt(y, mo, d)
            .and_then(|date| date.and_hms_opt(pick(3) as u32, pick(4) as u32, pick(5) as u32))
            .unwrap_or(NaiveDateTime::MIN);
        datetime.and_utc().timestamp() as f64
    }
}

#[derive(Clone, Copy)]
enum Role {
    Lower,
    Upper,
}

fn days_in_month(year: i32, month: u32) -> u32 {
    match month {
        4 | 6 | 9 | 11 => 30,
        2 => {
            if (year % 4 == 0 && year % 100 != 0) || year % 400 == 0 {
                29
            } else {
                28
            }
        }
        _ => 31,
    }
}

fn parse_slot(token: &str) -> Result<Option<i32>> {
    if token.starts_with('?') {
        return Ok(None);
    }
    token
        .parse::<i32>()
        .map(Some)
        .map_err(|_| TimegraphError::InvalidAbsTime(format!("bad slot: {}", token)))
}

/// The tighter of two lower bounds on the same elapsed duration (a stored
/// link minimum and an absolute-derived minimum are both valid; the larger
/// wins).
pub fn combine_min_duration(d1: f64, d2: f64) -> f64 {
    d1.max(d2)
}

/// Sequential composition of two duration ranges along a path.
pub fn combine_durations(a: DurationRange, b: DurationRange) -> DurationRange {
    (a.0 + b.0, a.1 + b.1)
}

/// The tighter of two duration ranges: max of minimums, min of maximums.
pub fn get_best_duration(
    a: Option<DurationRange>,
    b: Option<DurationRange>,
) -> Option<DurationRange> {
    match (a, b) {
        (None, x) => x,
        (x, None) => x,
        (Some(a), Some(b)) => Some((a.0.max(b.0), a.1.min(b.1))),
    }
}

impl fmt::Display for AbsTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let show = |slot: Option<i32>| match slot {
            Some(v) => format!("{:02}", v),
            None => "?".to_string(),
        };
        write!(
            f,
            "{}-{}-{} {}:{}:{}",
            show(self.slots[0]),
            show(self.slots[1]),
            show(self.slots[2]),
            show(self.slots[3]),
            show(self.slots[4]),
            show(self.slots[5]),
        )
    }
}

impl FromStr for AbsTime {
    type Err = TimegraphError;

    /// Parse an ISO-ish literal such as `1997-07-02T01:01:01`, `1997-07-02`,
    /// or `1997-?-?`; `?`-prefixed slots are unknown.
    fn from_str(s: &str) -> Result<AbsTime> {
        let (date, time) = match s.split_once(['T', ' ']) {
            Some((d, t)) => (d, Some(t)),
            None => (s, None),
        };
        let date_parts: Vec<&str> = date.split('-').collect();
        if date_parts.len() != 3 {
            return Err(TimegraphError::InvalidAbsTime(s.to_string()));
        }
        let mut slots = [None; 6];
        for (i, part) in date_parts.iter().enumerate() {
            slots[i] = parse_slot(part)?;
        }
        if let Some(time) = time {
            let time_parts: Vec<&str> = time.split(':').collect();
            if time_parts.len() != 3 {
                return Err(TimegraphError::InvalidAbsTime(s.to_string()));
            }
            for (i, part) in time_parts.iter().enumerate() {
                slots[3 + i] = parse_slot(part)?;
            }
        }
        AbsTime::new(slots)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn abs(s: &str) -> AbsTime {
        s.parse().unwrap()
    }

    #[test]
    fn test_compare_concrete() {
        let a = abs("1997-07-02T01:01:01");
        let b = abs("1998-07-02T01:01:01");
        assert_eq!(a.compare(&b).to_string(), "before-1");
        assert_eq!(b.compare(&a).to_string(), "after-1");
        assert_eq!(a.compare(&a).to_string(), "equal");
    }

    #[test]
    fn test_compare_unknown_poisons() {
        let a = abs("1997-?-?");
        let b = abs("1997-07-02");
        assert!(a.compare(&b).is_unknown());
        // A decision earlier than the unknown slot still stands.
        let c = abs("1998-?-?");
        assert_eq!(a.compare(&c).to_string(), "before-1");
    }

    #[test]
    fn test_merge_abs_min() {
        let old = AbsTime::unknown();
        let new = abs("1997-07-02T01:01:01");
        let merged = old.merge_abs_min(&new, &AbsTime::unknown());
        assert_eq!(merged, new);

        // Later lower bound wins slot-wise.
        let later = abs("1999-07-02T01:01:01");
        let merged = merged.merge_abs_min(&later, &AbsTime::unknown());
        assert_eq!(merged, later);
    }

    #[test]
    fn test_merge_refuses_crossing() {
        let min = abs("1997-01-01T00:00:00");
        let max = abs("1998-01-01T00:00:00");
        let past_max = abs("1999-01-01T00:00:00");
        let merged = min.merge_abs_min(&past_max, &max);
        assert_eq!(merged, min);
    }

    #[test]
    fn test_duration_min_one_year() {
        let a = abs("1998-07-02T01:01:01");
        let b = abs("1999-07-02T01:01:01");
        assert_eq!(a.calc_duration_min(&b), 365.0 * 86400.0);
        // Reversed order clamps to zero.
        assert_eq!(b.calc_duration_min(&a), 0.0);
    }

    #[test]
    fn test_duration_min_unknown_degrades() {
        let a = AbsTime::unknown();
        let b = abs("1999-07-02T01:01:01");
        assert_eq!(a.calc_duration_min(&b), 0.0);
    }

    #[test]
    fn test_duration_max_unknown_year() {
        let a = AbsTime::unknown();
        let b = abs("1999-07-02T01:01:01");
        assert_eq!(a.calc_duration_max(&b), f64::INFINITY);
        let c = abs("1998-07-02T01:01:01");
        assert_eq!(c.calc_duration_max(&b), 365.0 * 86400.0);
    }

    #[test]
    fn test_duration_with_partial_slots() {
        // "during 1998" as bounds: min fills late, max fills early.
        let year = abs("1998-?-?");
        let next = abs("1999-07-02T00:00:00");
        assert_eq!(year.calc_duration_min(&next), 0.0 + 182.0 * 86400.0 + 1.0);
    }

    #[test]
    fn test_shift_roundtrip() {
        let a = abs("1998-07-02T01:01:01");
        let later = a.calc_add_dur(86400.0);
        assert_eq!(later, abs("1998-07-03T01:01:01"));
        assert_eq!(later.calc_sub_dur(86400.0), a);
        // Partially-unknown bounds do not shift.
        let partial = abs("1998-07-?");
        assert_eq!(partial.calc_add_dur(86400.0), partial);
    }

    #[test]
    fn test_literal_forms() {
        let from_slots = AbsTime::from_slots(&["1997", "7", "2", "1", "1", "1"]).unwrap();
        assert_eq!(from_slots, abs("1997-07-02T01:01:01"));

        let rec = [
            "$", "date+time", ":year", "1997", ":month", "7", ":day", "2", ":hour", "?h",
            ":minute", "?mi", ":sec", "?s",
        ];
        let from_rec = AbsTime::from_record(&rec).unwrap();
        assert_eq!(from_rec, abs("1997-07-02"));
        assert_eq!(from_rec.to_record()[3], "1997");

        assert!(AbsTime::from_slots(&["1997", "13", "2", "1", "1", "1"]).is_err());
        assert!(AbsTime::from_record(&["$", "date"]).is_err());
    }

    #[test]
    fn test_best_and_combined_durations() {
        assert_eq!(
            get_best_duration(Some((1.0, 10.0)), Some((3.0, 20.0))),
            Some((3.0, 10.0))
        );
        assert_eq!(get_best_duration(None, Some((1.0, 2.0))), Some((1.0, 2.0)));
        assert_eq!(combine_durations((1.0, 2.0), (3.0, f64::INFINITY)).0, 4.0);
        assert_eq!(combine_min_duration(5.0, 3.0), 5.0);
    }
}
