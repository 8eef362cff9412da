use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

/// The reference time span used for cropping, typically the start and stop of a lowering.
///
/// Both bounds are inclusive. A window with `start > end` is not rejected; it simply matches
/// nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeWindow {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
}

impl Default for TimeWindow {
    /// From the unix epoch until now
    fn default() -> Self {
        Self {
            start: DateTime::<Utc>::UNIX_EPOCH.naive_utc(),
            end: Utc::now().naive_utc(),
        }
    }
}

impl TimeWindow {
    pub fn new(start: NaiveDateTime, end: NaiveDateTime) -> Self {
        Self { start, end }
    }

    /// Check if a single timestamp lies inside the window
    pub fn contains(&self, ts: &NaiveDateTime) -> bool {
        *ts >= self.start && *ts <= self.end
    }

    /// Check if the span `[first, last]` intersects the window.
    ///
    /// A span which only touches a window bound counts as overlapping.
    pub fn overlaps(&self, first: &NaiveDateTime, last: &NaiveDateTime) -> bool {
        let ends_before = self.start > *last;
        let starts_after = *first > self.end;
        !(ends_before || starts_after)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(h: u32, m: u32, s: u32, ms: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2021, 4, 21)
            .unwrap()
            .and_hms_milli_opt(h, m, s, ms)
            .unwrap()
    }

    #[test]
    fn test_contains_is_inclusive() {
        let window = TimeWindow::new(at(10, 0, 0, 0), at(12, 0, 0, 0));
        assert!(!window.contains(&at(9, 59, 59, 999)));
        assert!(window.contains(&at(10, 0, 0, 0)));
        assert!(window.contains(&at(11, 0, 0, 0)));
        assert!(window.contains(&at(12, 0, 0, 0)));
        assert!(!window.contains(&at(12, 0, 0, 1)));
    }

    #[test]
    fn test_overlap_cases() {
        let window = TimeWindow::new(at(10, 0, 0, 0), at(12, 0, 0, 0));
        // straddles start
        assert!(window.overlaps(&at(9, 0, 0, 0), &at(11, 0, 0, 0)));
        // straddles end
        assert!(window.overlaps(&at(11, 30, 0, 0), &at(13, 0, 0, 0)));
        // inside
        assert!(window.overlaps(&at(10, 30, 0, 0), &at(11, 30, 0, 0)));
        // covers
        assert!(window.overlaps(&at(8, 0, 0, 0), &at(14, 0, 0, 0)));
        // entirely before and after
        assert!(!window.overlaps(&at(8, 0, 0, 0), &at(9, 59, 59, 999)));
        assert!(!window.overlaps(&at(13, 1, 0, 0), &at(14, 0, 0, 0)));
    }

    #[test]
    fn test_overlap_touching_bounds() {
        let window = TimeWindow::new(at(10, 0, 0, 0), at(12, 0, 0, 0));
        assert!(window.overlaps(&at(9, 0, 0, 0), &at(10, 0, 0, 0)));
        assert!(window.overlaps(&at(12, 0, 0, 0), &at(13, 0, 0, 0)));
    }

    #[test]
    fn test_inverted_window_matches_nothing() {
        let window = TimeWindow::new(at(12, 0, 0, 0), at(10, 0, 0, 0));
        assert!(!window.contains(&at(11, 0, 0, 0)));
        assert!(!window.overlaps(&at(11, 0, 0, 0), &at(11, 30, 0, 0)));
    }

    #[test]
    fn test_default_window_starts_at_epoch() {
        let window = TimeWindow::default();
        assert_eq!(window.start.to_string(), "1970-01-01 00:00:00");
        assert!(window.end > at(0, 0, 0, 0));
    }
}
