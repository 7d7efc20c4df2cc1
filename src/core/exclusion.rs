//! Working-time exclusion rules.
//!
//! An [`IncludeRule`] keeps only a window of hours per day and/or days per
//! week on the axis. Candidate ticks at the rule's own granularity are kept
//! or dropped whole; coarser ticks get their boundaries clipped onto the
//! window, and coordinate queries count only included wall-clock time so
//! excluded spans collapse to zero visual width.

use chrono::{DateTime, TimeZone, Timelike};
use serde::{Deserialize, Serialize};

use crate::core::date_math::{self, resolve_local};
use crate::core::unit::TimeUnit;
use crate::error::{AxisError, AxisResult};

/// Half-open `[from, to)` window of hour-of-day or day-of-week values.
///
/// Day-of-week numbering is 0 = Sunday .. 6 = Saturday.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnitRange {
    pub from: u32,
    pub to: u32,
}

impl UnitRange {
    #[must_use]
    pub fn new(from: u32, to: u32) -> Self {
        Self { from, to }
    }

    #[must_use]
    pub fn contains(self, value: u32) -> bool {
        self.from <= value && value < self.to
    }
}

/// Working-time inclusion rule: hours of the day and/or days of the week to
/// keep on the axis. Empty rule means a continuous axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct IncludeRule {
    #[serde(default)]
    pub hour: Option<UnitRange>,
    #[serde(default)]
    pub day: Option<UnitRange>,
}

impl IncludeRule {
    #[must_use]
    pub fn is_empty(self) -> bool {
        self.hour.is_none() && self.day.is_none()
    }

    /// Validates the rule and precomputes the per-unit scale factors.
    pub fn resolve(self) -> AxisResult<Option<ResolvedInclude>> {
        if self.is_empty() {
            return Ok(None);
        }
        let hour = self.hour.map(|r| ResolvedRange::checked(r, 24, "hour")).transpose()?;
        let day = self.day.map(|r| ResolvedRange::checked(r, 7, "day")).transpose()?;
        Ok(Some(ResolvedInclude { hour, day }))
    }
}

/// A validated window with the scale factors used by coordinate mapping.
///
/// `length_factor` is the ratio of the base span to the included span (how
/// much an included span must stretch to fill the base unit visually);
/// `center` is the window midpoint, used to pick the collapse direction for
/// values inside an excluded span.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResolvedRange {
    pub from: u32,
    pub to: u32,
    pub length_factor: f64,
    pub center: f64,
}

impl ResolvedRange {
    fn checked(range: UnitRange, base: u32, what: &str) -> AxisResult<Self> {
        if range.from >= range.to || range.to > base {
            return Err(AxisError::InvalidConfiguration(format!(
                "include.{what} range must satisfy 0 <= from < to <= {base}, got {}..{}",
                range.from, range.to
            )));
        }
        Ok(Self {
            from: range.from,
            to: range.to,
            length_factor: f64::from(base) / f64::from(range.to - range.from),
            center: f64::from(range.from + range.to) / 2.0,
        })
    }

    #[must_use]
    pub fn contains(self, value: u32) -> bool {
        self.from <= value && value < self.to
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResolvedInclude {
    pub hour: Option<ResolvedRange>,
    pub day: Option<ResolvedRange>,
}

impl ResolvedInclude {
    /// Applies the rule to a candidate tick interval.
    ///
    /// Candidates at or below the rule's granularity are kept whole or
    /// dropped (`None`); coarser candidates get their boundaries clipped
    /// onto the included window. A candidate clipped to nothing is dropped.
    pub fn apply<Tz: TimeZone>(
        &self,
        start: &DateTime<Tz>,
        end: &DateTime<Tz>,
        unit: TimeUnit,
    ) -> Option<(DateTime<Tz>, DateTime<Tz>)> {
        let mut clipped_start = start.clone();
        let mut clipped_end = end.clone();

        if let Some(day) = self.day {
            if unit.is_coarser_than(TimeUnit::Day) {
                clipped_start = clip_start_to_day_window(&clipped_start, day);
                clipped_end = clip_end_to_day_window(&clipped_end, day);
            } else if !day.contains(date_math::day_of_week(start)) {
                return None;
            }
        }

        if let Some(hour) = self.hour {
            if unit.is_coarser_than(TimeUnit::Hour) {
                clipped_start = clip_start_to_hour_window(&clipped_start, hour);
                clipped_end = clip_end_to_hour_window(&clipped_end, hour);
            } else if !hour.contains(start.hour()) {
                return None;
            }
        }

        if clipped_start < clipped_end {
            Some((clipped_start, clipped_end))
        } else {
            None
        }
    }

    /// Included wall-clock milliseconds in `[a, b)`.
    pub fn included_ms_between<Tz: TimeZone>(&self, a: &DateTime<Tz>, b: &DateTime<Tz>) -> i64 {
        if a >= b {
            return 0;
        }
        let mut total = 0;
        let mut day = date_math::start_of(a, TimeUnit::Day, 0);
        while day < *b {
            let next = date_math::add(&day, TimeUnit::Day, 1);
            if let Some((win_start, win_end)) = self.day_window(&day) {
                let seg_start = max_date(a, &win_start);
                let seg_end = min_date(b, &win_end);
                if seg_start < seg_end {
                    total += seg_end.timestamp_millis() - seg_start.timestamp_millis();
                }
            }
            day = next;
        }
        total
    }

    /// Advances `from` by `ms` of included time, skipping excluded spans.
    pub fn advance_included<Tz: TimeZone>(&self, from: &DateTime<Tz>, ms: i64) -> DateTime<Tz> {
        let mut remaining = ms.max(0);
        let mut day = date_math::start_of(from, TimeUnit::Day, 0);
        // Bounded walk; an axis never spans anywhere near this many days.
        for _ in 0..100_000 {
            if let Some((win_start, win_end)) = self.day_window(&day) {
                let seg_start = max_date(from, &win_start);
                if seg_start < win_end {
                    let available =
                        win_end.timestamp_millis() - seg_start.timestamp_millis();
                    if remaining <= available {
                        return seg_start + chrono::Duration::milliseconds(remaining);
                    }
                    remaining -= available;
                }
            }
            day = date_math::add(&day, TimeUnit::Day, 1);
        }
        from.clone()
    }

    /// Moves a date inside an excluded span onto the nearer included edge.
    ///
    /// Direction is picked against the window `center`: values at or past it
    /// snap forward to the next window start, earlier values snap back.
    pub fn snap_excluded<Tz: TimeZone>(&self, date: &DateTime<Tz>) -> DateTime<Tz> {
        if self.contains_date(date) {
            return date.clone();
        }
        let mut day = date_math::start_of(date, TimeUnit::Day, 0);

        if let Some(hour) = self.hour {
            if self.day_included(&day) && f64::from(date.hour()) < hour.center {
                // early-morning side of the gap: previous window's end
                let mut prev = date_math::add(&day, TimeUnit::Day, -1);
                for _ in 0..7 {
                    if self.day_included(&prev) {
                        return at_hour(&prev, hour.to);
                    }
                    prev = date_math::add(&prev, TimeUnit::Day, -1);
                }
            }
        }

        // forward to the next window start
        for _ in 0..8 {
            if let Some((win_start, _)) = self.day_window(&day) {
                if win_start > *date {
                    return win_start;
                }
            }
            day = date_math::add(&day, TimeUnit::Day, 1);
        }
        date.clone()
    }

    #[must_use]
    pub fn contains_date<Tz: TimeZone>(&self, date: &DateTime<Tz>) -> bool {
        if let Some(day) = self.day {
            if !day.contains(date_math::day_of_week(date)) {
                return false;
            }
        }
        if let Some(hour) = self.hour {
            if !hour.contains(date.hour()) {
                return false;
            }
        }
        true
    }

    fn day_included<Tz: TimeZone>(&self, day: &DateTime<Tz>) -> bool {
        self.day
            .map(|rule| rule.contains(date_math::day_of_week(day)))
            .unwrap_or(true)
    }

    /// The included window of a local day, or `None` for excluded days.
    fn day_window<Tz: TimeZone>(
        &self,
        day: &DateTime<Tz>,
    ) -> Option<(DateTime<Tz>, DateTime<Tz>)> {
        if !self.day_included(day) {
            return None;
        }
        let (from, to) = self
            .hour
            .map(|rule| (rule.from, rule.to))
            .unwrap_or((0, 24));
        Some((at_hour(day, from), at_hour(day, to)))
    }
}

fn clip_start_to_day_window<Tz: TimeZone>(start: &DateTime<Tz>, rule: ResolvedRange) -> DateTime<Tz> {
    let mut day = start.clone();
    for _ in 0..7 {
        if rule.contains(date_math::day_of_week(&day)) {
            return day;
        }
        day = date_math::start_of(&date_math::add(&day, TimeUnit::Day, 1), TimeUnit::Day, 0);
    }
    day
}

fn clip_end_to_day_window<Tz: TimeZone>(end: &DateTime<Tz>, rule: ResolvedRange) -> DateTime<Tz> {
    // `end` is exclusive; the day just before it must be included
    let mut boundary = end.clone();
    for _ in 0..7 {
        let last_day = date_math::add(&boundary, TimeUnit::Millisecond, -1);
        if rule.contains(date_math::day_of_week(&last_day)) {
            return boundary;
        }
        boundary = date_math::start_of(&last_day, TimeUnit::Day, 0);
    }
    boundary
}

fn clip_start_to_hour_window<Tz: TimeZone>(start: &DateTime<Tz>, rule: ResolvedRange) -> DateTime<Tz> {
    if start.hour() < rule.from {
        at_hour(start, rule.from)
    } else if start.hour() >= rule.to {
        let next_day = date_math::add(&date_math::start_of(start, TimeUnit::Day, 0), TimeUnit::Day, 1);
        at_hour(&next_day, rule.from)
    } else {
        start.clone()
    }
}

fn clip_end_to_hour_window<Tz: TimeZone>(end: &DateTime<Tz>, rule: ResolvedRange) -> DateTime<Tz> {
    let last = date_math::add(end, TimeUnit::Millisecond, -1);
    if last.hour() >= rule.to {
        at_hour(&last, rule.to)
    } else if last.hour() < rule.from {
        let prev_day = date_math::add(&date_math::start_of(&last, TimeUnit::Day, 0), TimeUnit::Day, -1);
        at_hour(&prev_day, rule.to)
    } else {
        end.clone()
    }
}

/// The instant at `hour` o'clock of the local day containing `date`.
/// Hour 24 is the following midnight.
fn at_hour<Tz: TimeZone>(date: &DateTime<Tz>, hour: u32) -> DateTime<Tz> {
    let day = date_math::start_of(date, TimeUnit::Day, 0);
    if hour == 0 {
        return day;
    }
    if hour == 24 {
        return date_math::add(&day, TimeUnit::Day, 1);
    }
    let naive = day
        .naive_local()
        .date()
        .and_hms_opt(hour, 0, 0)
        .expect("hour 0..24 is valid");
    resolve_local(&date.timezone(), naive)
}

fn max_date<Tz: TimeZone>(a: &DateTime<Tz>, b: &DateTime<Tz>) -> DateTime<Tz> {
    if a > b { a.clone() } else { b.clone() }
}

fn min_date<Tz: TimeZone>(a: &DateTime<Tz>, b: &DateTime<Tz>) -> DateTime<Tz> {
    if a < b { a.clone() } else { b.clone() }
}

#[cfg(test)]
mod tests {
    use super::{IncludeRule, UnitRange};
    use crate::core::unit::TimeUnit;
    use chrono::{TimeZone, Utc};

    fn working_week() -> IncludeRule {
        IncludeRule {
            hour: None,
            day: Some(UnitRange::new(1, 6)),
        }
    }

    #[test]
    fn resolve_rejects_inverted_ranges() {
        let rule = IncludeRule {
            hour: Some(UnitRange::new(17, 9)),
            day: None,
        };
        assert!(rule.resolve().is_err());
    }

    #[test]
    fn resolve_computes_length_factor_and_center() {
        let rule = IncludeRule {
            hour: Some(UnitRange::new(9, 17)),
            day: None,
        };
        let resolved = rule.resolve().expect("valid rule").expect("non-empty");
        let hour = resolved.hour.expect("hour window");
        assert!((hour.length_factor - 3.0).abs() < 1e-12);
        assert!((hour.center - 13.0).abs() < 1e-12);
    }

    #[test]
    fn saturday_day_tick_is_dropped() {
        let resolved = working_week().resolve().expect("valid").expect("non-empty");
        let saturday = Utc.with_ymd_and_hms(2024, 1, 6, 0, 0, 0).unwrap();
        let sunday = Utc.with_ymd_and_hms(2024, 1, 7, 0, 0, 0).unwrap();
        assert!(resolved.apply(&saturday, &sunday, TimeUnit::Day).is_none());
    }

    #[test]
    fn week_tick_is_clipped_to_working_days() {
        let resolved = working_week().resolve().expect("valid").expect("non-empty");
        // Sunday-started week clipped to [Monday, Saturday)
        let start = Utc.with_ymd_and_hms(2024, 1, 7, 0, 0, 0).unwrap();
        let end = Utc.with_ymd_and_hms(2024, 1, 14, 0, 0, 0).unwrap();
        let (s, e) = resolved
            .apply(&start, &end, TimeUnit::Week)
            .expect("clipped tick");
        assert_eq!(s, Utc.with_ymd_and_hms(2024, 1, 8, 0, 0, 0).unwrap());
        assert_eq!(e, Utc.with_ymd_and_hms(2024, 1, 13, 0, 0, 0).unwrap());
    }

    #[test]
    fn day_tick_is_clipped_to_working_hours() {
        let rule = IncludeRule {
            hour: Some(UnitRange::new(9, 17)),
            day: None,
        };
        let resolved = rule.resolve().expect("valid").expect("non-empty");
        let start = Utc.with_ymd_and_hms(2024, 1, 2, 0, 0, 0).unwrap();
        let end = Utc.with_ymd_and_hms(2024, 1, 3, 0, 0, 0).unwrap();
        let (s, e) = resolved
            .apply(&start, &end, TimeUnit::Day)
            .expect("clipped tick");
        assert_eq!(s, Utc.with_ymd_and_hms(2024, 1, 2, 9, 0, 0).unwrap());
        assert_eq!(e, Utc.with_ymd_and_hms(2024, 1, 2, 17, 0, 0).unwrap());
    }

    #[test]
    fn included_ms_skips_weekends() {
        let resolved = working_week().resolve().expect("valid").expect("non-empty");
        // Friday midnight to Tuesday midnight: Friday + Monday count
        let a = Utc.with_ymd_and_hms(2024, 1, 5, 0, 0, 0).unwrap();
        let b = Utc.with_ymd_and_hms(2024, 1, 9, 0, 0, 0).unwrap();
        let ms = resolved.included_ms_between(&a, &b);
        assert_eq!(ms, 2 * 86_400_000);
    }

    #[test]
    fn advance_included_lands_after_weekend() {
        let resolved = working_week().resolve().expect("valid").expect("non-empty");
        let friday = Utc.with_ymd_and_hms(2024, 1, 5, 0, 0, 0).unwrap();
        let landed = resolved.advance_included(&friday, 86_400_000 + 3_600_000);
        // one full Friday, then one hour into Monday
        assert_eq!(landed, Utc.with_ymd_and_hms(2024, 1, 8, 1, 0, 0).unwrap());
    }
}
