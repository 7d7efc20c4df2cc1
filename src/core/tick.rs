use chrono::{DateTime, TimeZone};

/// One discrete cell of the time axis, the half-open interval `[start, end)`.
///
/// Ticks are regenerated wholesale whenever the axis is reconfigured and are
/// never mutated individually; the axis owns the sequence exclusively.
#[derive(Debug, Clone, PartialEq)]
pub struct Tick<Tz: TimeZone> {
    start: DateTime<Tz>,
    end: DateTime<Tz>,
}

impl<Tz: TimeZone> Tick<Tz> {
    pub(crate) fn new(start: DateTime<Tz>, end: DateTime<Tz>) -> Self {
        debug_assert!(start < end, "tick must have positive duration");
        Self { start, end }
    }

    #[must_use]
    pub fn start(&self) -> &DateTime<Tz> {
        &self.start
    }

    #[must_use]
    pub fn end(&self) -> &DateTime<Tz> {
        &self.end
    }

    #[must_use]
    pub fn start_ms(&self) -> i64 {
        self.start.timestamp_millis()
    }

    #[must_use]
    pub fn end_ms(&self) -> i64 {
        self.end.timestamp_millis()
    }

    #[must_use]
    pub fn duration_ms(&self) -> i64 {
        self.end_ms() - self.start_ms()
    }

    #[must_use]
    pub fn contains(&self, date: &DateTime<Tz>) -> bool {
        *date >= self.start && *date < self.end
    }
}
