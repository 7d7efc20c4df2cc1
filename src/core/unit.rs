use serde::{Deserialize, Serialize};

use crate::error::{AxisError, AxisResult};

/// Calendar units recognized by the time axis, ordered from finest to coarsest.
///
/// The ordering is meaningful: `TimeUnit::Hour < TimeUnit::Day`, so
/// comparisons express granularity ("finer than" / "coarser than").
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum TimeUnit {
    #[serde(alias = "ms", alias = "milli", alias = "milliseconds")]
    Millisecond,
    #[serde(alias = "s", alias = "sec", alias = "seconds")]
    Second,
    #[serde(alias = "min", alias = "minutes")]
    Minute,
    #[serde(alias = "h", alias = "hr", alias = "hours")]
    Hour,
    #[serde(alias = "d", alias = "date", alias = "days")]
    Day,
    #[serde(alias = "w", alias = "wk", alias = "weeks")]
    Week,
    #[serde(alias = "mon", alias = "mo", alias = "mth", alias = "months")]
    Month,
    #[serde(alias = "q", alias = "qtr", alias = "quarters")]
    Quarter,
    #[serde(alias = "y", alias = "yr", alias = "years")]
    Year,
}

pub const MS_PER_SECOND: i64 = 1_000;
pub const MS_PER_MINUTE: i64 = 60_000;
pub const MS_PER_HOUR: i64 = 3_600_000;
pub const MS_PER_DAY: i64 = 86_400_000;
pub const MS_PER_WEEK: i64 = 604_800_000;

impl TimeUnit {
    /// Normalizes a unit name or alias to its canonical unit.
    ///
    /// Accepts canonical names, common abbreviations and plural forms,
    /// case-insensitively. Unrecognized strings are configuration errors.
    pub fn normalize(name: &str) -> AxisResult<Self> {
        let lowered = name.trim().to_ascii_lowercase();
        let unit = match lowered.as_str() {
            "millisecond" | "milliseconds" | "ms" | "milli" => Self::Millisecond,
            "second" | "seconds" | "s" | "sec" => Self::Second,
            "minute" | "minutes" | "min" => Self::Minute,
            "hour" | "hours" | "h" | "hr" => Self::Hour,
            "day" | "days" | "d" | "date" => Self::Day,
            "week" | "weeks" | "w" | "wk" => Self::Week,
            "month" | "months" | "mon" | "mo" | "mth" => Self::Month,
            "quarter" | "quarters" | "q" | "qtr" => Self::Quarter,
            "year" | "years" | "y" | "yr" => Self::Year,
            _ => return Err(AxisError::UnknownUnit(name.to_owned())),
        };
        Ok(unit)
    }

    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Millisecond => "millisecond",
            Self::Second => "second",
            Self::Minute => "minute",
            Self::Hour => "hour",
            Self::Day => "day",
            Self::Week => "week",
            Self::Month => "month",
            Self::Quarter => "quarter",
            Self::Year => "year",
        }
    }

    #[must_use]
    pub fn capitalized_name(self) -> &'static str {
        match self {
            Self::Millisecond => "Millisecond",
            Self::Second => "Second",
            Self::Minute => "Minute",
            Self::Hour => "Hour",
            Self::Day => "Day",
            Self::Week => "Week",
            Self::Month => "Month",
            Self::Quarter => "Quarter",
            Self::Year => "Year",
        }
    }

    /// Approximate span of one unit in milliseconds.
    ///
    /// Month, quarter and year use the scheduler conventions of 30, 90 and
    /// 365 days. These magnitudes are for zoom-density comparison and unit
    /// ratios only, never for calendar arithmetic.
    #[must_use]
    pub fn approx_ms(self) -> i64 {
        match self {
            Self::Millisecond => 1,
            Self::Second => MS_PER_SECOND,
            Self::Minute => MS_PER_MINUTE,
            Self::Hour => MS_PER_HOUR,
            Self::Day => MS_PER_DAY,
            Self::Week => MS_PER_WEEK,
            Self::Month => 30 * MS_PER_DAY,
            Self::Quarter => 90 * MS_PER_DAY,
            Self::Year => 365 * MS_PER_DAY,
        }
    }

    #[must_use]
    pub fn is_finer_than(self, other: Self) -> bool {
        self < other
    }

    #[must_use]
    pub fn is_coarser_than(self, other: Self) -> bool {
        self > other
    }
}

/// Approximate span of `increment` × `unit` in milliseconds.
#[must_use]
pub fn duration_ms(increment: i64, unit: TimeUnit) -> i64 {
    increment * unit.approx_ms()
}

/// Approximate ratio of one `unit` span to one `base` span.
///
/// `span_ratio(TimeUnit::Minute, TimeUnit::Hour)` is `1/60`.
#[must_use]
pub fn span_ratio(unit: TimeUnit, base: TimeUnit) -> f64 {
    unit.approx_ms() as f64 / base.approx_ms() as f64
}

#[cfg(test)]
mod tests {
    use super::{span_ratio, TimeUnit};

    #[test]
    fn normalize_accepts_aliases_and_plurals() {
        assert_eq!(TimeUnit::normalize("ms").expect("ms"), TimeUnit::Millisecond);
        assert_eq!(TimeUnit::normalize("Hours").expect("hours"), TimeUnit::Hour);
        assert_eq!(TimeUnit::normalize("q").expect("q"), TimeUnit::Quarter);
        assert_eq!(TimeUnit::normalize("date").expect("date"), TimeUnit::Day);
    }

    #[test]
    fn normalize_rejects_unknown_unit() {
        assert!(TimeUnit::normalize("fortnight").is_err());
    }

    #[test]
    fn unit_ordering_expresses_granularity() {
        assert!(TimeUnit::Hour.is_finer_than(TimeUnit::Day));
        assert!(TimeUnit::Year.is_coarser_than(TimeUnit::Quarter));
    }

    #[test]
    fn span_ratio_of_minute_to_hour() {
        let ratio = span_ratio(TimeUnit::Minute, TimeUnit::Hour);
        assert!((ratio - 1.0 / 60.0).abs() < 1e-12);
    }
}
