//! Axis date snapping: floor, ceil and round to unit/increment grids.
//!
//! Snapping is either origin-relative (a plain millisecond grid anchored on
//! the axis start) or absolute (calendar boundaries; weeks honour the
//! configured week start day, 1-based calendar fields are shifted before the
//! modulo snap).

use chrono::{DateTime, Datelike, Duration, NaiveDate, Offset, TimeZone, Timelike};

use crate::core::date_math::{self, resolve_truncated};
use crate::core::unit::{duration_ms, TimeUnit};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rounding {
    Floor,
    Round,
    Ceil,
}

/// Snaps `date` down to the nearest `increment` multiple of `unit`.
///
/// With `relative_to`, snapping happens on a flat millisecond grid anchored
/// at that origin. Without it, snapping targets absolute calendar boundaries.
pub fn floor_date<Tz: TimeZone>(
    date: &DateTime<Tz>,
    relative_to: Option<&DateTime<Tz>>,
    unit: TimeUnit,
    increment: i64,
    week_start_day: u8,
) -> DateTime<Tz> {
    let increment = increment.max(1);

    if let Some(origin) = relative_to {
        let span = duration_ms(increment, unit);
        let delta = date
            .clone()
            .signed_duration_since(origin.clone())
            .num_milliseconds();
        let snapped = delta.div_euclid(span) * span;
        return origin.clone() + Duration::milliseconds(snapped);
    }

    let tz = date.timezone();
    let local = date.naive_local();
    let day = local.date();

    let naive = match unit {
        TimeUnit::Millisecond => {
            let ms = i64::from(local.nanosecond() / 1_000_000);
            let snapped = (ms / increment * increment) as u32;
            local
                .with_nanosecond(snapped * 1_000_000)
                .expect("snapped millisecond is in range")
        }
        TimeUnit::Second => {
            let snapped = (i64::from(local.second()) / increment * increment) as u32;
            day.and_hms_opt(local.hour(), local.minute(), snapped)
                .expect("snapped time is valid")
        }
        TimeUnit::Minute => {
            let snapped = (i64::from(local.minute()) / increment * increment) as u32;
            day.and_hms_opt(local.hour(), snapped, 0)
                .expect("snapped time is valid")
        }
        TimeUnit::Hour => {
            let snapped = (i64::from(local.hour()) / increment * increment) as u32;
            day.and_hms_opt(snapped, 0, 0).expect("snapped time is valid")
        }
        TimeUnit::Day => {
            // day-of-month is 1-based; shift by one before the modulo snap
            let snapped = ((i64::from(local.day()) - 1) / increment * increment + 1) as u32;
            day.with_day(snapped)
                .expect("snapped day exists in month")
                .and_hms_opt(0, 0, 0)
                .expect("midnight is valid")
        }
        TimeUnit::Week => {
            let floored = date_math::start_of(date, TimeUnit::Week, week_start_day);
            // Corrective step for zones where the week-start midnight does not
            // exist and the engine lands at 23:00 of the previous day.
            if date_math::day_of_week(&floored) != u32::from(week_start_day)
                && floored.hour() == 23
            {
                return floored + Duration::hours(1);
            }
            return floored;
        }
        TimeUnit::Month => {
            let snapped = (i64::from(local.month0()) / increment * increment) as u32;
            first_of(local.year(), snapped + 1)
        }
        TimeUnit::Quarter => {
            let quarter = i64::from(local.month0() / 3);
            let snapped = (quarter / increment * increment * 3) as u32;
            first_of(local.year(), snapped + 1)
        }
        TimeUnit::Year => {
            let snapped = (i64::from(local.year()) / increment * increment) as i32;
            first_of(snapped, 1)
        }
    };

    resolve_truncated(&tz, naive, date)
}

/// Snaps `date` up to the next `increment` multiple of `unit`.
///
/// A date already exactly on a `unit` boundary is returned unchanged.
pub fn ceil_date<Tz: TimeZone>(
    date: &DateTime<Tz>,
    relative_to: Option<&DateTime<Tz>>,
    unit: TimeUnit,
    increment: i64,
    week_start_day: u8,
) -> DateTime<Tz> {
    let increment = increment.max(1);

    if let Some(origin) = relative_to {
        let span = duration_ms(increment, unit);
        let delta = date
            .clone()
            .signed_duration_since(origin.clone())
            .num_milliseconds();
        if delta.rem_euclid(span) == 0 {
            return date.clone();
        }
        let snapped = (delta.div_euclid(span) + 1) * span;
        return origin.clone() + Duration::milliseconds(snapped);
    }

    if is_at_boundary(date, unit, week_start_day) {
        date.clone()
    } else {
        date_math::get_next(date, unit, increment, week_start_day)
    }
}

/// Snaps `date` to the nearest `increment` multiple of `unit` relative to an
/// origin.
///
/// Weeks snap to the nearest week start, months and quarters use fractional
/// month distance (day-of-month included), finer units use the millisecond
/// grid. Day snapping is corrected for UTC-offset changes between the origin
/// and the result so day boundaries stay on local midnight across DST.
pub fn round_date<Tz: TimeZone>(
    date: &DateTime<Tz>,
    relative_to: &DateTime<Tz>,
    unit: TimeUnit,
    increment: i64,
    week_start_day: u8,
) -> DateTime<Tz> {
    let increment = increment.max(1);

    match unit {
        TimeUnit::Week => {
            let before = floor_date(date, None, TimeUnit::Week, 1, week_start_day);
            let after = date_math::add(&before, TimeUnit::Week, 1);
            let to_before = date
                .clone()
                .signed_duration_since(before.clone())
                .num_milliseconds();
            let to_after = after
                .clone()
                .signed_duration_since(date.clone())
                .num_milliseconds();
            if to_after <= to_before { after } else { before }
        }
        TimeUnit::Month => round_months(date, relative_to, increment),
        TimeUnit::Quarter => round_months(date, relative_to, increment * 3),
        _ => {
            let span = duration_ms(increment, unit);
            let delta = date
                .clone()
                .signed_duration_since(relative_to.clone())
                .num_milliseconds();
            let snapped = ((delta as f64 / span as f64).round() as i64) * span;
            let result = relative_to.clone() + Duration::milliseconds(snapped);
            if unit == TimeUnit::Day {
                let offset_diff = i64::from(
                    relative_to.offset().fix().local_minus_utc()
                        - result.offset().fix().local_minus_utc(),
                );
                if offset_diff != 0 {
                    return result + Duration::seconds(offset_diff);
                }
            }
            result
        }
    }
}

fn round_months<Tz: TimeZone>(
    date: &DateTime<Tz>,
    relative_to: &DateTime<Tz>,
    increment: i64,
) -> DateTime<Tz> {
    let origin = floor_date(relative_to, None, TimeUnit::Month, 1, 0);
    let months = fractional_months(date) - fractional_months(&origin);
    let snapped = (months / increment as f64).round() as i64 * increment;
    date_math::add(&origin, TimeUnit::Month, snapped)
}

fn fractional_months<Tz: TimeZone>(date: &DateTime<Tz>) -> f64 {
    let local = date.naive_local();
    let whole = f64::from(local.year() * 12 + local.month0() as i32);
    let in_month = f64::from(local.day0()) + day_fraction(date);
    whole + in_month / f64::from(date_math::days_in_month(local.year(), local.month()))
}

fn day_fraction<Tz: TimeZone>(date: &DateTime<Tz>) -> f64 {
    let local = date.naive_local();
    f64::from(local.num_seconds_from_midnight()) / 86_400.0
}

fn is_at_boundary<Tz: TimeZone>(date: &DateTime<Tz>, unit: TimeUnit, week_start_day: u8) -> bool {
    let local = date.naive_local();
    let at_midnight = local.num_seconds_from_midnight() == 0 && local.nanosecond() == 0;
    match unit {
        TimeUnit::Millisecond => local.nanosecond() % 1_000_000 == 0,
        TimeUnit::Second => local.nanosecond() == 0,
        TimeUnit::Minute => local.second() == 0 && local.nanosecond() == 0,
        TimeUnit::Hour => local.minute() == 0 && local.second() == 0 && local.nanosecond() == 0,
        TimeUnit::Day => at_midnight,
        TimeUnit::Week => at_midnight && date_math::day_of_week(date) == u32::from(week_start_day),
        TimeUnit::Month => at_midnight && local.day() == 1,
        TimeUnit::Quarter => at_midnight && local.day() == 1 && local.month0() % 3 == 0,
        TimeUnit::Year => at_midnight && local.day() == 1 && local.month() == 1,
    }
}

fn first_of(year: i32, month: u32) -> chrono::NaiveDateTime {
    NaiveDate::from_ymd_opt(year, month, 1)
        .expect("first of month is valid")
        .and_hms_opt(0, 0, 0)
        .expect("midnight is valid")
}
