//! Calendar arithmetic over `chrono`, shared by tick generation and snapping.
//!
//! Wall-clock semantics: hour-and-finer arithmetic is absolute time (an hourly
//! tick sequence skips a spring-forward gap instead of stretching), day-and-
//! coarser arithmetic is naive-calendar addition re-resolved in the local
//! zone. Ambiguous local times resolve to the earliest instant; nonexistent
//! times resolve to the first valid instant after the gap.

use chrono::offset::LocalResult;
use chrono::{DateTime, Datelike, Days, Duration, NaiveDate, NaiveDateTime, TimeZone, Timelike};

use crate::core::unit::TimeUnit;

/// Resolves a naive local timestamp in `tz`.
pub(crate) fn resolve_local<Tz: TimeZone>(tz: &Tz, naive: NaiveDateTime) -> DateTime<Tz> {
    match tz.from_local_datetime(&naive) {
        LocalResult::Single(dt) => dt,
        LocalResult::Ambiguous(earliest, _) => earliest,
        LocalResult::None => resolve_after_gap(tz, naive),
    }
}

/// Resolves a truncated naive timestamp against the instant it was truncated
/// from. A fall-back transition makes the truncated wall-clock time
/// ambiguous; the right instant is the latest one not after the reference,
/// otherwise truncation would jump back across the repeated hour.
pub(crate) fn resolve_truncated<Tz: TimeZone>(
    tz: &Tz,
    naive: NaiveDateTime,
    reference: &DateTime<Tz>,
) -> DateTime<Tz> {
    match tz.from_local_datetime(&naive) {
        LocalResult::Single(dt) => dt,
        LocalResult::Ambiguous(earliest, latest) => {
            if latest <= *reference {
                latest
            } else {
                earliest
            }
        }
        LocalResult::None => resolve_after_gap(tz, naive),
    }
}

fn resolve_after_gap<Tz: TimeZone>(tz: &Tz, naive: NaiveDateTime) -> DateTime<Tz> {
    let mut probe = naive;
    for _ in 0..8 {
        probe = probe + Duration::minutes(15);
        match tz.from_local_datetime(&probe) {
            LocalResult::Single(dt) | LocalResult::Ambiguous(dt, _) => return dt,
            LocalResult::None => {}
        }
    }
    tz.from_utc_datetime(&naive)
}

/// 0 = Sunday .. 6 = Saturday, matching the exclusion-rule numbering.
#[must_use]
pub fn day_of_week<Tz: TimeZone>(date: &DateTime<Tz>) -> u32 {
    date.weekday().num_days_from_sunday()
}

/// Truncates `date` to the start of `unit`.
pub fn start_of<Tz: TimeZone>(
    date: &DateTime<Tz>,
    unit: TimeUnit,
    week_start_day: u8,
) -> DateTime<Tz> {
    let tz = date.timezone();
    let local = date.naive_local();
    let day = local.date();

    let naive = match unit {
        TimeUnit::Millisecond => local
            .with_nanosecond(local.nanosecond() / 1_000_000 * 1_000_000)
            .expect("nanosecond truncation is in range"),
        TimeUnit::Second => local
            .with_nanosecond(0)
            .expect("zero nanosecond is in range"),
        TimeUnit::Minute => day
            .and_hms_opt(local.hour(), local.minute(), 0)
            .expect("truncated time is valid"),
        TimeUnit::Hour => day
            .and_hms_opt(local.hour(), 0, 0)
            .expect("truncated time is valid"),
        TimeUnit::Day => day.and_hms_opt(0, 0, 0).expect("midnight is valid"),
        TimeUnit::Week => {
            let back = (local.weekday().num_days_from_sunday() + 7 - u32::from(week_start_day)) % 7;
            day.checked_sub_days(Days::new(u64::from(back)))
                .expect("date in supported range")
                .and_hms_opt(0, 0, 0)
                .expect("midnight is valid")
        }
        TimeUnit::Month => first_of_month(local.year(), local.month()),
        TimeUnit::Quarter => first_of_month(local.year(), local.month0() / 3 * 3 + 1),
        TimeUnit::Year => first_of_month(local.year(), 1),
    };

    resolve_truncated(&tz, naive, date)
}

fn first_of_month(year: i32, month: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(year, month, 1)
        .expect("first of month is valid")
        .and_hms_opt(0, 0, 0)
        .expect("midnight is valid")
}

/// Calendar-aware addition of `amount` × `unit`.
pub fn add<Tz: TimeZone>(date: &DateTime<Tz>, unit: TimeUnit, amount: i64) -> DateTime<Tz> {
    match unit {
        TimeUnit::Millisecond => date.clone() + Duration::milliseconds(amount),
        TimeUnit::Second => date.clone() + Duration::seconds(amount),
        TimeUnit::Minute => date.clone() + Duration::minutes(amount),
        TimeUnit::Hour => date.clone() + Duration::hours(amount),
        TimeUnit::Day => add_days(date, amount),
        TimeUnit::Week => add_days(date, amount * 7),
        TimeUnit::Month => add_months(date, amount),
        TimeUnit::Quarter => add_months(date, amount * 3),
        TimeUnit::Year => add_months(date, amount * 12),
    }
}

fn add_days<Tz: TimeZone>(date: &DateTime<Tz>, amount: i64) -> DateTime<Tz> {
    let tz = date.timezone();
    let naive = date.naive_local() + Duration::days(amount);
    resolve_local(&tz, naive)
}

fn add_months<Tz: TimeZone>(date: &DateTime<Tz>, amount: i64) -> DateTime<Tz> {
    let tz = date.timezone();
    let local = date.naive_local();
    let shifted = if amount >= 0 {
        local.checked_add_months(chrono::Months::new(amount.unsigned_abs() as u32))
    } else {
        local.checked_sub_months(chrono::Months::new(amount.unsigned_abs() as u32))
    }
    .expect("date in supported range");
    resolve_local(&tz, shifted)
}

/// Next tick boundary at or after `date`: the start of its `unit` advanced by
/// `increment` units.
pub fn get_next<Tz: TimeZone>(
    date: &DateTime<Tz>,
    unit: TimeUnit,
    increment: i64,
    week_start_day: u8,
) -> DateTime<Tz> {
    add(&start_of(date, unit, week_start_day), unit, increment)
}

/// Elapsed wall-clock milliseconds between two instants, ignoring offset
/// changes. Differs from absolute elapsed time across a DST transition.
#[must_use]
pub fn wall_ms_between<Tz: TimeZone>(from: &DateTime<Tz>, to: &DateTime<Tz>) -> i64 {
    (to.naive_local() - from.naive_local()).num_milliseconds()
}

#[must_use]
pub fn days_in_month(year: i32, month: u32) -> u32 {
    let first = NaiveDate::from_ymd_opt(year, month, 1).expect("first of month is valid");
    let next = first
        .checked_add_months(chrono::Months::new(1))
        .expect("date in supported range");
    (next - first).num_days() as u32
}
