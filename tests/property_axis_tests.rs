use chrono::{DateTime, Duration, TimeZone, Utc};
use proptest::prelude::*;
use timegrid_rs::core::{AxisSettings, TimeAxis, TimeUnit};

fn base_date() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).single().expect("valid date")
}

proptest! {
    #[test]
    fn tick_round_trip_recovers_the_date(
        span_days in 2i64..90,
        offset_minutes in 0i64..(24 * 60),
        day_offset in 0i64..89
    ) {
        prop_assume!(day_offset < span_days);

        let start = base_date();
        let end = start + Duration::days(span_days);
        let axis = TimeAxis::new(AxisSettings::new(start, end, TimeUnit::Day, 1))
            .expect("valid axis");

        let original = start + Duration::days(day_offset) + Duration::minutes(offset_minutes);
        let tick = axis.tick_from_date(&original).expect("date in axis");
        let recovered = axis.date_from_tick(tick, None).expect("tick in axis");

        let drift = (recovered - original).num_milliseconds().abs();
        prop_assert!(drift <= 1, "drift of {drift}ms after round trip");
    }

    #[test]
    fn coordinates_are_monotonic_in_time(
        span_days in 2i64..60,
        a_hours in 0i64..1_000,
        b_hours in 0i64..1_000
    ) {
        let start = base_date();
        let end = start + Duration::days(span_days);
        let axis = TimeAxis::new(AxisSettings::new(start, end, TimeUnit::Day, 1))
            .expect("valid axis");

        let limit = span_days * 24;
        let a = start + Duration::hours(a_hours.min(limit));
        let b = start + Duration::hours(b_hours.min(limit));
        let ta = axis.tick_from_date(&a).expect("a in axis");
        let tb = axis.tick_from_date(&b).expect("b in axis");

        if a < b {
            prop_assert!(ta < tb);
        } else if a > b {
            prop_assert!(ta > tb);
        } else {
            prop_assert!((ta - tb).abs() < 1e-12);
        }
    }

    #[test]
    fn regeneration_is_deterministic(
        span_days in 2i64..120,
        unit_pick in 0usize..3
    ) {
        let unit = [TimeUnit::Hour, TimeUnit::Day, TimeUnit::Week][unit_pick];
        let start = base_date();
        let end = start + Duration::days(span_days);

        let first = TimeAxis::new(AxisSettings::new(start, end, unit, 1)).expect("valid axis");
        let mut second = TimeAxis::new(AxisSettings::new(start, end, unit, 1)).expect("valid axis");
        second.set_time_span(start, end).expect("idempotent reconfigure");

        prop_assert_eq!(first.count(), second.count());
        prop_assert_eq!(first.ticks(), second.ticks());
    }

    #[test]
    fn continuous_ticks_always_partition(
        span_days in 2i64..120,
        increment in 1i64..5
    ) {
        let start = base_date();
        let end = start + Duration::days(span_days);
        let axis = TimeAxis::new(AxisSettings::new(start, end, TimeUnit::Day, increment))
            .expect("valid axis");

        prop_assert!(axis.count() >= 1);
        for pair in axis.ticks().windows(2) {
            prop_assert_eq!(pair[0].end(), pair[1].start());
        }
        prop_assert!(axis.ticks()[0].start() <= axis.start());
        prop_assert!(axis.ticks()[axis.count() - 1].end() >= axis.end());
    }
}
