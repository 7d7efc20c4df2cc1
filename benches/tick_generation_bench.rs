use chrono::{Duration, TimeZone, Utc};
use criterion::{criterion_group, criterion_main, BatchSize, Criterion};
use timegrid_rs::core::{AxisSettings, IncludeRule, TimeAxis, TimeUnit, UnitRange};

fn bench_tick_generation(c: &mut Criterion) {
    let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).expect("valid date");

    c.bench_function("generate_hour_ticks_one_year", |b| {
        let end = start + Duration::days(365);
        b.iter(|| {
            TimeAxis::new(AxisSettings::new(start, end, TimeUnit::Hour, 1)).expect("valid axis")
        });
    });

    c.bench_function("generate_working_week_day_ticks_one_year", |b| {
        let end = start + Duration::days(365);
        let settings = AxisSettings::new(start, end, TimeUnit::Day, 1).with_include(IncludeRule {
            hour: Some(UnitRange::new(9, 17)),
            day: Some(UnitRange::new(1, 6)),
        });
        b.iter_batched(
            || settings.clone(),
            |settings| TimeAxis::new(settings).expect("valid axis"),
            BatchSize::SmallInput,
        );
    });

    c.bench_function("tick_from_date_continuous", |b| {
        let end = start + Duration::days(365);
        let axis =
            TimeAxis::new(AxisSettings::new(start, end, TimeUnit::Hour, 1)).expect("valid axis");
        let probe = start + Duration::days(180) + Duration::minutes(42);
        b.iter(|| axis.tick_from_date(&probe));
    });
}

criterion_group!(benches, bench_tick_generation);
criterion_main!(benches);
