use chrono::{DateTime, TimeZone, Utc};
use timegrid_rs::core::{
    AxisSettings, IncludeRule, Orientation, Rounding, TimeAxis, TimeAxisViewModel, TimeUnit,
    UnitRange, ViewModelOptions,
};
use timegrid_rs::preset::{HeaderRowConfig, ViewPreset, ViewPresetConfig};

fn date(y: i32, mo: u32, d: u32, h: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(y, mo, d, h, 0, 0).single().expect("valid date")
}

fn day_axis() -> TimeAxis<Utc> {
    TimeAxis::new(AxisSettings::new(
        date(2024, 1, 1, 0),
        date(2024, 1, 8, 0),
        TimeUnit::Day,
        1,
    ))
    .expect("valid axis")
}

fn day_and_month_preset(tick_width: f64) -> ViewPreset {
    ViewPreset::from_config(&ViewPresetConfig {
        tick_width: Some(tick_width),
        headers: Some(vec![
            HeaderRowConfig::new("month").with_date_format("%B %Y"),
            HeaderRowConfig::new("day").with_date_format("%d"),
        ]),
        ..ViewPresetConfig::default()
    })
    .expect("valid preset")
}

#[test]
fn proposed_size_grows_to_fill_available_space() {
    let axis = day_axis();
    let mut vm = TimeAxisViewModel::new(&day_and_month_preset(80.0), ViewModelOptions::default());
    vm.update(&axis, 700.0, false).expect("update");

    // 7 ticks in 700px: the fitting size (100) beats the proposed 80
    assert_eq!(vm.tick_size(), 100.0);
    assert_eq!(vm.total_size(), 700.0);
}

#[test]
fn wide_proposed_size_wins_without_force_fit() {
    let axis = day_axis();
    let mut vm = TimeAxisViewModel::new(&day_and_month_preset(120.0), ViewModelOptions::default());
    vm.update(&axis, 700.0, false).expect("update");
    assert_eq!(vm.tick_size(), 120.0);
    assert_eq!(vm.total_size(), 840.0);
}

#[test]
fn force_fit_clamps_ticks_into_the_available_space() {
    let axis = day_axis();
    let options = ViewModelOptions {
        force_fit: true,
        ..ViewModelOptions::default()
    };
    let mut vm = TimeAxisViewModel::new(&day_and_month_preset(120.0), options);
    vm.update(&axis, 350.0, false).expect("update");
    assert_eq!(vm.tick_size(), 50.0);
    assert_eq!(vm.total_size(), 350.0);
}

#[test]
fn suppress_fit_uses_the_proposed_size_verbatim() {
    let axis = day_axis();
    let options = ViewModelOptions {
        suppress_fit: true,
        ..ViewModelOptions::default()
    };
    let mut vm = TimeAxisViewModel::new(&day_and_month_preset(80.0), options);
    vm.update(&axis, 700.0, false).expect("update");
    assert_eq!(vm.tick_size(), 80.0);
    assert_eq!(vm.total_size(), 560.0);
}

#[test]
fn snap_keeps_resolution_steps_at_least_one_pixel() {
    let mut axis = day_axis();
    axis.reconfigure(timegrid_rs::core::AxisPatch {
        resolution: Some((TimeUnit::Hour, 1)),
        ..timegrid_rs::core::AxisPatch::default()
    })
    .expect("set resolution");

    let options = ViewModelOptions {
        snap: true,
        ..ViewModelOptions::default()
    };
    let mut vm = TimeAxisViewModel::new(&day_and_month_preset(10.0), options);
    // 10px per day tick is 10/24px per hour step; snapping lifts each
    // hour step to a full pixel
    vm.update(&axis, 70.0, false).expect("update");
    assert_eq!(vm.tick_size(), 24.0);
}

#[test]
fn update_is_a_no_op_for_unchanged_space() {
    let axis = day_axis();
    let mut vm = TimeAxisViewModel::new(&day_and_month_preset(80.0), ViewModelOptions::default());
    assert!(vm.update(&axis, 700.0, false).expect("first update"));
    assert!(!vm.update(&axis, 700.0, false).expect("second update"));
    assert!(vm.update(&axis, 700.0, true).expect("forced update"));
}

#[test]
fn invalid_available_space_is_a_hard_error() {
    let axis = day_axis();
    let mut vm = TimeAxisViewModel::new(&day_and_month_preset(80.0), ViewModelOptions::default());
    assert!(vm.update(&axis, 0.0, false).is_err());
    assert!(vm.update(&axis, f64::NAN, false).is_err());
    assert!(vm.update(&axis, -5.0, false).is_err());
}

#[test]
fn column_config_has_one_row_per_header_level() {
    let axis = day_axis();
    let mut vm = TimeAxisViewModel::new(&day_and_month_preset(80.0), ViewModelOptions::default());
    vm.update(&axis, 700.0, false).expect("update");

    let columns = vm.columns();
    assert_eq!(columns.len(), 2);

    // one month cell spanning the full axis
    assert_eq!(columns[0].len(), 1);
    assert_eq!(columns[0][0].value, "January 2024");
    assert_eq!(columns[0][0].width, 700.0);
    assert_eq!(columns[0][0].coord, 0.0);

    // seven day cells of uniform width
    assert_eq!(columns[1].len(), 7);
    assert_eq!(columns[1][0].value, "01");
    assert_eq!(columns[1][3].coord, 300.0);
    assert!(columns[1].iter().all(|cell| cell.width == 100.0));
}

#[test]
fn upper_row_splits_on_its_own_unit_boundaries() {
    let axis = TimeAxis::new(AxisSettings::new(
        date(2024, 1, 29, 0),
        date(2024, 2, 3, 0),
        TimeUnit::Day,
        1,
    ))
    .expect("valid axis");
    let mut vm = TimeAxisViewModel::new(&day_and_month_preset(100.0), ViewModelOptions::default());
    vm.update(&axis, 500.0, false).expect("update");

    let months = &vm.columns()[0];
    assert_eq!(months.len(), 2);
    assert_eq!(months[0].value, "January 2024");
    assert_eq!(months[0].width, 300.0);
    assert_eq!(months[1].value, "February 2024");
    assert_eq!(months[1].width, 200.0);
    assert_eq!(months[1].coord, 300.0);
}

#[test]
fn position_round_trip_through_pixels() {
    let axis = day_axis();
    let mut vm = TimeAxisViewModel::new(&day_and_month_preset(100.0), ViewModelOptions::default());
    vm.update(&axis, 700.0, false).expect("update");

    let original = date(2024, 1, 3, 12);
    let position = vm.position_from_date(&axis, &original).expect("in axis");
    assert_eq!(position, 250.0);
    let recovered = vm
        .date_from_position(&axis, position, None)
        .expect("in range");
    assert_eq!(recovered, original);
}

#[test]
fn date_from_position_can_snap_to_resolution() {
    let mut axis = day_axis();
    axis.reconfigure(timegrid_rs::core::AxisPatch {
        resolution: Some((TimeUnit::Hour, 6)),
        ..timegrid_rs::core::AxisPatch::default()
    })
    .expect("set resolution");
    let mut vm = TimeAxisViewModel::new(&day_and_month_preset(100.0), ViewModelOptions::default());
    vm.update(&axis, 700.0, false).expect("update");

    // 260px = day 3, 14:24; floor-snapped at 6h resolution → 12:00
    let snapped = vm
        .date_from_position(&axis, 260.0, Some(Rounding::Floor))
        .expect("in range");
    assert_eq!(snapped, date(2024, 1, 3, 12));
}

#[test]
fn excluded_spans_occupy_zero_pixels() {
    let axis = TimeAxis::new(
        AxisSettings::new(
            date(2024, 1, 1, 0),
            date(2024, 1, 15, 0),
            TimeUnit::Day,
            1,
        )
        .with_include(IncludeRule {
            hour: None,
            day: Some(UnitRange::new(1, 6)),
        }),
    )
    .expect("valid axis");
    let mut vm = TimeAxisViewModel::new(&day_and_month_preset(50.0), ViewModelOptions::default());
    vm.update(&axis, 500.0, false).expect("update");

    // ten working days at 50px
    assert_eq!(vm.total_size(), 500.0);
    let friday_end = vm
        .position_from_date(&axis, &date(2024, 1, 6, 0))
        .expect("in axis");
    let monday_start = vm
        .position_from_date(&axis, &date(2024, 1, 8, 0))
        .expect("in axis");
    assert_eq!(friday_end, monday_start);
    assert_eq!(monday_start, 250.0);
}

#[test]
fn vertical_orientation_uses_tick_height() {
    let axis = day_axis();
    let mut config = ViewPresetConfig {
        tick_height: Some(40.0),
        headers: Some(vec![HeaderRowConfig::new("day")]),
        ..ViewPresetConfig::default()
    };
    config.tick_width = Some(90.0);
    let preset = ViewPreset::from_config(&config).expect("valid preset");

    let options = ViewModelOptions {
        orientation: Orientation::Vertical,
        suppress_fit: true,
        ..ViewModelOptions::default()
    };
    let mut vm = TimeAxisViewModel::new(&preset, options);
    vm.update(&axis, 700.0, false).expect("update");
    assert_eq!(vm.tick_size(), 40.0);
}
