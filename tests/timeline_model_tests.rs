use chrono::{DateTime, TimeZone, Utc};
use timegrid_rs::api::{TimelineModel, TimelineModelConfig};
use timegrid_rs::core::{AxisEvent, ReconfigureOutcome, TimeUnit};
use timegrid_rs::preset::PresetRef;

fn date(y: i32, mo: u32, d: u32, h: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(y, mo, d, h, 0, 0).single().expect("valid date")
}

fn model() -> TimelineModel<Utc> {
    TimelineModel::new(
        TimelineModelConfig::new(date(2024, 1, 1, 0), date(2024, 1, 2, 0), "hourAndDay")
            .with_available_space(1200.0),
    )
    .expect("valid model")
}

#[test]
fn model_wires_preset_axis_and_layout_together() {
    let model = model();
    assert_eq!(model.preset().id(), "hourAndDay");
    assert_eq!(model.axis().unit(), TimeUnit::Hour);
    assert_eq!(model.axis().count(), 24);
    // 24 ticks at the preset's 70px beat the 50px fitting size
    assert_eq!(model.view_model().tick_size(), 70.0);
    assert_eq!(model.columns().len(), 2);
}

#[test]
fn positions_round_trip_through_the_model() {
    let model = model();
    let noon = date(2024, 1, 1, 12);
    let coord = model.position_from_date(&noon).expect("in axis");
    assert_eq!(coord, 12.0 * 70.0);
    let back = model
        .date_from_position(coord, None, false)
        .expect("in range");
    assert_eq!(back, noon);
}

#[test]
fn switching_presets_regenerates_the_axis() {
    let mut model = model();
    let outcome = model
        .set_view_preset(&PresetRef::from("dayAndMonth"))
        .expect("switch preset");
    assert!(matches!(outcome, ReconfigureOutcome::Applied(_)));
    assert_eq!(model.preset().id(), "dayAndMonth");
    assert_eq!(model.axis().unit(), TimeUnit::Day);
    assert_eq!(model.axis().count(), 1);
}

#[test]
fn zoom_steps_walk_the_registry_ladder() {
    let mut model = model();
    let finer = model.zoom_in().expect("zoom in");
    assert_eq!(finer.expect("finer preset").id(), "minuteAndHour");
    assert_eq!(model.axis().unit(), TimeUnit::Minute);

    let coarser = model.zoom_out().expect("zoom out");
    assert_eq!(coarser.expect("coarser preset").id(), "hourAndDay");
    assert_eq!(model.axis().unit(), TimeUnit::Hour);
}

#[test]
fn zoom_to_density_picks_the_closest_preset() {
    let mut model = model();
    let target = model
        .zoom_to_ms_per_pixel(86_400_000 / 80)
        .expect("zoom to density");
    assert_eq!(target.expect("preset").id(), "dayAndMonth");
}

#[test]
fn shifting_keeps_the_layout_in_sync() {
    let mut model = model();
    model.shift_next().expect("shift next");
    assert_eq!(*model.axis().start(), date(2024, 1, 2, 0));
    let coord = model
        .position_from_date(&date(2024, 1, 2, 6))
        .expect("in axis");
    assert_eq!(coord, 6.0 * 70.0);
    model.shift_previous().expect("shift previous");
    assert_eq!(*model.axis().start(), date(2024, 1, 1, 0));
}

#[test]
fn resize_recomputes_only_on_change() {
    let mut model = model();
    assert!(!model.resize(1200.0).expect("same space"));
    assert!(model.resize(2400.0).expect("new space"));
    assert_eq!(model.view_model().tick_size(), 100.0);
}

#[test]
fn events_flow_through_the_facade() {
    let mut model = model();
    model
        .set_time_span(date(2024, 2, 1, 0), date(2024, 2, 2, 0))
        .expect("set span");
    assert!(model.take_events().contains(&AxisEvent::Reconfigured));
}

#[test]
fn filters_apply_and_clear_through_the_facade() {
    let mut model = model();
    assert!(model.filter_by(|tick| tick.index < 6).expect("filter"));
    assert_eq!(model.axis().count(), 6);
    model.clear_filters().expect("clear");
    assert_eq!(model.axis().count(), 24);
}

#[test]
fn unknown_presets_are_reference_errors() {
    let result = TimelineModel::new(TimelineModelConfig::new(
        date(2024, 1, 1, 0),
        date(2024, 1, 2, 0),
        "noSuchZoomLevel",
    ));
    assert!(result.is_err());
}
