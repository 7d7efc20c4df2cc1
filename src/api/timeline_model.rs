//! Composition root for embedding applications.
//!
//! A [`TimelineModel`] owns the axis, its view model and the coordinate
//! mapper, and keeps them consistent: every axis mutation is followed by an
//! explicit view-model recompute, so there is no event plumbing to wire.

use chrono::{DateTime, TimeZone, Utc};
use tracing::debug;

use crate::api::date_mapper::TimelineDateMapper;
use crate::core::exclusion::IncludeRule;
use crate::core::snap::Rounding;
use crate::core::time_axis::{
    AxisPatch, AxisSettings, ReconfigureOutcome, TickView, TimeAxis,
};
use crate::core::view_model::{HeaderCell, TimeAxisViewModel, ViewModelOptions};
use crate::error::AxisResult;
use crate::preset::{PresetRef, PresetRegistry, ViewPreset};

/// Bootstrap configuration for a [`TimelineModel`].
#[derive(Debug, Clone)]
pub struct TimelineModelConfig<Tz: TimeZone> {
    pub start: DateTime<Tz>,
    pub end: DateTime<Tz>,
    pub preset: PresetRef,
    /// 0 = Sunday .. 6 = Saturday.
    pub week_start_day: u8,
    pub auto_adjust: bool,
    pub include: Option<IncludeRule>,
    pub available_space: f64,
    pub options: ViewModelOptions,
    pub rtl: bool,
}

impl<Tz: TimeZone> TimelineModelConfig<Tz> {
    #[must_use]
    pub fn new(start: DateTime<Tz>, end: DateTime<Tz>, preset: impl Into<PresetRef>) -> Self {
        Self {
            start,
            end,
            preset: preset.into(),
            week_start_day: 0,
            auto_adjust: true,
            include: None,
            available_space: 800.0,
            options: ViewModelOptions::default(),
            rtl: false,
        }
    }

    #[must_use]
    pub fn with_week_start_day(mut self, week_start_day: u8) -> Self {
        self.week_start_day = week_start_day;
        self
    }

    #[must_use]
    pub fn with_auto_adjust(mut self, auto_adjust: bool) -> Self {
        self.auto_adjust = auto_adjust;
        self
    }

    #[must_use]
    pub fn with_include(mut self, include: IncludeRule) -> Self {
        self.include = Some(include);
        self
    }

    #[must_use]
    pub fn with_available_space(mut self, available_space: f64) -> Self {
        self.available_space = available_space;
        self
    }

    #[must_use]
    pub fn with_options(mut self, options: ViewModelOptions) -> Self {
        self.options = options;
        self
    }

    #[must_use]
    pub fn with_rtl(mut self, rtl: bool) -> Self {
        self.rtl = rtl;
        self
    }
}

pub struct TimelineModel<Tz: TimeZone = Utc> {
    registry: PresetRegistry,
    preset: ViewPreset,
    axis: TimeAxis<Tz>,
    view_model: TimeAxisViewModel<Tz>,
    mapper: TimelineDateMapper,
    available_space: f64,
}

impl<Tz: TimeZone> TimelineModel<Tz> {
    /// Builds a model over the default preset ladder.
    pub fn new(config: TimelineModelConfig<Tz>) -> AxisResult<Self> {
        Self::with_registry(PresetRegistry::with_defaults()?, config)
    }

    /// Builds a model over an explicitly constructed registry.
    pub fn with_registry(
        registry: PresetRegistry,
        config: TimelineModelConfig<Tz>,
    ) -> AxisResult<Self> {
        let preset = registry.get(&config.preset)?;
        let bottom = preset.bottom_header();
        let (resolution_unit, resolution_increment) = preset.resolution();
        let (shift_unit, shift_increment) = preset.shift();

        let mut settings = AxisSettings::new(config.start, config.end, bottom.unit, bottom.increment)
            .with_resolution(resolution_unit, resolution_increment)
            .with_shift(shift_unit, shift_increment)
            .with_week_start_day(config.week_start_day)
            .with_auto_adjust(config.auto_adjust);
        settings.main_unit = preset.main_unit();
        settings.default_span = preset.default_span();
        settings.include = config.include;

        let axis = TimeAxis::new(settings)?;
        let mut view_model = TimeAxisViewModel::new(&preset, config.options);
        view_model.update(&axis, config.available_space, true)?;
        let mapper = TimelineDateMapper::new(config.options.orientation, config.rtl);

        debug!(preset = preset.id(), ticks = axis.count(), "timeline model ready");
        Ok(Self {
            registry,
            preset,
            axis,
            view_model,
            mapper,
            available_space: config.available_space,
        })
    }

    #[must_use]
    pub fn axis(&self) -> &TimeAxis<Tz> {
        &self.axis
    }

    #[must_use]
    pub fn view_model(&self) -> &TimeAxisViewModel<Tz> {
        &self.view_model
    }

    #[must_use]
    pub fn mapper(&self) -> &TimelineDateMapper {
        &self.mapper
    }

    #[must_use]
    pub fn preset(&self) -> &ViewPreset {
        &self.preset
    }

    #[must_use]
    pub fn registry(&self) -> &PresetRegistry {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut PresetRegistry {
        &mut self.registry
    }

    /// Applies an axis patch and recomputes the layout.
    pub fn reconfigure(&mut self, patch: AxisPatch<Tz>) -> AxisResult<ReconfigureOutcome> {
        let outcome = self.axis.reconfigure(patch)?;
        if matches!(outcome, ReconfigureOutcome::Applied(_)) {
            self.view_model.update(&self.axis, self.available_space, true)?;
        }
        Ok(outcome)
    }

    pub fn set_time_span(
        &mut self,
        start: DateTime<Tz>,
        end: DateTime<Tz>,
    ) -> AxisResult<ReconfigureOutcome> {
        self.reconfigure(AxisPatch {
            start: Some(start),
            end: Some(end),
            ..AxisPatch::default()
        })
    }

    /// Switches the zoom level. Recovery mode: a preset whose granularity
    /// would empty the axis leaves the model on its current preset.
    pub fn set_view_preset(&mut self, preset_ref: &PresetRef) -> AxisResult<ReconfigureOutcome> {
        let preset = self.registry.get(preset_ref)?;
        let outcome = self
            .axis
            .reconfigure_with(preset.axis_patch(), true, true)?;
        if matches!(outcome, ReconfigureOutcome::Applied(_)) {
            self.preset = preset;
            self.view_model.set_preset(&self.preset);
            self.view_model.update(&self.axis, self.available_space, true)?;
        }
        Ok(outcome)
    }

    /// Steps one preset towards more detail in the registry's zoom order.
    pub fn zoom_in(&mut self) -> AxisResult<Option<&ViewPreset>> {
        self.zoom_step(1)
    }

    /// Steps one preset towards less detail in the registry's zoom order.
    pub fn zoom_out(&mut self) -> AxisResult<Option<&ViewPreset>> {
        self.zoom_step(-1)
    }

    fn zoom_step(&mut self, direction: i64) -> AxisResult<Option<&ViewPreset>> {
        let current = self.preset.id().to_owned();
        let Some(position) = self.registry.iter().position(|p| p.id() == current) else {
            return Ok(None);
        };
        let target = position as i64 + direction;
        if target < 0 || target >= self.registry.len() as i64 {
            return Ok(None);
        }
        let target_id = self
            .registry
            .iter()
            .nth(target as usize)
            .map(|p| p.id().to_owned())
            .expect("index checked against registry length");
        match self.set_view_preset(&PresetRef::Id(target_id))? {
            ReconfigureOutcome::Applied(_) => Ok(Some(&self.preset)),
            _ => Ok(None),
        }
    }

    /// Jumps to the registered preset closest to `target` ms-per-pixel.
    pub fn zoom_to_ms_per_pixel(&mut self, target: i64) -> AxisResult<Option<&ViewPreset>> {
        let Some(id) = self
            .registry
            .closest_for_ms_per_pixel(target)
            .map(|p| p.id().to_owned())
        else {
            return Ok(None);
        };
        match self.set_view_preset(&PresetRef::Id(id))? {
            ReconfigureOutcome::Applied(_) => Ok(Some(&self.preset)),
            _ => Ok(None),
        }
    }

    pub fn shift_next(&mut self) -> AxisResult<ReconfigureOutcome> {
        let outcome = self.axis.shift_next()?;
        self.refresh_after_axis_change(outcome)?;
        Ok(outcome)
    }

    pub fn shift_previous(&mut self) -> AxisResult<ReconfigureOutcome> {
        let outcome = self.axis.shift_previous()?;
        self.refresh_after_axis_change(outcome)?;
        Ok(outcome)
    }

    /// Replaces the tick filter; see [`TimeAxis::filter_by`].
    pub fn filter_by<F>(&mut self, predicate: F) -> AxisResult<bool>
    where
        F: Fn(&TickView<'_, Tz>) -> bool + 'static,
    {
        let kept = self.axis.filter_by(predicate);
        self.view_model.update(&self.axis, self.available_space, true)?;
        Ok(kept)
    }

    pub fn clear_filters(&mut self) -> AxisResult<()> {
        self.axis.clear_filters();
        self.view_model.update(&self.axis, self.available_space, true)?;
        Ok(())
    }

    /// Adjusts the pixel budget.
    pub fn resize(&mut self, available_space: f64) -> AxisResult<bool> {
        self.available_space = available_space;
        self.view_model.update(&self.axis, available_space, false)
    }

    #[must_use]
    pub fn position_from_date(&self, date: &DateTime<Tz>) -> Option<f64> {
        self.mapper
            .coordinate_from_date(&self.axis, &self.view_model, date)
    }

    #[must_use]
    pub fn date_from_position(
        &self,
        coord: f64,
        rounding: Option<Rounding>,
        allow_out_of_range: bool,
    ) -> Option<DateTime<Tz>> {
        self.mapper.date_from_coordinate(
            &self.axis,
            &self.view_model,
            coord,
            rounding,
            allow_out_of_range,
        )
    }

    /// Header cell rows for rendering, top level first.
    #[must_use]
    pub fn columns(&self) -> &[Vec<HeaderCell<Tz>>] {
        self.view_model.columns()
    }

    /// Drains axis events recorded since the last call.
    pub fn take_events(&mut self) -> Vec<crate::core::time_axis::AxisEvent> {
        self.axis.take_events()
    }

    fn refresh_after_axis_change(&mut self, outcome: ReconfigureOutcome) -> AxisResult<()> {
        if matches!(outcome, ReconfigureOutcome::Applied(_)) {
            self.view_model.update(&self.axis, self.available_space, true)?;
        }
        Ok(())
    }
}
