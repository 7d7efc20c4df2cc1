//! The central time-axis model.
//!
//! A [`TimeAxis`] turns a date range plus a tick granularity into an ordered
//! tick sequence, optionally punched through by a working-time
//! [`IncludeRule`], and answers bidirectional fractional-tick ⇄ date queries.
//!
//! Reconfiguration is diff-and-apply: a candidate settings record is built
//! from the current settings plus a patch, validated, and ticks are generated
//! into a fresh set before anything is committed. A failing reconfigure
//! leaves the axis untouched.

use std::collections::HashMap;

use chrono::{DateTime, Duration, TimeZone, Utc};
use tracing::{debug, trace};

use crate::core::date_math;
use crate::core::exclusion::{IncludeRule, ResolvedInclude};
use crate::core::snap::{self, Rounding};
use crate::core::tick::Tick;
use crate::core::unit::{TimeUnit, MS_PER_HOUR};
use crate::error::{AxisError, AxisResult};

/// Retry bound for shifting across fully excluded spans.
pub const MAX_TRAVERSE_TRIES: u32 = 100;

/// Complete configuration of a time axis.
#[derive(Debug, Clone, PartialEq)]
pub struct AxisSettings<Tz: TimeZone> {
    pub start: DateTime<Tz>,
    pub end: DateTime<Tz>,
    /// Tick granularity.
    pub unit: TimeUnit,
    pub increment: i64,
    /// Snap granularity, may be finer than the tick granularity.
    pub resolution_unit: TimeUnit,
    pub resolution_increment: i64,
    /// Navigation granularity.
    pub main_unit: TimeUnit,
    pub shift_unit: TimeUnit,
    pub shift_increment: i64,
    /// Default visible duration in `main_unit`s.
    pub default_span: i64,
    /// 0 = Sunday .. 6 = Saturday.
    pub week_start_day: u8,
    /// Snap the configured range onto unit boundaries before generating.
    pub auto_adjust: bool,
    pub include: Option<IncludeRule>,
}

impl<Tz: TimeZone> AxisSettings<Tz> {
    pub fn new(start: DateTime<Tz>, end: DateTime<Tz>, unit: TimeUnit, increment: i64) -> Self {
        Self {
            start,
            end,
            unit,
            increment,
            resolution_unit: unit,
            resolution_increment: increment,
            main_unit: unit,
            shift_unit: unit,
            shift_increment: 1,
            default_span: 1,
            week_start_day: 0,
            auto_adjust: true,
            include: None,
        }
    }

    #[must_use]
    pub fn with_resolution(mut self, unit: TimeUnit, increment: i64) -> Self {
        self.resolution_unit = unit;
        self.resolution_increment = increment;
        self
    }

    #[must_use]
    pub fn with_shift(mut self, unit: TimeUnit, increment: i64) -> Self {
        self.shift_unit = unit;
        self.shift_increment = increment;
        self
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

    fn validate(&self) -> AxisResult<()> {
        for (name, value) in [
            ("increment", self.increment),
            ("resolution_increment", self.resolution_increment),
            ("shift_increment", self.shift_increment),
        ] {
            if value < 1 {
                return Err(AxisError::InvalidConfiguration(format!(
                    "axis {name} must be >= 1, got {value}"
                )));
            }
        }
        if self.week_start_day > 6 {
            return Err(AxisError::InvalidConfiguration(format!(
                "week_start_day must be 0..=6, got {}",
                self.week_start_day
            )));
        }
        Ok(())
    }

    fn patched(&self, patch: &AxisPatch<Tz>) -> Self {
        let mut next = self.clone();
        if let Some(start) = &patch.start {
            next.start = start.clone();
        }
        if let Some(end) = &patch.end {
            next.end = end.clone();
        }
        if let Some(unit) = patch.unit {
            next.unit = unit;
        }
        if let Some(increment) = patch.increment {
            next.increment = increment;
        }
        if let Some((unit, increment)) = patch.resolution {
            next.resolution_unit = unit;
            next.resolution_increment = increment;
        }
        if let Some(main_unit) = patch.main_unit {
            next.main_unit = main_unit;
        }
        if let Some((unit, increment)) = patch.shift {
            next.shift_unit = unit;
            next.shift_increment = increment;
        }
        if let Some(default_span) = patch.default_span {
            next.default_span = default_span;
        }
        if let Some(week_start_day) = patch.week_start_day {
            next.week_start_day = week_start_day;
        }
        if let Some(auto_adjust) = patch.auto_adjust {
            next.auto_adjust = auto_adjust;
        }
        if let Some(include) = patch.include {
            next.include = include;
        }
        next
    }
}

/// Partial update applied by [`TimeAxis::reconfigure`]. Unset fields keep
/// their current values; `include: Some(None)` clears the exclusion rule.
#[derive(Debug, Clone)]
pub struct AxisPatch<Tz: TimeZone> {
    pub start: Option<DateTime<Tz>>,
    pub end: Option<DateTime<Tz>>,
    pub unit: Option<TimeUnit>,
    pub increment: Option<i64>,
    pub resolution: Option<(TimeUnit, i64)>,
    pub main_unit: Option<TimeUnit>,
    pub shift: Option<(TimeUnit, i64)>,
    pub default_span: Option<i64>,
    pub week_start_day: Option<u8>,
    pub auto_adjust: Option<bool>,
    pub include: Option<Option<IncludeRule>>,
}

impl<Tz: TimeZone> Default for AxisPatch<Tz> {
    fn default() -> Self {
        Self {
            start: None,
            end: None,
            unit: None,
            increment: None,
            resolution: None,
            main_unit: None,
            shift: None,
            default_span: None,
            week_start_day: None,
            auto_adjust: None,
            include: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AxisEvent {
    Reconfigured,
    InvalidFilter,
}

/// Change summary returned by a successful reconfigure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReconfigureReport {
    pub range_changed: bool,
    pub granularity_changed: bool,
    pub exclusion_changed: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReconfigureOutcome {
    Applied(ReconfigureReport),
    /// The registered guard vetoed the change; state is unchanged.
    Prevented,
    /// Recovery mode: the change would have produced zero ticks and was not
    /// applied.
    Empty,
}

/// Borrowed view of one tick handed to filter predicates.
pub struct TickView<'a, Tz: TimeZone> {
    pub start: &'a DateTime<Tz>,
    pub end: &'a DateTime<Tz>,
    pub index: usize,
}

type TickFilter<Tz> = Box<dyn Fn(&TickView<'_, Tz>) -> bool>;
type ReconfigureGuard<Tz> = Box<dyn Fn(&AxisSettings<Tz>, &AxisSettings<Tz>) -> bool>;
type CustomGenerator<Tz> =
    Box<dyn Fn(&AxisSettings<Tz>) -> Option<Vec<(DateTime<Tz>, DateTime<Tz>)>>>;

pub struct TimeAxis<Tz: TimeZone = Utc> {
    settings: AxisSettings<Tz>,
    include: Option<ResolvedInclude>,
    /// All generated ticks, before filtering.
    generated: Vec<Tick<Tz>>,
    /// Visible ticks after filtering.
    ticks: Vec<Tick<Tz>>,
    filter: Option<TickFilter<Tz>>,
    filter_disabled: bool,
    guard: Option<ReconfigureGuard<Tz>>,
    generator: Option<CustomGenerator<Tz>>,
    adjusted_start: DateTime<Tz>,
    adjusted_end: DateTime<Tz>,
    visible_tick_start: f64,
    visible_tick_end: f64,
    tick_cache: HashMap<i64, usize>,
    events: Vec<AxisEvent>,
}

impl<Tz: TimeZone> TimeAxis<Tz> {
    pub fn new(settings: AxisSettings<Tz>) -> AxisResult<Self> {
        settings.validate()?;
        let include = settings.include.map(IncludeRule::resolve).transpose()?.flatten();
        let generated = generate_ticks(&settings, include.as_ref(), None)?;
        if generated.is_empty() {
            return Err(AxisError::InvalidConfiguration(
                "time axis generated zero ticks".to_owned(),
            ));
        }
        let derived = derive(&settings, include.as_ref(), &generated, include.is_none());
        Ok(Self {
            settings,
            include,
            ticks: generated.clone(),
            generated,
            filter: None,
            filter_disabled: false,
            guard: None,
            generator: None,
            adjusted_start: derived.adjusted_start,
            adjusted_end: derived.adjusted_end,
            visible_tick_start: derived.visible_tick_start,
            visible_tick_end: derived.visible_tick_end,
            tick_cache: derived.tick_cache,
            events: Vec::new(),
        })
    }

    /// Reconfigures the axis: validate, regenerate into a fresh tick set,
    /// then swap atomically. Errors leave the axis untouched.
    pub fn reconfigure(&mut self, patch: AxisPatch<Tz>) -> AxisResult<ReconfigureOutcome> {
        self.reconfigure_with(patch, false, false)
    }

    pub(crate) fn reconfigure_with(
        &mut self,
        patch: AxisPatch<Tz>,
        prevent_throw: bool,
        preset_changed: bool,
    ) -> AxisResult<ReconfigureOutcome> {
        let candidate = self.settings.patched(&patch);
        candidate.validate()?;
        let include = candidate.include.map(IncludeRule::resolve).transpose()?.flatten();

        if let Some(guard) = &self.guard {
            if !guard(&self.settings, &candidate) {
                trace!("reconfigure prevented by guard");
                return Ok(ReconfigureOutcome::Prevented);
            }
        }

        let generated = generate_ticks(&candidate, include.as_ref(), self.generator.as_ref())?;
        if generated.is_empty() {
            if prevent_throw {
                if preset_changed {
                    self.filter_disabled = true;
                }
                return Ok(ReconfigureOutcome::Empty);
            }
            return Err(AxisError::InvalidConfiguration(
                "time axis generated zero ticks".to_owned(),
            ));
        }

        // A preset change re-evaluates previously auto-disabled filters.
        let mut filter_disabled = if preset_changed { false } else { self.filter_disabled };
        let mut invalid_filter = false;
        let visible = match &self.filter {
            Some(predicate) if !filter_disabled => {
                let kept = filtered(&generated, predicate);
                if kept.is_empty() {
                    invalid_filter = true;
                    filter_disabled = true;
                    generated.clone()
                } else {
                    kept
                }
            }
            _ => generated.clone(),
        };

        let filter_active = self.filter.is_some() && !filter_disabled;
        let continuous = include.is_none() && !filter_active;
        let derived = derive(&candidate, include.as_ref(), &visible, continuous);

        let report = ReconfigureReport {
            range_changed: candidate.start != self.settings.start
                || candidate.end != self.settings.end,
            granularity_changed: candidate.unit != self.settings.unit
                || candidate.increment != self.settings.increment,
            exclusion_changed: candidate.include != self.settings.include,
        };

        debug!(
            ticks = visible.len(),
            unit = candidate.unit.name(),
            increment = candidate.increment,
            continuous,
            "time axis reconfigured"
        );

        self.settings = candidate;
        self.include = include;
        self.generated = generated;
        self.ticks = visible;
        self.filter_disabled = filter_disabled;
        self.adjusted_start = derived.adjusted_start;
        self.adjusted_end = derived.adjusted_end;
        self.visible_tick_start = derived.visible_tick_start;
        self.visible_tick_end = derived.visible_tick_end;
        self.tick_cache = derived.tick_cache;
        if invalid_filter {
            self.events.push(AxisEvent::InvalidFilter);
        }
        self.events.push(AxisEvent::Reconfigured);
        Ok(ReconfigureOutcome::Applied(report))
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

    /// Moves the whole axis by `amount` × `unit`, retrying past spans that
    /// resolve to zero ticks (fully excluded), up to [`MAX_TRAVERSE_TRIES`].
    pub fn shift(&mut self, unit: TimeUnit, amount: i64) -> AxisResult<ReconfigureOutcome> {
        if amount == 0 {
            return Err(AxisError::InvalidConfiguration(
                "shift amount must be non-zero".to_owned(),
            ));
        }
        let mut offset = amount;
        for tries in 0..MAX_TRAVERSE_TRIES {
            let patch = AxisPatch {
                start: Some(date_math::add(&self.settings.start, unit, offset)),
                end: Some(date_math::add(&self.settings.end, unit, offset)),
                ..AxisPatch::default()
            };
            match self.reconfigure_with(patch, true, false)? {
                ReconfigureOutcome::Empty => {
                    trace!(tries, "shift landed on an empty span, retrying");
                    offset += amount;
                }
                outcome => return Ok(outcome),
            }
        }
        Err(AxisError::ShiftExhausted {
            tries: MAX_TRAVERSE_TRIES,
        })
    }

    pub fn shift_next(&mut self) -> AxisResult<ReconfigureOutcome> {
        self.shift(self.settings.shift_unit, self.settings.shift_increment)
    }

    pub fn shift_previous(&mut self) -> AxisResult<ReconfigureOutcome> {
        self.shift(self.settings.shift_unit, -self.settings.shift_increment)
    }

    /// Replaces any existing filter with `predicate`.
    ///
    /// Returns `false` when the filter removed every tick; in that case an
    /// [`AxisEvent::InvalidFilter`] is recorded, the filter is disabled and
    /// the axis keeps its unfiltered tick set.
    pub fn filter_by<F>(&mut self, predicate: F) -> bool
    where
        F: Fn(&TickView<'_, Tz>) -> bool + 'static,
    {
        self.filter = Some(Box::new(predicate));
        self.filter_disabled = false;
        self.refresh_visible()
    }

    pub fn clear_filters(&mut self) {
        self.filter = None;
        self.filter_disabled = false;
        self.refresh_visible();
    }

    fn refresh_visible(&mut self) -> bool {
        let mut valid = true;
        self.ticks = match &self.filter {
            Some(predicate) if !self.filter_disabled => {
                let kept = filtered(&self.generated, predicate);
                if kept.is_empty() {
                    valid = false;
                    self.filter_disabled = true;
                    self.events.push(AxisEvent::InvalidFilter);
                    self.generated.clone()
                } else {
                    kept
                }
            }
            _ => self.generated.clone(),
        };
        let derived = derive(
            &self.settings,
            self.include.as_ref(),
            &self.ticks,
            self.is_continuous(),
        );
        self.adjusted_start = derived.adjusted_start;
        self.adjusted_end = derived.adjusted_end;
        self.visible_tick_start = derived.visible_tick_start;
        self.visible_tick_end = derived.visible_tick_end;
        self.tick_cache = derived.tick_cache;
        valid
    }

    /// Registers a preventable hook consulted before any reconfigure.
    /// Returning `false` vetoes the change.
    pub fn set_reconfigure_guard<F>(&mut self, guard: F)
    where
        F: Fn(&AxisSettings<Tz>, &AxisSettings<Tz>) -> bool + 'static,
    {
        self.guard = Some(Box::new(guard));
    }

    pub fn clear_reconfigure_guard(&mut self) {
        self.guard = None;
    }

    /// Registers a custom tick generator consulted before the default one.
    /// Returning `None` falls back to the default generator.
    pub fn set_tick_generator<F>(&mut self, generator: F)
    where
        F: Fn(&AxisSettings<Tz>) -> Option<Vec<(DateTime<Tz>, DateTime<Tz>)>> + 'static,
    {
        self.generator = Some(Box::new(generator));
    }

    /// Drains events recorded since the last call.
    pub fn take_events(&mut self) -> Vec<AxisEvent> {
        std::mem::take(&mut self.events)
    }

    // --- queries ---

    #[must_use]
    pub fn ticks(&self) -> &[Tick<Tz>] {
        &self.ticks
    }

    #[must_use]
    pub fn count(&self) -> usize {
        self.ticks.len()
    }

    /// Start of the first visible tick.
    #[must_use]
    pub fn start(&self) -> &DateTime<Tz> {
        self.ticks[0].start()
    }

    /// End of the last visible tick.
    #[must_use]
    pub fn end(&self) -> &DateTime<Tz> {
        self.ticks[self.ticks.len() - 1].end()
    }

    #[must_use]
    pub fn settings(&self) -> &AxisSettings<Tz> {
        &self.settings
    }

    #[must_use]
    pub fn unit(&self) -> TimeUnit {
        self.settings.unit
    }

    #[must_use]
    pub fn increment(&self) -> i64 {
        self.settings.increment
    }

    #[must_use]
    pub fn is_continuous(&self) -> bool {
        self.include.is_none() && !(self.filter.is_some() && !self.filter_disabled)
    }

    #[must_use]
    pub fn exclusion(&self) -> Option<&ResolvedInclude> {
        self.include.as_ref()
    }

    #[must_use]
    pub fn adjusted_start(&self) -> &DateTime<Tz> {
        &self.adjusted_start
    }

    #[must_use]
    pub fn adjusted_end(&self) -> &DateTime<Tz> {
        &self.adjusted_end
    }

    /// Fractional tick coordinate of the axis start (non-zero for a partial
    /// leading tick).
    #[must_use]
    pub fn visible_tick_start(&self) -> f64 {
        self.visible_tick_start
    }

    #[must_use]
    pub fn visible_tick_end(&self) -> f64 {
        self.visible_tick_end
    }

    /// Visible span in tick units, accounting for partial edge ticks.
    #[must_use]
    pub fn visible_tick_time_span(&self) -> f64 {
        self.visible_tick_end - self.visible_tick_start
    }

    /// Index of the tick starting exactly at `date`, if any.
    #[must_use]
    pub fn tick_index_at(&self, date: &DateTime<Tz>) -> Option<usize> {
        self.tick_cache.get(&date.timestamp_millis()).copied()
    }

    /// Fractional tick coordinate of `date`: integer part is the tick index,
    /// fractional part the proportional position inside that tick. `None`
    /// when the date falls outside the axis. Dates inside excluded gaps
    /// collapse onto the following tick's start.
    #[must_use]
    pub fn tick_from_date(&self, date: &DateTime<Tz>) -> Option<f64> {
        fractional_tick(
            &self.ticks,
            &self.adjusted_start,
            &self.adjusted_end,
            self.include.as_ref(),
            self.is_continuous(),
            date,
        )
    }

    /// Inverse of [`tick_from_date`](Self::tick_from_date): interpolates
    /// inside the addressed tick, then optionally re-snaps at the resolution
    /// granularity.
    #[must_use]
    pub fn date_from_tick(&self, tick: f64, rounding: Option<Rounding>) -> Option<DateTime<Tz>> {
        if self.ticks.is_empty() || !tick.is_finite() {
            return None;
        }
        if (tick - self.visible_tick_end).abs() < 1e-9 {
            return Some(self.end().clone());
        }
        if tick < 0.0 || tick > self.visible_tick_end {
            return None;
        }

        let whole = tick.floor() as usize;
        let frac = tick - tick.floor();
        if whole >= self.ticks.len() {
            return Some(self.end().clone());
        }
        let t = &self.ticks[whole];
        let continuous = self.is_continuous();

        let date = if let Some(include) = &self.include {
            let total = include.included_ms_between(t.start(), t.end());
            include.advance_included(t.start(), (frac * total as f64).round() as i64)
        } else {
            let interp_start = if whole == 0 && continuous {
                &self.adjusted_start
            } else {
                t.start()
            };
            let interp_end = if whole + 1 == self.ticks.len() && continuous {
                &self.adjusted_end
            } else {
                t.end()
            };
            let span = interp_end.timestamp_millis() - interp_start.timestamp_millis();
            interp_start.clone() + Duration::milliseconds((frac * span as f64).round() as i64)
        };

        Some(match rounding {
            None => date,
            Some(rounding) => self.snap_date_to_resolution(&date, rounding),
        })
    }

    /// Snaps a date onto the axis resolution grid (anchored at the adjusted
    /// axis start).
    #[must_use]
    pub fn snap_date_to_resolution(&self, date: &DateTime<Tz>, rounding: Rounding) -> DateTime<Tz> {
        match rounding {
            Rounding::Floor => snap::floor_date(
                date,
                Some(&self.adjusted_start),
                self.settings.resolution_unit,
                self.settings.resolution_increment,
                self.settings.week_start_day,
            ),
            Rounding::Ceil => snap::ceil_date(
                date,
                Some(&self.adjusted_start),
                self.settings.resolution_unit,
                self.settings.resolution_increment,
                self.settings.week_start_day,
            ),
            Rounding::Round => snap::round_date(
                date,
                &self.adjusted_start,
                self.settings.resolution_unit,
                self.settings.resolution_increment,
                self.settings.week_start_day,
            ),
        }
    }

    #[must_use]
    pub fn date_in_axis(&self, date: &DateTime<Tz>, inclusive_end: bool) -> bool {
        if self.ticks.is_empty() {
            return false;
        }
        if self.is_continuous() {
            *date >= *self.start() && (*date < *self.end() || (inclusive_end && *date == *self.end()))
        } else {
            let i = self.ticks.partition_point(|t| *t.start() <= *date);
            (i > 0 && self.ticks[i - 1].contains(date))
                || (inclusive_end && *date == *self.end())
        }
    }

    #[must_use]
    pub fn time_span_in_axis(&self, start: &DateTime<Tz>, end: &DateTime<Tz>) -> bool {
        if *start >= *end || self.ticks.is_empty() {
            return false;
        }
        if self.is_continuous() {
            *start < *self.end() && *end > *self.start()
        } else {
            self.ticks
                .iter()
                .any(|t| *t.start() < *end && *start < *t.end())
        }
    }
}

struct Derived<Tz: TimeZone> {
    adjusted_start: DateTime<Tz>,
    adjusted_end: DateTime<Tz>,
    visible_tick_start: f64,
    visible_tick_end: f64,
    tick_cache: HashMap<i64, usize>,
}

fn filtered<Tz: TimeZone>(ticks: &[Tick<Tz>], predicate: &TickFilter<Tz>) -> Vec<Tick<Tz>> {
    ticks
        .iter()
        .enumerate()
        .filter(|(index, tick)| {
            predicate(&TickView {
                start: tick.start(),
                end: tick.end(),
                index: *index,
            })
        })
        .map(|(_, tick)| tick.clone())
        .collect()
}

fn derive<Tz: TimeZone>(
    settings: &AxisSettings<Tz>,
    include: Option<&ResolvedInclude>,
    ticks: &[Tick<Tz>],
    continuous: bool,
) -> Derived<Tz> {
    let first = ticks.first().expect("derive requires ticks");
    let last = ticks.last().expect("derive requires ticks");

    let (adjusted_start, adjusted_end) = if continuous {
        (
            snap::floor_date(
                first.start(),
                None,
                settings.unit,
                settings.increment,
                settings.week_start_day,
            ),
            snap::ceil_date(
                last.end(),
                None,
                settings.unit,
                settings.increment,
                settings.week_start_day,
            ),
        )
    } else {
        (first.start().clone(), last.end().clone())
    };

    let visible_tick_start = fractional_tick(
        ticks,
        &adjusted_start,
        &adjusted_end,
        include,
        continuous,
        first.start(),
    )
    .unwrap_or(0.0);
    let visible_tick_end = fractional_tick(
        ticks,
        &adjusted_start,
        &adjusted_end,
        include,
        continuous,
        last.end(),
    )
    .unwrap_or(ticks.len() as f64);

    let tick_cache = ticks
        .iter()
        .enumerate()
        .map(|(index, tick)| (tick.start_ms(), index))
        .collect();

    Derived {
        adjusted_start,
        adjusted_end,
        visible_tick_start,
        visible_tick_end,
        tick_cache,
    }
}

fn fractional_tick<Tz: TimeZone>(
    ticks: &[Tick<Tz>],
    adjusted_start: &DateTime<Tz>,
    adjusted_end: &DateTime<Tz>,
    include: Option<&ResolvedInclude>,
    continuous: bool,
    date: &DateTime<Tz>,
) -> Option<f64> {
    let first = ticks.first()?;
    let last = ticks.last()?;
    if *date < *first.start() || *date > *last.end() {
        return None;
    }

    let i = ticks.partition_point(|t| *t.start() <= *date);
    if i == 0 {
        return Some(0.0);
    }
    let i = i - 1;
    let tick = &ticks[i];
    let is_last = i + 1 == ticks.len();

    if *date >= *tick.end() && !is_last {
        // between ticks: the gap collapses onto the next tick's start
        return Some((i + 1) as f64);
    }

    let (numerator, denominator) = if let Some(include) = include {
        (
            include.included_ms_between(tick.start(), date) as f64,
            include.included_ms_between(tick.start(), tick.end()) as f64,
        )
    } else {
        let interp_start = if i == 0 && continuous {
            adjusted_start
        } else {
            tick.start()
        };
        let interp_end = if is_last && continuous {
            adjusted_end
        } else {
            tick.end()
        };
        (
            (date.timestamp_millis() - interp_start.timestamp_millis()) as f64,
            (interp_end.timestamp_millis() - interp_start.timestamp_millis()) as f64,
        )
    };

    if denominator <= 0.0 {
        return Some(i as f64);
    }
    Some(i as f64 + (numerator / denominator).clamp(0.0, 1.0))
}

fn generate_ticks<Tz: TimeZone>(
    settings: &AxisSettings<Tz>,
    include: Option<&ResolvedInclude>,
    custom: Option<&CustomGenerator<Tz>>,
) -> AxisResult<Vec<Tick<Tz>>> {
    if settings.start >= settings.end {
        return Err(AxisError::InvalidRange {
            start: settings.start.naive_local().to_string(),
            end: settings.end.naive_local().to_string(),
        });
    }
    let (norm_start, norm_end) = normalized_range(settings);
    if norm_start >= norm_end {
        return Err(AxisError::InvalidRange {
            start: settings.start.naive_local().to_string(),
            end: settings.end.naive_local().to_string(),
        });
    }

    if let Some(generator) = custom {
        if let Some(pairs) = generator(settings) {
            return Ok(pairs
                .into_iter()
                .filter(|(start, end)| start < end)
                .map(|(start, end)| Tick::new(start, end))
                .collect());
        }
    }

    let mut ticks = Vec::new();
    let mut cursor = norm_start;
    while cursor < norm_end {
        let mut boundary = date_math::get_next(
            &cursor,
            settings.unit,
            settings.increment,
            settings.week_start_day,
        );

        // multi-hour ticks stay aligned to wall-clock hours across DST
        if settings.unit == TimeUnit::Hour && settings.increment > 1 {
            let wall = date_math::wall_ms_between(&cursor, &boundary);
            let expected = settings.increment * MS_PER_HOUR;
            if wall != expected {
                boundary = boundary + Duration::milliseconds(expected - wall);
            }
        }

        if !settings.auto_adjust && boundary > norm_end {
            boundary = norm_end.clone();
        }
        if boundary <= cursor {
            break;
        }

        match include {
            Some(include) => {
                if let Some((start, end)) = include.apply(&cursor, &boundary, settings.unit) {
                    if include.included_ms_between(&start, &end) > 0 {
                        ticks.push(Tick::new(start, end));
                    }
                }
            }
            None => ticks.push(Tick::new(cursor.clone(), boundary.clone())),
        }
        cursor = boundary;
    }

    trace!(count = ticks.len(), "generated ticks");
    Ok(ticks)
}

fn normalized_range<Tz: TimeZone>(settings: &AxisSettings<Tz>) -> (DateTime<Tz>, DateTime<Tz>) {
    if settings.auto_adjust {
        (
            snap::floor_date(
                &settings.start,
                None,
                settings.unit,
                settings.increment,
                settings.week_start_day,
            ),
            snap::ceil_date(
                &settings.end,
                None,
                settings.unit,
                settings.increment,
                settings.week_start_day,
            ),
        )
    } else {
        (settings.start.clone(), settings.end.clone())
    }
}
