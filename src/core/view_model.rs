//! Pixel layout over a [`TimeAxis`]: tick sizing, header cell columns and
//! position ⇄ date scaling.
//!
//! The view model holds no reference to its axis; callers pass the axis into
//! every computation and call [`TimeAxisViewModel::update`] explicitly after
//! the axis regenerates.

use chrono::{DateTime, Datelike, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use tracing::trace;

use crate::core::date_math;
use crate::core::snap::Rounding;
use crate::core::time_axis::TimeAxis;
use crate::core::unit::{span_ratio, TimeUnit};
use crate::error::{AxisError, AxisResult};
use crate::preset::{Header, ViewPreset};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Orientation {
    Horizontal,
    Vertical,
}

/// Layout behavior knobs, independent of any particular preset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViewModelOptions {
    pub orientation: Orientation,
    /// Constrain the tick size so a whole number of resolution snap points
    /// maps to a whole number of pixels.
    #[serde(default)]
    pub snap: bool,
    /// Shrink or grow ticks so the full tick count exactly fills the
    /// available space.
    #[serde(default)]
    pub force_fit: bool,
    /// Use the proposed tick size verbatim, never fitting to space.
    #[serde(default)]
    pub suppress_fit: bool,
}

impl Default for ViewModelOptions {
    fn default() -> Self {
        Self {
            orientation: Orientation::Horizontal,
            snap: false,
            force_fit: false,
            suppress_fit: false,
        }
    }
}

/// One rendered header cell: dates, formatted value and pixel geometry.
#[derive(Debug, Clone, PartialEq)]
pub struct HeaderCell<Tz: TimeZone> {
    pub start: DateTime<Tz>,
    pub end: DateTime<Tz>,
    pub value: String,
    /// Pixel span of the cell.
    pub width: f64,
    /// Cumulative pixel offset from the axis origin.
    pub coord: f64,
}

pub struct TimeAxisViewModel<Tz: TimeZone = Utc> {
    options: ViewModelOptions,
    headers: SmallVec<[Header; 3]>,
    proposed_tick_size: f64,
    available_space: f64,
    tick_size: f64,
    total_size: f64,
    columns: Vec<Vec<HeaderCell<Tz>>>,
}

impl<Tz: TimeZone> TimeAxisViewModel<Tz> {
    #[must_use]
    pub fn new(preset: &ViewPreset, options: ViewModelOptions) -> Self {
        let proposed = match options.orientation {
            Orientation::Horizontal => preset.tick_width(),
            Orientation::Vertical => preset.tick_height(),
        };
        Self {
            options,
            headers: SmallVec::from(preset.headers()),
            proposed_tick_size: proposed,
            available_space: 0.0,
            tick_size: proposed,
            total_size: 0.0,
            columns: Vec::new(),
        }
    }

    /// Adopts a new preset's header stack and proposed tick size. Call
    /// [`update`](Self::update) with `force` afterwards.
    pub fn set_preset(&mut self, preset: &ViewPreset) {
        self.headers = SmallVec::from(preset.headers());
        self.proposed_tick_size = match self.options.orientation {
            Orientation::Horizontal => preset.tick_width(),
            Orientation::Vertical => preset.tick_height(),
        };
    }

    /// Recomputes tick size and header columns for `available_space` pixels.
    ///
    /// No-op (returns `false`) when the space is unchanged and `force` is
    /// not set. Non-positive or non-finite space is a programming error.
    pub fn update(
        &mut self,
        axis: &TimeAxis<Tz>,
        available_space: f64,
        force: bool,
    ) -> AxisResult<bool> {
        if !available_space.is_finite() || available_space <= 0.0 {
            return Err(AxisError::InvalidConfiguration(format!(
                "view model available space must be finite and > 0, got {available_space}"
            )));
        }
        if !force && available_space == self.available_space {
            return Ok(false);
        }
        self.available_space = available_space;

        let size = self.calculate_tick_size(axis, self.proposed_tick_size);
        if !size.is_finite() || size <= 0.0 {
            return Err(AxisError::InvalidConfiguration(format!(
                "view model tick size must be finite and > 0, got {size}"
            )));
        }
        self.tick_size = size;
        self.total_size = size * axis.visible_tick_time_span();
        self.columns = self.build_columns(axis);
        trace!(
            tick_size = self.tick_size,
            total_size = self.total_size,
            "view model updated"
        );
        Ok(true)
    }

    fn calculate_tick_size(&self, axis: &TimeAxis<Tz>, proposed: f64) -> f64 {
        let mut size = if self.options.suppress_fit {
            proposed
        } else {
            let fitting = self.available_space / axis.visible_tick_time_span();
            if self.options.force_fit || proposed < fitting {
                fitting
            } else {
                proposed
            }
        };

        if self.options.snap {
            let settings = axis.settings();
            let ratio = span_ratio(settings.resolution_unit, settings.unit)
                * settings.resolution_increment as f64;
            if ratio > 0.0 && !(self.options.force_fit && ratio >= 1.0) {
                size = (ratio * size).max(1.0) / ratio;
            }
        }
        size
    }

    /// Pixel offset of `date` from the axis origin, or `None` outside the
    /// axis. Excluded spans occupy zero width.
    #[must_use]
    pub fn position_from_date(&self, axis: &TimeAxis<Tz>, date: &DateTime<Tz>) -> Option<f64> {
        let tick = axis.tick_from_date(date)?;
        Some((tick - axis.visible_tick_start()) * self.tick_size)
    }

    /// Inverse of [`position_from_date`](Self::position_from_date), with
    /// optional resolution snapping.
    #[must_use]
    pub fn date_from_position(
        &self,
        axis: &TimeAxis<Tz>,
        position: f64,
        rounding: Option<Rounding>,
    ) -> Option<DateTime<Tz>> {
        if !position.is_finite() {
            return None;
        }
        let tick = position / self.tick_size + axis.visible_tick_start();
        axis.date_from_tick(tick, rounding)
    }

    /// Pixel distance between two in-axis dates.
    #[must_use]
    pub fn distance_between(
        &self,
        axis: &TimeAxis<Tz>,
        start: &DateTime<Tz>,
        end: &DateTime<Tz>,
    ) -> Option<f64> {
        Some(self.position_from_date(axis, end)? - self.position_from_date(axis, start)?)
    }

    #[must_use]
    pub fn orientation(&self) -> Orientation {
        self.options.orientation
    }

    #[must_use]
    pub fn tick_size(&self) -> f64 {
        self.tick_size
    }

    #[must_use]
    pub fn total_size(&self) -> f64 {
        self.total_size
    }

    #[must_use]
    pub fn available_space(&self) -> f64 {
        self.available_space
    }

    /// Header cell rows, top level first; the last row is the tick row.
    #[must_use]
    pub fn columns(&self) -> &[Vec<HeaderCell<Tz>>] {
        &self.columns
    }

    fn build_columns(&self, axis: &TimeAxis<Tz>) -> Vec<Vec<HeaderCell<Tz>>> {
        let headers: SmallVec<[Header; 3]> = if self.headers.is_empty() {
            let mut fallback = SmallVec::new();
            fallback.push(Header {
                unit: axis.unit(),
                increment: axis.increment(),
                date_format: None,
            });
            fallback
        } else {
            self.headers.clone()
        };

        let bottom_level = headers.len() - 1;
        headers
            .iter()
            .enumerate()
            .map(|(level, header)| {
                if level == bottom_level {
                    self.build_tick_row(axis, header)
                } else {
                    self.build_span_row(axis, header)
                }
            })
            .collect()
    }

    /// The bottom row mirrors the axis ticks: interior cells get the uniform
    /// tick size, edge cells their partial share.
    fn build_tick_row(&self, axis: &TimeAxis<Tz>, header: &Header) -> Vec<HeaderCell<Tz>> {
        let count = axis.count();
        let mut cells = Vec::with_capacity(count);
        for (index, tick) in axis.ticks().iter().enumerate() {
            let coord_start = if index == 0 {
                axis.visible_tick_start()
            } else {
                index as f64
            };
            let coord_end = if index + 1 == count {
                axis.visible_tick_end()
            } else {
                (index + 1) as f64
            };
            let width = (coord_end - coord_start) * self.tick_size;
            if width <= 0.0 {
                continue;
            }
            cells.push(HeaderCell {
                start: tick.start().clone(),
                end: tick.end().clone(),
                value: format_cell_value(tick.start(), header),
                width,
                coord: (coord_start - axis.visible_tick_start()) * self.tick_size,
            });
        }
        cells
    }

    /// Upper rows iterate their own unit across the visible range; cells
    /// collapsed to zero width by exclusion or filtering are dropped.
    fn build_span_row(&self, axis: &TimeAxis<Tz>, header: &Header) -> Vec<HeaderCell<Tz>> {
        let week_start_day = axis.settings().week_start_day;
        let end = axis.end().clone();
        let mut cells = Vec::new();
        let mut cursor = axis.start().clone();

        while cursor < end {
            let mut next = date_math::get_next(&cursor, header.unit, header.increment, week_start_day);
            if next > end {
                next = end.clone();
            }
            if next <= cursor {
                break;
            }
            let coord = self.position_from_date(axis, &cursor);
            let width = self.distance_between(axis, &cursor, &next);
            if let (Some(coord), Some(width)) = (coord, width) {
                if width > 0.0 {
                    cells.push(HeaderCell {
                        start: cursor.clone(),
                        end: next.clone(),
                        value: format_cell_value(&cursor, header),
                        width,
                        coord,
                    });
                }
            }
            cursor = next;
        }
        cells
    }
}

fn format_cell_value<Tz: TimeZone>(date: &DateTime<Tz>, header: &Header) -> String {
    let local = date.naive_local();
    if let Some(format) = &header.date_format {
        return local.format(format).to_string();
    }
    match header.unit {
        TimeUnit::Quarter => format!("Q{}", date.month0() / 3 + 1),
        TimeUnit::Millisecond => local.format("%H:%M:%S%.3f").to_string(),
        TimeUnit::Second => local.format("%H:%M:%S").to_string(),
        TimeUnit::Minute | TimeUnit::Hour => local.format("%H:%M").to_string(),
        TimeUnit::Day | TimeUnit::Week => local.format("%d %b").to_string(),
        TimeUnit::Month => local.format("%b %Y").to_string(),
        TimeUnit::Year => local.format("%Y").to_string(),
    }
}
