//! View-space coordinate mapping.
//!
//! Composes a [`TimeAxis`] and a [`TimeAxisViewModel`] into the queries a
//! rendering layer consumes: view coordinate ⇄ date with RTL mirroring,
//! orientation tagging and resolution snapping.

use chrono::{DateTime, Duration, TimeZone};
use serde::{Deserialize, Serialize};

use crate::core::snap::Rounding;
use crate::core::time_axis::TimeAxis;
use crate::core::unit::duration_ms;
use crate::core::view_model::{Orientation, TimeAxisViewModel};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimelineDateMapper {
    pub orientation: Orientation,
    pub rtl: bool,
}

impl Default for TimelineDateMapper {
    fn default() -> Self {
        Self {
            orientation: Orientation::Horizontal,
            rtl: false,
        }
    }
}

impl TimelineDateMapper {
    #[must_use]
    pub fn new(orientation: Orientation, rtl: bool) -> Self {
        Self { orientation, rtl }
    }

    /// RTL mirrors horizontal coordinates; vertical axes are unaffected.
    /// The mapping is its own inverse.
    fn to_axis_position(&self, coord: f64, total_size: f64) -> f64 {
        if self.rtl && self.orientation == Orientation::Horizontal {
            total_size - coord
        } else {
            coord
        }
    }

    /// Date under a view coordinate.
    ///
    /// In-range coordinates resolve through the view model; with
    /// `allow_out_of_range`, coordinates beyond either edge extrapolate at
    /// the edge tick rate.
    #[must_use]
    pub fn date_from_coordinate<Tz: TimeZone>(
        &self,
        axis: &TimeAxis<Tz>,
        view_model: &TimeAxisViewModel<Tz>,
        coord: f64,
        rounding: Option<Rounding>,
        allow_out_of_range: bool,
    ) -> Option<DateTime<Tz>> {
        if !coord.is_finite() {
            return None;
        }
        let position = self.to_axis_position(coord, view_model.total_size());
        if let Some(date) = view_model.date_from_position(axis, position, rounding) {
            return Some(date);
        }
        if !allow_out_of_range {
            return None;
        }

        let tick_ms = duration_ms(axis.increment(), axis.unit()) as f64;
        let date = if position < 0.0 {
            let overshoot_ms = position / view_model.tick_size() * tick_ms;
            axis.start().clone() + Duration::milliseconds(overshoot_ms.round() as i64)
        } else {
            let overshoot = position - view_model.total_size();
            let overshoot_ms = overshoot / view_model.tick_size() * tick_ms;
            axis.end().clone() + Duration::milliseconds(overshoot_ms.round() as i64)
        };
        Some(match rounding {
            None => date,
            Some(rounding) => axis.snap_date_to_resolution(&date, rounding),
        })
    }

    /// View coordinate of a date, or `None` outside the axis.
    #[must_use]
    pub fn coordinate_from_date<Tz: TimeZone>(
        &self,
        axis: &TimeAxis<Tz>,
        view_model: &TimeAxisViewModel<Tz>,
        date: &DateTime<Tz>,
    ) -> Option<f64> {
        let position = view_model.position_from_date(axis, date)?;
        Some(self.to_axis_position(position, view_model.total_size()))
    }

    /// Snaps a date onto the axis resolution grid; dates inside excluded
    /// spans first collapse onto the nearer included edge.
    #[must_use]
    pub fn snap_date<Tz: TimeZone>(
        &self,
        axis: &TimeAxis<Tz>,
        date: &DateTime<Tz>,
        rounding: Rounding,
    ) -> DateTime<Tz> {
        let date = match axis.exclusion() {
            Some(include) if !include.contains_date(date) => include.snap_excluded(date),
            _ => date.clone(),
        };
        axis.snap_date_to_resolution(&date, rounding)
    }
}
