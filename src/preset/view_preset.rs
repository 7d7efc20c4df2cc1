//! Zoom-level configuration records.
//!
//! A [`ViewPresetConfig`] is the serializable form host applications supply
//! (unit names as strings, everything optional); a [`ViewPreset`] is the
//! validated record with units normalized and defaults resolvable through
//! accessors.

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::core::time_axis::AxisPatch;
use crate::core::unit::{duration_ms, TimeUnit};
use crate::error::{AxisError, AxisResult};
use chrono::TimeZone;

pub const DEFAULT_TICK_WIDTH: f64 = 50.0;
pub const DEFAULT_TICK_HEIGHT: f64 = 50.0;
pub const DEFAULT_SPAN: i64 = 12;

/// One header row as configured: unit given by name, increment defaulting
/// to 1.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeaderRowConfig {
    pub unit: String,
    #[serde(default)]
    pub increment: Option<i64>,
    #[serde(default)]
    pub date_format: Option<String>,
}

impl HeaderRowConfig {
    #[must_use]
    pub fn new(unit: &str) -> Self {
        Self {
            unit: unit.to_owned(),
            increment: None,
            date_format: None,
        }
    }

    #[must_use]
    pub fn with_increment(mut self, increment: i64) -> Self {
        self.increment = Some(increment);
        self
    }

    #[must_use]
    pub fn with_date_format(mut self, date_format: &str) -> Self {
        self.date_format = Some(date_format.to_owned());
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeResolutionConfig {
    pub unit: String,
    pub increment: i64,
}

/// Raw, serializable preset configuration. `base` references another
/// registered preset whose values are merged underneath this one.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ViewPresetConfig {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub base: Option<String>,
    #[serde(default)]
    pub tick_width: Option<f64>,
    #[serde(default)]
    pub tick_height: Option<f64>,
    #[serde(default)]
    pub display_date_format: Option<String>,
    #[serde(default)]
    pub shift_unit: Option<String>,
    #[serde(default)]
    pub shift_increment: Option<i64>,
    #[serde(default)]
    pub default_span: Option<i64>,
    #[serde(default)]
    pub time_resolution: Option<TimeResolutionConfig>,
    #[serde(default)]
    pub headers: Option<Vec<HeaderRowConfig>>,
    #[serde(default)]
    pub main_header_level: Option<usize>,
    #[serde(default)]
    pub column_lines_for: Option<usize>,
}

impl ViewPresetConfig {
    /// Whether every unit name in this configuration normalizes and the
    /// record would construct successfully (`base` must already be merged).
    #[must_use]
    pub fn is_valid(&self) -> bool {
        ViewPreset::from_config(self).is_ok()
    }
}

/// A normalized header row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Header {
    pub unit: TimeUnit,
    pub increment: i64,
    pub date_format: Option<String>,
}

/// Legacy positional view of up to three header rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PositionedHeaders<'a> {
    pub top: Option<&'a Header>,
    pub middle: Option<&'a Header>,
    pub bottom: &'a Header,
}

/// A validated zoom level: normalized header stack, tick sizing and
/// navigation/snap granularities. Read-mostly after construction.
#[derive(Debug, Clone, PartialEq)]
pub struct ViewPreset {
    id: String,
    name: Option<String>,
    headers: SmallVec<[Header; 3]>,
    main_header_level: usize,
    column_lines_for: usize,
    tick_width: Option<f64>,
    tick_height: Option<f64>,
    display_date_format: Option<String>,
    resolution: Option<(TimeUnit, i64)>,
    shift: Option<(TimeUnit, i64)>,
    default_span: Option<i64>,
}

impl ViewPreset {
    /// Normalizes and validates a raw configuration.
    ///
    /// Fails when a unit name cannot be normalized, the header stack is
    /// empty, or an increment is not positive. `base` references must be
    /// resolved by the registry before calling this.
    pub fn from_config(config: &ViewPresetConfig) -> AxisResult<Self> {
        let rows = config.headers.as_deref().unwrap_or_default();
        if rows.is_empty() {
            return Err(AxisError::InvalidConfiguration(
                "view preset requires at least one header row".to_owned(),
            ));
        }

        let mut headers: SmallVec<[Header; 3]> = SmallVec::new();
        for row in rows {
            let increment = row.increment.unwrap_or(1);
            if increment < 1 {
                return Err(AxisError::InvalidConfiguration(format!(
                    "header increment must be >= 1, got {increment}"
                )));
            }
            headers.push(Header {
                unit: TimeUnit::normalize(&row.unit)?,
                increment,
                date_format: row.date_format.clone(),
            });
        }

        let main_header_level = config
            .main_header_level
            .unwrap_or_else(|| headers.len().saturating_sub(2).min(headers.len() - 1));
        if main_header_level >= headers.len() {
            return Err(AxisError::InvalidConfiguration(format!(
                "main_header_level {main_header_level} is out of range for {} header rows",
                headers.len()
            )));
        }
        let column_lines_for = config.column_lines_for.unwrap_or(main_header_level);
        if column_lines_for >= headers.len() {
            return Err(AxisError::InvalidConfiguration(format!(
                "column_lines_for {column_lines_for} is out of range for {} header rows",
                headers.len()
            )));
        }

        let resolution = config
            .time_resolution
            .as_ref()
            .map(|r| {
                if r.increment < 1 {
                    return Err(AxisError::InvalidConfiguration(format!(
                        "time resolution increment must be >= 1, got {}",
                        r.increment
                    )));
                }
                Ok((TimeUnit::normalize(&r.unit)?, r.increment))
            })
            .transpose()?;

        let shift = config
            .shift_unit
            .as_deref()
            .map(TimeUnit::normalize)
            .transpose()?
            .map(|unit| (unit, config.shift_increment.unwrap_or(1)));

        let mut preset = Self {
            id: String::new(),
            name: config.name.clone(),
            headers,
            main_header_level,
            column_lines_for,
            tick_width: config.tick_width,
            tick_height: config.tick_height,
            display_date_format: config.display_date_format.clone(),
            resolution,
            shift,
            default_span: config.default_span,
        };
        preset.id = match &config.id {
            Some(id) => id.clone(),
            None => preset.generate_id(|_| false),
        };
        Ok(preset)
    }

    /// Derives the default identifier from the header stack, bottom row
    /// first, each segment `increment` (when not 1) plus the capitalized
    /// unit name, joined with `And`: `[month/1, day/1]` → `DayAndMonth`.
    ///
    /// Collisions (per `taken`) are disambiguated by a tick-width suffix,
    /// then a bottom-increment suffix, then a numeric counter.
    pub fn generate_id<F>(&self, taken: F) -> String
    where
        F: Fn(&str) -> bool,
    {
        let base = self
            .headers
            .iter()
            .rev()
            .map(|header| {
                let mut segment = String::new();
                if header.increment != 1 {
                    segment.push_str(&header.increment.to_string());
                }
                segment.push_str(header.unit.capitalized_name());
                segment
            })
            .collect::<Vec<_>>()
            .join("And");

        if !taken(&base) {
            return base;
        }
        let by_width = format!("{base}-{}", self.tick_width() as i64);
        if !taken(&by_width) {
            return by_width;
        }
        let by_increment = format!("{base}-{}", self.bottom_header().increment);
        if !taken(&by_increment) {
            return by_increment;
        }
        let mut counter = 2u64;
        loop {
            let candidate = format!("{base}-{counter}");
            if !taken(&candidate) {
                return candidate;
            }
            counter += 1;
        }
    }

    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    pub(crate) fn set_id(&mut self, id: String) {
        self.id = id;
    }

    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    #[must_use]
    pub fn headers(&self) -> &[Header] {
        &self.headers
    }

    /// The bottom header row defines the tick granularity.
    #[must_use]
    pub fn bottom_header(&self) -> &Header {
        &self.headers[self.headers.len() - 1]
    }

    #[must_use]
    pub fn main_header(&self) -> &Header {
        &self.headers[self.main_header_level]
    }

    #[must_use]
    pub fn main_header_level(&self) -> usize {
        self.main_header_level
    }

    #[must_use]
    pub fn column_lines_for(&self) -> usize {
        self.column_lines_for
    }

    #[must_use]
    pub fn main_unit(&self) -> TimeUnit {
        self.main_header().unit
    }

    /// Pixel width of one bottom-row tick; defaults to 50.
    #[must_use]
    pub fn tick_width(&self) -> f64 {
        self.tick_width.unwrap_or(DEFAULT_TICK_WIDTH)
    }

    /// Pixel height of one bottom-row tick; defaults to 50.
    #[must_use]
    pub fn tick_height(&self) -> f64 {
        self.tick_height.unwrap_or(DEFAULT_TICK_HEIGHT)
    }

    #[must_use]
    pub fn display_date_format(&self) -> Option<&str> {
        self.display_date_format.as_deref()
    }

    /// Snap granularity; defaults to the tick granularity.
    #[must_use]
    pub fn resolution(&self) -> (TimeUnit, i64) {
        self.resolution.unwrap_or_else(|| {
            let bottom = self.bottom_header();
            (bottom.unit, bottom.increment)
        })
    }

    /// Navigation step; defaults to one `main_unit`.
    #[must_use]
    pub fn shift(&self) -> (TimeUnit, i64) {
        self.shift.unwrap_or((self.main_unit(), 1))
    }

    /// Default visible duration in `main_unit`s; defaults to 12.
    #[must_use]
    pub fn default_span(&self) -> i64 {
        self.default_span.unwrap_or(DEFAULT_SPAN)
    }

    /// Milliseconds represented by one pixel at this zoom level.
    #[must_use]
    pub fn ms_per_pixel(&self) -> i64 {
        let bottom = self.bottom_header();
        (duration_ms(bottom.increment, bottom.unit) as f64 / self.tick_width()).round() as i64
    }

    /// Sort key from most zoomed-out to most zoomed-in.
    #[must_use]
    pub fn zoom_key(&self) -> (i64, i64, i64) {
        let bottom = self.bottom_header();
        (
            self.ms_per_pixel(),
            bottom.unit.approx_ms(),
            bottom.increment,
        )
    }

    /// Back-compat positional view of the header stack. More than three
    /// rows cannot be expressed positionally and is an error.
    pub fn header_config(&self) -> AxisResult<PositionedHeaders<'_>> {
        match self.headers.as_slice() {
            [bottom] => Ok(PositionedHeaders {
                top: None,
                middle: None,
                bottom,
            }),
            [middle, bottom] => Ok(PositionedHeaders {
                top: None,
                middle: Some(middle),
                bottom,
            }),
            [top, middle, bottom] => Ok(PositionedHeaders {
                top: Some(top),
                middle: Some(middle),
                bottom,
            }),
            _ => Err(AxisError::InvalidConfiguration(format!(
                "positional header access supports at most 3 rows, preset has {}",
                self.headers.len()
            ))),
        }
    }

    /// Structural equality ignoring identity, used for registry dedup.
    #[must_use]
    pub fn same_structure(&self, other: &Self) -> bool {
        self.headers == other.headers
            && self.main_header_level == other.main_header_level
            && self.column_lines_for == other.column_lines_for
            && self.tick_width == other.tick_width
            && self.tick_height == other.tick_height
            && self.display_date_format == other.display_date_format
            && self.resolution == other.resolution
            && self.shift == other.shift
            && self.default_span == other.default_span
    }

    /// The axis granularity patch this preset implies.
    #[must_use]
    pub fn axis_patch<Tz: TimeZone>(&self) -> AxisPatch<Tz> {
        let bottom = self.bottom_header();
        AxisPatch {
            unit: Some(bottom.unit),
            increment: Some(bottom.increment),
            resolution: Some(self.resolution()),
            main_unit: Some(self.main_unit()),
            shift: Some(self.shift()),
            default_span: Some(self.default_span()),
            ..AxisPatch::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{HeaderRowConfig, ViewPreset, ViewPresetConfig};

    fn day_and_month() -> ViewPresetConfig {
        ViewPresetConfig {
            headers: Some(vec![
                HeaderRowConfig::new("month"),
                HeaderRowConfig::new("day"),
            ]),
            ..ViewPresetConfig::default()
        }
    }

    #[test]
    fn generated_id_reads_bottom_to_top() {
        let preset = ViewPreset::from_config(&day_and_month()).expect("valid preset");
        assert_eq!(preset.id(), "DayAndMonth");
    }

    #[test]
    fn generated_id_prepends_non_unit_increments() {
        let config = ViewPresetConfig {
            headers: Some(vec![
                HeaderRowConfig::new("hour"),
                HeaderRowConfig::new("minute").with_increment(15),
            ]),
            ..ViewPresetConfig::default()
        };
        let preset = ViewPreset::from_config(&config).expect("valid preset");
        assert_eq!(preset.id(), "15MinuteAndHour");
    }

    #[test]
    fn collision_suffixes_follow_width_then_increment_then_counter() {
        let preset = ViewPreset::from_config(&day_and_month()).expect("valid preset");
        let id = preset.generate_id(|candidate| candidate == "DayAndMonth");
        assert_eq!(id, "DayAndMonth-50");
        let id = preset.generate_id(|candidate| {
            candidate == "DayAndMonth" || candidate == "DayAndMonth-50"
        });
        assert_eq!(id, "DayAndMonth-1");
        let id = preset.generate_id(|candidate| {
            ["DayAndMonth", "DayAndMonth-50", "DayAndMonth-1", "DayAndMonth-2"]
                .contains(&candidate)
        });
        assert_eq!(id, "DayAndMonth-3");
    }

    #[test]
    fn unknown_unit_fails_normalization() {
        let config = ViewPresetConfig {
            headers: Some(vec![HeaderRowConfig::new("lightyear")]),
            ..ViewPresetConfig::default()
        };
        assert!(ViewPreset::from_config(&config).is_err());
    }

    #[test]
    fn ms_per_pixel_scales_with_tick_width() {
        let mut config = day_and_month();
        config.tick_width = Some(100.0);
        let preset = ViewPreset::from_config(&config).expect("valid preset");
        assert_eq!(preset.ms_per_pixel(), 864_000);
    }
}
