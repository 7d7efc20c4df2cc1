//! The injectable preset registry.
//!
//! Holds registered [`ViewPreset`]s ordered from most zoomed-out to most
//! zoomed-in, resolves [`PresetRef`]s and merges `base`-derived
//! configurations. Construct one per scheduler (or share explicitly); there
//! is no global instance.

use indexmap::IndexMap;

use crate::error::{AxisError, AxisResult};
use crate::preset::view_preset::{HeaderRowConfig, TimeResolutionConfig, ViewPreset, ViewPresetConfig};

/// A reference to a preset: registered id, position in zoom order, an ad-hoc
/// configuration, or an already-built instance.
#[derive(Debug, Clone)]
pub enum PresetRef {
    Id(String),
    Index(usize),
    Config(ViewPresetConfig),
    Instance(ViewPreset),
}

impl From<&str> for PresetRef {
    fn from(id: &str) -> Self {
        Self::Id(id.to_owned())
    }
}

impl From<ViewPresetConfig> for PresetRef {
    fn from(config: ViewPresetConfig) -> Self {
        Self::Config(config)
    }
}

impl From<ViewPreset> for PresetRef {
    fn from(preset: ViewPreset) -> Self {
        Self::Instance(preset)
    }
}

pub struct PresetRegistry {
    presets: IndexMap<String, ViewPreset>,
    zoom_order: i8,
}

impl Default for PresetRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl PresetRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self {
            presets: IndexMap::new(),
            zoom_order: 1,
        }
    }

    /// A registry pre-loaded with the standard zoom ladder, from
    /// seconds-per-tick up to years-per-tick.
    pub fn with_defaults() -> AxisResult<Self> {
        let mut registry = Self::new();
        for config in default_preset_configs() {
            registry.register(config)?;
        }
        Ok(registry)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.presets.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.presets.is_empty()
    }

    /// Presets in zoom order.
    pub fn iter(&self) -> impl Iterator<Item = &ViewPreset> {
        self.presets.values()
    }

    #[must_use]
    pub fn zoom_order(&self) -> i8 {
        self.zoom_order
    }

    /// `1` (default) sorts from most zoomed-out to most zoomed-in,
    /// `-1` reverses.
    pub fn set_zoom_order(&mut self, zoom_order: i8) {
        self.zoom_order = if zoom_order < 0 { -1 } else { 1 };
        self.sort();
    }

    /// Registers a preset configuration.
    ///
    /// A structurally equal preset is not added twice; the existing one is
    /// returned instead. Generated ids are disambiguated against the
    /// registered collection.
    pub fn register(&mut self, config: ViewPresetConfig) -> AxisResult<&ViewPreset> {
        let resolved = self.resolve_base(config)?;
        let mut preset = ViewPreset::from_config(&resolved)?;

        if let Some(index) = self
            .presets
            .values()
            .position(|existing| existing.same_structure(&preset))
        {
            let (_, existing) = self
                .presets
                .get_index(index)
                .expect("position came from this map");
            return Ok(existing);
        }

        if self.presets.contains_key(preset.id()) {
            let id = preset.generate_id(|candidate| self.presets.contains_key(candidate));
            preset.set_id(id);
        }
        let id = preset.id().to_owned();
        self.presets.insert(id.clone(), preset);
        self.sort();
        Ok(&self.presets[&id])
    }

    /// Resolves a preset reference.
    ///
    /// Ad-hoc configs get their `base` merged and are validated, but are not
    /// added to the registry.
    pub fn get(&self, preset_ref: &PresetRef) -> AxisResult<ViewPreset> {
        match preset_ref {
            PresetRef::Id(id) => self
                .presets
                .get(id)
                .cloned()
                .ok_or_else(|| AxisError::UnknownPreset(id.clone())),
            PresetRef::Index(index) => self
                .presets
                .get_index(*index)
                .map(|(_, preset)| preset.clone())
                .ok_or_else(|| AxisError::UnknownPreset(format!("#{index}"))),
            PresetRef::Config(config) => {
                let resolved = self.resolve_base(config.clone())?;
                ViewPreset::from_config(&resolved)
            }
            PresetRef::Instance(preset) => Ok(preset.clone()),
        }
    }

    /// Removes a preset by id or index.
    pub fn delete(&mut self, preset_ref: &PresetRef) -> AxisResult<ViewPreset> {
        match preset_ref {
            PresetRef::Id(id) => self
                .presets
                .shift_remove(id)
                .ok_or_else(|| AxisError::UnknownPreset(id.clone())),
            PresetRef::Index(index) => self
                .presets
                .shift_remove_index(*index)
                .map(|(_, preset)| preset)
                .ok_or_else(|| AxisError::UnknownPreset(format!("#{index}"))),
            PresetRef::Config(_) | PresetRef::Instance(_) => Err(AxisError::InvalidConfiguration(
                "only registered presets (by id or index) can be deleted".to_owned(),
            )),
        }
    }

    /// The registered preset whose zoom density best approximates `target`
    /// milliseconds per pixel.
    #[must_use]
    pub fn closest_for_ms_per_pixel(&self, target: i64) -> Option<&ViewPreset> {
        self.presets
            .values()
            .min_by_key(|preset| (preset.ms_per_pixel() - target).abs())
    }

    fn resolve_base(&self, config: ViewPresetConfig) -> AxisResult<ViewPresetConfig> {
        let Some(base_id) = &config.base else {
            return Ok(config);
        };
        let base = self
            .presets
            .get(base_id)
            .ok_or_else(|| AxisError::UnknownPresetBase(base_id.clone()))?;
        Ok(merge_over_base(base, config))
    }

    fn sort(&mut self) {
        let reverse = self.zoom_order < 0;
        self.presets.sort_by(|_, a, _, b| {
            let ordering = b.zoom_key().cmp(&a.zoom_key());
            if reverse {
                ordering.reverse()
            } else {
                ordering
            }
        });
    }
}

/// Copies the base preset's values underneath `config`: override keys win,
/// and the base's `name` is kept only when the override supplies none of its
/// own. Identity (`id`, `base`) is never inherited.
fn merge_over_base(base: &ViewPreset, config: ViewPresetConfig) -> ViewPresetConfig {
    let base_headers = base
        .headers()
        .iter()
        .map(|header| HeaderRowConfig {
            unit: header.unit.name().to_owned(),
            increment: Some(header.increment),
            date_format: header.date_format.clone(),
        })
        .collect();
    let (resolution_unit, resolution_increment) = base.resolution();
    let (shift_unit, shift_increment) = base.shift();

    ViewPresetConfig {
        id: config.id,
        name: config.name.or_else(|| base.name().map(str::to_owned)),
        base: None,
        tick_width: config.tick_width.or(Some(base.tick_width())),
        tick_height: config.tick_height.or(Some(base.tick_height())),
        display_date_format: config
            .display_date_format
            .or_else(|| base.display_date_format().map(str::to_owned)),
        shift_unit: config.shift_unit.or(Some(shift_unit.name().to_owned())),
        shift_increment: config.shift_increment.or(Some(shift_increment)),
        default_span: config.default_span.or(Some(base.default_span())),
        time_resolution: config.time_resolution.or(Some(TimeResolutionConfig {
            unit: resolution_unit.name().to_owned(),
            increment: resolution_increment,
        })),
        headers: config.headers.or(Some(base_headers)),
        main_header_level: config.main_header_level.or(Some(base.main_header_level())),
        column_lines_for: config.column_lines_for.or(Some(base.column_lines_for())),
    }
}

fn preset(
    id: &str,
    headers: Vec<HeaderRowConfig>,
    tick_width: f64,
    resolution: (&str, i64),
    shift: (&str, i64),
    default_span: i64,
) -> ViewPresetConfig {
    ViewPresetConfig {
        id: Some(id.to_owned()),
        tick_width: Some(tick_width),
        time_resolution: Some(TimeResolutionConfig {
            unit: resolution.0.to_owned(),
            increment: resolution.1,
        }),
        shift_unit: Some(shift.0.to_owned()),
        shift_increment: Some(shift.1),
        default_span: Some(default_span),
        headers: Some(headers),
        ..ViewPresetConfig::default()
    }
}

/// The standard zoom ladder shipped with every defaulted registry.
fn default_preset_configs() -> Vec<ViewPresetConfig> {
    vec![
        preset(
            "manyYears",
            vec![
                HeaderRowConfig::new("year").with_increment(5).with_date_format("%Y"),
                HeaderRowConfig::new("year").with_date_format("%y"),
            ],
            40.0,
            ("year", 1),
            ("year", 5),
            2,
        ),
        preset(
            "year",
            vec![
                HeaderRowConfig::new("year").with_date_format("%Y"),
                HeaderRowConfig::new("quarter"),
            ],
            100.0,
            ("month", 1),
            ("year", 1),
            1,
        ),
        preset(
            "monthAndYear",
            vec![
                HeaderRowConfig::new("year").with_date_format("%Y"),
                HeaderRowConfig::new("month").with_date_format("%b"),
            ],
            110.0,
            ("day", 1),
            ("year", 1),
            1,
        ),
        preset(
            "weekAndMonth",
            vec![
                HeaderRowConfig::new("month").with_date_format("%b %Y"),
                HeaderRowConfig::new("week").with_date_format("%d"),
            ],
            35.0,
            ("day", 1),
            ("month", 1),
            2,
        ),
        preset(
            "dayAndMonth",
            vec![
                HeaderRowConfig::new("month").with_date_format("%B %Y"),
                HeaderRowConfig::new("day").with_date_format("%d"),
            ],
            80.0,
            ("hour", 1),
            ("month", 1),
            1,
        ),
        preset(
            "weekAndDay",
            vec![
                HeaderRowConfig::new("week").with_date_format("%d %b"),
                HeaderRowConfig::new("day").with_date_format("%a"),
            ],
            100.0,
            ("hour", 1),
            ("week", 1),
            1,
        ),
        preset(
            "hourAndDay",
            vec![
                HeaderRowConfig::new("day").with_date_format("%a %d/%m"),
                HeaderRowConfig::new("hour").with_date_format("%H"),
            ],
            70.0,
            ("minute", 30),
            ("day", 1),
            1,
        ),
        preset(
            "minuteAndHour",
            vec![
                HeaderRowConfig::new("hour").with_date_format("%H:%M"),
                HeaderRowConfig::new("minute").with_increment(30).with_date_format("%M"),
            ],
            60.0,
            ("minute", 15),
            ("hour", 1),
            24,
        ),
        preset(
            "secondAndMinute",
            vec![
                HeaderRowConfig::new("minute").with_date_format("%H:%M"),
                HeaderRowConfig::new("second").with_increment(10).with_date_format("%S"),
            ],
            30.0,
            ("second", 5),
            ("minute", 1),
            10,
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::{PresetRef, PresetRegistry};

    #[test]
    fn defaults_sort_from_zoomed_out_to_zoomed_in() {
        let registry = PresetRegistry::with_defaults().expect("default registry");
        let densities: Vec<i64> = registry.iter().map(|p| p.ms_per_pixel()).collect();
        assert!(densities.windows(2).all(|pair| pair[0] >= pair[1]));
        assert_eq!(
            registry.iter().next().expect("non-empty").id(),
            "manyYears"
        );
    }

    #[test]
    fn reversed_zoom_order_flips_the_ladder() {
        let mut registry = PresetRegistry::with_defaults().expect("default registry");
        registry.set_zoom_order(-1);
        assert_eq!(
            registry.iter().next().expect("non-empty").id(),
            "secondAndMinute"
        );
    }

    #[test]
    fn closest_preset_by_zoom_density() {
        let registry = PresetRegistry::with_defaults().expect("default registry");
        let hour_scale = registry
            .closest_for_ms_per_pixel(3_600_000 / 70)
            .expect("some preset");
        assert_eq!(hour_scale.id(), "hourAndDay");
    }

    #[test]
    fn unknown_id_is_an_error() {
        let registry = PresetRegistry::with_defaults().expect("default registry");
        assert!(registry.get(&PresetRef::from("noSuchPreset")).is_err());
    }
}
