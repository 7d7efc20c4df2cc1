//! timegrid-rs: a scheduling time-axis engine.
//!
//! This crate is the date-axis computation core of a Gantt-style scheduler:
//! view presets describe zoom levels, a [`core::TimeAxis`] turns a date range
//! into a tick sequence (with working-time exclusion and filtering), a
//! [`core::TimeAxisViewModel`] lays the ticks out in pixels, and the
//! [`api::TimelineDateMapper`] converts between view coordinates and dates.
//! Rendering, interaction and widget lifecycle are left to embedding
//! applications.

pub mod api;
pub mod core;
pub mod error;
pub mod preset;
pub mod telemetry;

pub use crate::api::{TimelineDateMapper, TimelineModel, TimelineModelConfig};
pub use crate::core::{TimeAxis, TimeAxisViewModel};
pub use crate::error::{AxisError, AxisResult};
pub use crate::preset::{PresetRef, PresetRegistry, ViewPreset};
