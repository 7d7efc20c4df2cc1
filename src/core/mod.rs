pub mod date_math;
pub mod exclusion;
pub mod snap;
pub mod tick;
pub mod time_axis;
pub mod unit;
pub mod view_model;

pub use exclusion::{IncludeRule, UnitRange};
pub use snap::Rounding;
pub use tick::Tick;
pub use time_axis::{
    AxisEvent, AxisPatch, AxisSettings, ReconfigureOutcome, ReconfigureReport, TickView, TimeAxis,
};
pub use unit::TimeUnit;
pub use view_model::{HeaderCell, Orientation, TimeAxisViewModel, ViewModelOptions};
