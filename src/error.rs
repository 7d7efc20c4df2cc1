use thiserror::Error;

pub type AxisResult<T> = Result<T, AxisError>;

#[derive(Debug, Error)]
pub enum AxisError {
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("invalid time range: start {start} is not before end {end}")]
    InvalidRange { start: String, end: String },

    #[error("unknown calendar unit: `{0}`")]
    UnknownUnit(String),

    #[error("view preset `{0}` does not exist")]
    UnknownPreset(String),

    #[error("view preset base `{0}` does not exist")]
    UnknownPresetBase(String),

    #[error("time axis shift gave up after {tries} attempts across excluded spans")]
    ShiftExhausted { tries: u32 },
}
