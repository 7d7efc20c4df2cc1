pub mod registry;
pub mod view_preset;

pub use registry::{PresetRef, PresetRegistry};
pub use view_preset::{
    Header, HeaderRowConfig, PositionedHeaders, TimeResolutionConfig, ViewPreset, ViewPresetConfig,
};
