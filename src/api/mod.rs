pub mod date_mapper;
pub mod timeline_model;

pub use date_mapper::TimelineDateMapper;
pub use timeline_model::{TimelineModel, TimelineModelConfig};
