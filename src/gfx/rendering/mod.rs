//! Rendering pipeline: pipeline definitions, shadow mapping, uniform
//! packing, and the frame loop.

pub mod pipeline_manager;
pub mod renderer;
pub mod shadow;
pub mod uniforms;
pub mod vertex;

pub use pipeline_manager::{DepthState, PipelineConfig, PipelineManager};
pub use renderer::{RenderError, Renderer, BACKGROUND_PIPELINE, MAIN_PIPELINE, SHADOW_PIPELINE};
pub use vertex::Vertex;
