pub mod image_pipeline;
pub mod bridge;
pub mod logger;
