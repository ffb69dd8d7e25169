pub mod capture;
pub mod image_pipeline;
pub mod logger;
