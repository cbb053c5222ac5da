pub mod error;
pub mod pipeline_service;
