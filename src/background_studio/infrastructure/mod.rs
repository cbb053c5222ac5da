pub mod axum_handler;
pub mod error;
pub mod file_storage;
pub mod image_data;
pub mod image_processor;
pub mod memory_storage;
pub mod passthrough_separator;
pub mod remove_bg_separator;
pub mod retry;
