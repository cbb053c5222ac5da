pub mod color;
pub mod compositor;
pub mod dimension;
pub mod error;
pub mod image_processor_trait;
pub mod image_store;
pub mod raster;
pub mod resizer;
pub mod separator;
pub mod transform;
