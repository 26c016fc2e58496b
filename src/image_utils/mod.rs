pub mod drawing;
pub mod image_conversion;
pub mod image_io;
pub mod letterbox;
