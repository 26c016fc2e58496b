pub mod coco;
pub mod detection;
pub mod oriented_bounding_box;
pub mod point;
