use crate::annotations::detection::Detection;
use crate::annotations::oriented_bounding_box::BoundingBoxGeometry;
use crate::error::Result;
use image::RgbImage;

/// Defines a trait that all object detection models must follow.
///
/// Models receive the decoded image at its original size and return boxes in that image's
/// pixel coordinates. Any resizing the network needs happens inside the implementation.
pub trait ObjectDetectionModel<T: BoundingBoxGeometry> {
    fn run_inference(&mut self, image: &RgbImage) -> Result<Vec<Detection<T>>>;
}
