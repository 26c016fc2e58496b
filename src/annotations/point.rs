/// A point in image pixel coordinates.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    /// Divides each coordinate by the matching image dimension, mapping pixels into [0, 1].
    pub fn normalized(&self, image_width: u32, image_height: u32) -> Point {
        Point {
            x: self.x / image_width as f32,
            y: self.y / image_height as f32,
        }
    }
}
