use crate::annotations::detection::Detection;
use crate::annotations::oriented_bounding_box::{BoundingBoxGeometry, OrientedBoundingBox};
use image::{Rgb, RgbImage};
use imageproc::drawing::draw_hollow_polygon_mut;
use imageproc::point::Point;

const PALETTE: [u32; 20] = [
    0x042AFF, 0x0BDBEB, 0xF3F3F3, 0x00DFB7, 0x111F68, 0xFF6FDD, 0xFF444F, 0xCCED00, 0x00F344,
    0xBD00FF, 0x00B4FF, 0xDD00BA, 0x00FFFF, 0x26C000, 0x01FFB3, 0x7D24FF, 0x7B0068, 0xFF1B6C,
    0xFC6D2F, 0xA2FF0B,
];

/// A stable color for a class id, cycling through the palette.
pub fn class_color(category_id: usize) -> Rgb<u8> {
    let hex = PALETTE[category_id % PALETTE.len()];
    Rgb([(hex >> 16) as u8, (hex >> 8) as u8, hex as u8])
}

/// Outline width that scales with the image, never thinner than 2 px.
pub fn line_width(image: &RgbImage) -> u32 {
    let (width, height) = image.dimensions();
    (((width + height) as f32 / 2.0 * 0.003).round() as u32).max(2)
}

/// Draws every detection as a closed, class-colored polygon on top of the image.
pub fn draw_oriented_detections(
    image: &mut RgbImage,
    detections: &[Detection<OrientedBoundingBox>],
) {
    let thickness = line_width(image) as i32;
    let offsets = -(thickness / 2)..(thickness - thickness / 2);
    for det in detections {
        let color = class_color(det.annotation.category_id());
        let corners = det.annotation.corners();
        // Thick outlines are drawn as a bundle of shifted 1 px polygons.
        for dx in offsets.clone() {
            for dy in offsets.clone() {
                let shifted: Vec<Point<f32>> = corners
                    .iter()
                    .map(|c| Point::new(c.x + dx as f32, c.y + dy as f32))
                    .collect();
                draw_hollow_polygon_mut(image, &shifted, color);
            }
        }
    }
}
