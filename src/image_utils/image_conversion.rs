use image::RgbImage;
use ndarray::{Array, Array4};

/// Converts an rgb8 image into the normalized `(1, 3, height, width)` layout YOLO models take.
pub fn convert_rgb_image_to_owned_array(rgb_image: &RgbImage) -> Array4<f32> {
    let mut image_array = Array::zeros((
        1,
        3,
        rgb_image.height() as usize,
        rgb_image.width() as usize,
    ));
    for (x, y, pixel) in rgb_image.enumerate_pixels() {
        let (x, y) = (x as usize, y as usize);
        let [r, g, b] = pixel.0;
        image_array[[0, 0, y, x]] = (r as f32) / 255.;
        image_array[[0, 1, y, x]] = (g as f32) / 255.;
        image_array[[0, 2, y, x]] = (b as f32) / 255.;
    }
    image_array
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    fn test_image() -> RgbImage {
        // Deliberately not square so a transposed layout would be caught.
        let mut img = RgbImage::new(4, 2);
        img.put_pixel(3, 0, Rgb([255, 0, 0]));
        img.put_pixel(0, 1, Rgb([0, 255, 0]));
        img.put_pixel(2, 1, Rgb([0, 0, 255]));
        img
    }

    #[test]
    fn convert_rgb_image_to_owned_array_test() {
        let arr = convert_rgb_image_to_owned_array(&test_image());
        assert_eq!(arr.shape(), &[1, 3, 2, 4]);
        assert_eq!((arr[[0, 0, 0, 3]], arr[[0, 1, 0, 3]], arr[[0, 2, 0, 3]]), (1.0, 0.0, 0.0));
        assert_eq!((arr[[0, 0, 1, 0]], arr[[0, 1, 1, 0]], arr[[0, 2, 1, 0]]), (0.0, 1.0, 0.0));
        assert_eq!((arr[[0, 0, 1, 2]], arr[[0, 1, 1, 2]], arr[[0, 2, 1, 2]]), (0.0, 0.0, 1.0));
    }
}
