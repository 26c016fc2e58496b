use image::imageops::{self, FilterType};
use image::{Rgb, RgbImage};

const PAD_COLOR: Rgb<u8> = Rgb([114, 114, 114]);

/// How an image was scaled and shifted to fit the model input.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Letterbox {
    pub gain: f32,
    pub pad_left: u32,
    pub pad_top: u32,
}

impl Letterbox {
    /// Maps a point in model input coordinates back onto the original image.
    pub fn unmap_point(&self, x: f32, y: f32) -> (f32, f32) {
        (
            (x - self.pad_left as f32) / self.gain,
            (y - self.pad_top as f32) / self.gain,
        )
    }

    pub fn unmap_length(&self, length: f32) -> f32 {
        length / self.gain
    }
}

/// Resizes an rgb8 image to fit a `size` x `size` square without distorting it and pads the
/// remaining border with gray, keeping the content centered.
pub fn letterbox_rgb8(original_image: &RgbImage, size: u32) -> (RgbImage, Letterbox) {
    let (width, height) = original_image.dimensions();
    let gain = (size as f32 / height as f32).min(size as f32 / width as f32);
    let new_width = ((width as f32 * gain).round() as u32).clamp(1, size);
    let new_height = ((height as f32 * gain).round() as u32).clamp(1, size);

    let half_dw = (size - new_width) as f32 / 2.0;
    let half_dh = (size - new_height) as f32 / 2.0;
    let pad_left = (half_dw - 0.1).round().max(0.0) as u32;
    let pad_top = (half_dh - 0.1).round().max(0.0) as u32;

    let mut padded_image = RgbImage::from_pixel(size, size, PAD_COLOR);
    if (new_width, new_height) == (width, height) {
        imageops::replace(&mut padded_image, original_image, pad_left as i64, pad_top as i64);
    } else {
        let resized = imageops::resize(original_image, new_width, new_height, FilterType::Triangle);
        imageops::replace(&mut padded_image, &resized, pad_left as i64, pad_top as i64);
    }
    (
        padded_image,
        Letterbox {
            gain,
            pad_left,
            pad_top,
        },
    )
}
