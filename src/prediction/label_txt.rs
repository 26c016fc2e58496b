use crate::annotations::detection::Detection;
use crate::annotations::oriented_bounding_box::{BoundingBoxGeometry, OrientedBoundingBox};
use crate::error::Result;
use itertools::Itertools;
use std::fs;
use std::path::Path;

/// Formats a number the way C's `%g` does: six significant digits, trailing zeros dropped,
/// scientific notation for very large or very small magnitudes.
pub fn format_general(value: f64) -> String {
    if value == 0.0 || !value.is_finite() {
        return value.to_string();
    }
    let scientific = format!("{:.5e}", value);
    let (mantissa, exponent) = match scientific.split_once('e') {
        Some((m, e)) => (m, e.parse::<i32>().unwrap_or(0)),
        None => return scientific,
    };
    if !(-4..6).contains(&exponent) {
        let sign = if exponent < 0 { '-' } else { '+' };
        format!("{}e{}{:02}", trim_fraction(mantissa), sign, exponent.abs())
    } else {
        let decimals = (5 - exponent) as usize;
        trim_fraction(&format!("{:.*}", decimals, value)).to_string()
    }
}

fn trim_fraction(number: &str) -> &str {
    if number.contains('.') {
        number.trim_end_matches('0').trim_end_matches('.')
    } else {
        number
    }
}

/// One `class x1 y1 x2 y2 x3 y3 x4 y4 [confidence]` line per detection, corners normalized.
pub fn label_lines(
    detections: &[Detection<OrientedBoundingBox>],
    image_width: u32,
    image_height: u32,
    save_confidence: bool,
) -> Vec<String> {
    detections
        .iter()
        .map(|det| {
            let mut values = vec![det.annotation.category_id() as f64];
            for corner in det.annotation.corners() {
                let p = corner.normalized(image_width, image_height);
                values.push(p.x as f64);
                values.push(p.y as f64);
            }
            if save_confidence {
                values.push(det.confidence as f64);
            }
            values.into_iter().map(format_general).join(" ")
        })
        .collect()
}

/// Writes the label file for one image. Returns false, writing nothing, when there are no
/// detections.
pub fn write_label_txt(
    path: &Path,
    detections: &[Detection<OrientedBoundingBox>],
    image_width: u32,
    image_height: u32,
    save_confidence: bool,
) -> Result<bool> {
    let lines = label_lines(detections, image_width, image_height, save_confidence);
    if lines.is_empty() {
        return Ok(false);
    }
    let mut text = lines.join("\n");
    text.push('\n');
    fs::write(path, text)?;
    Ok(true)
}
