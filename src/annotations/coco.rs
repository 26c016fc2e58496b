// COCO JSON export of oriented detections.
// http://cocodataset.org/#format-data

use crate::annotations::detection::Detection;
use crate::annotations::oriented_bounding_box::{BoundingBoxGeometry, OrientedBoundingBox};
use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct CocoLicense {
    pub name: String,
    pub id: u32,
    pub url: String,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct CocoInfo {
    pub contributor: String,
    pub date_created: String,
    pub description: String,
    pub url: String,
    pub version: String,
    pub year: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CocoCategory {
    pub id: u32,
    pub name: String,
    pub supercategory: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CocoImage {
    pub id: u32,
    pub width: u32,
    pub height: u32,
    pub file_name: String,
    pub license: u32,
    pub flickr_url: String,
    pub coco_url: String,
    pub date_captured: u32,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AnnotationAttributes {
    pub occluded: bool,
    /// Degrees.
    pub rotation: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AnnotationRecord {
    pub id: u32,
    pub image_id: u32,
    pub category_id: u32,
    pub segmentation: Vec<Vec<f64>>,
    pub area: f64,
    /// [left, top, width, height]
    pub bbox: [f64; 4],
    pub iscrowd: u8,
    pub attributes: AnnotationAttributes,
}

/// The whole annotation file. Field order is the key order of the written JSON.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CocoDocument {
    pub licenses: Vec<CocoLicense>,
    pub info: CocoInfo,
    pub categories: Vec<CocoCategory>,
    pub images: Vec<CocoImage>,
    pub annotations: Vec<AnnotationRecord>,
}

/// Converts one oriented detection into a COCO annotation.
///
/// The model's class index is zero-based while COCO categories start at 1. The bbox is the
/// unrotated box around the center; the angle travels separately in `attributes.rotation`.
pub fn calculate_bbox(
    annotation_id: u32,
    image_id: u32,
    detection: &Detection<OrientedBoundingBox>,
) -> AnnotationRecord {
    let obb = &detection.annotation;
    let x = obb.cx() as f64;
    let y = obb.cy() as f64;
    let width = obb.width() as f64;
    let height = obb.height() as f64;

    AnnotationRecord {
        id: annotation_id,
        image_id,
        category_id: obb.category_id() as u32 + 1,
        segmentation: Vec::new(),
        area: width * height,
        bbox: [x - width / 2.0, y - height / 2.0, width, height],
        iscrowd: 0,
        attributes: AnnotationAttributes {
            occluded: false,
            rotation: (obb.rotation() as f64).to_degrees(),
        },
    }
}

impl CocoDocument {
    /// Builds the header and one category per label, numbered from 1.
    pub fn new(labels: &[String]) -> Self {
        let categories = labels
            .iter()
            .zip(1..)
            .map(|(label, id)| CocoCategory {
                id,
                name: label.clone(),
                supercategory: String::new(),
            })
            .collect();
        CocoDocument {
            licenses: vec![CocoLicense::default()],
            info: CocoInfo::default(),
            categories,
            images: Vec::new(),
            annotations: Vec::new(),
        }
    }

    /// Appends an image record and its annotations, returning the id given to the image.
    pub fn push_image(
        &mut self,
        file_name: &str,
        width: u32,
        height: u32,
        detections: &[Detection<OrientedBoundingBox>],
    ) -> u32 {
        let image_id = self.images.len() as u32 + 1;
        self.images.push(CocoImage {
            id: image_id,
            width,
            height,
            file_name: file_name.to_string(),
            license: 0,
            flickr_url: String::new(),
            coco_url: String::new(),
            date_captured: 0,
        });
        self.annotations.extend(
            detections
                .iter()
                .zip(1..)
                .map(|(det, annotation_id)| calculate_bbox(annotation_id, image_id, det)),
        );
        image_id
    }

    pub fn write_json(&self, path: &Path) -> Result<()> {
        let mut writer = BufWriter::new(File::create(path)?);
        serde_json::to_writer(&mut writer, self)?;
        writer.flush()?;
        Ok(())
    }
}
