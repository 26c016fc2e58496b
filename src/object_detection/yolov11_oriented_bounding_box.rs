use crate::annotations::detection::Detection;
use crate::annotations::oriented_bounding_box::OrientedBoundingBox;
use crate::config::InferenceSettings;
use crate::error::{AnnotatorError, Result};
use crate::image_utils::image_conversion::convert_rgb_image_to_owned_array;
use crate::image_utils::letterbox::{Letterbox, letterbox_rgb8};
use crate::object_detection::object_detection_model::ObjectDetectionModel;
use crate::object_detection::object_detection_utils::non_maximum_suppression;
use crate::object_detection::ort_inference_session::OrtInferenceSession;
use image::RgbImage;
use log::{debug, warn};
use ndarray::{ArrayView2, Axis, Ix3};
use std::path::Path;

/// A YOLO11 oriented bounding box model exported to ONNX.
///
/// The network takes a letterboxed `(1, 3, size, size)` image and returns a
/// `(1, 4 + classes + 1, candidates)` tensor. Each candidate column holds the box center and
/// size in input pixels, one score per class and finally the box angle in radians.
pub struct Yolov11OrientedBoundingBox {
    ort_session: OrtInferenceSession,
    settings: InferenceSettings,
}

impl Yolov11OrientedBoundingBox {
    pub fn new(model_path: &Path, settings: InferenceSettings) -> Result<Self> {
        let ort_session = OrtInferenceSession::new(model_path)?;
        Ok(Yolov11OrientedBoundingBox {
            ort_session,
            settings,
        })
    }
}

impl ObjectDetectionModel<OrientedBoundingBox> for Yolov11OrientedBoundingBox {
    fn run_inference(&mut self, image: &RgbImage) -> Result<Vec<Detection<OrientedBoundingBox>>> {
        let (input_image, letterbox) = letterbox_rgb8(image, self.settings.image_size);
        let input_array = convert_rgb_image_to_owned_array(&input_image).into_dyn();
        let output = self.ort_session.run(&input_array)?;

        let output = output
            .into_dimensionality::<Ix3>()
            .map_err(|e| AnnotatorError::ModelOutput(format!("expected a 3D output: {}", e)))?;
        if output.shape()[0] != 1 {
            return Err(AnnotatorError::ModelOutput(format!(
                "expected a batch of 1, got shape {:?}",
                output.shape()
            )));
        }
        let detections = decode_predictions(output.index_axis(Axis(0), 0), &self.settings)?;
        let (width, height) = image.dimensions();
        Ok(restore_original_coordinates(detections, &letterbox, width, height))
    }
}

/// Turns raw `(channels, candidates)` predictions into filtered, suppressed detections.
///
/// Boxes stay in model input coordinates.
pub fn decode_predictions(
    output: ArrayView2<f32>,
    settings: &InferenceSettings,
) -> Result<Vec<Detection<OrientedBoundingBox>>> {
    let channels = output.shape()[0];
    if channels < 6 {
        return Err(AnnotatorError::ModelOutput(format!(
            "{} channels is too few for an oriented box output",
            channels
        )));
    }
    let num_classes = channels - 5;

    let mut candidates: Vec<Detection<OrientedBoundingBox>> = Vec::new();
    for column in output.axis_iter(Axis(1)) {
        let (class_id, prob) = column
            .iter()
            .skip(4) // skips bounding box coords.
            .take(num_classes)
            .copied()
            .enumerate()
            .reduce(|accum, row| if row.1 > accum.1 { row } else { accum })
            .unwrap_or((0, 0.0));
        if prob <= settings.confidence {
            continue;
        }
        let angle = column[channels - 1];
        match OrientedBoundingBox::new(column[0], column[1], column[2], column[3], angle, class_id)
        {
            Ok(annotation) => candidates.push(Detection {
                annotation,
                confidence: prob,
            }),
            Err(e) => warn!("Skipping candidate: {}", e),
        }
    }
    debug!("{} candidates above confidence {}", candidates.len(), settings.confidence);

    let mut detections = non_maximum_suppression(candidates, settings.iou);
    detections.truncate(settings.max_detections);
    Ok(detections)
}

/// Maps detections from the letterboxed input back onto the original image and puts each
/// box into its canonical orientation.
pub fn restore_original_coordinates(
    detections: Vec<Detection<OrientedBoundingBox>>,
    letterbox: &Letterbox,
    image_width: u32,
    image_height: u32,
) -> Vec<Detection<OrientedBoundingBox>> {
    detections
        .into_iter()
        .map(|mut det| {
            let obb = &mut det.annotation;
            let (cx, cy) = letterbox.unmap_point(obb.cx(), obb.cy());
            // Only the center is clamped. Width and height stay as predicted.
            *obb.cx_mut() = cx.clamp(0.0, image_width as f32);
            *obb.cy_mut() = cy.clamp(0.0, image_height as f32);
            *obb.width_mut() = letterbox.unmap_length(obb.width());
            *obb.height_mut() = letterbox.unmap_length(obb.height());
            Detection {
                annotation: det.annotation.regularized(),
                confidence: det.confidence,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::annotations::oriented_bounding_box::BoundingBoxGeometry;
    use ndarray::Array2;
    use std::f32::consts::FRAC_PI_2;

    /// Builds a `(4 + classes + 1, n)` output from per-candidate rows.
    fn output_from(rows: &[Vec<f32>]) -> Array2<f32> {
        let channels = rows[0].len();
        let mut out = Array2::zeros((channels, rows.len()));
        for (i, row) in rows.iter().enumerate() {
            for (c, v) in row.iter().enumerate() {
                out[[c, i]] = *v;
            }
        }
        out
    }

    #[test]
    fn picks_best_class_and_drops_low_scores() {
        let output = output_from(&[
            vec![100.0, 100.0, 20.0, 10.0, 0.1, 0.9, 0.2],
            vec![300.0, 300.0, 20.0, 10.0, 0.2, 0.1, 0.0],
        ]);
        let dets = decode_predictions(output.view(), &InferenceSettings::default()).unwrap();
        assert_eq!(dets.len(), 1);
        assert_eq!(dets[0].annotation.category_id(), 1);
        assert_eq!(dets[0].confidence, 0.9);
        assert_eq!(dets[0].annotation.rotation(), 0.2);
    }

    #[test]
    fn drops_scores_equal_to_the_threshold() {
        let output = output_from(&[
            vec![100.0, 100.0, 20.0, 10.0, 0.25, 0.0],
            vec![300.0, 300.0, 20.0, 10.0, 0.26, 0.0],
        ]);
        let dets = decode_predictions(output.view(), &InferenceSettings::default()).unwrap();
        assert_eq!(dets.len(), 1);
        assert_eq!(dets[0].confidence, 0.26);
    }

    #[test]
    fn suppresses_duplicates_and_caps_count() {
        let output = output_from(&[
            vec![100.0, 100.0, 20.0, 10.0, 0.8, 0.0],
            vec![100.5, 100.0, 20.0, 10.0, 0.7, 0.0],
            vec![300.0, 300.0, 20.0, 10.0, 0.6, 0.0],
            vec![500.0, 500.0, 20.0, 10.0, 0.5, 0.0],
        ]);
        let settings = InferenceSettings {
            max_detections: 2,
            ..Default::default()
        };
        let dets = decode_predictions(output.view(), &settings).unwrap();
        let confidences: Vec<f32> = dets.iter().map(|d| d.confidence).collect();
        assert_eq!(confidences, vec![0.8, 0.6]);
    }

    #[test]
    fn rejects_outputs_without_class_channels() {
        let output = Array2::<f32>::zeros((5, 3));
        assert!(matches!(
            decode_predictions(output.view(), &InferenceSettings::default()),
            Err(AnnotatorError::ModelOutput(_))
        ));
    }

    #[test]
    fn restores_letterboxed_boxes() {
        let letterbox = Letterbox {
            gain: 0.5,
            pad_left: 0,
            pad_top: 160,
        };
        let dets = vec![Detection {
            annotation: OrientedBoundingBox::new(100.0, 260.0, 40.0, 10.0, FRAC_PI_2 + 0.1, 3)
                .unwrap(),
            confidence: 0.9,
        }];
        let restored = restore_original_coordinates(dets, &letterbox, 1280, 640);
        let obb = &restored[0].annotation;
        assert_eq!((obb.cx(), obb.cy()), (200.0, 200.0));
        // Rotation past a quarter turn swaps the sides.
        assert_eq!((obb.width(), obb.height()), (20.0, 80.0));
        assert!((obb.rotation() - 0.1).abs() < 1e-5);
        assert_eq!(obb.category_id(), 3);
    }

    #[test]
    fn restore_clamps_centers_into_the_image() {
        let letterbox = Letterbox {
            gain: 1.0,
            pad_left: 0,
            pad_top: 0,
        };
        let dets = vec![Detection {
            annotation: OrientedBoundingBox::new(700.0, -5.0, 10.0, 10.0, 0.0, 0).unwrap(),
            confidence: 0.5,
        }];
        let restored = restore_original_coordinates(dets, &letterbox, 640, 480);
        assert_eq!(
            (restored[0].annotation.cx(), restored[0].annotation.cy()),
            (640.0, 0.0)
        );
    }
}
