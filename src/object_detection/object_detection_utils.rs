use crate::annotations::detection::Detection;
use crate::annotations::oriented_bounding_box::BoundingBoxGeometry;

/// Upper bound on candidates that enter NMS, after sorting by confidence.
pub const MAX_NMS_CANDIDATES: usize = 30_000;

/// Non maxmimum suppression is a way of removing duplicate detections.
///
/// Detections only suppress others of the same category. A detection that was itself
/// suppressed still suppresses lower-scoring ones, so the result does not depend on the
/// order suppressions are discovered in. Output is sorted by confidence, highest first.
pub fn non_maximum_suppression<T: BoundingBoxGeometry>(
    mut detections: Vec<Detection<T>>,
    iou_threshold: f32,
) -> Vec<Detection<T>> {
    detections.sort_by(|a, b| b.confidence.total_cmp(&a.confidence));
    detections.truncate(MAX_NMS_CANDIDATES);
    let mut detections_to_remove: Vec<bool> = vec![false; detections.len()];
    for (current_index, current_det) in detections.iter().enumerate() {
        for (other_index, other_det) in detections[current_index + 1..].iter().enumerate() {
            if detections_to_remove[current_index + other_index + 1] {
                continue;
            }
            if current_det.annotation.category_id() != other_det.annotation.category_id() {
                continue;
            }
            let iou = current_det
                .annotation
                .intersection_over_union(&other_det.annotation);
            if iou >= iou_threshold {
                detections_to_remove[current_index + other_index + 1] = true;
            }
        }
    }
    let mut drop_iter = detections_to_remove.into_iter();
    detections.retain(|_| !drop_iter.next().unwrap_or(false));
    detections
}
