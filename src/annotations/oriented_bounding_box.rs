use crate::annotations::point::Point;
use crate::error::AnnotatorError;
use std::f32::consts::{FRAC_PI_2, PI};
use std::fmt;

const EPS: f32 = 1e-7;

/// Geometry every box type must expose so detections can be filtered generically.
pub trait BoundingBoxGeometry {
    fn category_id(&self) -> usize;
    fn intersection_over_union(&self, other: &Self) -> f32;
}

/// A struct representing an oriented (rotated) bounding box.
///
/// Oriented boxes are stored as a center, a size and a rotation in radians, which is the
/// `xywhr` layout YOLO OBB models emit. Coordinates follow the image convention of x growing
/// to the right and y growing downward, so a positive rotation turns the box clockwise on
/// screen.
#[derive(Clone, Debug, PartialEq)]
pub struct OrientedBoundingBox {
    cx: f32,
    cy: f32,
    width: f32,
    height: f32,
    rotation: f32,
    category_id: usize,
}

impl OrientedBoundingBox {
    /// Checks if a box has valid parameters before constructing.
    pub fn new(
        cx: f32,
        cy: f32,
        width: f32,
        height: f32,
        rotation: f32,
        category_id: usize,
    ) -> Result<Self, AnnotatorError> {
        if ![cx, cy, width, height, rotation].iter().all(|v| v.is_finite()) {
            return Err(AnnotatorError::InvalidBox(format!(
                "non-finite value in ({}, {}, {}, {}, {}).",
                cx, cy, width, height, rotation
            )));
        }
        if width < 0.0 || height < 0.0 {
            return Err(AnnotatorError::InvalidBox(format!(
                "negative size ({} x {}).",
                width, height
            )));
        }
        Ok(OrientedBoundingBox {
            cx,
            cy,
            width,
            height,
            rotation,
            category_id,
        })
    }

    pub fn cx(&self) -> f32 {
        self.cx
    }

    pub fn cy(&self) -> f32 {
        self.cy
    }

    pub fn width(&self) -> f32 {
        self.width
    }

    pub fn height(&self) -> f32 {
        self.height
    }

    /// Rotation in radians.
    pub fn rotation(&self) -> f32 {
        self.rotation
    }

    pub fn cx_mut(&mut self) -> &mut f32 {
        &mut self.cx
    }

    pub fn cy_mut(&mut self) -> &mut f32 {
        &mut self.cy
    }

    pub fn width_mut(&mut self) -> &mut f32 {
        &mut self.width
    }

    pub fn height_mut(&mut self) -> &mut f32 {
        &mut self.height
    }

    /// Brings the box into the canonical range used for output.
    ///
    /// The same physical box can be described with the sides swapped and the angle shifted
    /// by a quarter turn. After this call the rotation lies in [0, pi/2).
    pub fn regularized(self) -> Self {
        let swap = self.rotation.rem_euclid(PI) >= FRAC_PI_2;
        let (width, height) = if swap {
            (self.height, self.width)
        } else {
            (self.width, self.height)
        };
        OrientedBoundingBox {
            width,
            height,
            rotation: self.rotation.rem_euclid(FRAC_PI_2),
            ..self
        }
    }

    /// The four corners in YOLO label order: (+w, +h), (+w, -h), (-w, -h), (-w, +h) along the
    /// box's own axes.
    pub fn corners(&self) -> [Point; 4] {
        let (sin, cos) = self.rotation.sin_cos();
        let half_w = self.width / 2.0;
        let half_h = self.height / 2.0;
        [
            (half_w, half_h),
            (half_w, -half_h),
            (-half_w, -half_h),
            (-half_w, half_h),
        ]
        .map(|(dx, dy)| Point {
            x: self.cx + dx * cos - dy * sin,
            y: self.cy + dx * sin + dy * cos,
        })
    }

    /// Covariance terms (a, b, c) of the Gaussian that has the same second moments as the box.
    fn covariance(&self) -> (f32, f32, f32) {
        let a = self.width.powi(2) / 12.0;
        let b = self.height.powi(2) / 12.0;
        let (sin, cos) = self.rotation.sin_cos();
        (
            a * cos.powi(2) + b * sin.powi(2),
            a * sin.powi(2) + b * cos.powi(2),
            (a - b) * cos * sin,
        )
    }

    /// ProbIoU: one minus the Hellinger distance between the Gaussians of the two boxes.
    pub fn probabilistic_iou(&self, other: &OrientedBoundingBox) -> f32 {
        let (a1, b1, c1) = self.covariance();
        let (a2, b2, c2) = other.covariance();
        let (dx, dy) = (self.cx - other.cx, self.cy - other.cy);

        let a = a1 + a2;
        let b = b1 + b2;
        let c = c1 + c2;
        let det = a * b - c.powi(2);

        let t1 = (a * dy.powi(2) + b * dx.powi(2)) / (det + EPS) * 0.25;
        let t2 = (c * -dx * dy) / (det + EPS) * 0.5;
        let own_dets = (a1 * b1 - c1.powi(2)).max(0.0) * (a2 * b2 - c2.powi(2)).max(0.0);
        let t3 = (det / (4.0 * own_dets.sqrt() + EPS) + EPS).ln() * 0.5;

        let bhattacharyya = (t1 + t2 + t3).clamp(EPS, 100.0);
        let hellinger = (1.0 - (-bhattacharyya).exp() + EPS).sqrt();
        (1.0 - hellinger).clamp(0.0, 1.0)
    }
}

impl BoundingBoxGeometry for OrientedBoundingBox {
    fn category_id(&self) -> usize {
        self.category_id
    }

    fn intersection_over_union(&self, other: &Self) -> f32 {
        self.probabilistic_iou(other)
    }
}

impl fmt::Display for OrientedBoundingBox {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "OrientedBoundingBox {{ cx: {}, cy: {}, w: {}, h: {}, r: {}, class: {} }}",
            self.cx, self.cy, self.width, self.height, self.rotation, self.category_id
        )
    }
}
