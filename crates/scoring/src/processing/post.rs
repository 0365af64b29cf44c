use ndarray::ArrayViewD;

pub struct TransformParams {
    pub orig_width: u32,
    pub orig_height: u32,
    pub scale: f32,
    pub offset_x: f32,
    pub offset_y: f32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Detection {
    pub x1: f32,
    pub y1: f32,
    pub x2: f32,
    pub y2: f32,
    pub confidence: f32,
    pub class_id: u16,
}

pub struct PostProcessor {
    pub confidence_threshold: f32,
    pub iou_threshold: f32,
    pub max_detections: usize,
}

impl PostProcessor {
    pub fn new(confidence_threshold: f32, iou_threshold: f32, max_detections: usize) -> Self {
        Self {
            confidence_threshold,
            iou_threshold,
            max_detections,
        }
    }

    /// Decode raw predictions into detections in original-image pixels.
    ///
    /// The prediction tensor is `[1, 4 + num_classes, num_anchors]`: rows 0-3
    /// hold cxcywh boxes in input-pixel coordinates, the remaining rows hold
    /// per-class scores (already activated).
    #[tracing::instrument(skip(self, preds, transform))]
    pub fn parse_detections(
        &self,
        preds: &ArrayViewD<f32>,
        transform: &TransformParams,
    ) -> anyhow::Result<Vec<Detection>> {
        anyhow::ensure!(
            preds.ndim() == 3 && preds.shape()[0] == 1 && preds.shape()[1] > 4,
            "unexpected prediction shape {:?}",
            preds.shape()
        );

        let num_classes = preds.shape()[1] - 4;
        let num_anchors = preds.shape()[2];

        let mut candidates = Vec::new();

        for i in 0..num_anchors {
            // Argmax over class scores for this anchor
            let mut confidence = f32::NEG_INFINITY;
            let mut class_idx = 0usize;
            for c in 0..num_classes {
                let score = preds[[0, 4 + c, i]];
                if score > confidence {
                    confidence = score;
                    class_idx = c;
                }
            }

            if confidence < self.confidence_threshold {
                continue;
            }

            // Box in cxcywh format, input-pixel coordinates
            let cx = preds[[0, 0, i]];
            let cy = preds[[0, 1, i]];
            let w = preds[[0, 2, i]];
            let h = preds[[0, 3, i]];

            let (x1_input, y1_input, x2_input, y2_input) = cxcywh_to_xyxy(cx, cy, w, h);

            // Apply inverse letterbox transform to original image coordinates
            let x1 = ((x1_input - transform.offset_x) / transform.scale)
                .max(0.0)
                .min(transform.orig_width as f32);
            let y1 = ((y1_input - transform.offset_y) / transform.scale)
                .max(0.0)
                .min(transform.orig_height as f32);
            let x2 = ((x2_input - transform.offset_x) / transform.scale)
                .max(0.0)
                .min(transform.orig_width as f32);
            let y2 = ((y2_input - transform.offset_y) / transform.scale)
                .max(0.0)
                .min(transform.orig_height as f32);

            candidates.push(Detection {
                x1,
                y1,
                x2,
                y2,
                confidence,
                class_id: class_idx as u16,
            });
        }

        let mut detections = non_max_suppression(candidates, self.iou_threshold);
        detections.truncate(self.max_detections);

        Ok(detections)
    }
}

/// Class-wise greedy non-maximum suppression.
///
/// Keeps the highest-confidence box and drops same-class boxes overlapping it
/// beyond the IoU threshold. Returns survivors sorted by descending confidence.
fn non_max_suppression(mut candidates: Vec<Detection>, iou_threshold: f32) -> Vec<Detection> {
    candidates.sort_by(|a, b| b.confidence.total_cmp(&a.confidence));

    let mut kept: Vec<Detection> = Vec::with_capacity(candidates.len());

    'candidates: for detection in candidates {
        for survivor in &kept {
            if survivor.class_id == detection.class_id
                && iou(survivor, &detection) > iou_threshold
            {
                continue 'candidates;
            }
        }
        kept.push(detection);
    }

    kept
}

/// Intersection over union of two boxes in xyxy format
#[inline]
fn iou(a: &Detection, b: &Detection) -> f32 {
    let ix1 = a.x1.max(b.x1);
    let iy1 = a.y1.max(b.y1);
    let ix2 = a.x2.min(b.x2);
    let iy2 = a.y2.min(b.y2);

    let intersection = (ix2 - ix1).max(0.0) * (iy2 - iy1).max(0.0);
    let area_a = (a.x2 - a.x1).max(0.0) * (a.y2 - a.y1).max(0.0);
    let area_b = (b.x2 - b.x1).max(0.0) * (b.y2 - b.y1).max(0.0);
    let union = area_a + area_b - intersection;

    if union <= 0.0 { 0.0 } else { intersection / union }
}

/// Convert bounding box from center-width-height format to corner format
#[inline]
fn cxcywh_to_xyxy(cx: f32, cy: f32, w: f32, h: f32) -> (f32, f32, f32, f32) {
    let x1 = cx - w / 2.0;
    let y1 = cy - h / 2.0;
    let x2 = cx + w / 2.0;
    let y2 = cy + h / 2.0;
    (x1, y1, x2, y2)
}
