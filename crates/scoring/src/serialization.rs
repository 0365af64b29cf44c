use anyhow::Context;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::labels::class_name;
use crate::processing::post::Detection;

/// One serialized detection record, in the shape the upstream model library
/// emits: name, class id, confidence, and corner-format box.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetectionRecord {
    pub name: String,
    pub class: u16,
    pub confidence: f32,
    #[serde(rename = "box")]
    pub bounding_box: BoundingBox,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BoundingBox {
    pub x1: f32,
    pub y1: f32,
    pub x2: f32,
    pub y2: f32,
}

pub fn to_records(detections: &[Detection], names: Option<&[String]>) -> Vec<DetectionRecord> {
    detections
        .iter()
        .map(|d| DetectionRecord {
            name: class_name(names, d.class_id).to_string(),
            class: d.class_id,
            confidence: round5(d.confidence),
            bounding_box: BoundingBox {
                x1: round5(d.x1),
                y1: round5(d.y1),
                x2: round5(d.x2),
                y2: round5(d.y2),
            },
        })
        .collect()
}

/// Serialize detections to the response payload: a JSON array of detection
/// records. No detections is an empty array, not an error.
pub fn serialize_detections(
    detections: &[Detection],
    names: Option<&[String]>,
) -> anyhow::Result<Value> {
    serde_json::to_value(to_records(detections, names)).context("failed to serialize detections")
}

/// Round to five decimal places, as the upstream serializer does
#[inline]
fn round5(value: f32) -> f32 {
    ((value as f64 * 100_000.0).round() / 100_000.0) as f32
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_detection() -> Detection {
        Detection {
            x1: 10.123456,
            y1: 20.5,
            x2: 110.98,
            y2: 220.5,
            confidence: 0.928274,
            class_id: 16,
        }
    }

    #[test]
    fn test_record_shape_matches_upstream() {
        let value = serialize_detections(&[test_detection()], None).unwrap();

        let records = value.as_array().expect("payload should be an array");
        assert_eq!(records.len(), 1);

        let record = &records[0];
        assert_eq!(record["name"], "dog");
        assert_eq!(record["class"], 16);
        assert!(record["box"].is_object(), "box should be a nested object");
        assert_eq!(record["box"]["y1"], 20.5);
    }

    #[test]
    fn test_values_rounded_to_five_decimals() {
        let records = to_records(&[test_detection()], None);

        assert_eq!(records[0].confidence, 0.92827);
        assert_eq!(records[0].bounding_box.x1, 10.12346);
        assert_eq!(records[0].bounding_box.x2, 110.98);
    }

    #[test]
    fn test_embedded_names_take_precedence() {
        let names: Vec<String> = (0..17).map(|i| format!("label_{i}")).collect();

        let records = to_records(&[test_detection()], Some(&names));

        assert_eq!(records[0].name, "label_16");
    }

    #[test]
    fn test_no_detections_is_an_empty_array() {
        let value = serialize_detections(&[], None).unwrap();

        assert_eq!(value, serde_json::json!([]));
    }
}
