/// The 80 COCO class names the pretrained detection checkpoints ship with.
/// Used when the model artifact carries no name metadata of its own.
pub const COCO_NAMES: [&str; 80] = [
    "person",
    "bicycle",
    "car",
    "motorcycle",
    "airplane",
    "bus",
    "train",
    "truck",
    "boat",
    "traffic light",
    "fire hydrant",
    "stop sign",
    "parking meter",
    "bench",
    "bird",
    "cat",
    "dog",
    "horse",
    "sheep",
    "cow",
    "elephant",
    "bear",
    "zebra",
    "giraffe",
    "backpack",
    "umbrella",
    "handbag",
    "tie",
    "suitcase",
    "frisbee",
    "skis",
    "snowboard",
    "sports ball",
    "kite",
    "baseball bat",
    "baseball glove",
    "skateboard",
    "surfboard",
    "tennis racket",
    "bottle",
    "wine glass",
    "cup",
    "fork",
    "knife",
    "spoon",
    "bowl",
    "banana",
    "apple",
    "sandwich",
    "orange",
    "broccoli",
    "carrot",
    "hot dog",
    "pizza",
    "donut",
    "cake",
    "chair",
    "couch",
    "potted plant",
    "bed",
    "dining table",
    "toilet",
    "tv",
    "laptop",
    "mouse",
    "remote",
    "keyboard",
    "cell phone",
    "microwave",
    "oven",
    "toaster",
    "sink",
    "refrigerator",
    "book",
    "clock",
    "vase",
    "scissors",
    "teddy bear",
    "hair drier",
    "toothbrush",
];

/// Name for a class id, preferring names the model artifact embeds.
pub fn class_name<'a>(names: Option<&'a [String]>, class_id: u16) -> &'a str {
    match names {
        Some(names) => names
            .get(class_id as usize)
            .map(String::as_str)
            .unwrap_or("unknown"),
        None => COCO_NAMES.get(class_id as usize).copied().unwrap_or("unknown"),
    }
}

/// Parse the `names` entry of the exported model metadata, a
/// `{0: 'person', 1: 'bicycle', ...}` map written by the exporter.
///
/// Indices must be dense and ascending from zero; anything else falls back
/// to the built-in table by returning `None`.
pub fn parse_names_metadata(raw: &str) -> Option<Vec<String>> {
    let inner = raw.trim().strip_prefix('{')?.strip_suffix('}')?;

    let mut names = Vec::new();
    for entry in inner.split(',') {
        let (index, name) = entry.split_once(':')?;
        let index: usize = index.trim().parse().ok()?;
        if index != names.len() {
            return None;
        }
        let name = name.trim().trim_matches(|c| c == '\'' || c == '"');
        names.push(name.to_string());
    }

    if names.is_empty() { None } else { Some(names) }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_coco_table_boundaries() {
        assert_eq!(COCO_NAMES.len(), 80);
        assert_eq!(COCO_NAMES[0], "person");
        assert_eq!(COCO_NAMES[79], "toothbrush");
    }

    #[test]
    fn test_class_name_falls_back_to_coco() {
        assert_eq!(class_name(None, 16), "dog");
        assert_eq!(class_name(None, 200), "unknown");
    }

    #[test]
    fn test_class_name_prefers_embedded_names() {
        let names = vec!["crack".to_string(), "pothole".to_string()];

        assert_eq!(class_name(Some(&names), 1), "pothole");
        assert_eq!(class_name(Some(&names), 5), "unknown");
    }

    #[test]
    fn test_parse_names_metadata() {
        let names = parse_names_metadata("{0: 'person', 1: 'bicycle', 2: 'car'}")
            .expect("well-formed map should parse");

        assert_eq!(names, vec!["person", "bicycle", "car"]);
    }

    #[test]
    fn test_parse_names_metadata_rejects_sparse_maps() {
        assert!(parse_names_metadata("{0: 'person', 2: 'car'}").is_none());
    }

    #[test]
    fn test_parse_names_metadata_rejects_garbage() {
        assert!(parse_names_metadata("person, bicycle").is_none());
        assert!(parse_names_metadata("{}").is_none());
        assert!(parse_names_metadata("{person}").is_none());
    }
}
