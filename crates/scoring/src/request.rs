use anyhow::Context;
use serde::Deserialize;

/// Request body accepted by the scoring entry point.
///
/// Exactly one field is recognized; anything else in the payload is ignored.
#[derive(Debug, Clone, Deserialize)]
pub struct ScoreRequest {
    pub image_url: String,
}

impl ScoreRequest {
    pub fn parse(raw_data: &str) -> anyhow::Result<Self> {
        serde_json::from_str(raw_data).context("invalid scoring request body")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_request_parses() {
        let request = ScoreRequest::parse(r#"{"image_url": "https://example.com/dog.jpg"}"#)
            .expect("valid body should parse");

        assert_eq!(request.image_url, "https://example.com/dog.jpg");
    }

    #[test]
    fn test_missing_image_url_is_an_error() {
        let result = ScoreRequest::parse(r#"{"url": "https://example.com/dog.jpg"}"#);

        assert!(result.is_err(), "body without image_url must not parse");
    }

    #[test]
    fn test_malformed_body_is_an_error() {
        let result = ScoreRequest::parse("image_url=dog.jpg");

        assert!(result.is_err(), "non-JSON body must not parse");
    }

    #[test]
    fn test_extra_fields_are_ignored() {
        let request =
            ScoreRequest::parse(r#"{"image_url": "dog.jpg", "threshold": 0.9, "batch": 4}"#)
                .expect("unknown fields should be tolerated");

        assert_eq!(request.image_url, "dog.jpg");
    }
}
