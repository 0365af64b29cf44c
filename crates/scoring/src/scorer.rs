use std::sync::{Mutex, OnceLock};

use anyhow::Context;
use image::RgbImage;
use serde_json::Value;

use crate::backend::{InferenceBackend, InferenceOutput, ort::OrtBackend};
use crate::config::ScoringConfig;
use crate::fetch::fetch_image;
use crate::processing::post::{Detection, PostProcessor, TransformParams};
use crate::processing::pre::PreProcessor;
use crate::request::ScoreRequest;
use crate::serialization::serialize_detections;

/// The full detection pass over one image: preprocess, forward, postprocess.
pub struct Scorer<B: InferenceBackend> {
    backend: B,
    preprocessor: PreProcessor,
    postprocessor: PostProcessor,
}

impl Scorer<OrtBackend> {
    /// Load the model artifact named by the configuration.
    pub fn load(config: &ScoringConfig) -> anyhow::Result<Self> {
        let backend = OrtBackend::load_model(&config.model_path, config.device)
            .with_context(|| {
                format!("failed to load model from {}", config.model_path.display())
            })?;

        Ok(Self::new(backend, config))
    }
}

impl<B: InferenceBackend> Scorer<B> {
    pub fn new(backend: B, config: &ScoringConfig) -> Self {
        Self {
            backend,
            preprocessor: PreProcessor::new(config.input_size),
            postprocessor: PostProcessor::new(
                config.confidence_threshold,
                config.iou_threshold,
                config.max_detections,
            ),
        }
    }

    /// Run detection on a decoded image, returning detections in image pixels.
    pub fn score_image(&mut self, image: &RgbImage) -> anyhow::Result<Vec<Detection>> {
        let (width, height) = image.dimensions();

        let (input, scale, offset_x, offset_y) = self.preprocessor.preprocess(image)?;

        let InferenceOutput { preds } = {
            let _infer_span = tracing::info_span!("model_inference").entered();
            self.backend.infer(&input)?
        };

        let transform = TransformParams {
            orig_width: width,
            orig_height: height,
            scale,
            offset_x,
            offset_y,
        };

        let detections = self
            .postprocessor
            .parse_detections(&preds.view(), &transform)?;

        tracing::debug!(width, height, detections = detections.len(), "Image scored");

        Ok(detections)
    }

    pub fn class_names(&self) -> Option<&[String]> {
        self.backend.class_names()
    }
}

static SCORER: OnceLock<Mutex<Scorer<OrtBackend>>> = OnceLock::new();

/// Load the model into the process-wide handle.
///
/// Idempotent: once a model is loaded, later calls are no-ops and the handle
/// is never reloaded for the lifetime of the process.
pub fn init(config: &ScoringConfig) -> anyhow::Result<()> {
    if SCORER.get().is_some() {
        return Ok(());
    }

    let scorer = Scorer::load(config)?;

    // On a racing init the first loaded model stays
    let _ = SCORER.set(Mutex::new(scorer));

    Ok(())
}

/// Score one raw request body against the process-wide model.
///
/// Parses the body, resolves the image locator, runs the detection pass, and
/// returns the serialized detections. Every failure propagates to the caller;
/// there is no retry and no partial result.
pub async fn run(raw_data: &str) -> anyhow::Result<Value> {
    let scorer = SCORER
        .get()
        .context("model not initialized; call init() before run()")?;

    let request = ScoreRequest::parse(raw_data)?;
    let image = fetch_image(&request.image_url).await?;

    let mut scorer = scorer
        .lock()
        .map_err(|_| anyhow::anyhow!("scorer lock poisoned"))?;
    let detections = scorer.score_image(&image)?;

    serialize_detections(&detections, scorer.class_names())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_run_before_init_is_an_error() {
        let result = run(r#"{"image_url": "dog.jpg"}"#).await;

        assert!(result.is_err());
        assert!(
            result.unwrap_err().to_string().contains("not initialized"),
            "error should say the model is missing"
        );
    }

    #[test]
    fn test_init_with_missing_artifact_is_an_error() {
        let config = ScoringConfig::test_default();

        let result = init(&config);

        assert!(
            result.is_err(),
            "missing model artifact must abort initialization"
        );
    }
}
