use std::env;
use std::path::PathBuf;

use anyhow::Context;

use crate::backend::ExecutionProvider;

pub use common::Environment;

/// Environment variable injected by the hosting platform, pointing at the
/// directory that holds the model artifact.
pub const MODEL_DIR_ENV: &str = "AZUREML_MODEL_DIR";

/// Fixed filename of the model artifact inside the model directory. The
/// artifact is produced and versioned outside this repository.
pub const MODEL_FILENAME: &str = "best.onnx";

pub const DEFAULT_INPUT_SIZE: (u32, u32) = (640, 640);

#[derive(Debug, Clone)]
pub struct ScoringConfig {
    pub environment: Environment,
    pub model_path: PathBuf,
    pub input_size: (u32, u32),
    pub confidence_threshold: f32,
    pub iou_threshold: f32,
    pub max_detections: usize,
    pub device: ExecutionProvider,
}

impl ScoringConfig {
    /// Load configuration from environment variables.
    ///
    /// The model directory is mandatory and missing it aborts startup; the
    /// remaining settings fall back to defaults.
    pub fn from_env() -> anyhow::Result<Self> {
        let environment = Environment::from_env();

        let model_dir =
            env::var(MODEL_DIR_ENV).with_context(|| format!("{MODEL_DIR_ENV} is not set"))?;
        let model_path = PathBuf::from(model_dir).join(MODEL_FILENAME);

        let input_width = env::var("INPUT_WIDTH")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(DEFAULT_INPUT_SIZE.0);

        let input_height = env::var("INPUT_HEIGHT")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(DEFAULT_INPUT_SIZE.1);

        let confidence_threshold = env::var("CONFIDENCE_THRESHOLD")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(0.25);

        let iou_threshold = env::var("IOU_THRESHOLD")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(0.45);

        let max_detections = env::var("MAX_DETECTIONS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(300);

        let device = match env::var("DEVICE")
            .unwrap_or_else(|_| "cpu".to_string())
            .to_lowercase()
            .as_str()
        {
            "cuda" | "gpu" => ExecutionProvider::Cuda,
            _ => ExecutionProvider::Cpu,
        };

        Ok(Self {
            environment,
            model_path,
            input_size: (input_width, input_height),
            confidence_threshold,
            iou_threshold,
            max_detections,
            device,
        })
    }

    /// Create default configuration for testing
    #[cfg(test)]
    pub fn test_default() -> Self {
        Self {
            environment: Environment::Development,
            model_path: PathBuf::from("/models/best.onnx"),
            input_size: DEFAULT_INPUT_SIZE,
            confidence_threshold: 0.25,
            iou_threshold: 0.45,
            max_detections: 300,
            device: ExecutionProvider::Cpu,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    #[serial]
    fn test_missing_model_dir_is_fatal() {
        unsafe { env::remove_var(MODEL_DIR_ENV) };

        let result = ScoringConfig::from_env();

        assert!(result.is_err(), "unset model dir must abort configuration");
        assert!(
            result.unwrap_err().to_string().contains(MODEL_DIR_ENV),
            "error should name the missing variable"
        );
    }

    #[test]
    #[serial]
    fn test_model_path_joins_dir_and_fixed_filename() {
        unsafe { env::set_var(MODEL_DIR_ENV, "/var/azureml/models") };

        let config = ScoringConfig::from_env().unwrap();

        assert_eq!(
            config.model_path,
            PathBuf::from("/var/azureml/models/best.onnx")
        );
        assert_eq!(config.input_size, DEFAULT_INPUT_SIZE);
        assert_eq!(config.max_detections, 300);

        unsafe { env::remove_var(MODEL_DIR_ENV) };
    }
}
