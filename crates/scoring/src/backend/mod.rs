use std::path::Path;

use ndarray::{Array, IxDyn};

pub mod ort;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecutionProvider {
    Cpu,
    Cuda,
}

pub trait InferenceBackend {
    fn load_model(path: &Path, provider: ExecutionProvider) -> anyhow::Result<Self>
    where
        Self: Sized;

    /// Run a forward pass on a preprocessed `[1, 3, H, W]` input.
    fn infer(&mut self, images: &Array<f32, IxDyn>) -> anyhow::Result<InferenceOutput>;

    /// Class names carried by the model artifact, when it has any.
    fn class_names(&self) -> Option<&[String]> {
        None
    }
}

pub struct InferenceOutput {
    pub preds: ndarray::ArrayD<f32>, // [1, 4 + num_classes, num_anchors] cxcywh + class scores
}
