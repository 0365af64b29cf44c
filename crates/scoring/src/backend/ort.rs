use std::path::Path;

use super::{ExecutionProvider, InferenceBackend, InferenceOutput};
use crate::labels::parse_names_metadata;
use ndarray::{Array, IxDyn};
use ort::{
    session::{Session, builder::GraphOptimizationLevel},
    value::TensorRef,
};

pub struct OrtBackend {
    session: Session,
    names: Option<Vec<String>>,
}

impl InferenceBackend for OrtBackend {
    fn load_model(path: &Path, provider: ExecutionProvider) -> anyhow::Result<Self> {
        // Initialize ORT environment (idempotent)
        let _ = ort::init().commit();

        #[allow(unused_mut)]
        let mut builder = Session::builder()?
            .with_optimization_level(GraphOptimizationLevel::Level3)?
            .with_intra_threads(4)?;

        match provider {
            ExecutionProvider::Cuda => {
                #[cfg(feature = "cuda")]
                {
                    tracing::info!("Initializing ONNX Runtime with CUDA execution provider");
                    builder = builder.with_execution_providers([
                        ort::execution_providers::CUDAExecutionProvider::default()
                            .with_device_id(0)
                            .build()
                            .error_on_failure(),
                    ])?;
                }
                #[cfg(not(feature = "cuda"))]
                anyhow::bail!("this build does not include CUDA support");
            }
            ExecutionProvider::Cpu => {
                tracing::info!("Initializing ONNX Runtime with CPU execution provider");
            }
        }

        let session = builder.commit_from_file(path)?;
        let names = read_class_names(&session);

        tracing::info!(
            path = %path.display(),
            embedded_names = names.is_some(),
            "Model loaded"
        );

        Ok(Self { session, names })
    }

    fn infer(&mut self, images: &Array<f32, IxDyn>) -> anyhow::Result<InferenceOutput> {
        let outputs = self.session.run(ort::inputs![
            "images" => TensorRef::from_array_view(images.view())?
        ])?;

        let preds = outputs["output0"].try_extract_array()?;

        Ok(InferenceOutput {
            preds: preds.into_owned(),
        })
    }

    fn class_names(&self) -> Option<&[String]> {
        self.names.as_deref()
    }
}

/// Read the class-name map the exporter writes into the model metadata.
fn read_class_names(session: &Session) -> Option<Vec<String>> {
    let metadata = session.metadata().ok()?;
    let raw = metadata.custom("names")?;
    parse_names_metadata(&raw)
}
