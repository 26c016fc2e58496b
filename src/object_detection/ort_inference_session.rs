use crate::error::{AnnotatorError, Result};
use log::debug;
use ndarray::ArrayD;
use ort::session::{Session, builder::GraphOptimizationLevel};
use ort::value::TensorRef;
use std::path::Path;

/// An onnxruntime inference session.
///
/// All of the object detection classes in this project are just wrappers
/// around an ONNX inference session that handles running the model on
/// hardware.
pub struct OrtInferenceSession {
    session: Session,
}

impl OrtInferenceSession {
    pub fn new(model_path: &Path) -> Result<Self> {
        debug!("Creating ONNX Runtime session for {:?}", model_path);
        let session = Session::builder()
            .map_err(|e| AnnotatorError::ModelLoad(e.to_string()))?
            .with_optimization_level(GraphOptimizationLevel::Level3)
            .map_err(|e| AnnotatorError::ModelLoad(e.to_string()))?
            .commit_from_file(model_path)
            .map_err(|e| {
                AnnotatorError::ModelLoad(format!("Failed to load {:?}: {}", model_path, e))
            })?;
        Ok(Self { session })
    }

    /// Runs the model on a single input tensor and returns an owned copy of its first output.
    pub fn run(&mut self, input: &ArrayD<f32>) -> Result<ArrayD<f32>> {
        let tensor_ref = TensorRef::from_array_view(input)
            .map_err(|e| AnnotatorError::Inference(e.to_string()))?;
        let outputs = self
            .session
            .run(ort::inputs![tensor_ref])
            .map_err(|e| AnnotatorError::Inference(e.to_string()))?;
        let output = outputs[0]
            .try_extract_array::<f32>()
            .map_err(|e| AnnotatorError::Inference(e.to_string()))?
            .into_owned();
        Ok(output)
    }
}
