use crate::error::{AnnotatorError, Result};
use log::debug;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

pub const DEFAULT_CONFIG_PATH: &str = "constants.yaml";
const PREDICTIONS_DIR: &str = "predictions";

/// Which prediction artifacts are written besides the COCO file.
#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
pub struct YoloResults {
    pub save_image: bool,
    pub save_annotation: bool,
    #[serde(default)]
    pub save_confidence: bool,
}

/// Detector thresholds. Defaults match the usual YOLO predict settings.
#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct InferenceSettings {
    pub confidence: f32,
    pub iou: f32,
    pub image_size: u32,
    pub max_detections: usize,
}

impl Default for InferenceSettings {
    fn default() -> Self {
        InferenceSettings {
            confidence: 0.25,
            iou: 0.7,
            image_size: 640,
            max_detections: 300,
        }
    }
}

impl InferenceSettings {
    fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.confidence) {
            return Err(AnnotatorError::Config(format!(
                "inference.confidence must be in [0, 1], got {}",
                self.confidence
            )));
        }
        if !(0.0..=1.0).contains(&self.iou) {
            return Err(AnnotatorError::Config(format!(
                "inference.iou must be in [0, 1], got {}",
                self.iou
            )));
        }
        if self.image_size == 0 || self.image_size % 32 != 0 {
            return Err(AnnotatorError::Config(format!(
                "inference.image_size must be a positive multiple of 32, got {}",
                self.image_size
            )));
        }
        if self.max_detections == 0 {
            return Err(AnnotatorError::Config(
                "inference.max_detections must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }
}

/// Everything read from the YAML configuration file.
#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct Config {
    pub model_path: PathBuf,
    pub images_path: PathBuf,
    #[serde(default)]
    pub save_annotations_path: Option<PathBuf>,
    pub labels: Vec<String>,
    pub yolo_results: YoloResults,
    #[serde(default)]
    pub inference: InferenceSettings,
}

/// Where each output of a run is written.
#[derive(Clone, Debug, PartialEq)]
pub struct OutputPaths {
    pub root: PathBuf,
    pub instances_json: PathBuf,
    pub images_dir: PathBuf,
    pub labels_dir: PathBuf,
}

impl OutputPaths {
    pub fn new(root: &Path) -> Self {
        let predictions = root.join(PREDICTIONS_DIR);
        OutputPaths {
            root: root.to_path_buf(),
            instances_json: root.join("instances.json"),
            images_dir: predictions.join("images"),
            labels_dir: predictions.join("annotations"),
        }
    }

    /// Creates only the directories whose output is enabled.
    pub fn create_dirs(&self, save_image: bool, save_txt: bool) -> Result<()> {
        if save_image && !self.images_dir.exists() {
            debug!("Creating {:?}", self.images_dir);
            fs::create_dir_all(&self.images_dir)?;
        }
        if save_txt && !self.labels_dir.exists() {
            debug!("Creating {:?}", self.labels_dir);
            fs::create_dir_all(&self.labels_dir)?;
        }
        Ok(())
    }
}

impl Config {
    pub fn from_yaml_file(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path).map_err(|e| {
            AnnotatorError::Config(format!("failed to read {:?}: {}", path, e))
        })?;
        Self::from_yaml_str(&text)
    }

    pub fn from_yaml_str(text: &str) -> Result<Self> {
        let raw: serde_yaml::Value = serde_yaml::from_str(text)?;
        if let Some(labels) = raw.get("labels") {
            let all_strings = labels
                .as_sequence()
                .is_some_and(|items| items.iter().all(|item| item.is_string()));
            if !all_strings {
                return Err(AnnotatorError::Config(format!(
                    "Incorrect labels format: {:?} should be a list of strings",
                    labels
                )));
            }
        }
        Ok(serde_yaml::from_value(raw)?)
    }

    /// Checks that every input path exists and works out where outputs go.
    ///
    /// Without `save_annotations_path` everything is written under the current directory.
    pub fn validate(&self) -> Result<OutputPaths> {
        if !self.model_path.exists() {
            return Err(AnnotatorError::PathNotFound(
                "Model path",
                self.model_path.clone(),
            ));
        }
        if !self.images_path.exists() {
            return Err(AnnotatorError::PathNotFound(
                "Images path",
                self.images_path.clone(),
            ));
        }
        if !self.images_path.is_dir() {
            return Err(AnnotatorError::Config(format!(
                "Images path {:?} is not a directory",
                self.images_path
            )));
        }
        let root = match &self.save_annotations_path {
            Some(path) if !path.exists() => {
                return Err(AnnotatorError::PathNotFound(
                    "Save annotations path",
                    path.clone(),
                ));
            }
            Some(path) => path.clone(),
            None => PathBuf::from("."),
        };
        self.inference.validate()?;
        Ok(OutputPaths::new(&root))
    }
}
