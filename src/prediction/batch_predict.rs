use crate::annotations::coco::CocoDocument;
use crate::annotations::oriented_bounding_box::{BoundingBoxGeometry, OrientedBoundingBox};
use crate::config::{Config, OutputPaths};
use crate::error::Result;
use crate::image_utils::drawing::draw_oriented_detections;
use crate::image_utils::image_io::{list_images, read_image_as_rgb8};
use crate::object_detection::object_detection_model::ObjectDetectionModel;
use crate::object_detection::yolov11_oriented_bounding_box::Yolov11OrientedBoundingBox;
use crate::prediction::label_txt::write_label_txt;
use log::{debug, info, warn};
use std::path::Path;

/// Runs the whole batch described by `config` and returns the document that was written.
pub fn run(config: &Config) -> Result<CocoDocument> {
    let outputs = config.validate()?;
    outputs.create_dirs(
        config.yolo_results.save_image,
        config.yolo_results.save_annotation,
    )?;

    debug!("Loading model from {:?}", config.model_path);
    let mut model = Yolov11OrientedBoundingBox::new(&config.model_path, config.inference.clone())?;

    predict_directory(&mut model, config, &outputs)
}

/// Predicts every image in the configured directory, one at a time, and writes the outputs.
pub fn predict_directory<M: ObjectDetectionModel<OrientedBoundingBox>>(
    model: &mut M,
    config: &Config,
    outputs: &OutputPaths,
) -> Result<CocoDocument> {
    debug!("Loading images from {:?}", config.images_path);
    let image_paths = list_images(&config.images_path)?;
    debug!("Found {} images", image_paths.len());

    debug!("Predicting on images");
    let mut document = CocoDocument::new(&config.labels);
    for image_path in &image_paths {
        let file_name = file_name_of(image_path);
        let mut image = read_image_as_rgb8(image_path)?;
        let (width, height) = image.dimensions();
        let detections = model.run_inference(&image)?;
        debug!("{}: {} detections", file_name, detections.len());

        for det in &detections {
            if det.annotation.category_id() >= config.labels.len() {
                warn!(
                    "{}: class {} has no label ({} labels configured)",
                    file_name,
                    det.annotation.category_id(),
                    config.labels.len()
                );
            }
        }

        if config.yolo_results.save_annotation {
            let txt_path = outputs.labels_dir.join(format!("{}.txt", file_stem_of(image_path)));
            write_label_txt(
                &txt_path,
                &detections,
                width,
                height,
                config.yolo_results.save_confidence,
            )?;
        }
        if config.yolo_results.save_image {
            draw_oriented_detections(&mut image, &detections);
            image.save(outputs.images_dir.join(&file_name))?;
        }

        document.push_image(&file_name, width, height, &detections);
    }

    debug!("Saving results");
    document.write_json(&outputs.instances_json)?;
    info!(
        "Wrote {} images and {} annotations to {:?}",
        document.images.len(),
        document.annotations.len(),
        outputs.instances_json
    );
    Ok(document)
}

fn file_name_of(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default()
}

fn file_stem_of(path: &Path) -> String {
    path.file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_default()
}
