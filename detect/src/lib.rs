//! The inference program.

mod common;
pub mod detector;
pub mod input;

pub use detector::*;
pub use input::*;

use crate::common::*;
use indicatif::{ProgressBar, ProgressStyle};

/// One detected object.
#[derive(Debug, Clone, PartialEq)]
pub struct Detection {
    pub class_id: usize,
    /// The configured class name, or the class index when no name is configured.
    pub class_name: String,
    pub confidence: f64,
    /// Normalized box.
    pub rect: CyCxHW<f64>,
}

/// Detections of one image.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageReport {
    pub image: PathBuf,
    pub detections: Vec<Detection>,
}

/// The entry of inference program.
///
/// Runs `detector` on each of `images` in order and stops at the first failure.
pub fn start<D>(settings: &Settings, images: &[PathBuf], detector: &mut D) -> Result<Vec<ImageReport>>
where
    D: Detector + ?Sized,
{
    let model = &settings.inference.model;
    ensure!(model.exists(), "model not found: '{}'", model.display());

    info!("model: {}", model.display());
    info!("images: {}", images.len());
    info!("confidence threshold: {}", settings.inference.conf);

    let progress = ProgressBar::new(images.len() as u64);
    progress.set_style(
        ProgressStyle::default_bar().template("{msg} [{elapsed_precise}] {bar:40} {pos}/{len}")?,
    );
    progress.set_message("processing images");

    let reports = images
        .iter()
        .map(|image| {
            let labels = detector
                .detect(image)
                .with_context(|| format!("inference failed on '{}'", image.display()))?;
            progress.inc(1);

            let detections = labels
                .into_iter()
                .map(|DetectionLabel { label, confidence }| Detection {
                    class_id: label.class,
                    class_name: class_name(settings, label.class),
                    confidence,
                    rect: label.rect,
                })
                .collect();

            Ok(ImageReport {
                image: image.clone(),
                detections,
            })
        })
        .collect::<Result<Vec<_>>>()?;
    progress.finish_and_clear();

    info!("inference completed");
    Ok(reports)
}

fn class_name(settings: &Settings, class_id: usize) -> String {
    settings
        .names
        .get(&class_id)
        .cloned()
        .unwrap_or_else(|| class_id.to_string())
}
