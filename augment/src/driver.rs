//! The augmentation program.

use crate::{
    common::*,
    pipeline::{Pipeline, PipelineInit},
    sample::Sample,
};
use indicatif::{ProgressBar, ProgressStyle};
use settings::{Settings, SplitDirs};

/// The only source image extension that is picked up.
pub const IMAGE_EXTENSION: &str = "jpg";
/// The label file extension.
pub const LABEL_EXTENSION: &str = "txt";

/// Outcome of an augmentation run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AugmentReport {
    /// The output directory already had `existing` entries and nothing was done.
    Skipped { existing: usize },
    Completed(AugmentSummary),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AugmentSummary {
    /// Number of source images found.
    pub sources: usize,
    /// Number of augmented images written, each with a label file.
    pub written: usize,
    /// Source images that could not be decoded.
    pub unreadable: usize,
    /// Augmentation iterations that failed.
    pub failed: usize,
    pub output_dir: PathBuf,
}

/// Augments the `split` of the raw dataset into the augmented dataset.
///
/// If the output images directory is not empty the run is skipped unless
/// `force` is set, in which case all previous outputs of the split are
/// deleted first.
pub fn start(settings: &Settings, split: &str, force: bool) -> Result<AugmentReport> {
    let input = settings.input_split_dirs(split);
    let output = settings.augment_split_dirs(split);
    let n_aug = settings.augmentation.aug_per_image.get();

    fs::create_dir_all(&output.images)
        .with_context(|| format!("failed to create '{}'", output.images.display()))?;
    fs::create_dir_all(&output.labels)
        .with_context(|| format!("failed to create '{}'", output.labels.display()))?;

    // at most once unless forced
    let existing = fs::read_dir(&output.images)?.count();
    if existing > 0 {
        if !force {
            info!(
                "augmented images already exist ({} files), use --force to re-augment",
                existing
            );
            return Ok(AugmentReport::Skipped { existing });
        }

        info!("removing existing augmented images");
        remove_files(&output.images)?;
        remove_files(&output.labels)?;
    }

    let pipeline = PipelineInit::from(&settings.augmentation).build()?;
    debug!("augmentation pipeline: {}", pipeline.describe());

    let images = discover_images(&input.images)?;
    ensure!(
        !images.is_empty(),
        "no images found in '{}'",
        input.images.display()
    );

    info!("processing {} images", images.len());
    info!("augmentations per image: {}", n_aug);
    info!("total output images: {}", images.len() * n_aug);

    let mut rng = match settings.augmentation.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    let progress = ProgressBar::new(images.len() as u64);
    progress.set_style(
        ProgressStyle::default_bar().template("{msg} [{elapsed_precise}] {bar:40} {pos}/{len}")?,
    );
    progress.set_message(format!("augmenting {}", split));

    let mut summary = AugmentSummary {
        sources: images.len(),
        written: 0,
        unreadable: 0,
        failed: 0,
        output_dir: settings.base_path.join(&settings.augment_dir).join(split),
    };

    for image_path in &images {
        progress.inc(1);
        let stem = file_stem(image_path)?;

        let image = match image::open(image_path) {
            Ok(image) => image.to_rgb8(),
            Err(err) => {
                warn!("could not read '{}': {}", image_path.display(), err);
                summary.unreadable += 1;
                continue;
            }
        };

        let label_path = input
            .labels
            .join(format!("{}.{}", stem, LABEL_EXTENSION));
        let labels = label::decode(&label_path)?;
        let source = Sample::new(image, labels);

        for index in 0..n_aug {
            match augment_one(&pipeline, &source, &mut rng, &output, &stem, index) {
                Ok(()) => summary.written += 1,
                Err(err) => {
                    warn!(
                        "augmentation failed for '{}' (aug {}): {:#}",
                        image_path.display(),
                        index,
                        err
                    );
                    summary.failed += 1;
                }
            }
        }
    }
    progress.finish_and_clear();

    info!(
        "augmentation completed: {} images written, {} unreadable, {} failed",
        summary.written, summary.unreadable, summary.failed
    );
    info!("output directory: {}", summary.output_dir.display());

    Ok(AugmentReport::Completed(summary))
}

/// Lists `*.jpg` files directly inside `dir`, sorted by path.
///
/// A missing directory yields no images.
pub fn discover_images(dir: &Path) -> Result<Vec<PathBuf>> {
    let dir_str = dir
        .to_str()
        .ok_or_else(|| format_err!("non-UTF-8 path '{}'", dir.display()))?;
    let pattern = Path::new(&glob::Pattern::escape(dir_str))
        .join(format!("*.{}", IMAGE_EXTENSION));
    let pattern = pattern
        .to_str()
        .ok_or_else(|| format_err!("non-UTF-8 path '{}'", pattern.display()))?;

    let mut images: Vec<PathBuf> = glob::glob(pattern)?
        .filter_map(|entry| match entry {
            Ok(path) => path.is_file().then(|| path),
            Err(err) => {
                warn!("skip unreadable entry: {}", err);
                None
            }
        })
        .collect();
    images.sort();
    Ok(images)
}

/// Output file name of the `index`-th variant of the image named `stem`.
pub fn augmented_name(stem: &str, index: usize, extension: &str) -> String {
    format!("{}_aug{}.{}", stem, index, extension)
}

fn augment_one(
    pipeline: &Pipeline,
    source: &Sample,
    rng: &mut StdRng,
    output: &SplitDirs,
    stem: &str,
    index: usize,
) -> Result<()> {
    let Sample { image, labels } = pipeline.apply(source, rng)?;

    let image_path = output
        .images
        .join(augmented_name(stem, index, IMAGE_EXTENSION));
    image
        .save(&image_path)
        .with_context(|| format!("failed to write '{}'", image_path.display()))?;

    let label_path = output
        .labels
        .join(augmented_name(stem, index, LABEL_EXTENSION));
    label::encode(&label_path, &labels)?;
    Ok(())
}

/// Deletes the regular files in `dir`. Sub-directories are kept.
fn remove_files(dir: &Path) -> Result<()> {
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        if !entry.file_type()?.is_dir() {
            fs::remove_file(entry.path())
                .with_context(|| format!("failed to remove '{}'", entry.path().display()))?;
        }
    }
    Ok(())
}

fn file_stem(path: &Path) -> Result<String> {
    let stem = path
        .file_stem()
        .ok_or_else(|| format_err!("'{}' has no file name", path.display()))?;
    Ok(stem.to_string_lossy().into_owned())
}
