use anyhow::{format_err, Result};
use augment::AugmentReport;
use clap::Parser;
use detect::{ImageReport, UltralyticsDetector};
use log::{info, LevelFilter};
use noisy_float::prelude::*;
use prettytable::{cell, row, Table};
use settings::{InferenceOverrides, Settings, TrainingOverrides};
use std::{
    env,
    num::NonZeroUsize,
    path::{Path, PathBuf},
};
use train::UltralyticsTrainer;

#[derive(Debug, Clone, Parser)]
#[clap(name = "bsort", about = "CLI tool for YOLO training and inference")]
enum Opts {
    /// Run data augmentation on training images.
    Augment {
        /// path to settings.yaml
        #[clap(short, long)]
        config: PathBuf,
        /// dataset split to augment
        #[clap(short, long, default_value = "train")]
        split: String,
        /// re-augment even if outputs exist
        #[clap(long)]
        force: bool,
    },
    /// Train YOLO model.
    Train {
        /// path to settings.yaml
        #[clap(short, long)]
        config: PathBuf,
        /// override epochs from config
        #[clap(short, long)]
        epochs: Option<NonZeroUsize>,
        /// device to use (e.g. 0, cpu)
        #[clap(short, long)]
        device: Option<String>,
        /// batch size, -1 for auto
        #[clap(short, long, allow_hyphen_values = true)]
        batch: Option<i64>,
        /// image size
        #[clap(long)]
        imgsz: Option<NonZeroUsize>,
    },
    /// Run inference on image(s).
    Infer {
        /// path to settings.yaml
        #[clap(short, long)]
        config: PathBuf,
        /// path to a single image file
        #[clap(short, long)]
        image: Option<PathBuf>,
        /// directory containing images
        #[clap(short, long)]
        dir: Option<PathBuf>,
        /// override model path from config
        #[clap(short, long)]
        model: Option<PathBuf>,
        /// confidence threshold, 0 keeps the configured value
        #[clap(long)]
        conf: Option<f64>,
        /// save annotated images to runs/detect/predict
        #[clap(long)]
        save: bool,
        /// display annotated images
        #[clap(long)]
        show: bool,
    },
}

fn main() -> Result<()> {
    init_logger();

    match Opts::parse() {
        Opts::Augment {
            config,
            split,
            force,
        } => {
            let settings = load_settings(&config)?;
            augment(&settings, &split, force)?;
        }
        Opts::Train {
            config,
            epochs,
            device,
            batch,
            imgsz,
        } => {
            let mut settings = load_settings(&config)?;
            TrainingOverrides {
                epochs,
                device,
                batch,
                imgsz,
            }
            .apply(&mut settings)?;

            let mut trainer = UltralyticsTrainer::from_settings(&settings);
            train::start(&settings, &mut trainer)?;
        }
        Opts::Infer {
            config,
            image,
            dir,
            model,
            conf,
            save,
            show,
        } => {
            let mut settings = load_settings(&config)?;
            let conf = conf
                .map(|conf| {
                    R64::try_new(conf).ok_or_else(|| format_err!("invalid confidence '{}'", conf))
                })
                .transpose()?;
            InferenceOverrides { model, conf }.apply(&mut settings)?;

            let images = detect::resolve_inputs(image.as_deref(), dir.as_deref(), &settings)?;
            let mut detector = UltralyticsDetector::from_settings(&settings, save, show);
            let reports = detect::start(&settings, &images, &mut detector)?;
            print_reports(&reports);

            if save {
                info!("results saved to {}", detector.output_dir().display());
            }
        }
    }

    Ok(())
}

/// Logs at INFO level unless RUST_LOG says otherwise.
fn init_logger() {
    let mut builder = pretty_env_logger::formatted_builder();
    match env::var("RUST_LOG") {
        Ok(filters) => builder.parse_filters(&filters),
        Err(_) => builder.filter_level(LevelFilter::Info),
    };
    builder.init();
}

fn load_settings(path: &Path) -> Result<Settings> {
    let settings = Settings::open(path)?;
    info!("loaded config: {}", path.display());
    Ok(settings)
}

fn augment(settings: &Settings, split: &str, force: bool) -> Result<()> {
    match augment::start(settings, split, force)? {
        AugmentReport::Skipped { existing } => {
            info!("skipped, {} augmented images already exist", existing);
        }
        AugmentReport::Completed(summary) => {
            let mut table = Table::new();
            table.add_row(row!["sources", "written", "unreadable", "failed", "output"]);
            table.add_row(row![
                summary.sources,
                summary.written,
                summary.unreadable,
                summary.failed,
                summary.output_dir.display()
            ]);
            table.printstd();
        }
    }
    Ok(())
}

fn print_reports(reports: &[ImageReport]) {
    let mut table = Table::new();
    table.add_row(row!["image", "class", "confidence"]);

    reports.iter().for_each(|report| {
        let file_name = report
            .image
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| format!("{}", report.image.display()));

        if report.detections.is_empty() {
            table.add_row(row![file_name, "no detections", ""]);
        }
        report.detections.iter().for_each(|detection| {
            table.add_row(row![
                file_name,
                detection.class_name,
                format!("{:.2}", detection.confidence)
            ]);
        });
    });

    table.printstd();
}
