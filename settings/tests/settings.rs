use anyhow::Result;
use noisy_float::prelude::*;
use settings::{InferenceOverrides, Settings, TrainingOverrides};
use std::{fs, num::NonZeroUsize, path::PathBuf};
use tempfile::TempDir;

const FULL_CONFIG: &str = r#"
base_path: /data/bottles
input_dir: relabel
augment_dir: relabel_aug
augmentation:
  aug_per_image: 3
  horizontal_flip: 0.5
  vertical_flip: 0.1
  rotation_limit: 10
  brightness_contrast: 0.3
  blur: 0.1
  shift_limit: 0.05
  scale_limit: 0.1
augmented_train_path: relabel_aug/train/images
raw_train_path: relabel/train/images
val_path: relabel/val/images
names:
  0: light_blue
  2: others
  1: dark_blue
training:
  model: yolov8n.pt
  epochs: 50
  imgsz: 320
  batch: 16
  device: cpu
  project: runs/bsort
  name: exp1
inference:
  model: weights/best.pt
  conf: 0.4
  image_dir: unseen
wandb:
  enabled: false
  project: bsort
  entity: team
"#;

#[test]
fn load_full_config() -> Result<()> {
    let dir = TempDir::new()?;
    let path = dir.path().join("settings.yaml");
    fs::write(&path, FULL_CONFIG)?;

    let settings = Settings::open(&path)?;
    assert_eq!(settings.base_path, PathBuf::from("/data/bottles"));
    assert_eq!(settings.augmentation.aug_per_image.get(), 3);
    assert_eq!(settings.augmentation.horizontal_flip, 0.5);
    assert_eq!(settings.training.model, "yolov8n.pt");
    assert_eq!(settings.training.batch, NonZeroUsize::new(16));
    assert_eq!(settings.training.device(), Some("cpu"));
    assert_eq!(settings.training.project.as_deref(), Some("runs/bsort"));
    assert_eq!(settings.inference.conf, 0.4);
    assert!(!settings.wandb.enabled);
    assert_eq!(settings.wandb.entity.as_deref(), Some("team"));

    // class names keep their file order
    let names: Vec<_> = settings.names.iter().map(|(&k, v)| (k, v.as_str())).collect();
    assert_eq!(
        names,
        vec![(0, "light_blue"), (2, "others"), (1, "dark_blue")]
    );
    Ok(())
}

#[test]
fn missing_keys_use_defaults() -> Result<()> {
    let settings = Settings::from_yaml_str("base_path: data\n")?;
    assert_eq!(settings.base_path, PathBuf::from("data"));
    assert_eq!(settings.input_dir, PathBuf::from("relabel"));
    assert_eq!(settings.augment_dir, PathBuf::from("relabel_aug"));
    assert_eq!(settings.augmentation.aug_per_image.get(), 5);
    assert_eq!(settings.augmentation.horizontal_flip, 0.0);
    assert_eq!(settings.augmentation.seed, None);
    assert_eq!(settings.raw_train_path, "relabel/train/images");
    assert_eq!(settings.training.model, "yolov9t.pt");
    assert_eq!(settings.training.epochs.get(), 100);
    assert_eq!(settings.training.imgsz.get(), 640);
    assert_eq!(settings.training.batch, None);
    assert_eq!(settings.training.device(), None);
    assert_eq!(
        settings.inference.model,
        PathBuf::from("runs/detect/train/weights/best.pt")
    );
    assert_eq!(settings.inference.conf, 0.25);
    assert!(settings.wandb.enabled);
    assert_eq!(settings.wandb.project, "bsort-yolo");
    assert_eq!(settings.yolo_bin, PathBuf::from("yolo"));
    assert!(settings.names.is_empty());

    assert_eq!(Settings::from_yaml_str("")?, Settings::default());
    Ok(())
}

#[test]
fn auto_batch_size() -> Result<()> {
    let settings = Settings::from_yaml_str("training:\n  batch: -1\n")?;
    assert_eq!(settings.training.batch, None);
    Ok(())
}

#[test]
fn reject_invalid_values() {
    for text in [
        "augmentation:\n  horizontal_flip: 1.5\n",
        "augmentation:\n  blur: -0.1\n",
        "augmentation:\n  rotation_limit: -5\n",
        "augmentation:\n  scale_limit: 1.0\n",
        "augmentation:\n  rotation_limit: 1.0e308\n",
        "augmentation:\n  rotation_limit: 181\n",
        "augmentation:\n  shift_limit: 1.5\n",
        "augmentation:\n  aug_per_image: 0\n",
        "inference:\n  conf: 2.0\n",
        "training:\n  epochs: 0\n",
        "base_path: [unclosed\n",
    ] {
        assert!(
            Settings::from_yaml_str(text).is_err(),
            "'{}' should be rejected",
            text
        );
    }
}

#[test]
fn missing_config_file() {
    let dir = TempDir::new().unwrap();
    assert!(Settings::open(dir.path().join("missing.yaml")).is_err());
}

#[test]
fn split_directories() {
    let settings = Settings::from_yaml_str("base_path: data\n").unwrap();
    let input = settings.input_split_dirs("val");
    assert_eq!(input.images, PathBuf::from("data/relabel/val/images"));
    assert_eq!(input.labels, PathBuf::from("data/relabel/val/labels"));

    let output = settings.augment_split_dirs("train");
    assert_eq!(output.images, PathBuf::from("data/relabel_aug/train/images"));
    assert_eq!(output.labels, PathBuf::from("data/relabel_aug/train/labels"));
}

#[test]
fn command_line_overrides() -> Result<()> {
    let mut settings = Settings::from_yaml_str("training:\n  batch: 8\n  device: '0'\n")?;

    TrainingOverrides {
        epochs: NonZeroUsize::new(3),
        device: Some("cpu".into()),
        batch: Some(-1),
        imgsz: None,
    }
    .apply(&mut settings)?;
    assert_eq!(settings.training.epochs.get(), 3);
    assert_eq!(settings.training.device(), Some("cpu"));
    assert_eq!(settings.training.batch, None);
    assert_eq!(settings.training.imgsz.get(), 640);

    InferenceOverrides {
        model: Some(PathBuf::from("last.pt")),
        conf: Some(r64(0.6)),
    }
    .apply(&mut settings)?;
    assert_eq!(settings.inference.model, PathBuf::from("last.pt"));
    assert_eq!(settings.inference.conf, 0.6);

    let result = InferenceOverrides {
        model: None,
        conf: Some(r64(1.5)),
    }
    .apply(&mut settings);
    assert!(result.is_err());
    Ok(())
}

#[test]
fn zero_confidence_keeps_configured_threshold() -> Result<()> {
    let mut settings = Settings::from_yaml_str("inference:\n  conf: 0.4\n")?;
    InferenceOverrides {
        model: None,
        conf: Some(r64(0.0)),
    }
    .apply(&mut settings)?;
    assert_eq!(settings.inference.conf, 0.4);
    Ok(())
}

#[test]
fn training_overrides_are_validated() -> Result<()> {
    let mut settings = Settings::default();
    TrainingOverrides::default().apply(&mut settings)?;
    assert_eq!(settings, Settings::default());

    // a section that became invalid after loading is reported by the override pass
    settings.augmentation.rotation_limit = r64(1.0e308);
    let result = TrainingOverrides {
        epochs: NonZeroUsize::new(1),
        ..Default::default()
    }
    .apply(&mut settings);
    assert!(result.is_err());
    Ok(())
}

#[test]
fn load_sample_config() -> Result<()> {
    let path = concat!(env!("CARGO_MANIFEST_DIR"), "/../settings.yaml");
    let settings = Settings::open(path)?;
    assert_eq!(settings.augmentation.aug_per_image.get(), 5);
    assert_eq!(settings.training.batch, None);
    assert_eq!(settings.training.device(), None);
    assert_eq!(
        settings.names.values().collect::<Vec<_>>(),
        ["light_blue", "dark_blue", "others"]
    );
    Ok(())
}
