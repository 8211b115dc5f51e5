//! The configuration shared by the augmentation, training and inference programs.
//!
//! Every key is optional. Missing keys fall back to the defaults documented on
//! each field, and the whole structure is validated once when it is loaded.

mod common;

use crate::common::*;

pub use augmentation::*;
pub use inference::*;
pub use overrides::*;
pub use training::*;
pub use wandb::*;

/// The name of the images directory inside a split.
pub const IMAGES_DIR: &str = "images";
/// The name of the labels directory inside a split.
pub const LABELS_DIR: &str = "labels";
/// Upper bound of `augmentation.rotation_limit` in degrees.
pub const MAX_ROTATION_DEGREES: f64 = 180.0;
/// Upper bound of `augmentation.shift_limit` as a fraction of the image size.
pub const MAX_SHIFT_LIMIT: f64 = 1.0;
/// Exclusive upper bound of `augmentation.scale_limit`.
pub const MAX_SCALE_LIMIT: f64 = 1.0;

/// The main configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Root of the dataset. Defaults to `.`.
    pub base_path: PathBuf,
    /// Raw dataset directory relative to `base_path`. Defaults to `relabel`.
    pub input_dir: PathBuf,
    /// Augmented dataset directory relative to `base_path`. Defaults to `relabel_aug`.
    pub augment_dir: PathBuf,
    pub augmentation: AugmentationConfig,
    /// Training images used when augmented data exists. Defaults to `relabel_aug/train/images`.
    pub augmented_train_path: String,
    /// Training images used otherwise. Defaults to `relabel/train/images`.
    pub raw_train_path: String,
    /// Validation images. Defaults to `relabel/val/images`.
    pub val_path: String,
    /// Class index to class name mapping, kept in file order.
    pub names: IndexMap<usize, String>,
    pub training: TrainingConfig,
    pub inference: InferenceConfig,
    pub wandb: WandbConfig,
    /// The executable of the detection framework. Defaults to `yolo`.
    pub yolo_bin: PathBuf,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            base_path: PathBuf::from("."),
            input_dir: PathBuf::from("relabel"),
            augment_dir: PathBuf::from("relabel_aug"),
            augmentation: AugmentationConfig::default(),
            augmented_train_path: "relabel_aug/train/images".into(),
            raw_train_path: "relabel/train/images".into(),
            val_path: "relabel/val/images".into(),
            names: IndexMap::new(),
            training: TrainingConfig::default(),
            inference: InferenceConfig::default(),
            wandb: WandbConfig::default(),
            yolo_bin: PathBuf::from("yolo"),
        }
    }
}

/// The images and labels directories of a dataset split.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SplitDirs {
    pub images: PathBuf,
    pub labels: PathBuf,
}

impl SplitDirs {
    fn new(root: PathBuf) -> Self {
        Self {
            images: root.join(IMAGES_DIR),
            labels: root.join(LABELS_DIR),
        }
    }
}

impl Settings {
    pub fn open<P>(path: P) -> Result<Self>
    where
        P: AsRef<Path>,
    {
        let path = path.as_ref();
        let text = fs::read_to_string(path)
            .with_context(|| format!("failed to read config file '{}'", path.display()))?;
        Self::from_yaml_str(&text)
            .with_context(|| format!("invalid config file '{}'", path.display()))
    }

    pub fn from_yaml_str(text: &str) -> Result<Self> {
        let settings: Self = if text.trim().is_empty() {
            Self::default()
        } else {
            serde_yaml::from_str(text)?
        };
        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<()> {
        self.augmentation.validate()?;
        self.inference.validate()?;
        Ok(())
    }

    /// Directories of the raw `split`.
    pub fn input_split_dirs(&self, split: &str) -> SplitDirs {
        SplitDirs::new(self.base_path.join(&self.input_dir).join(split))
    }

    /// Directories where augmented samples of `split` are written.
    pub fn augment_split_dirs(&self, split: &str) -> SplitDirs {
        SplitDirs::new(self.base_path.join(&self.augment_dir).join(split))
    }
}

mod augmentation {
    use super::*;

    /// Augmentation options.
    ///
    /// Probabilities and limits default to zero, which disables the
    /// corresponding transform.
    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    #[serde(default)]
    pub struct AugmentationConfig {
        /// Number of augmented variants per source image. Defaults to 5.
        pub aug_per_image: NonZeroUsize,
        /// Probability of a horizontal flip.
        pub horizontal_flip: R64,
        /// Probability of a vertical flip.
        pub vertical_flip: R64,
        /// Maximum rotation in degrees.
        pub rotation_limit: R64,
        /// Probability of a random brightness and contrast change.
        pub brightness_contrast: R64,
        /// Probability of blurring.
        pub blur: R64,
        /// Maximum shift as a fraction of the image size.
        pub shift_limit: R64,
        /// Maximum scale change as a fraction of the image size.
        pub scale_limit: R64,
        /// Optional RNG seed for repeatable runs.
        pub seed: Option<u64>,
    }

    impl Default for AugmentationConfig {
        fn default() -> Self {
            Self {
                aug_per_image: NonZeroUsize::new(5).unwrap(),
                horizontal_flip: r64(0.0),
                vertical_flip: r64(0.0),
                rotation_limit: r64(0.0),
                brightness_contrast: r64(0.0),
                blur: r64(0.0),
                shift_limit: r64(0.0),
                scale_limit: r64(0.0),
                seed: None,
            }
        }
    }

    impl AugmentationConfig {
        pub fn validate(&self) -> Result<()> {
            [
                ("horizontal_flip", self.horizontal_flip),
                ("vertical_flip", self.vertical_flip),
                ("brightness_contrast", self.brightness_contrast),
                ("blur", self.blur),
            ]
            .iter()
            .try_for_each(|&(name, prob)| ensure_probability(name, prob))?;

            ensure_limit("rotation_limit", self.rotation_limit, MAX_ROTATION_DEGREES)?;
            ensure_limit("shift_limit", self.shift_limit, MAX_SHIFT_LIMIT)?;
            ensure_limit("scale_limit", self.scale_limit, MAX_SCALE_LIMIT)?;
            ensure!(
                self.scale_limit < MAX_SCALE_LIMIT,
                "augmentation.scale_limit must be less than {}, but get {}",
                MAX_SCALE_LIMIT,
                self.scale_limit
            );
            Ok(())
        }
    }
}

mod training {
    use super::*;

    /// Options passed to the external trainer.
    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    #[serde(default)]
    pub struct TrainingConfig {
        /// Model weights or architecture name. Defaults to `yolov9t.pt`.
        pub model: String,
        /// Defaults to 100.
        pub epochs: NonZeroUsize,
        /// Input image size. Defaults to 640.
        pub imgsz: NonZeroUsize,
        /// Batch size. `-1`, or any non-positive value, lets the trainer decide.
        #[serde(with = "batch_size")]
        pub batch: Option<NonZeroUsize>,
        /// Device identifier such as `0` or `cpu`. Empty lets the trainer decide.
        pub device: String,
        pub project: Option<String>,
        pub name: Option<String>,
    }

    impl Default for TrainingConfig {
        fn default() -> Self {
            Self {
                model: "yolov9t.pt".into(),
                epochs: NonZeroUsize::new(100).unwrap(),
                imgsz: NonZeroUsize::new(640).unwrap(),
                batch: None,
                device: String::new(),
                project: None,
                name: None,
            }
        }
    }

    impl TrainingConfig {
        pub fn device(&self) -> Option<&str> {
            let device = self.device.trim();
            (!device.is_empty()).then(|| device)
        }
    }

    /// Converts a signed batch size where non-positive values mean "auto".
    pub fn batch_from_i64(batch: i64) -> Option<NonZeroUsize> {
        usize::try_from(batch).ok().and_then(NonZeroUsize::new)
    }

    mod batch_size {
        use super::*;

        pub fn serialize<S>(batch: &Option<NonZeroUsize>, serializer: S) -> Result<S::Ok, S::Error>
        where
            S: Serializer,
        {
            match batch {
                Some(batch) => serializer.serialize_u64(batch.get() as u64),
                None => serializer.serialize_i64(-1),
            }
        }

        pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<NonZeroUsize>, D::Error>
        where
            D: Deserializer<'de>,
        {
            let batch = i64::deserialize(deserializer)?;
            Ok(batch_from_i64(batch))
        }
    }
}

mod inference {
    use super::*;

    /// Options of the inference program.
    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    #[serde(default)]
    pub struct InferenceConfig {
        /// Trained weights. Defaults to `runs/detect/train/weights/best.pt`.
        pub model: PathBuf,
        /// Confidence threshold. Defaults to 0.25.
        pub conf: R64,
        /// Images used when no input is given. Defaults to `unseen`.
        pub image_dir: PathBuf,
    }

    impl Default for InferenceConfig {
        fn default() -> Self {
            Self {
                model: PathBuf::from("runs/detect/train/weights/best.pt"),
                conf: r64(0.25),
                image_dir: PathBuf::from("unseen"),
            }
        }
    }

    impl InferenceConfig {
        pub fn validate(&self) -> Result<()> {
            ensure_probability("conf", self.conf)
        }
    }
}

mod wandb {
    use super::*;

    /// Experiment tracking options.
    #[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(default)]
    pub struct WandbConfig {
        /// Defaults to true. Tracking still stays off without an API key.
        pub enabled: bool,
        /// Defaults to `bsort-yolo`.
        pub project: String,
        pub entity: Option<String>,
        pub name: Option<String>,
    }

    impl Default for WandbConfig {
        fn default() -> Self {
            Self {
                enabled: true,
                project: "bsort-yolo".into(),
                entity: None,
                name: None,
            }
        }
    }
}

mod overrides {
    use super::*;

    /// Command line values that take precedence over the training section.
    #[derive(Debug, Clone, Default, PartialEq, Eq)]
    pub struct TrainingOverrides {
        pub epochs: Option<NonZeroUsize>,
        pub device: Option<String>,
        /// Signed like the config key: non-positive means auto, zero is ignored.
        pub batch: Option<i64>,
        pub imgsz: Option<NonZeroUsize>,
    }

    impl TrainingOverrides {
        pub fn apply(self, settings: &mut Settings) -> Result<()> {
            let Self {
                epochs,
                device,
                batch,
                imgsz,
            } = self;
            let training = &mut settings.training;

            if let Some(epochs) = epochs {
                training.epochs = epochs;
            }
            if let Some(device) = device.filter(|device| !device.is_empty()) {
                training.device = device;
            }
            if let Some(batch) = batch.filter(|&batch| batch != 0) {
                training.batch = batch_from_i64(batch);
            }
            if let Some(imgsz) = imgsz {
                training.imgsz = imgsz;
            }
            settings.validate()
        }
    }

    /// Command line values that take precedence over the inference section.
    #[derive(Debug, Clone, Default, PartialEq)]
    pub struct InferenceOverrides {
        pub model: Option<PathBuf>,
        /// Zero is ignored and keeps the configured threshold.
        pub conf: Option<R64>,
    }

    impl InferenceOverrides {
        pub fn apply(self, settings: &mut Settings) -> Result<()> {
            if let Some(model) = self.model {
                settings.inference.model = model;
            }
            if let Some(conf) = self.conf.filter(|&conf| conf != 0.0) {
                settings.inference.conf = conf;
            }
            settings.validate()
        }
    }
}

fn ensure_limit(name: &str, limit: R64, max: f64) -> Result<()> {
    ensure!(
        limit >= 0.0 && limit <= max,
        "augmentation.{} must be within [0, {}], but get {}",
        name,
        max,
        limit
    );
    Ok(())
}

fn ensure_probability(name: &str, prob: R64) -> Result<()> {
    ensure!(
        (0.0..=1.0).contains(&prob.raw()),
        "{} must be a probability within [0, 1], but get {}",
        name,
        prob
    );
    Ok(())
}
