//! The dataset descriptor handed to the external trainer.

use crate::common::*;

/// Augmented training images relative to the dataset root.
pub const AUGMENTED_TRAIN_IMAGES: &str = "relabel_aug/train/images";
/// File name of the generated descriptor under the dataset root.
pub const DYNAMIC_CONFIG_FILE: &str = "config_dynamic.yaml";

/// Returns true if augmented training images exist under `base_path`.
///
/// Any directory entry counts. The directory content is not validated.
pub fn select_training_source<P>(base_path: P) -> bool
where
    P: AsRef<Path>,
{
    has_entries(&base_path.as_ref().join(AUGMENTED_TRAIN_IMAGES))
}

/// The dataset description in the format the external trainer reads.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatasetDescriptor {
    /// The dataset root. Other paths are relative to it.
    pub path: PathBuf,
    pub train: String,
    pub val: String,
    pub names: IndexMap<usize, String>,
}

impl DatasetDescriptor {
    /// Picks the augmented training images if [select_training_source] finds
    /// any, or the raw ones otherwise.
    pub fn from_settings(settings: &Settings) -> Self {
        let train = if select_training_source(&settings.base_path) {
            info!("using augmented training data");
            settings.augmented_train_path.clone()
        } else {
            warn!("using raw training data (no augmentation found)");
            settings.raw_train_path.clone()
        };

        Self {
            path: settings.base_path.clone(),
            train,
            val: settings.val_path.clone(),
            names: settings.names.clone(),
        }
    }

    /// Writes the descriptor as YAML, replacing any existing file.
    pub fn save<P>(&self, path: P) -> Result<()>
    where
        P: AsRef<Path>,
    {
        let path = path.as_ref();
        let text = serde_yaml::to_string(self)?;
        fs::write(path, text)
            .with_context(|| format!("failed to write dataset config '{}'", path.display()))?;
        Ok(())
    }
}

/// Builds the descriptor and saves it to `<base_path>/config_dynamic.yaml`.
pub fn create_dynamic_config(settings: &Settings) -> Result<PathBuf> {
    let descriptor = DatasetDescriptor::from_settings(settings);
    let path = settings.base_path.join(DYNAMIC_CONFIG_FILE);
    descriptor.save(&path)?;
    info!("dataset config created: {}", path.display());
    Ok(path)
}

fn has_entries(dir: &Path) -> bool {
    fs::read_dir(dir)
        .map(|mut entries| entries.next().is_some())
        .unwrap_or(false)
}
