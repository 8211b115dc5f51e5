use crate::common::*;

/// Where the external detector writes its runs.
pub const PREDICT_PROJECT: &str = "runs/detect";
/// The run name under [PREDICT_PROJECT]. Annotated images are kept here.
pub const PREDICT_NAME: &str = "predict";

/// Finds objects in one image.
pub trait Detector {
    fn detect(&mut self, image: &Path) -> Result<Vec<DetectionLabel>>;
}

/// Delegates detection to the `yolo` command line program.
///
/// The program is asked to write its detections as label files with
/// confidence scores, which are read back after each run.
#[derive(Debug, Clone, PartialEq)]
pub struct UltralyticsDetector {
    pub program: PathBuf,
    pub model: PathBuf,
    pub conf: R64,
    /// Keep annotated images under `runs/detect/predict`.
    pub save: bool,
    /// Let the detector display annotated images.
    pub show: bool,
    pub project: PathBuf,
}

impl UltralyticsDetector {
    pub fn from_settings(settings: &Settings, save: bool, show: bool) -> Self {
        Self {
            program: settings.yolo_bin.clone(),
            model: settings.inference.model.clone(),
            conf: settings.inference.conf,
            save,
            show,
            project: PathBuf::from(PREDICT_PROJECT),
        }
    }

    pub fn output_dir(&self) -> PathBuf {
        self.project.join(PREDICT_NAME)
    }

    /// The label file the detector writes for `image`.
    pub fn labels_path(&self, image: &Path) -> Result<PathBuf> {
        let stem = image
            .file_stem()
            .ok_or_else(|| format_err!("'{}' has no file name", image.display()))?;
        let mut file_name = stem.to_owned();
        file_name.push(".txt");
        Ok(self.output_dir().join("labels").join(file_name))
    }

    /// The command that [Detector::detect] runs on `image`.
    pub fn command(&self, image: &Path) -> Command {
        let mut command = Command::new(&self.program);
        command
            .args(["detect", "predict"])
            .arg(format!("model={}", self.model.display()))
            .arg(format!("source={}", image.display()))
            .arg(format!("conf={}", self.conf))
            .arg("save_txt=True")
            .arg("save_conf=True")
            .arg(format!("save={}", py_bool(self.save)))
            .arg(format!("show={}", py_bool(self.show)))
            .arg(format!("project={}", self.project.display()))
            .arg(format!("name={}", PREDICT_NAME))
            .arg("exist_ok=True");
        command
    }
}

impl Detector for UltralyticsDetector {
    fn detect(&mut self, image: &Path) -> Result<Vec<DetectionLabel>> {
        // the detector appends to existing label files
        let labels_path = self.labels_path(image)?;
        if labels_path.exists() {
            fs::remove_file(&labels_path)
                .with_context(|| format!("failed to remove '{}'", labels_path.display()))?;
        }

        let output = self
            .command(image)
            .output()
            .with_context(|| format!("failed to run '{}'", self.program.display()))?;
        if !output.status.success() {
            bail!(
                "the detector exited with {}: {}",
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            );
        }

        // no file means no detections
        Ok(label::decode_detections(&labels_path)?)
    }
}

fn py_bool(value: bool) -> &'static str {
    if value {
        "True"
    } else {
        "False"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn predict_command_line() {
        let detector = UltralyticsDetector::from_settings(&Settings::default(), true, false);
        let args: Vec<_> = detector
            .command(Path::new("unseen/a.jpg"))
            .get_args()
            .map(|arg| arg.to_string_lossy().into_owned())
            .collect();
        assert_eq!(
            args,
            [
                "detect",
                "predict",
                "model=runs/detect/train/weights/best.pt",
                "source=unseen/a.jpg",
                "conf=0.25",
                "save_txt=True",
                "save_conf=True",
                "save=True",
                "show=False",
                "project=runs/detect",
                "name=predict",
                "exist_ok=True"
            ]
        );
    }

    #[test]
    fn labels_follow_image_stem() {
        let detector = UltralyticsDetector::from_settings(&Settings::default(), false, false);
        let path = detector.labels_path(Path::new("unseen/a.b.jpg")).unwrap();
        assert_eq!(path, Path::new("runs/detect/predict/labels/a.b.txt"));
    }
}
