use crate::common::*;

/// The parameters of one training run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrainParams {
    /// The dataset descriptor file.
    pub data: PathBuf,
    pub model: String,
    pub epochs: NonZeroUsize,
    pub imgsz: NonZeroUsize,
    /// `None` lets the trainer pick the batch size.
    pub batch: Option<NonZeroUsize>,
    /// `None` lets the trainer pick the device.
    pub device: Option<String>,
    pub project: Option<String>,
    pub name: Option<String>,
}

impl TrainParams {
    pub fn from_settings(settings: &Settings, data: PathBuf) -> Self {
        let training = &settings.training;

        Self {
            data,
            model: training.model.clone(),
            epochs: training.epochs,
            imgsz: training.imgsz,
            batch: training.batch,
            device: training.device().map(str::to_owned),
            project: training.project.clone(),
            name: training.name.clone(),
        }
    }

    /// The batch size as the trainer's config value, where `-1` means auto.
    pub fn batch_value(&self) -> i64 {
        self.batch.map(|batch| batch.get() as i64).unwrap_or(-1)
    }

    /// The device name, or `auto`.
    pub fn device_name(&self) -> &str {
        self.device.as_deref().unwrap_or("auto")
    }

    /// `key=value` arguments in the external trainer's syntax.
    ///
    /// Unset batch size and device are left out.
    pub fn args(&self) -> Vec<String> {
        let mut args = vec![
            format!("data={}", self.data.display()),
            format!("model={}", self.model),
            format!("epochs={}", self.epochs),
            format!("imgsz={}", self.imgsz),
        ];
        if let Some(batch) = self.batch {
            args.push(format!("batch={}", batch));
        }
        if let Some(device) = &self.device {
            args.push(format!("device={}", device));
        }
        if let Some(project) = &self.project {
            args.push(format!("project={}", project));
        }
        if let Some(name) = &self.name {
            args.push(format!("name={}", name));
        }
        args
    }

    pub fn log_summary(&self) {
        info!("model: {}", self.model);
        info!("epochs: {}", self.epochs);
        info!("image size: {}", self.imgsz);
        match self.batch {
            Some(batch) => info!("batch size: {}", batch),
            None => info!("batch size: auto"),
        }
        info!("device: {}", self.device_name());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_args_leave_out_auto_values() {
        let params = TrainParams::from_settings(&Settings::default(), "data.yaml".into());
        assert_eq!(
            params.args(),
            ["data=data.yaml", "model=yolov9t.pt", "epochs=100", "imgsz=640"]
        );
        assert_eq!(params.batch_value(), -1);
        assert_eq!(params.device_name(), "auto");
    }

    #[test]
    fn explicit_values_are_passed() {
        let mut settings = Settings::default();
        settings.training.batch = NonZeroUsize::new(16);
        settings.training.device = "0".into();
        settings.training.project = Some("runs/sort".into());
        settings.training.name = Some("exp".into());

        let params = TrainParams::from_settings(&settings, "data.yaml".into());
        assert_eq!(
            &params.args()[4..],
            ["batch=16", "device=0", "project=runs/sort", "name=exp"]
        );
        assert_eq!(params.batch_value(), 16);
    }
}
