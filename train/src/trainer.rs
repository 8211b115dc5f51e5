use crate::{common::*, params::TrainParams};

/// Runs a training job described by [TrainParams].
pub trait Trainer {
    /// Trains to completion. `env` is added to the trainer's environment.
    fn train(&mut self, params: &TrainParams, env: &[(String, String)]) -> Result<()>;
}

/// Delegates training to the `yolo` command line program.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UltralyticsTrainer {
    program: PathBuf,
}

impl UltralyticsTrainer {
    pub fn new<P>(program: P) -> Self
    where
        P: Into<PathBuf>,
    {
        Self {
            program: program.into(),
        }
    }

    pub fn from_settings(settings: &Settings) -> Self {
        Self::new(&settings.yolo_bin)
    }

    /// The command that [Trainer::train] runs.
    pub fn command(&self, params: &TrainParams, env: &[(String, String)]) -> Command {
        let mut command = Command::new(&self.program);
        command
            .args(["detect", "train"])
            .args(params.args())
            .envs(env.iter().map(|(key, value)| (key, value)));
        command
    }
}

impl Trainer for UltralyticsTrainer {
    fn train(&mut self, params: &TrainParams, env: &[(String, String)]) -> Result<()> {
        let status = self
            .command(params, env)
            .status()
            .with_context(|| format!("failed to run '{}'", self.program.display()))?;
        ensure!(status.success(), "the trainer exited with {}", status);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn train_command_line() {
        let params = TrainParams::from_settings(&Settings::default(), "data.yaml".into());
        let env = vec![("WANDB_MODE".to_string(), "disabled".to_string())];
        let command = UltralyticsTrainer::new("yolo").command(&params, &env);

        assert_eq!(command.get_program(), "yolo");
        let args: Vec<_> = command
            .get_args()
            .map(|arg| arg.to_string_lossy().into_owned())
            .collect();
        assert_eq!(
            args,
            [
                "detect",
                "train",
                "data=data.yaml",
                "model=yolov9t.pt",
                "epochs=100",
                "imgsz=640"
            ]
        );
        let envs: Vec<_> = command.get_envs().collect();
        assert_eq!(envs.len(), 1);
    }

    #[test]
    fn missing_program_is_an_error() {
        let params = TrainParams::from_settings(&Settings::default(), "data.yaml".into());
        let mut trainer = UltralyticsTrainer::new("/nonexistent/yolo");
        assert!(trainer.train(&params, &[]).is_err());
    }
}
