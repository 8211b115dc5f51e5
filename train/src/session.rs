//! Experiment tracking session.

use crate::{common::*, params::TrainParams};

/// The environment variable that holds the tracking service credential.
pub const API_KEY_VAR: &str = "WANDB_API_KEY";
/// Where the trainer writes its runs unless a project is configured.
pub const DEFAULT_PROJECT_DIR: &str = "runs/detect";
/// Tags attached to every run.
pub const TAGS: [&str; 2] = ["yolo", "object-detection"];

const FILE_STRFTIME: &str = "%Y-%m-%d-%H-%M-%S.%3f%z";

/// The final state recorded for a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    Succeeded,
    Failed,
    /// The session was dropped without being finished.
    Aborted,
}

/// The run configuration reported to the tracking service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunConfig {
    pub model: String,
    pub epochs: usize,
    pub imgsz: usize,
    pub batch: i64,
    pub device: String,
}

impl From<&TrainParams> for RunConfig {
    fn from(params: &TrainParams) -> Self {
        Self {
            model: params.model.clone(),
            epochs: params.epochs.get(),
            imgsz: params.imgsz.get(),
            batch: params.batch_value(),
            device: params.device_name().to_owned(),
        }
    }
}

/// The record saved when a session ends.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionRecord {
    pub project: String,
    pub entity: Option<String>,
    pub name: Option<String>,
    pub tags: Vec<String>,
    pub config: RunConfig,
    pub started: DateTime<Local>,
    pub finished: DateTime<Local>,
    pub status: SessionStatus,
}

/// The experiment tracking session of one training run.
///
/// The session is created before training and ends exactly once, either by
/// [TrackingSession::finish] or when it is dropped.
#[derive(Debug)]
pub struct TrackingSession {
    run: Option<ActiveRun>,
}

#[derive(Debug)]
struct ActiveRun {
    project: String,
    entity: Option<String>,
    name: Option<String>,
    config: RunConfig,
    started: DateTime<Local>,
    record_dir: PathBuf,
}

impl TrackingSession {
    /// Starts a session using the API key from the environment.
    pub fn start(settings: &Settings, params: &TrainParams) -> Self {
        let api_key = env::var_os(API_KEY_VAR);
        Self::with_api_key(settings, params, api_key.as_deref())
    }

    /// Starts a session. Tracking stays off unless it is enabled and an API key is given.
    pub fn with_api_key(
        settings: &Settings,
        params: &TrainParams,
        api_key: Option<&OsStr>,
    ) -> Self {
        let wandb = &settings.wandb;

        if !wandb.enabled {
            return Self::disabled();
        }
        if api_key.map_or(true, |key| key.is_empty()) {
            warn!(
                "{} not found, experiment tracking is disabled. \
                 Get your API key from https://wandb.ai/authorize",
                API_KEY_VAR
            );
            return Self::disabled();
        }

        info!("experiment tracking enabled");
        info!("tracking project: {}", wandb.project);
        if let Some(entity) = &wandb.entity {
            info!("tracking entity: {}", entity);
        }

        let project_dir = settings
            .training
            .project
            .as_deref()
            .unwrap_or(DEFAULT_PROJECT_DIR);

        Self {
            run: Some(ActiveRun {
                project: wandb.project.clone(),
                entity: wandb.entity.clone(),
                name: wandb.name.clone(),
                config: params.into(),
                started: Local::now(),
                record_dir: Path::new(project_dir).join("sessions"),
            }),
        }
    }

    pub fn disabled() -> Self {
        Self { run: None }
    }

    pub fn is_active(&self) -> bool {
        self.run.is_some()
    }

    /// Environment variables that carry the run identity to the trainer.
    pub fn env(&self) -> Vec<(String, String)> {
        let run = match &self.run {
            Some(run) => run,
            None => return vec![("WANDB_MODE".into(), "disabled".into())],
        };

        let mut vars = vec![
            ("WANDB_MODE".into(), "online".into()),
            ("WANDB_PROJECT".into(), run.project.clone()),
            ("WANDB_TAGS".into(), TAGS.join(",")),
        ];
        if let Some(entity) = &run.entity {
            vars.push(("WANDB_ENTITY".into(), entity.clone()));
        }
        if let Some(name) = &run.name {
            vars.push(("WANDB_NAME".into(), name.clone()));
        }
        vars
    }

    /// Ends the session and returns the path of the saved record, if tracking was active.
    pub fn finish(mut self, status: SessionStatus) -> Result<Option<PathBuf>> {
        match self.run.take() {
            Some(run) => run.save(status).map(Some),
            None => Ok(None),
        }
    }
}

impl Drop for TrackingSession {
    fn drop(&mut self) {
        if let Some(run) = self.run.take() {
            if let Err(err) = run.save(SessionStatus::Aborted) {
                warn!("unable to save the tracking session: {:#}", err);
            }
        }
    }
}

impl ActiveRun {
    fn save(self, status: SessionStatus) -> Result<PathBuf> {
        let Self {
            project,
            entity,
            name,
            config,
            started,
            record_dir,
        } = self;

        fs::create_dir_all(&record_dir)
            .with_context(|| format!("failed to create '{}'", record_dir.display()))?;
        let path = record_dir.join(format!("{}.json", started.format(FILE_STRFTIME)));

        let record = SessionRecord {
            project,
            entity,
            name,
            tags: TAGS.iter().map(|tag| tag.to_string()).collect(),
            config,
            started,
            finished: Local::now(),
            status,
        };
        let text = serde_json::to_string_pretty(&record)?;
        fs::write(&path, text)
            .with_context(|| format!("failed to write '{}'", path.display()))?;

        info!("tracking session saved to {}", path.display());
        Ok(path)
    }
}
