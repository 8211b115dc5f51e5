use anyhow::{bail, Result};
use std::{ffi::OsStr, fs, path::PathBuf};
use tempfile::TempDir;
use train::{SessionRecord, SessionStatus, TrackingSession, TrainParams, Trainer};

#[derive(Debug, Default)]
struct FakeTrainer {
    fail: bool,
    calls: Vec<(TrainParams, Vec<(String, String)>)>,
}

impl Trainer for FakeTrainer {
    fn train(&mut self, params: &TrainParams, env: &[(String, String)]) -> Result<()> {
        self.calls.push((params.clone(), env.to_vec()));
        if self.fail {
            bail!("out of memory");
        }
        Ok(())
    }
}

fn settings_in(dir: &TempDir) -> settings::Settings {
    let mut settings = settings::Settings::default();
    settings.base_path = dir.path().to_owned();
    settings.training.project = Some(dir.path().join("runs").to_string_lossy().into_owned());
    settings.wandb.enabled = false;
    settings
}

fn session_records(dir: &TempDir) -> Result<Vec<PathBuf>> {
    let sessions = dir.path().join("runs/sessions");
    if !sessions.exists() {
        return Ok(vec![]);
    }
    let mut paths: Vec<_> = fs::read_dir(sessions)?
        .map(|entry| -> Result<_> { Ok(entry?.path()) })
        .collect::<Result<_>>()?;
    paths.sort();
    Ok(paths)
}

#[test]
fn trainer_receives_descriptor_and_params() -> Result<()> {
    let dir = TempDir::new()?;
    let settings = settings_in(&dir);
    let mut trainer = FakeTrainer::default();

    train::start(&settings, &mut trainer)?;

    assert_eq!(trainer.calls.len(), 1);
    let (params, env) = &trainer.calls[0];
    assert_eq!(params.data, dir.path().join("config_dynamic.yaml"));
    assert!(params.data.is_file());
    assert_eq!(params.model, "yolov9t.pt");
    assert_eq!(env, &[("WANDB_MODE".to_string(), "disabled".to_string())]);
    Ok(())
}

#[test]
fn trainer_failure_is_propagated() -> Result<()> {
    let dir = TempDir::new()?;
    let settings = settings_in(&dir);
    let mut trainer = FakeTrainer {
        fail: true,
        ..Default::default()
    };

    let err = train::start(&settings, &mut trainer).unwrap_err();
    assert!(format!("{:#}", err).contains("out of memory"));
    Ok(())
}

#[test]
fn tracking_requires_api_key() -> Result<()> {
    let dir = TempDir::new()?;
    let mut settings = settings_in(&dir);
    settings.wandb.enabled = true;
    let params = TrainParams::from_settings(&settings, "data.yaml".into());

    let session = TrackingSession::with_api_key(&settings, &params, None);
    assert!(!session.is_active());
    assert_eq!(session.finish(SessionStatus::Succeeded)?, None);
    assert!(session_records(&dir)?.is_empty());
    Ok(())
}

#[test]
fn finished_session_is_recorded() -> Result<()> {
    let dir = TempDir::new()?;
    let mut settings = settings_in(&dir);
    settings.wandb.enabled = true;
    settings.wandb.entity = Some("lab".into());
    let params = TrainParams::from_settings(&settings, "data.yaml".into());

    let session = TrackingSession::with_api_key(&settings, &params, Some(OsStr::new("key")));
    assert!(session.is_active());
    let env = session.env();
    assert!(env.contains(&("WANDB_PROJECT".into(), "bsort-yolo".into())));
    assert!(env.contains(&("WANDB_ENTITY".into(), "lab".into())));
    assert!(env.contains(&("WANDB_MODE".into(), "online".into())));

    let path = session
        .finish(SessionStatus::Failed)?
        .expect("an active session saves a record");
    let record: SessionRecord = serde_json::from_str(&fs::read_to_string(&path)?)?;
    assert_eq!(record.status, SessionStatus::Failed);
    assert_eq!(record.tags, ["yolo", "object-detection"]);
    assert_eq!(record.config.batch, -1);
    assert_eq!(record.config.device, "auto");
    Ok(())
}

#[test]
fn dropped_session_is_recorded_as_aborted() -> Result<()> {
    let dir = TempDir::new()?;
    let mut settings = settings_in(&dir);
    settings.wandb.enabled = true;
    let params = TrainParams::from_settings(&settings, "data.yaml".into());

    drop(TrackingSession::with_api_key(
        &settings,
        &params,
        Some(OsStr::new("key")),
    ));

    let records = session_records(&dir)?;
    assert_eq!(records.len(), 1);
    let record: SessionRecord = serde_json::from_str(&fs::read_to_string(&records[0])?)?;
    assert_eq!(record.status, SessionStatus::Aborted);
    Ok(())
}
