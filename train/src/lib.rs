//! The training program.
//!
//! The training loop itself belongs to the external detection framework.
//! This crate prepares the dataset descriptor, assembles the parameters,
//! keeps the experiment tracking session and hands everything to a [Trainer].

mod common;
pub mod dataset;
pub mod params;
pub mod session;
pub mod trainer;

pub use dataset::*;
pub use params::*;
pub use session::*;
pub use trainer::*;

use crate::common::*;

/// The entry of training program.
///
/// The tracking session is finished with the training outcome whether the
/// trainer succeeds or fails.
pub fn start<T>(settings: &Settings, trainer: &mut T) -> Result<()>
where
    T: Trainer + ?Sized,
{
    let data = create_dynamic_config(settings)?;
    let params = TrainParams::from_settings(settings, data);
    params.log_summary();

    let session = TrackingSession::start(settings, &params);

    info!("starting training");
    let result = trainer
        .train(&params, &session.env())
        .context("training failed");

    let status = if result.is_ok() {
        SessionStatus::Succeeded
    } else {
        SessionStatus::Failed
    };
    if let Err(err) = session.finish(status) {
        warn!("unable to save the tracking session: {:#}", err);
    }

    result?;
    info!("training completed successfully");
    Ok(())
}
