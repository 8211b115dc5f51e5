//! The composed augmentation pipeline.

use crate::{
    blur::BoxBlurInit,
    color_jitter::{BrightnessContrastInit, ColorJitterInit},
    common::*,
    random_affine::{Flip, RandomRotateInit, ShiftScaleRotateInit},
    sample::Sample,
};
use settings::AugmentationConfig;

/// Probability of the free rotation stage.
pub const ROTATE_PROB: f64 = 0.5;
/// Probability of the color jitter stage, which is always part of the pipeline.
pub const COLOR_JITTER_PROB: f64 = 0.2;
/// Probability of the shift-scale-rotate stage.
pub const SHIFT_SCALE_ROTATE_PROB: f64 = 0.5;
/// Rotation limit of the shift-scale-rotate stage in degrees.
pub const SHIFT_SCALE_ROTATE_DEGREES: f64 = 15.0;

/// A random transform on an image and its labels.
pub trait Transform: Debug {
    fn name(&self) -> &'static str;

    fn forward(&self, sample: Sample, rng: &mut StdRng) -> Result<Sample>;
}

#[derive(Debug)]
pub struct Stage {
    pub prob: f64,
    pub transform: Box<dyn Transform>,
}

/// Transforms applied in order, each with its own probability.
#[derive(Debug, Default)]
pub struct Pipeline {
    stages: Vec<Stage>,
}

impl Pipeline {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push<T>(&mut self, prob: f64, transform: T) -> Result<()>
    where
        T: Transform + 'static,
    {
        ensure!(
            (0.0..=1.0).contains(&prob),
            "the probability of {} must be within [0, 1], but get {}",
            transform.name(),
            prob
        );
        self.stages.push(Stage {
            prob,
            transform: Box::new(transform),
        });
        Ok(())
    }

    pub fn stages(&self) -> &[Stage] {
        &self.stages
    }

    /// Produces one random variant of `sample`.
    pub fn apply(&self, sample: &Sample, rng: &mut StdRng) -> Result<Sample> {
        self.stages
            .iter()
            .try_fold(sample.clone(), |sample, stage| {
                if !rng.gen_bool(stage.prob) {
                    return Ok(sample);
                }
                stage
                    .transform
                    .forward(sample, rng)
                    .with_context(|| format!("{} failed", stage.transform.name()))
            })
    }

    pub fn describe(&self) -> String {
        self.stages
            .iter()
            .map(|stage| format!("{}(p={:.2})", stage.transform.name(), stage.prob))
            .join(" -> ")
    }
}

/// Pipeline options taken from the augmentation section of the settings.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PipelineInit {
    pub horizontal_flip: R64,
    pub vertical_flip: R64,
    pub rotation_limit: R64,
    pub brightness_contrast: R64,
    pub blur: R64,
    pub shift_limit: R64,
    pub scale_limit: R64,
}

impl From<&AugmentationConfig> for PipelineInit {
    fn from(config: &AugmentationConfig) -> Self {
        Self {
            horizontal_flip: config.horizontal_flip,
            vertical_flip: config.vertical_flip,
            rotation_limit: config.rotation_limit,
            brightness_contrast: config.brightness_contrast,
            blur: config.blur,
            shift_limit: config.shift_limit,
            scale_limit: config.scale_limit,
        }
    }
}

impl PipelineInit {
    pub fn build(self) -> Result<Pipeline> {
        let Self {
            horizontal_flip,
            vertical_flip,
            rotation_limit,
            brightness_contrast,
            blur,
            shift_limit,
            scale_limit,
        } = self;

        let mut pipeline = Pipeline::new();
        pipeline.push(horizontal_flip.raw(), Flip::Horizontal)?;
        pipeline.push(vertical_flip.raw(), Flip::Vertical)?;
        pipeline.push(
            ROTATE_PROB,
            RandomRotateInit {
                max_degrees: rotation_limit,
            }
            .build()?,
        )?;
        pipeline.push(
            brightness_contrast.raw(),
            BrightnessContrastInit::default().build()?,
        )?;
        pipeline.push(blur.raw(), BoxBlurInit::default().build()?)?;
        pipeline.push(COLOR_JITTER_PROB, ColorJitterInit::default().build()?)?;
        pipeline.push(
            SHIFT_SCALE_ROTATE_PROB,
            ShiftScaleRotateInit {
                shift_limit,
                scale_limit,
                rotate_limit: r64(SHIFT_SCALE_ROTATE_DEGREES),
            }
            .build()?,
        )?;

        Ok(pipeline)
    }
}
