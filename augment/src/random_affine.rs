//! Geometric transforms. Each one moves the labels along with the pixels.

use crate::{common::*, pipeline::Transform, sample::Sample, warp::warp_affine};
use settings::{MAX_ROTATION_DEGREES, MAX_SCALE_LIMIT, MAX_SHIFT_LIMIT};

/// Mirrors the image and its labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Flip {
    Horizontal,
    Vertical,
}

impl Transform for Flip {
    fn name(&self) -> &'static str {
        match self {
            Self::Horizontal => "horizontal_flip",
            Self::Vertical => "vertical_flip",
        }
    }

    fn forward(&self, mut sample: Sample, _rng: &mut StdRng) -> Result<Sample> {
        let (image, affine) = match self {
            Self::Horizontal => (imageops::flip_horizontal(&sample.image), Affine::hflip(1.0)),
            Self::Vertical => (imageops::flip_vertical(&sample.image), Affine::vflip(1.0)),
        };
        sample.image = image;
        sample.map_labels(&affine);
        Ok(sample)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RandomRotateInit {
    /// Maximum rotation angle in degrees.
    pub max_degrees: R64,
}

impl RandomRotateInit {
    pub fn build(self) -> Result<RandomRotate> {
        let Self { max_degrees } = self;
        ensure!(
            max_degrees >= 0.0 && max_degrees <= MAX_ROTATION_DEGREES,
            "max_degrees must be within [0, {}], but get {}",
            MAX_ROTATION_DEGREES,
            max_degrees
        );

        Ok(RandomRotate {
            max_degrees: max_degrees.raw(),
        })
    }
}

/// Rotates about the image center by a uniformly sampled angle.
#[derive(Debug, Clone)]
pub struct RandomRotate {
    max_degrees: f64,
}

impl Transform for RandomRotate {
    fn name(&self) -> &'static str {
        "rotate"
    }

    fn forward(&self, sample: Sample, rng: &mut StdRng) -> Result<Sample> {
        let angle = rng.gen_range(-self.max_degrees..=self.max_degrees);
        let (height, width) = (sample.height() as f64, sample.width() as f64);
        let affine = Affine::rotate_degrees(angle).about(height / 2.0, width / 2.0);
        apply_pixel_affine(sample, &affine)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ShiftScaleRotateInit {
    /// Maximum shift as a fraction of the image height and width.
    pub shift_limit: R64,
    /// Maximum deviation of the scaling factor from 1.
    pub scale_limit: R64,
    /// Maximum rotation angle in degrees.
    pub rotate_limit: R64,
}

impl ShiftScaleRotateInit {
    pub fn build(self) -> Result<ShiftScaleRotate> {
        let Self {
            shift_limit,
            scale_limit,
            rotate_limit,
        } = self;

        ensure!(
            shift_limit >= 0.0 && shift_limit <= MAX_SHIFT_LIMIT,
            "shift_limit must be within [0, {}], but get {}",
            MAX_SHIFT_LIMIT,
            shift_limit
        );
        ensure!(
            scale_limit >= 0.0 && scale_limit < MAX_SCALE_LIMIT,
            "scale_limit must be within [0, {}), but get {}",
            MAX_SCALE_LIMIT,
            scale_limit
        );
        ensure!(
            rotate_limit >= 0.0 && rotate_limit <= MAX_ROTATION_DEGREES,
            "rotate_limit must be within [0, {}], but get {}",
            MAX_ROTATION_DEGREES,
            rotate_limit
        );

        Ok(ShiftScaleRotate {
            shift_limit: shift_limit.raw(),
            scale_limit: scale_limit.raw(),
            rotate_limit: rotate_limit.raw(),
        })
    }
}

/// Random rotation and scaling about the center followed by a random shift.
#[derive(Debug, Clone)]
pub struct ShiftScaleRotate {
    shift_limit: f64,
    scale_limit: f64,
    rotate_limit: f64,
}

impl Transform for ShiftScaleRotate {
    fn name(&self) -> &'static str {
        "shift_scale_rotate"
    }

    fn forward(&self, sample: Sample, rng: &mut StdRng) -> Result<Sample> {
        let angle = rng.gen_range(-self.rotate_limit..=self.rotate_limit);
        let scale = 1.0 + rng.gen_range(-self.scale_limit..=self.scale_limit);
        let dy = rng.gen_range(-self.shift_limit..=self.shift_limit);
        let dx = rng.gen_range(-self.shift_limit..=self.shift_limit);

        let (height, width) = (sample.height() as f64, sample.width() as f64);
        let affine = Affine::rotate_degrees(angle)
            .then(&Affine::scale(scale, scale))
            .about(height / 2.0, width / 2.0)
            .then(&Affine::translate(dy * height, dx * width));
        apply_pixel_affine(sample, &affine)
    }
}

/// Warps the image by `affine`, given in pixel units, and moves the labels to match.
fn apply_pixel_affine(mut sample: Sample, affine: &Affine<f64>) -> Result<Sample> {
    let (height, width) = (sample.height() as f64, sample.width() as f64);
    ensure!(height > 0.0 && width > 0.0, "the image is empty");

    sample.image = warp_affine(&sample.image, affine)?;

    let normalized = Affine::scale(height, width)
        .then(affine)
        .then(&Affine::scale(1.0 / height, 1.0 / width));
    sample.map_labels(&normalized);
    Ok(sample)
}
