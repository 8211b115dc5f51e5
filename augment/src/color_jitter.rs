//! Photometric transforms. Labels are left untouched.

use crate::{common::*, pipeline::Transform, sample::Sample, warp::to_u8};

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BrightnessContrastInit {
    /// Maximum brightness offset as a fraction of the full intensity range.
    pub brightness_limit: R64,
    /// Maximum deviation of the contrast factor from 1.
    pub contrast_limit: R64,
}

impl Default for BrightnessContrastInit {
    fn default() -> Self {
        Self {
            brightness_limit: r64(0.2),
            contrast_limit: r64(0.2),
        }
    }
}

impl BrightnessContrastInit {
    pub fn build(self) -> Result<BrightnessContrast> {
        let Self {
            brightness_limit,
            contrast_limit,
        } = self;
        ensure!(brightness_limit >= 0.0, "brightness_limit must be non-negative");
        ensure!(contrast_limit >= 0.0, "contrast_limit must be non-negative");

        Ok(BrightnessContrast {
            brightness_limit: brightness_limit.raw(),
            contrast_limit: contrast_limit.raw(),
        })
    }
}

/// Scales pixel intensities by a random contrast factor and adds a random offset.
#[derive(Debug, Clone)]
pub struct BrightnessContrast {
    brightness_limit: f64,
    contrast_limit: f64,
}

impl Transform for BrightnessContrast {
    fn name(&self) -> &'static str {
        "brightness_contrast"
    }

    fn forward(&self, mut sample: Sample, rng: &mut StdRng) -> Result<Sample> {
        let alpha = 1.0 + rng.gen_range(-self.contrast_limit..=self.contrast_limit);
        let beta = rng.gen_range(-self.brightness_limit..=self.brightness_limit) * 255.0;

        sample.image.pixels_mut().for_each(|pixel| {
            pixel
                .0
                .iter_mut()
                .for_each(|value| *value = to_u8(*value as f64 * alpha + beta));
        });
        Ok(sample)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ColorJitterInit {
    pub brightness: Option<R64>,
    pub contrast: Option<R64>,
    pub saturation: Option<R64>,
    /// Maximum hue rotation as a fraction of a full turn, at most 0.5.
    pub hue: Option<R64>,
}

impl Default for ColorJitterInit {
    fn default() -> Self {
        Self {
            brightness: Some(r64(0.2)),
            contrast: Some(r64(0.2)),
            saturation: Some(r64(0.2)),
            hue: Some(r64(0.2)),
        }
    }
}

impl ColorJitterInit {
    pub fn build(self) -> Result<ColorJitter> {
        let Self {
            brightness,
            contrast,
            saturation,
            hue,
        } = self;

        [
            ("brightness", brightness),
            ("contrast", contrast),
            ("saturation", saturation),
            ("hue", hue),
        ]
        .iter()
        .try_for_each(|&(name, value)| -> Result<_> {
            if let Some(value) = value {
                ensure!(value >= 0.0, "{} must be non-negative", name);
            }
            Ok(())
        })?;
        if let Some(hue) = hue {
            ensure!(hue <= 0.5, "hue must not exceed 0.5");
        }

        Ok(ColorJitter {
            max_brightness_shift: brightness.map(R64::raw),
            max_contrast_shift: contrast.map(R64::raw),
            max_saturation_shift: saturation.map(R64::raw),
            max_hue_shift: hue.map(R64::raw),
        })
    }
}

/// Random brightness, contrast, saturation and hue distortion.
#[derive(Debug, Clone)]
pub struct ColorJitter {
    max_brightness_shift: Option<f64>,
    max_contrast_shift: Option<f64>,
    max_saturation_shift: Option<f64>,
    max_hue_shift: Option<f64>,
}

impl Transform for ColorJitter {
    fn name(&self) -> &'static str {
        "color_jitter"
    }

    fn forward(&self, mut sample: Sample, rng: &mut StdRng) -> Result<Sample> {
        let mut factor = |max_shift: Option<f64>| {
            max_shift.map(|max_shift| 1.0 + rng.gen_range(-max_shift..=max_shift))
        };
        let brightness = factor(self.max_brightness_shift);
        let contrast = factor(self.max_contrast_shift);
        let saturation = factor(self.max_saturation_shift);
        let hue_shift = self
            .max_hue_shift
            .map(|max_shift| rng.gen_range(-max_shift..=max_shift));

        let mut rgb: Vec<[f64; 3]> = sample
            .image
            .pixels()
            .map(|pixel| {
                let rgb = pixel.0.map(|value| value as f64 / 255.0);
                match brightness {
                    Some(brightness) => rgb.map(|value| (value * brightness).min(1.0)),
                    None => rgb,
                }
            })
            .collect();

        if let Some(contrast) = contrast {
            let mean = if rgb.is_empty() {
                0.0
            } else {
                rgb.iter().map(|&pixel| gray(pixel)).sum::<f64>() / rgb.len() as f64
            };
            rgb.iter_mut().for_each(|pixel| {
                *pixel = pixel.map(|value| blend(value, mean, contrast));
            });
        }

        if let Some(saturation) = saturation {
            rgb.iter_mut().for_each(|pixel| {
                let gray = gray(*pixel);
                *pixel = pixel.map(|value| blend(value, gray, saturation));
            });
        }

        if let Some(hue_shift) = hue_shift {
            rgb.iter_mut().for_each(|pixel| {
                let [hue, saturation, value] = rgb_to_hsv(*pixel);
                *pixel = hsv_to_rgb([(hue + hue_shift).rem_euclid(1.0), saturation, value]);
            });
        }

        sample
            .image
            .pixels_mut()
            .zip(rgb)
            .for_each(|(pixel, rgb)| pixel.0 = rgb.map(|value| to_u8(value * 255.0)));
        Ok(sample)
    }
}

fn gray([r, g, b]: [f64; 3]) -> f64 {
    0.299 * r + 0.587 * g + 0.114 * b
}

/// `factor` = 0 yields `base`, 1 keeps `value`.
fn blend(value: f64, base: f64, factor: f64) -> f64 {
    ((value - base) * factor + base).max(0.0).min(1.0)
}

/// Converts RGB within `[0, 1]` to HSV with hue as a fraction of a turn.
pub fn rgb_to_hsv([r, g, b]: [f64; 3]) -> [f64; 3] {
    let max = r.max(g).max(b);
    let min = r.min(g).min(b);
    let delta = max - min;

    let hue = if delta <= 0.0 {
        0.0
    } else if max == r {
        ((g - b) / delta).rem_euclid(6.0) / 6.0
    } else if max == g {
        ((b - r) / delta + 2.0) / 6.0
    } else {
        ((r - g) / delta + 4.0) / 6.0
    };
    let saturation = if max <= 0.0 { 0.0 } else { delta / max };

    [hue, saturation, max]
}

pub fn hsv_to_rgb([hue, saturation, value]: [f64; 3]) -> [f64; 3] {
    let sector = hue.rem_euclid(1.0) * 6.0;
    let chroma = value * saturation;
    let x = chroma * (1.0 - (sector.rem_euclid(2.0) - 1.0).abs());
    let m = value - chroma;

    let [r, g, b] = match sector as u32 {
        0 => [chroma, x, 0.0],
        1 => [x, chroma, 0.0],
        2 => [0.0, chroma, x],
        3 => [0.0, x, chroma],
        4 => [x, 0.0, chroma],
        _ => [chroma, 0.0, x],
    };
    [r + m, g + m, b + m]
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn hsv_round_trip() {
        [
            [1.0, 0.0, 0.0],
            [0.2, 0.4, 0.6],
            [0.9, 0.9, 0.1],
            [0.5, 0.5, 0.5],
            [0.0, 0.0, 0.0],
        ]
        .iter()
        .for_each(|&rgb| {
            let back = hsv_to_rgb(rgb_to_hsv(rgb));
            rgb.iter()
                .zip(back.iter())
                .for_each(|(&lhs, &rhs)| assert_abs_diff_eq!(lhs, rhs, epsilon = 1e-9));
        });
    }

    #[test]
    fn jitter_keeps_labels_and_size() {
        let image = RgbImage::from_fn(5, 3, |x, y| Rgb([(x * 50) as u8, (y * 100) as u8, 128]));
        let labels = vec![YoloLabel {
            rect: CyCxHW::try_from_cycxhw([0.5, 0.5, 0.2, 0.2]).unwrap(),
            class: 0,
        }];
        let input = Sample::new(image, labels);
        let mut rng = StdRng::seed_from_u64(7);

        let jitter = ColorJitterInit::default().build().unwrap();
        let output = jitter.forward(input.clone(), &mut rng).unwrap();
        assert_eq!(output.image.dimensions(), input.image.dimensions());
        assert_eq!(output.labels, input.labels);

        let bc = BrightnessContrastInit::default().build().unwrap();
        let output = bc.forward(input.clone(), &mut rng).unwrap();
        assert_eq!(output.labels, input.labels);
    }

    #[test]
    fn zero_jitter_is_identity() {
        let image = RgbImage::from_fn(4, 4, |x, y| Rgb([(x * 60) as u8, (y * 60) as u8, 30]));
        let input = Sample::new(image, vec![]);
        let mut rng = StdRng::seed_from_u64(1);

        let bc = BrightnessContrastInit {
            brightness_limit: r64(0.0),
            contrast_limit: r64(0.0),
        }
        .build()
        .unwrap();
        assert_eq!(bc.forward(input.clone(), &mut rng).unwrap(), input);
    }
}
