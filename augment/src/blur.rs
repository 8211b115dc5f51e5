use crate::{
    common::*,
    pipeline::Transform,
    sample::Sample,
    warp::{reflect_101, to_u8},
};

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BoxBlurInit {
    pub kernel_size: u32,
}

impl Default for BoxBlurInit {
    fn default() -> Self {
        Self { kernel_size: 3 }
    }
}

impl BoxBlurInit {
    pub fn build(self) -> Result<BoxBlur> {
        let Self { kernel_size } = self;
        ensure!(
            kernel_size % 2 == 1,
            "kernel_size must be a positive odd number, but get {}",
            kernel_size
        );
        Ok(BoxBlur { kernel_size })
    }
}

/// Mean filter over a square window.
#[derive(Debug, Clone)]
pub struct BoxBlur {
    kernel_size: u32,
}

impl Transform for BoxBlur {
    fn name(&self) -> &'static str {
        "blur"
    }

    fn forward(&self, mut sample: Sample, _rng: &mut StdRng) -> Result<Sample> {
        let radius = (self.kernel_size / 2) as i64;
        let horizontal = box_filter(&sample.image, radius, [0, 1]);
        sample.image = box_filter(&horizontal, radius, [1, 0]);
        Ok(sample)
    }
}

/// One-dimensional mean filter along the `[dy, dx]` direction.
fn box_filter(image: &RgbImage, radius: i64, [dy, dx]: [i64; 2]) -> RgbImage {
    let (width, height) = image.dimensions();
    let window = (2 * radius + 1) as f64;

    RgbImage::from_fn(width, height, |col, row| {
        let mut sum = [0.0; 3];
        (-radius..=radius).for_each(|offset| {
            let r = reflect_101(row as i64 + offset * dy, height as i64) as u32;
            let c = reflect_101(col as i64 + offset * dx, width as i64) as u32;
            let pixel = image.get_pixel(c, r).0;
            sum.iter_mut()
                .zip(pixel.iter())
                .for_each(|(acc, &value)| *acc += value as f64);
        });
        Rgb(sum.map(|value| to_u8(value / window)))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blur_flat_image_is_unchanged() {
        let image = RgbImage::from_pixel(6, 4, Rgb([10, 20, 30]));
        let input = Sample::new(image, vec![]);
        let mut rng = StdRng::seed_from_u64(0);
        let blur = BoxBlurInit::default().build().unwrap();
        assert_eq!(blur.forward(input.clone(), &mut rng).unwrap(), input);
    }

    #[test]
    fn blur_averages_neighbors() {
        let mut image = RgbImage::from_pixel(3, 3, Rgb([0, 0, 0]));
        image.put_pixel(1, 1, Rgb([90, 90, 90]));
        let mut rng = StdRng::seed_from_u64(0);
        let blur = BoxBlurInit::default().build().unwrap();
        let output = blur.forward(Sample::new(image, vec![]), &mut rng).unwrap();
        assert_eq!(output.image.get_pixel(1, 1), &Rgb([10, 10, 10]));
    }

    #[test]
    fn reject_even_kernel() {
        assert!(BoxBlurInit { kernel_size: 4 }.build().is_err());
    }
}
