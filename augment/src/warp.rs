//! Resampling helpers shared by the geometric transforms.

use crate::common::*;

/// Renders `image` through `affine`, given in pixel coordinates where the
/// image spans `[0, height] x [0, width]`.
///
/// The output keeps the input size. Pixels mapped from outside the source are
/// filled by mirroring the border without repeating the edge pixel.
pub fn warp_affine(image: &RgbImage, affine: &Affine<f64>) -> Result<RgbImage> {
    let inverse = affine.inverse()?;
    let (width, height) = image.dimensions();

    let output = RgbImage::from_fn(width, height, |col, row| {
        let [sy, sx] = inverse.apply([row as f64 + 0.5, col as f64 + 0.5]);
        sample_bilinear(image, sy - 0.5, sx - 0.5)
    });
    Ok(output)
}

/// Bilinear interpolation at fractional pixel indexes.
pub fn sample_bilinear(image: &RgbImage, y: f64, x: f64) -> Rgb<u8> {
    let (width, height) = image.dimensions();
    let y0 = y.floor();
    let x0 = x.floor();
    let fy = y - y0;
    let fx = x - x0;

    let y0 = y0 as i64;
    let x0 = x0 as i64;
    let pixel = |row: i64, col: i64| {
        let row = reflect_101(row, height as i64) as u32;
        let col = reflect_101(col, width as i64) as u32;
        image.get_pixel(col, row).0
    };

    let tl = pixel(y0, x0);
    let tr = pixel(y0, x0 + 1);
    let bl = pixel(y0 + 1, x0);
    let br = pixel(y0 + 1, x0 + 1);

    let mut out = [0u8; 3];
    out.iter_mut().enumerate().for_each(|(c, value)| {
        let top = tl[c] as f64 * (1.0 - fx) + tr[c] as f64 * fx;
        let bottom = bl[c] as f64 * (1.0 - fx) + br[c] as f64 * fx;
        *value = to_u8(top * (1.0 - fy) + bottom * fy);
    });
    Rgb(out)
}

/// Maps an out-of-range index back into `[0, len)` by mirroring, e.g.
/// `-1 -> 1` and `len -> len - 2`.
pub fn reflect_101(index: i64, len: i64) -> i64 {
    if len <= 1 {
        return 0;
    }
    let period = 2 * (len - 1);
    let index = index.rem_euclid(period);
    if index < len {
        index
    } else {
        period - index
    }
}

pub(crate) fn to_u8(value: f64) -> u8 {
    value.round().max(0.0).min(255.0) as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reflect_indexes() {
        assert_eq!(reflect_101(-1, 5), 1);
        assert_eq!(reflect_101(-2, 5), 2);
        assert_eq!(reflect_101(5, 5), 3);
        assert_eq!(reflect_101(6, 5), 2);
        assert_eq!(reflect_101(3, 5), 3);
        assert_eq!(reflect_101(7, 1), 0);
    }

    #[test]
    fn identity_warp_keeps_pixels() {
        let image = RgbImage::from_fn(7, 5, |x, y| Rgb([(x * 30) as u8, (y * 40) as u8, 9]));
        let warped = warp_affine(&image, &Affine::identity()).unwrap();
        assert_eq!(warped, image);
    }

    #[test]
    fn half_turn_warp() {
        let image = RgbImage::from_fn(4, 3, |x, y| Rgb([(x * 50) as u8, (y * 80) as u8, 0]));
        let affine = Affine::rotate_degrees(180.0).about(1.5, 2.0);
        let warped = warp_affine(&image, &affine).unwrap();
        assert_eq!(warped.get_pixel(0, 0), image.get_pixel(3, 2));
        assert_eq!(warped.get_pixel(3, 1), image.get_pixel(0, 1));
    }
}
