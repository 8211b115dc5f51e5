use crate::common::*;

/// An image together with its labels in normalized coordinates.
#[derive(Debug, Clone, PartialEq)]
pub struct Sample {
    pub image: RgbImage,
    pub labels: Vec<YoloLabel>,
}

impl Sample {
    pub fn new(image: RgbImage, labels: Vec<YoloLabel>) -> Self {
        Self { image, labels }
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    /// Moves every label through `affine`, given in normalized coordinates.
    ///
    /// Labels are replaced by the enclosing box of their transformed corners,
    /// clipped to the image. Labels left with no area are dropped.
    pub fn map_labels(&mut self, affine: &Affine<f64>) {
        self.labels = self
            .labels
            .iter()
            .filter_map(|label| {
                let moved = affine * &label.rect.to_tlbr();
                let rect: CyCxHW<f64> = moved.clip_unit()?.into();
                Some(YoloLabel {
                    rect,
                    class: label.class,
                })
            })
            .collect();
    }
}
