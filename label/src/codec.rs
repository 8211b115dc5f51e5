//! The line-oriented YOLO label format.
//!
//! Each line holds `<class> <cx> <cy> <w> <h>`, where the box fields are
//! normalized to the image size. Detector output appends a confidence score
//! as the sixth field.

use crate::{DetectionLabel, LabelError, YoloLabel};
use bbox::{prelude::*, CyCxHW};
use std::{
    fmt, fs,
    path::{Path, PathBuf},
};

const LABEL_FIELDS: usize = 5;
const DETECTION_FIELDS: usize = 6;

/// Reads all labels from `path` in file order.
///
/// A missing file means the image has no objects and yields an empty list.
/// Blank lines are ignored; any other line must carry exactly five fields.
pub fn decode(path: impl AsRef<Path>) -> Result<Vec<YoloLabel>, LabelError> {
    let path = path.as_ref();
    parse_lines(path, LABEL_FIELDS, |fields| {
        let (label, _) = parse_label(fields)?;
        Ok(label)
    })
}

/// Reads detector output lines, each a label followed by a confidence score.
pub fn decode_detections(path: impl AsRef<Path>) -> Result<Vec<DetectionLabel>, LabelError> {
    let path = path.as_ref();
    parse_lines(path, DETECTION_FIELDS, |fields| {
        let (label, rest) = parse_label(fields)?;
        let confidence = parse_float(rest[0], "confidence")?;
        Ok(DetectionLabel { label, confidence })
    })
}

/// Writes `labels` to `path`, one per line, replacing previous content.
pub fn encode(path: impl AsRef<Path>, labels: &[YoloLabel]) -> Result<(), LabelError> {
    let path = path.as_ref();
    let text: String = labels.iter().map(|label| format!("{}\n", label)).collect();
    fs::write(path, text).map_err(|source| LabelError::Io {
        path: path.to_owned(),
        source,
    })
}

impl fmt::Display for YoloLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [cy, cx, h, w] = self.rect.cycxhw();
        write!(f, "{} {:.6} {:.6} {:.6} {:.6}", self.class, cx, cy, w, h)
    }
}

fn parse_lines<T, F>(path: &Path, n_fields: usize, mut parse: F) -> Result<Vec<T>, LabelError>
where
    F: FnMut(&[&str]) -> Result<T, String>,
{
    if !path.exists() {
        return Ok(vec![]);
    }

    let text = fs::read_to_string(path).map_err(|source| LabelError::Io {
        path: path.to_owned(),
        source,
    })?;

    text.lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(index, line)| {
            let parse_error = |reason: String| LabelError::Parse {
                path: PathBuf::from(path),
                line: index + 1,
                reason,
            };

            let fields: Vec<&str> = line.split_whitespace().collect();
            if fields.len() != n_fields {
                return Err(parse_error(format!(
                    "expect {} fields, but get {}",
                    n_fields,
                    fields.len()
                )));
            }
            parse(&fields[..]).map_err(parse_error)
        })
        .collect()
}

fn parse_label<'a, 'b>(fields: &'a [&'b str]) -> Result<(YoloLabel, &'a [&'b str]), String> {
    let class: usize = fields[0]
        .parse()
        .map_err(|_| format!("invalid class id '{}'", fields[0]))?;
    let cx = parse_float(fields[1], "center x")?;
    let cy = parse_float(fields[2], "center y")?;
    let w = parse_float(fields[3], "width")?;
    let h = parse_float(fields[4], "height")?;
    let rect = CyCxHW::try_from_cycxhw([cy, cx, h, w]).map_err(|err| err.to_string())?;

    Ok((YoloLabel { rect, class }, &fields[LABEL_FIELDS..]))
}

fn parse_float(text: &str, name: &str) -> Result<f64, String> {
    text.parse()
        .map_err(|_| format!("invalid {} value '{}'", name, text))
}
