use crate::common::*;

/// The only image extension accepted from a directory.
pub const IMAGE_EXTENSION: &str = "jpg";

/// Determines the images to run on.
///
/// An explicit image takes precedence over an explicit directory. Without
/// either, the configured `inference.image_dir` is used when it exists.
pub fn resolve_inputs(
    image: Option<&Path>,
    dir: Option<&Path>,
    settings: &Settings,
) -> Result<Vec<PathBuf>> {
    if let Some(image) = image {
        ensure!(image.exists(), "image not found: '{}'", image.display());
        return Ok(vec![image.to_owned()]);
    }

    if let Some(dir) = dir {
        ensure!(dir.exists(), "directory not found: '{}'", dir.display());
        let images = list_images(dir)?;
        ensure!(
            !images.is_empty(),
            "no .{} images found in '{}'",
            IMAGE_EXTENSION,
            dir.display()
        );
        return Ok(images);
    }

    let default_dir = &settings.inference.image_dir;
    let images = if default_dir.is_dir() {
        list_images(default_dir)?
    } else {
        vec![]
    };
    ensure!(
        !images.is_empty(),
        "no images specified, use --image or --dir"
    );
    Ok(images)
}

fn list_images(dir: &Path) -> Result<Vec<PathBuf>> {
    let dir_str = dir
        .to_str()
        .ok_or_else(|| format_err!("non-UTF-8 path '{}'", dir.display()))?;
    let pattern = format!(
        "{}/*.{}",
        glob::Pattern::escape(dir_str),
        IMAGE_EXTENSION
    );

    let mut images: Vec<_> = glob::glob(&pattern)?
        .filter_map(|entry| entry.ok())
        .filter(|path| path.is_file())
        .collect();
    images.sort();
    Ok(images)
}
