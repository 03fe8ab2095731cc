//! Background image validation.

use anyhow::{bail, Context, Result};
use std::path::Path;

/// Check that `path` is a decodable image and return its size in pixels.
///
/// Only the header is read; the pixels are decoded later by GPUI's image
/// cache when the pane paints.
pub fn probe_image(path: &Path) -> Result<(u32, u32)> {
    let (width, height) = image::ImageReader::open(path)
        .with_context(|| format!("Failed to open {}", path.display()))?
        .with_guessed_format()
        .with_context(|| format!("Failed to read {}", path.display()))?
        .into_dimensions()
        .with_context(|| format!("{} is not a supported image", path.display()))?;

    if width == 0 || height == 0 {
        bail!("{} has no pixels", path.display());
    }
    Ok((width, height))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn reads_png_dimensions() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("wall.png");
        image::RgbImage::new(3, 2).save(&path).unwrap();
        assert_eq!(probe_image(&path).unwrap(), (3, 2));
    }

    #[test]
    fn format_is_sniffed_not_taken_from_extension() {
        let dir = tempfile::tempdir().unwrap();
        let png = dir.path().join("wall.png");
        image::RgbImage::new(4, 4).save(&png).unwrap();
        let renamed = dir.path().join("wall.dat");
        std::fs::rename(&png, &renamed).unwrap();
        assert_eq!(probe_image(&renamed).unwrap(), (4, 4));
    }

    #[test]
    fn rejects_non_images() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notes.png");
        std::fs::write(&path, "not an image").unwrap();
        assert!(probe_image(&path).is_err());
    }

    #[test]
    fn rejects_missing_files() {
        assert!(probe_image(Path::new("/nonexistent/kiri.png")).is_err());
    }
}
