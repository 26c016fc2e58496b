use crate::error::{AnnotatorError, Result};
use image::{self, RgbImage};
use itertools::Itertools;
use log::warn;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

const IMAGE_EXTENSIONS: [&str; 3] = [".jpg", ".jpeg", ".png"];

pub fn read_image_as_rgb8(filepath: &Path) -> Result<RgbImage> {
    image::open(filepath)
        .map(|img| img.into_rgb8())
        .map_err(|source| AnnotatorError::ImageRead {
            path: filepath.to_path_buf(),
            source,
        })
}

/// Whether a file name carries one of the supported image extensions, ignoring case.
pub fn has_image_extension(file_name: &str) -> bool {
    let lowered = file_name.to_lowercase();
    IMAGE_EXTENSIONS.iter().any(|ext| lowered.ends_with(ext))
}

/// Lists the images directly inside `dir`, sorted by path.
///
/// Subdirectories are not descended into and anything that is not a regular file is skipped.
/// Entries that cannot be resolved, such as dangling symlinks, are skipped with a warning.
pub fn list_images(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut images = Vec::new();
    let walker = WalkDir::new(dir).min_depth(1).max_depth(1).follow_links(true);
    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) if e.depth() > 0 => {
                warn!("Skipping unreadable entry: {}", e);
                continue;
            }
            Err(e) => return Err(e.into()),
        };
        if !entry.file_type().is_file() {
            continue;
        }
        if has_image_extension(&entry.file_name().to_string_lossy()) {
            images.push(entry.into_path());
        }
    }
    Ok(images.into_iter().sorted().collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;
    use std::fs;

    fn write_test_image(path: &Path) {
        let mut img = RgbImage::new(3, 3);
        img.put_pixel(0, 1, Rgb([255, 0, 0]));
        img.put_pixel(1, 1, Rgb([0, 255, 0]));
        img.put_pixel(2, 1, Rgb([0, 0, 255]));
        for x in 0..3 {
            img.put_pixel(x, 2, Rgb([255, 255, 255]));
        }
        img.save(path).unwrap();
    }

    #[test]
    fn read_test_data_as_rgb8() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("test_image.png");
        write_test_image(&path);

        let img = read_image_as_rgb8(&path).unwrap();
        assert_eq!(img.dimensions(), (3, 3));
        assert_eq!(img.get_pixel(0, 0), &Rgb([0, 0, 0]));
        assert_eq!(img.get_pixel(0, 1), &Rgb([255, 0, 0]));
        assert_eq!(img.get_pixel(1, 1), &Rgb([0, 255, 0]));
        assert_eq!(img.get_pixel(2, 1), &Rgb([0, 0, 255]));
        assert_eq!(img.get_pixel(1, 2), &Rgb([255, 255, 255]));
    }

    #[test]
    fn read_reports_the_failing_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.jpg");
        fs::write(&path, b"not an image").unwrap();

        match read_image_as_rgb8(&path) {
            Err(AnnotatorError::ImageRead { path: p, .. }) => assert_eq!(p, path),
            other => panic!("expected ImageRead error, got {:?}", other),
        }
    }

    #[test]
    fn extension_check_is_case_insensitive() {
        assert!(has_image_extension("a.JPG"));
        assert!(has_image_extension("b.Jpeg"));
        assert!(has_image_extension("c.png"));
        assert!(!has_image_extension("d.tif"));
        assert!(!has_image_extension("png"));
        assert!(!has_image_extension("e.png.txt"));
    }

    #[test]
    fn list_images_filters_and_sorts() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["b.png", "a.JPG", "c.jpeg", "notes.txt", "d.bmp"] {
            fs::write(dir.path().join(name), b"").unwrap();
        }
        fs::create_dir(dir.path().join("nested.png")).unwrap();
        fs::write(dir.path().join("nested.png").join("inner.png"), b"").unwrap();

        let images = list_images(dir.path()).unwrap();
        let names: Vec<String> = images
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["a.JPG", "b.png", "c.jpeg"]);
    }

    #[cfg(unix)]
    #[test]
    fn list_images_skips_dangling_symlinks() {
        let dir = tempfile::tempdir().unwrap();
        write_test_image(&dir.path().join("a.png"));
        std::os::unix::fs::symlink(dir.path().join("gone.png"), dir.path().join("link.png"))
            .unwrap();

        let images = list_images(dir.path()).unwrap();
        assert_eq!(images, vec![dir.path().join("a.png")]);
    }

    #[test]
    fn list_images_of_missing_dir_fails() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            list_images(&dir.path().join("nope")),
            Err(AnnotatorError::Walk(_))
        ));
    }

    #[test]
    fn list_images_of_empty_dir() {
        let dir = tempfile::tempdir().unwrap();
        assert!(list_images(dir.path()).unwrap().is_empty());
    }
}
