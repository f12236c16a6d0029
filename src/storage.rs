use crate::error::UploadError;
use image::{ImageFormat, RgbImage};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Directory that every decoded capture is written to.
#[derive(Debug, Clone)]
pub struct UploadDir {
    root: PathBuf,
}

impl UploadDir {
    /// Creates the directory (and any parents) if it doesn't exist yet.
    pub fn create<P: AsRef<Path>>(root: P) -> io::Result<UploadDir> {
        let root = root.as_ref().to_path_buf();
        fs::create_dir_all(&root)?;
        Ok(UploadDir { root })
    }

    pub fn path(&self) -> &Path {
        &self.root
    }

    // The load id goes into the name untouched, separators and all.
    pub fn file_name(load: &str, time: &str) -> String {
        format!("LOAD{}_{}.jpg", load, time)
    }

    /// Writes the image as a JPEG named after the load and time. A capture with
    /// the same load in the same second replaces the earlier file.
    pub fn save(&self, image: &RgbImage, load: &str, time: &str) -> Result<PathBuf, UploadError> {
        let path = self.root.join(UploadDir::file_name(load, time));
        match image.save_with_format(&path, ImageFormat::Jpeg) {
            Ok(()) => Ok(path),
            Err(e) => Err(UploadError::Persist(path, e)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    fn checkerboard(color: Rgb<u8>) -> RgbImage {
        RgbImage::from_fn(32, 16, |x, y| {
            if (x / 4 + y / 4) % 2 == 0 {
                color
            } else {
                Rgb([255, 255, 255])
            }
        })
    }

    fn file_names(dir: &Path) -> Vec<String> {
        let mut names: Vec<String> = fs::read_dir(dir)
            .unwrap()
            .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        names
    }

    #[test]
    fn file_name_encodes_load_and_time() {
        assert_eq!(
            UploadDir::file_name("2", "20240131_235959"),
            "LOAD2_20240131_235959.jpg"
        );
        assert_eq!(
            UploadDir::file_name("UNKNOWN", "20240131_235959"),
            "LOADUNKNOWN_20240131_235959.jpg"
        );
    }

    #[test]
    fn create_makes_nested_directories() {
        let tmp = tempfile::tempdir().unwrap();
        let nested = tmp.path().join("a").join("captured_images");
        let dir = UploadDir::create(&nested).unwrap();
        assert!(nested.is_dir());
        assert_eq!(dir.path(), nested.as_path());
        // Creating it again is harmless.
        UploadDir::create(&nested).unwrap();
    }

    #[test]
    fn save_writes_a_jpeg_that_reloads() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = UploadDir::create(tmp.path()).unwrap();
        let path = dir
            .save(&checkerboard(Rgb([0, 0, 0])), "1", "20240101_120000")
            .unwrap();

        assert_eq!(path, tmp.path().join("LOAD1_20240101_120000.jpg"));
        assert_eq!(ImageFormat::from_path(&path).unwrap(), ImageFormat::Jpeg);
        let reloaded = image::open(&path).unwrap().to_rgb8();
        assert_eq!(reloaded.dimensions(), (32, 16));
    }

    #[test]
    fn same_load_and_second_overwrites() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = UploadDir::create(tmp.path()).unwrap();
        dir.save(&checkerboard(Rgb([0, 0, 0])), "7", "20240101_120000")
            .unwrap();
        dir.save(&checkerboard(Rgb([200, 0, 0])), "7", "20240101_120000")
            .unwrap();
        dir.save(&checkerboard(Rgb([0, 0, 0])), "8", "20240101_120000")
            .unwrap();

        assert_eq!(
            file_names(tmp.path()),
            vec![
                "LOAD7_20240101_120000.jpg".to_string(),
                "LOAD8_20240101_120000.jpg".to_string(),
            ]
        );
        let survivor = image::open(tmp.path().join("LOAD7_20240101_120000.jpg"))
            .unwrap()
            .to_rgb8();
        // The red board was written last.
        assert!(survivor.get_pixel(0, 0)[0] > 150);
    }

    #[test]
    fn save_into_missing_directory_fails() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = UploadDir::create(tmp.path()).unwrap();
        let board = checkerboard(Rgb([0, 0, 0]));
        let result = dir.save(&board, "no/such/dir", "20240101_120000");
        match result {
            Err(UploadError::Persist(path, _)) => {
                assert!(path.ends_with("LOADno/such/dir_20240101_120000.jpg"))
            }
            other => panic!("expected a persist error, got {:?}", other),
        }
    }
}
