use image::RgbImage;

/// Reported when the engine finds no text at all.
pub const UNKNOWN_PLATE: &str = "UNKNOWN";

/// Maps a bitmap to the text fragments found in it, in reading order.
///
/// One recognizer is loaded at startup and shared by every request.
pub trait Recognizer: Send + Sync {
    fn read_text(&self, image: &RgbImage) -> Result<Vec<String>, failure::Error>;
}

/// Joins the fragments with single spaces and upper-cases the result.
/// Fragments are trimmed and blank ones skipped, so stray engine whitespace
/// never reaches the plate.
pub fn plate_text<S: AsRef<str>>(fragments: &[S]) -> String {
    let words: Vec<&str> = fragments
        .iter()
        .map(|f| f.as_ref().trim())
        .filter(|f| !f.is_empty())
        .collect();
    if words.is_empty() {
        return UNKNOWN_PLATE.to_string();
    }
    words.join(" ").to_uppercase()
}

/// Splits raw engine output into its non-empty lines, trimmed, in engine order.
#[cfg_attr(not(feature = "tesseract"), allow(dead_code))]
pub fn fragments(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(feature = "tesseract")]
pub use self::tesseract::TesseractRecognizer;

#[cfg(feature = "tesseract")]
mod tesseract {
    use super::{fragments, Recognizer};
    use image::{DynamicImage, ImageOutputFormat, RgbImage};
    use leptess::LepTess;
    use log::debug;
    use std::io::Cursor;
    use std::path::Path;
    use std::sync::Mutex;

    struct Engine(LepTess);

    // The tesseract handle is only ever touched while holding the mutex below.
    unsafe impl Send for Engine {}

    pub struct TesseractRecognizer {
        engine: Mutex<Engine>,
    }

    impl TesseractRecognizer {
        /// Loads the trained data for `lang`. This is slow and happens once,
        /// before the server starts accepting uploads.
        pub fn load(data_dir: Option<&Path>, lang: &str) -> Result<Self, failure::Error> {
            let data_dir = match data_dir {
                Some(dir) => Some(
                    dir.to_str()
                        .ok_or_else(|| format_err!("Non UTF-8 tessdata path {:?}", dir))?,
                ),
                None => None,
            };
            let engine = LepTess::new(data_dir, lang)
                .map_err(|e| format_err!("Unable to load OCR model '{}': {}", lang, e))?;
            Ok(TesseractRecognizer {
                engine: Mutex::new(Engine(engine)),
            })
        }
    }

    impl Recognizer for TesseractRecognizer {
        fn read_text(&self, image: &RgbImage) -> Result<Vec<String>, failure::Error> {
            // leptonica wants an encoded image, not raw pixels.
            let mut png = Vec::new();
            DynamicImage::ImageRgb8(image.clone())
                .write_to(&mut Cursor::new(&mut png), ImageOutputFormat::Png)?;

            let mut engine = self
                .engine
                .lock()
                .map_err(|_| format_err!("OCR engine lock poisoned"))?;
            engine
                .0
                .set_image_from_mem(&png)
                .map_err(|e| format_err!("Unable to hand image to OCR engine: {:?}", e))?;
            let text = engine.0.get_utf8_text()?;
            debug!("Raw OCR output: {:?}", text);

            Ok(fragments(&text))
        }
    }
}
