use crate::error::UploadError;
use crate::ocr::{plate_text, Recognizer};
use crate::storage::UploadDir;
use crate::types::{ErrorBody, PlateReading, UploadQuery};
use bytes::Bytes;
use chrono::Local;
use image::io::Reader as ImageReader;
use image::{ImageError, RgbImage};
use log::{debug, error, info};
use std::convert::Infallible;
use std::io::Cursor;
use std::sync::Arc;
use tokio::task;
use warp::reply::Response;
use warp::{Filter, Reply};

pub const TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";

/// Process-wide pieces shared by every request. Both are set up before the
/// server binds and are never mutated afterwards.
#[derive(Clone)]
pub struct AppState {
    pub uploads: UploadDir,
    pub recognizer: Arc<dyn Recognizer>,
}

pub fn routes(
    state: AppState,
) -> impl Filter<Extract = impl Reply, Error = warp::Rejection> + Clone {
    // A query string we can't parse is treated like a missing one.
    let query = warp::query::<UploadQuery>()
        .or(warp::any().map(UploadQuery::default))
        .unify();
    warp::post()
        .and(warp::path!("upload"))
        .and(query)
        .and(warp::body::bytes())
        .and(warp::any().map(move || state.clone()))
        .and_then(handle_upload)
}

async fn handle_upload(
    query: UploadQuery,
    body: Bytes,
    state: AppState,
) -> Result<Response, Infallible> {
    let load = query.load();
    debug!("Got upload of {} bytes for load {}", body.len(), load);

    // Decoding, JPEG encoding and OCR all block.
    let log_load = load.clone();
    let result = match task::spawn_blocking(move || process(&state, load, &body)).await {
        Ok(result) => result,
        Err(e) => Err(UploadError::Worker(e.to_string())),
    };

    Ok(match result {
        Ok(reading) => warp::reply::json(&reading).into_response(),
        Err(e) => {
            error!("Error handling upload for load {}: {}", log_load, e);
            let body = warp::reply::json(&ErrorBody {
                error: e.public_message(),
            });
            warp::reply::with_status(body, e.status()).into_response()
        }
    })
}

/// Decodes, stores and reads one uploaded capture.
///
/// The image is saved before recognition runs, so a recognition failure still
/// leaves the file on disk.
pub fn process(state: &AppState, load: String, body: &[u8]) -> Result<PlateReading, UploadError> {
    if body.is_empty() {
        return Err(UploadError::NoImageData);
    }
    let image = decode(body)?;

    let time = Local::now().format(TIMESTAMP_FORMAT).to_string();
    state.uploads.save(&image, &load, &time)?;
    info!("Saved: {}", UploadDir::file_name(&load, &time));

    let fragments = state
        .recognizer
        .read_text(&image)
        .map_err(|e| UploadError::Recognize(e.to_string()))?;
    let plate = plate_text(&fragments);
    info!("Plate: {}", plate);

    Ok(PlateReading { plate, load, time })
}

fn decode(body: &[u8]) -> Result<RgbImage, UploadError> {
    let reader = ImageReader::new(Cursor::new(body))
        .with_guessed_format()
        .map_err(|e| UploadError::InvalidImage(ImageError::IoError(e)))?;
    let image = reader.decode().map_err(UploadError::InvalidImage)?;
    Ok(image.to_rgb8())
}
