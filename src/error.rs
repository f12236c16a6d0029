use failure::Fail;
use std::path::PathBuf;
use warp::http::StatusCode;

/// Everything that can go wrong while handling a single upload.
///
/// Only `NoImageData` and `InvalidImage` are the caller's fault; the rest are
/// reported to the client as a generic server error and only logged in full.
#[derive(Debug, Fail)]
pub enum UploadError {
    #[fail(display = "No image data")]
    NoImageData,
    #[fail(display = "Invalid image: {}", _0)]
    InvalidImage(#[fail(cause)] image::ImageError),
    #[fail(display = "Unable to save image to {:?}: {}", _0, _1)]
    Persist(PathBuf, #[fail(cause)] image::ImageError),
    #[fail(display = "Text recognition failed: {}", _0)]
    Recognize(String),
    #[fail(display = "Upload worker failed: {}", _0)]
    Worker(String),
}

impl UploadError {
    pub fn status(&self) -> StatusCode {
        match self {
            UploadError::NoImageData | UploadError::InvalidImage(_) => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// The message sent back in the `error` field of the response body.
    pub fn public_message(&self) -> &'static str {
        match self {
            UploadError::NoImageData => "No image data",
            UploadError::InvalidImage(_) => "Invalid image",
            _ => "Server error",
        }
    }
}
