use serde::{Deserialize, Serialize};

pub const UNKNOWN_LOAD: &str = "UNKNOWN";

/// Query string of `POST /upload`.
#[derive(Debug, Default, Deserialize)]
pub struct UploadQuery {
    pub load: Option<String>,
}

impl UploadQuery {
    pub fn load(self) -> String {
        self.load.unwrap_or_else(|| UNKNOWN_LOAD.to_string())
    }
}

/// Body of a successful upload.
#[derive(Debug, Clone, Serialize)]
pub struct PlateReading {
    pub plate: String,
    pub load: String,
    pub time: String,
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: &'static str,
}
