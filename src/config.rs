use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;

pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:5000";
pub const DEFAULT_UPLOAD_DIR: &str = "captured_images";
pub const DEFAULT_OCR_LANG: &str = "eng";

#[derive(Debug, Clone)]
pub struct Config {
    pub bind_addr: SocketAddr,
    pub upload_dir: PathBuf,
    pub ocr_lang: String,
    /// Directory with trained OCR data; `None` lets the engine search its default path.
    pub tessdata_dir: Option<PathBuf>,
}

impl Config {
    pub fn from_env() -> Result<Config, failure::Error> {
        Config::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the config from an arbitrary key lookup. Unset and empty values
    /// fall back to the defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Config, failure::Error>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let bind_addr = get("BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string());
        let bind_addr = bind_addr
            .parse::<SocketAddr>()
            .map_err(|e| format_err!("Invalid BIND_ADDR '{}': {}", bind_addr, e))?;

        Ok(Config {
            bind_addr,
            upload_dir: PathBuf::from(
                get("UPLOAD_DIR").unwrap_or_else(|| DEFAULT_UPLOAD_DIR.to_string()),
            ),
            ocr_lang: get("OCR_LANG").unwrap_or_else(|| DEFAULT_OCR_LANG.to_string()),
            tessdata_dir: get("TESSDATA_DIR").map(PathBuf::from),
        })
    }
}
