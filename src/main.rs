mod config;
mod error;
mod ocr;
mod storage;
mod types;
mod upload;

use config::Config;
use env_logger::Env;
use log::{error, info};
use ocr::Recognizer;
use std::process;
use std::sync::Arc;
use storage::UploadDir;
use upload::AppState;

#[macro_use]
extern crate failure;

#[tokio::main]
async fn main() {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();
    info!("Starting plate-reader");

    if let Err(e) = run().await {
        error!("Fatal: {}", e);
        process::exit(1);
    }
    info!("Exiting main");
}

async fn run() -> Result<(), failure::Error> {
    let config = Config::from_env()?;
    let uploads = UploadDir::create(&config.upload_dir)
        .map_err(|e| format_err!("Unable to create {:?}: {}", config.upload_dir, e))?;
    info!("Saving captures under {:?}", uploads.path());

    info!("Loading OCR model ({})...", config.ocr_lang);
    let recognizer = load_recognizer(&config)?;
    info!("OCR model loaded");

    let state = AppState {
        uploads,
        recognizer,
    };
    let (addr, server) = warp::serve(upload::routes(state))
        .try_bind_with_graceful_shutdown(config.bind_addr, async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                // Without a signal handler the server runs until killed.
                error!("Unable to listen for shutdown signal: {}", e);
                std::future::pending::<()>().await;
            }
            info!("Shutting down");
        })
        .map_err(|e| format_err!("Unable to bind {}: {}", config.bind_addr, e))?;
    info!("Listening on {}", addr);
    server.await;
    Ok(())
}

#[cfg(feature = "tesseract")]
fn load_recognizer(config: &Config) -> Result<Arc<dyn Recognizer>, failure::Error> {
    let recognizer =
        ocr::TesseractRecognizer::load(config.tessdata_dir.as_deref(), &config.ocr_lang)?;
    Ok(Arc::new(recognizer))
}

#[cfg(not(feature = "tesseract"))]
fn load_recognizer(_config: &Config) -> Result<Arc<dyn Recognizer>, failure::Error> {
    Err(format_err!(
        "No OCR engine compiled in; rebuild with `--features tesseract`"
    ))
}
