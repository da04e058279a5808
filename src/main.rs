mod api;
mod app;
mod config;
mod coordinator;
mod logging;
mod registry;
mod session;
mod upload;
mod utils;

use app::PapersUploader;
use config::AppConfig;
use eframe::CreationContext;
use session::FileTokenStore;
use std::process::ExitCode;
use tokio::runtime::Runtime;
use tracing::error;

fn main() -> ExitCode {
    if let Err(e) = logging::init_logging() {
        eprintln!("{}", e);
        return ExitCode::FAILURE;
    }

    let config = match AppConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!(error = %e, "Invalid configuration");
            return ExitCode::FAILURE;
        }
    };

    let runtime = match Runtime::new() {
        Ok(runtime) => runtime,
        Err(e) => {
            error!(error = %e, "Failed to start async runtime");
            return ExitCode::FAILURE;
        }
    };

    let token_store = Box::new(FileTokenStore::new(config.token_file.clone()));

    let options = eframe::NativeOptions {
        viewport: eframe::egui::ViewportBuilder::default()
            .with_inner_size([1100.0, 720.0])
            .with_min_inner_size([800.0, 560.0]),
        ..Default::default()
    };

    let result = eframe::run_native(
        "Papers Uploader",
        options,
        Box::new(move |cc: &CreationContext| {
            Box::new(PapersUploader::new(cc, config, runtime, token_store))
        }),
    );

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "Application window failed");
            ExitCode::FAILURE
        }
    }
}
