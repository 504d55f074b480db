use std::process::ExitCode;

use driftfield::{run, SceneConfig, SceneError};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

fn load_config() -> Result<SceneConfig, SceneError> {
    match std::env::args().nth(1) {
        Some(path) => {
            info!("Loading config from {}", path);
            Ok(SceneConfig::from_json_file(path)?)
        }
        None => Ok(SceneConfig::default()),
    }
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_target(false)
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    match load_config().and_then(run) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        }
    }
}
