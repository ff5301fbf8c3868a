use std::process::ExitCode;

use starscape::{Scene, SceneConfig, SceneError};
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn run() -> Result<(), SceneError> {
    let config = match std::env::args().nth(1) {
        Some(path) => {
            info!(%path, "loading config");
            SceneConfig::load(path)?
        }
        None => SceneConfig::default(),
    };
    Scene::new().with_config(config).run()
}

fn main() -> ExitCode {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!(error = %err, "starscape failed");
            ExitCode::FAILURE
        }
    }
}
