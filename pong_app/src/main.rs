//! Headless Pong
//!
//! Usage: `pong_app [config.toml|config.ron]`. Without an argument the
//! built-in defaults are used.

mod app;
mod components;
mod config;
mod error;
mod spawn;
mod systems;

use ecs_core::foundation::logging;
use ecs_core::Config;

use crate::app::PongApp;
use crate::components::Camera;
use crate::config::PongConfig;
use crate::error::AppError;

fn main() -> Result<(), AppError> {
    let config = match std::env::args().nth(1) {
        Some(path) => PongConfig::load_from_file(path)?,
        None => PongConfig::default(),
    };
    logging::init_with_filter(&config.log_level);

    log::info!("Starting headless Pong");
    let mut app = PongApp::new(config)?;

    match app.run() {
        Ok(summary) => {
            log::info!(
                "Finished after {} frames: {} - {} (winner: {:?}, {} matrix updates)",
                summary.frames,
                summary.left,
                summary.right,
                summary.winner,
                summary.matrices_recomputed
            );
            let camera = app.active_camera();
            let view_height = camera
                .and_then(|camera| app.world().component::<Camera>(camera.id()))
                .map(|camera| camera.view_height);
            log::debug!(
                "{} entities left, active camera {:?} (view height {:?})",
                app.world().entity_count(),
                camera,
                view_height
            );
            app.shutdown()
        }
        Err(e) => {
            log::error!("Pong failed: {}", e);
            Err(e)
        }
    }
}
