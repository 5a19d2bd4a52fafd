use clap::Parser;
use std::sync::Arc;
use tracing::{error, info};

mod access;
mod config;
mod console;
mod generator;
mod i18n;
mod session;
mod util;

use crate::access::{AccessGate, LaunchContext};
use crate::config::{AppConfig, CliArgs, LogFormat};
use crate::generator::providers::http::HttpGenerator;
use crate::i18n::TextKey;
use crate::session::clipboard::SystemClipboard;
use crate::session::controller::GenerationController;
use crate::session::state::Session;
use crate::util::logging::init_tracing;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Parse command line arguments
    let args = CliArgs::parse();

    // Load configuration
    let config = match AppConfig::new(&args) {
        Ok(config) => config,
        Err(e) => {
            init_tracing(LogFormat::Text);
            error!("Failed to load configuration: {}", e);
            return Err(e.into());
        }
    };

    // Initialize logging
    init_tracing(config.logging.format);

    // Resolve the access credential once; without it nothing else is built
    let launch_context =
        LaunchContext::capture(args.launch_url.as_deref(), args.key.clone(), &config.access)?;
    let Some(credential) = AccessGate::resolve(&launch_context) else {
        println!("{}", i18n::text(config.session.language, TextKey::AccessDenied));
        std::process::exit(1);
    };

    info!(
        "Initializing SQL generator client for {}",
        config.generator.endpoint_url
    );
    let generator = HttpGenerator::new(&config.generator)?;

    let session = Session::new(
        config.session.language,
        config.session.database,
        config.initial_sql_mode(),
    );
    let (controller, resolutions) = GenerationController::new(
        session,
        credential,
        Arc::new(generator),
        Box::new(SystemClipboard::default()),
    );

    match console::run_console(controller, resolutions).await {
        Ok(()) => info!("Console closed"),
        Err(e) => {
            error!("Console error: {}", e);
            return Err(e.into());
        }
    }

    Ok(())
}
