use actix_web::{middleware, web, App, HttpServer};
use std::process::ExitCode;

use tryon::{config::Config, logger, server, AppState};

#[actix_web::main]
async fn main() -> ExitCode {
    let env_loaded = dotenv::dotenv().is_ok();

    if let Err(e) = logger::init() {
        eprintln!("{}", e);
        return ExitCode::FAILURE;
    }

    if env_loaded {
        log::info!("✅ .env file loaded successfully");
    } else {
        log::warn!("⚠️  No .env file found, using system environment variables");
    }

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            log::error!("❌ {}", e);
            return ExitCode::FAILURE;
        }
    };

    let state = match AppState::from_config(&config) {
        Ok(state) => web::Data::new(state),
        Err(e) => {
            log::error!("❌ Failed to initialize relay: {}", e);
            return ExitCode::FAILURE;
        }
    };

    logger::log_startup_info(
        env!("CARGO_PKG_NAME"),
        env!("CARGO_PKG_VERSION"),
        &config.host,
        config.port(),
    );
    logger::log_config_info(&config, state.catalog.len());

    if !config.assets_dir.is_dir() {
        log::warn!(
            "⚠️  Assets directory {} not found, product images will 404",
            config.assets_dir.display()
        );
    }

    let assets_dir = config.assets_dir.clone();
    let server = HttpServer::new(move || {
        App::new()
            .wrap(middleware::Logger::default())
            .app_data(state.clone())
            .configure(server::configure)
            .service(server::assets(&assets_dir))
    })
    .bind((config.host.as_str(), config.port()));

    let result = match server {
        Ok(server) => server.run().await,
        Err(e) => Err(e),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("❌ Server error: {}", e);
            ExitCode::FAILURE
        }
    }
}
