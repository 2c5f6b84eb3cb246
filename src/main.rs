mod config;
mod error;
mod model;
mod web;

use std::sync::Arc;

use actix_web::middleware::Logger;
use actix_web::{web::Data, App, HttpServer};
use dotenv::dotenv;
use log::{error, info, warn};

use config::Config;
use model::{Generator, OpenAiModel};
use web::routes;

// App state structure
struct AppState {
    config: Config,
    generator: Arc<dyn Generator>,
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Initialize environment
    dotenv().ok();
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    info!("Starting workshop gateway");

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!("Invalid configuration: {}", e);
            std::process::exit(1);
        }
    };

    info!("Allowed models: {}", config.allowed_models.join(", "));
    if !config.is_model_allowed(&config.default_model) {
        warn!(
            "Default model {} is not in ALLOWED_MODELS; requests without a model will be rejected",
            config.default_model
        );
    }
    if config.workshop_code.is_none() {
        warn!("WORKSHOP_CODE not set; /chat is open to any caller");
    }

    let generator: Arc<dyn Generator> = match OpenAiModel::new(&config) {
        Ok(model) => Arc::new(model),
        Err(e) => {
            error!("Failed to initialize upstream model client: {}", e);
            std::process::exit(1);
        }
    };

    let bind_addr = (config.host.clone(), config.port);
    info!("Listening on {}:{}", bind_addr.0, bind_addr.1);

    let app_state = Data::new(AppState {
        config: config.clone(),
        generator,
    });

    HttpServer::new(move || {
        App::new()
            .app_data(app_state.clone())
            .wrap(routes::cors(&config))
            .wrap(Logger::default().exclude("/health"))
            .configure(|cfg| routes::configure(cfg, &config))
    })
    .bind(bind_addr)?
    .run()
    .await
}
