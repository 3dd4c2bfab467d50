// src/main.rs
use actix_web::{App, HttpResponse, HttpServer, Responder, web};
use std::io;

use donation_pay::{AppState, Config, api};

async fn index() -> impl Responder {
    HttpResponse::Ok().body("Service ready!")
}

#[actix_web::main]
async fn main() -> io::Result<()> {
    env_logger::init();

    let config = Config::from_env().map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e))?;
    let bind = (config.proxy_host.clone(), config.proxy_port);

    log::info!(
        "proxying /api to {} (env={:?}, timeout={:?})",
        config.api_base_url,
        config.environment,
        config.request_timeout
    );

    let state = AppState::new(config).map_err(io::Error::other)?;
    let state = web::Data::new(state);

    HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            // proxied request bodies up to 1 MiB
            .app_data(web::PayloadConfig::new(1024 * 1024))
            .route("/", web::get().to(index))
            .service(api::proxy::forward)
    })
    .bind(bind)?
    .run()
    .await
}
