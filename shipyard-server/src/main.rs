#![deny(missing_docs)]
//! Shipyard server executable.
//!
//! Hosts the ship registry REST API.

mod config;
mod db;
mod models;
mod openapi;
mod routes;
mod schema;
mod store;

#[cfg(not(test))]
use std::sync::Arc;

#[cfg(not(test))]
use actix_cors::Cors;
#[cfg(not(test))]
use actix_web::{App, HttpServer, http::header, web};
#[cfg(not(test))]
use dotenvy::dotenv;
#[cfg(not(test))]
use shipyard_core::{MemoryShipStore, ShipService, ShipStore};

#[cfg(not(test))]
use crate::config::{ServerConfig, StoreBackend};
#[cfg(not(test))]
use crate::db::init_pool;
#[cfg(not(test))]
use crate::routes::{AppState, configure};
#[cfg(not(test))]
use crate::store::PgShipStore;

#[cfg(not(test))]
fn build_store(backend: &StoreBackend) -> std::io::Result<Arc<dyn ShipStore + Send + Sync>> {
    match backend {
        StoreBackend::Postgres {
            database_url,
            pool_size,
        } => {
            let pool = init_pool(database_url, *pool_size)?;
            log::info!("using PostgreSQL ship store");
            Ok(Arc::new(PgShipStore::new(pool)))
        }
        StoreBackend::Memory => {
            log::warn!("using in-memory ship store; records are lost on restart");
            Ok(Arc::new(MemoryShipStore::new()))
        }
    }
}

#[cfg(not(test))]
fn main() -> std::io::Result<()> {
    dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let config = ServerConfig::from_env()?;

    // Pool setup and migrations block, so run them before the runtime starts.
    let store = build_store(&config.store)?;
    let state = web::Data::new(AppState {
        ships: ShipService::new(store),
    });

    let allowed_origins = config.allowed_origins.clone();
    log::info!("listening on {}:{}", config.host, config.port);

    actix_web::rt::System::new().block_on(async move {
        HttpServer::new(move || {
            let mut cors = Cors::default()
                .allowed_methods(vec!["GET", "POST", "DELETE", "OPTIONS"])
                .allowed_headers(vec![header::CONTENT_TYPE])
                .max_age(3600);
            for origin in &allowed_origins {
                cors = cors.allowed_origin(origin);
            }
            App::new()
                .wrap(actix_web::middleware::Logger::default())
                .wrap(cors)
                .app_data(state.clone())
                .configure(configure)
        })
        .bind((config.host.as_str(), config.port))?
        .run()
        .await
    })
}

#[cfg(test)]
fn main() {}
