use std::sync::Arc;

use actix_web::{web, App, HttpServer};
use dotenv::dotenv;

use crate::config::app_config::AppConfig;
use crate::logger::init_logger;
use crate::services::record_store::{InMemoryStore, RecordStore, SqliteStore};

mod app;
mod config;
mod errors;
mod handlers;
mod logger;
mod models;
mod services;
mod utils;

#[cfg(test)]
mod tests;

async fn setup_store(config: &AppConfig) -> std::io::Result<Arc<dyn RecordStore>> {
    let Some(database_url) = config.database_url.as_deref() else {
        log::info!("Sin DATABASE_URL; empresas y clientes quedan en memoria");
        return Ok(Arc::new(InMemoryStore::new()));
    };

    log::info!("Conectando a SQLite en {}", database_url);
    let store = SqliteStore::connect(database_url)
        .await
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, format!("{:?}", e)))?;

    if let Err(e) = store.run_migrations().await {
        log::error!("Fallo en migraciones de 'records': {:?}", e);
        return Err(std::io::Error::new(
            std::io::ErrorKind::Other,
            format!("{:?}", e),
        ));
    }
    Ok(Arc::new(store))
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv().ok(); // Cargar .env al inicio
    init_logger();

    let config = AppConfig::from_env();
    log::info!("Proveedor de voz: {:?}", config.voice_provider);

    let store = setup_store(&config).await?;
    let call_service = app::build_call_service(&config, store);

    log::info!("Levantando servidor en 0.0.0.0:{}", config.port);
    HttpServer::new(move || {
        App::new()
            .app_data(web::Data::new(call_service.clone()))
            .configure(app::init_app)
    })
    .bind(("0.0.0.0", config.port))?
    .run()
    .await
}
