pub(crate) mod auth;
pub(crate) mod controllers;
pub(crate) mod core;
pub(crate) mod routes;
pub(crate) mod store;
pub(crate) mod types;

use config::Config;
use std::sync::Arc;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use crate::core::error::ConfigError as Error;
use crate::core::{config::Args, state::AppState};
use crate::store::objects::LocalObjectStore;
use crate::store::postgres::PgStore;

pub async fn run() -> Result<(), Error> {
    let config = Config::builder()
        .add_source(config::File::with_name("tasktrack").required(false))
        .add_source(config::Environment::with_prefix("TASKTRACK"))
        .build()?;

    let config = config.try_deserialize::<Args>()?;

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_new(&config.log_level).unwrap_or_default())
        .with(tracing_subscriber::fmt::layer())
        .init();

    let store = PgStore::connect(
        &config.database_url(),
        config.database_max_connections,
        config.store_timeout(),
    )
    .await?;

    store.migrate().await?;

    let objects = LocalObjectStore::new(&config.attachment_dir);

    let state = AppState::new(Arc::new(store), Arc::new(objects), &config)?;

    let app = routes::router::routes(state, &config)?;

    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", config.port)).await?;

    tracing::info!("listening on port {}", config.port);

    axum::serve(listener, app).await?;

    Ok(())
}
