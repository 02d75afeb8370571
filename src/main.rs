//! Sneaker Shop - storefront service

use anyhow::Result;
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use sneaker_shop::api::{self, AppState};
use sneaker_shop::backend::{PgBackend, SupabaseAuth};
use sneaker_shop::checkout::Checkout;
use sneaker_shop::config::Config;
use sneaker_shop::persistence::{CartSessions, PgCartStorage};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::registry().with(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into())).with(tracing_subscriber::fmt::layer()).init();
    let config = Config::from_env()?;

    let db = PgPoolOptions::new().max_connections(config.db_max_connections).connect(&config.database_url).await?;
    sqlx::migrate!("./migrations").run(&db).await?;
    let nats = match &config.nats_url {
        Some(url) => match async_nats::connect(url.as_str()).await {
            Ok(client) => Some(client),
            Err(e) => {
                tracing::warn!(error = %e, "NATS unavailable, order events will not be published");
                None
            }
        },
        None => None,
    };

    let backend = Arc::new(PgBackend::new(db.clone()));
    let carts = Arc::new(CartSessions::new(Arc::new(PgCartStorage::new(db)), config.shipping));
    let state = AppState {
        catalog: backend.clone(),
        auth: Arc::new(SupabaseAuth::new(&config.supabase_url, config.supabase_anon_key.clone())),
        profiles: backend.clone(),
        checkout: Arc::new(Checkout::new(carts.clone(), backend, nats)),
        carts,
        site_url: config.site_url.clone(),
    };

    let app = api::router(state);
    tracing::info!("Sneaker Shop listening on 0.0.0.0:{}", config.port);
    axum::serve(tokio::net::TcpListener::bind(("0.0.0.0", config.port)).await?, app).await?;
    Ok(())
}
