//! TouristIQ discount ledger server
//!
//! Architecture:
//! - SeaORM for database access (SQLite)
//! - Axum for the HTTP API with rate limiting
//! - Tokio for the async runtime
//!
//! The authoritative core is the one-time-code store plus the per-tourist
//! plafond counter; everything HTTP-facing sits on top of it.

mod entities;
mod error;
mod migration;
mod prelude;
mod server;
mod services;
mod state;
mod utils;

use std::{env, sync::Arc};

use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use crate::entities::iq_code::Role;
use crate::prelude::*;
use crate::state::AppState;

#[tokio::main]
async fn main() {
  dotenvy::dotenv().ok();

  tracing_subscriber::registry()
    .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
      "touristiq=debug,tower_http=debug,sea_orm=warn".into()
    }))
    .with(tracing_subscriber::fmt::layer())
    .init();

  let db_url =
    env::var("DATABASE_URL").unwrap_or_else(|_| "sqlite:touristiq.db?mode=rwc".into());

  info!("Starting TouristIQ ledger v{}", env!("CARGO_PKG_VERSION"));

  let app_state = Arc::new(AppState::new(&db_url).await);

  // Seed the configured admin identity so /admin routes are reachable on a
  // fresh database.
  match env::var("ADMIN_IQCODE") {
    Ok(admin) if !admin.trim().is_empty() => {
      app_state
        .sv()
        .iqcodes
        .ensure(admin.trim(), Role::Admin)
        .await
        .expect("Failed to seed admin IQCode");
    }
    _ => warn!("ADMIN_IQCODE not set, admin endpoints unusable"),
  }

  if let Err(err) = server::serve(app_state).await {
    error!("Server error: {err:#}");
  }
}
