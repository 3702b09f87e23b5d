mod handlers;

use std::{net::SocketAddr, sync::Arc};

use anyhow::Context;
use axum::{
  Router,
  routing::{get, post},
};
use tower::ServiceBuilder;
use tower_governor::{GovernorLayer, governor::GovernorConfigBuilder};
use tower_http::{
  cors::{Any, CorsLayer},
  trace::TraceLayer,
};

use crate::{prelude::*, state::AppState};

pub async fn serve(app: Arc<AppState>) -> anyhow::Result<()> {
  let governor_conf = Arc::new(
    GovernorConfigBuilder::default()
      .per_second(2)
      .burst_size(100)
      .finish()
      .context("Failed to build rate limiter config")?,
  );

  let limiter = governor_conf.limiter().clone();

  let router = Router::new()
    .route("/health", get(handlers::health))
    // One-time discount codes
    .route(
      "/tourist/generate-one-time-code",
      post(handlers::generate_one_time_code),
    )
    .route("/tourist/one-time-codes", get(handlers::tourist_codes))
    .route(
      "/partner/validate-one-time-code",
      post(handlers::validate_one_time_code),
    )
    .route("/partner/apply-otc-discount", post(handlers::apply_discount))
    // Legacy validation requests
    .route("/partner/request-validation", post(handlers::request_validation))
    .route("/tourist/respond-validation", post(handlers::respond_validation))
    .route("/partner/use-validation", post(handlers::use_validation))
    .route("/tourist/validation-requests", get(handlers::tourist_requests))
    .route("/partner/validation-requests", get(handlers::partner_requests))
    // Reporting
    .route("/partner/stats", get(handlers::partner_stats))
    .route("/structure/savings", get(handlers::structure_savings))
    .route("/tourist/history", get(handlers::tourist_history))
    // Identity administration
    .route("/admin/iqcodes", post(handlers::create_iqcode))
    .route("/admin/iqcodes/status", post(handlers::set_iqcode_status))
    .layer(
      ServiceBuilder::new()
        .layer(TraceLayer::new_for_http())
        .layer(GovernorLayer::new(governor_conf))
        .layer(
          CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any),
        ),
    )
    .with_state(app)
    .into_make_service_with_connect_info::<SocketAddr>();

  let port: u16 =
    std::env::var("PORT").ok().and_then(|p| p.parse().ok()).unwrap_or(3000);
  let addr = SocketAddr::from(([0, 0, 0, 0], port));

  let listener =
    tokio::net::TcpListener::bind(addr).await.context("Failed to bind")?;
  info!("HTTP server listening on {addr}");

  let limiter = async {
    loop {
      tokio::time::sleep(Duration::from_secs(60)).await;
      limiter.retain_recent();
    }
  };

  let server =
    async { axum::serve(listener, router).await.context("Axum server error") };

  tokio::select! {
    result = server => {
      match &result {
        Ok(_) => info!("Server stopped gracefully"),
        Err(err) => error!("Server stopped with error: {err}"),
      }
      result
    }
    _ = limiter => {
      error!("Rate limiter cleaner stopped unexpectedly!");
      Ok(())
    }
  }
}
