use axum::{
    extract::State,
    routing::{get, post},
    Json, Router,
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use tickerscout_core::cache::TtlCache;
use tickerscout_core::discover::{
    DiscoverRequest, DiscoverResponse, DiscoveryService, ResolveRequest, ResolveResponse,
};
use tickerscout_core::verify::yahoo::YahooSearchClient;
use tickerscout_core::verify::VerificationClient;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let settings = tickerscout_core::config::Settings::from_env()?;
    let _sentry_guard = init_sentry(&settings);

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer())
        .with(sentry_tracing::layer())
        .init();

    // Handlers are infallible, so startup is the only error path worth
    // reporting.
    if let Err(err) = serve(&settings).await {
        sentry_anyhow::capture_anyhow(&err);
        tracing::error!(error = %err, "api startup failed");
        return Err(err);
    }

    Ok(())
}

async fn serve(settings: &tickerscout_core::config::Settings) -> anyhow::Result<()> {
    let provider = Arc::new(YahooSearchClient::from_settings(settings)?);
    // One cache per process, shared by every verification lookup.
    let cache = Arc::new(TtlCache::from_env());
    let verifier = Arc::new(VerificationClient::new(provider, cache));
    let state = AppState {
        discovery: Arc::new(DiscoveryService::new(verifier)),
    };

    let app = Router::new()
        .route("/healthz", get(healthz))
        .route("/discover", post(discover))
        .route("/resolve", post(resolve))
        .with_state(state)
        .layer(TraceLayer::new_for_http());

    let port: u16 = std::env::var("PORT")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(3000);
    let addr = std::net::SocketAddr::from(([0, 0, 0, 0], port));

    tracing::info!(%addr, "api listening");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn healthz() -> &'static str {
    "ok"
}

#[derive(Clone)]
struct AppState {
    discovery: Arc<DiscoveryService>,
}

/// Extraction never fails and verification failures degrade to a
/// smaller allowed set, so both handlers are infallible.
async fn discover(
    State(state): State<AppState>,
    Json(req): Json<DiscoverRequest>,
) -> Json<DiscoverResponse> {
    tracing::debug!(stories = req.stories.len(), verify = req.verify, "discover request");
    Json(state.discovery.discover(req).await)
}

async fn resolve(
    State(state): State<AppState>,
    Json(req): Json<ResolveRequest>,
) -> Json<ResolveResponse> {
    tracing::debug!(
        tickers = req.tickers.len(),
        names = req.names.len(),
        "resolve request"
    );
    Json(state.discovery.resolve(req).await)
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
}

fn init_sentry(settings: &tickerscout_core::config::Settings) -> Option<sentry::ClientInitGuard> {
    let dsn = settings.sentry_dsn.as_deref()?;
    Some(sentry::init((
        dsn,
        sentry::ClientOptions {
            release: sentry::release_name!(),
            ..Default::default()
        },
    )))
}
