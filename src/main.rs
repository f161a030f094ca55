//! Sunny Tours Backend
//!
//! Content API for the tour site: tour and page-content lists kept in SQLite
//! or local snapshots, the featured-tour countdown, and weather-based outfit advice.

mod api;
mod auth;
mod catalog;
mod config;
mod db;
mod errors;
mod models;
mod store;
mod sync;
mod weather;

use std::sync::Arc;

use axum::{
    middleware,
    routing::{delete, get, post, put},
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use auth::{AuthenticationPort, SessionRegistry, StaticCredentials};
use catalog::LiveCountdown;
use config::{Config, StorageMode};
use db::Repository;
use models::{BlogPost, Testimonial, TourRecord, WhyChooseUsItem};
use store::{ContentStore, FileSnapshotStore};
use weather::{OpenMeteoProvider, WeatherService};

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    pub store: ContentStore,
    pub weather: Arc<WeatherService>,
    pub auth: Arc<dyn AuthenticationPort>,
    pub sessions: Arc<SessionRegistry>,
    pub countdown: Arc<LiveCountdown>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load configuration
    let config = Config::from_env();

    // Initialize logging
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Sunny Tours Backend");
    tracing::info!("Storage: {:?}", config.storage);
    tracing::info!("Bind address: {}", config.bind_addr);

    let credentials = StaticCredentials::from_config(&config);
    if !credentials.is_enabled() {
        tracing::warn!("No admin password configured (SUNNY_ADMIN_PASSWORD). Admin login is disabled!");
    }

    let store = match config.storage {
        StorageMode::Sqlite => {
            tracing::info!("Database path: {:?}", config.db_path);
            tracing::info!("Sync mode: {:?}", config.sync_mode);
            let pool = db::init_database(&config.db_path).await?;
            ContentStore::sqlite(Repository::new(pool), config.sync_mode)
        }
        StorageMode::Local => {
            tracing::info!("Snapshot directory: {:?}", config.snapshot_dir);
            ContentStore::local(Arc::new(FileSnapshotStore::new(&config.snapshot_dir)))
        }
    };

    let provider = OpenMeteoProvider::from_config(&config)?;
    let weather = WeatherService::new(Arc::new(provider), config.weather_utc_offset_hours);

    // Create application state
    let state = AppState {
        store,
        weather: Arc::new(weather),
        auth: Arc::new(credentials),
        sessions: Arc::new(SessionRegistry::new()),
        countdown: Arc::new(LiveCountdown::new()),
    };

    // Build router
    let app = create_router(state);

    // Start server
    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    tracing::info!("Server listening on {}", config.bind_addr);

    axum::serve(listener, app).await?;

    Ok(())
}

/// Create the application router with all routes.
pub fn create_router(state: AppState) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let sessions = state.sessions.clone();

    // Admin routes
    let admin_routes = Router::new()
        .route("/session", delete(api::logout))
        .route("/tours", put(api::replace_content::<TourRecord>))
        .route("/tours", post(api::create_tour))
        .route("/tours/{id}", put(api::edit_tour))
        .route("/tours/{id}", delete(api::delete_tour))
        .route("/featured", put(api::set_featured))
        .route("/blog-posts", put(api::replace_content::<BlogPost>))
        .route("/testimonials", put(api::replace_content::<Testimonial>))
        .route("/why-choose-us", put(api::replace_content::<WhyChooseUsItem>))
        .route_layer(middleware::from_fn(move |req, next| {
            auth::admin_session_layer(sessions.clone(), req, next)
        }));

    // Public routes
    let public_routes = Router::new()
        .route("/session", post(api::login))
        .route("/tours", get(api::list_tours))
        .route("/featured", get(api::get_featured))
        .route("/blog-posts", get(api::list_content::<BlogPost>))
        .route("/testimonials", get(api::list_content::<Testimonial>))
        .route("/why-choose-us", get(api::list_content::<WhyChooseUsItem>))
        .route("/weather", get(api::get_weather))
        .route("/weather/cities", get(api::list_cities));

    // Health check (no auth required)
    let health_routes = Router::new().route("/health", get(health_check));

    Router::new()
        .nest("/api", public_routes.merge(admin_routes))
        .merge(health_routes)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Health check endpoint.
async fn health_check() -> &'static str {
    "OK"
}
