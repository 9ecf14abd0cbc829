use axum::{
    middleware::{from_fn, from_fn_with_state},
    routing::get,
    Router,
};
use chrono::Utc;
use sqlx::PgPool;
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;
use tracing::debug;

use crate::activity::ActivityLogger;
use crate::config::AppConfig;
use crate::database::{DatabaseError, DatabaseManager};
use crate::handlers::{self, protected, public};
use crate::middleware::{self, RateLimitScope};
use crate::security::RateLimiter;
use crate::session::SessionStore;

/// Everything a request handler may need, passed explicitly
#[derive(Clone, Debug)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub db: PgPool,
    pub sessions: SessionStore,
    pub limiter: RateLimiter,
    pub activity: ActivityLogger,
}

impl AppState {
    /// Build state from config. Must run inside a tokio runtime.
    pub fn new(config: AppConfig) -> Result<Self, DatabaseError> {
        let db = DatabaseManager::connect_lazy(&config.database)?;
        Ok(Self::with_pool(config, db))
    }

    pub fn with_pool(config: AppConfig, db: PgPool) -> Self {
        let sessions = SessionStore::new(config.security.session_ttl_secs);
        let limiter = RateLimiter::new(
            config.security.rate_limit_per_minute,
            config.security.rate_limit_window_secs,
        );
        let activity = ActivityLogger::spawn(db.clone());
        Self {
            config: Arc::new(config),
            db,
            sessions,
            limiter,
            activity,
        }
    }

    /// Purge idle sessions and closed rate-limit windows once a minute
    pub fn spawn_maintenance(&self) {
        let sessions = self.sessions.clone();
        let limiter = self.limiter.clone();
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(Duration::from_secs(60));
            loop {
                interval.tick().await;
                let now = Utc::now();
                let sessions_purged = sessions.purge_expired(now).await;
                let buckets_purged = limiter.purge_expired(now.timestamp()).await;
                debug!(
                    "Maintenance: purged {} sessions, {} rate-limit buckets",
                    sessions_purged, buckets_purged
                );
            }
        });
    }
}

pub fn app(state: AppState) -> Router {
    Router::new()
        // Public
        .route("/", get(handlers::root))
        .route("/health", get(handlers::health))
        .merge(public_routes(&state))
        // Session required
        .merge(protected_routes())
        .fallback(handlers::not_found)
        // Global middleware, outermost first
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(from_fn(middleware::preflight_middleware))
                .layer(middleware::cors_layer(&state.config.security.cors_origins))
                .layer(from_fn_with_state(state.clone(), middleware::client_ip_middleware))
                .layer(from_fn_with_state(state.clone(), middleware::session_middleware)),
        )
        .with_state(state)
}

fn public_routes(state: &AppState) -> Router<AppState> {
    let scope = |label: &'static str| RateLimitScope {
        limiter: state.limiter.clone(),
        label,
    };

    Router::new()
        .route(
            "/auth",
            get(public::auth::status)
                .post(public::auth::submit)
                .fallback(handlers::method_not_allowed)
                .layer(from_fn_with_state(scope("auth"), middleware::rate_limit)),
        )
        .route(
            "/contact",
            get(public::contact::token)
                .post(public::contact::submit)
                .fallback(handlers::method_not_allowed)
                .layer(from_fn_with_state(scope("contact"), middleware::rate_limit)),
        )
}

fn protected_routes() -> Router<AppState> {
    Router::new()
        .route("/dashboard", get(protected::dashboard::show).fallback(handlers::method_not_allowed))
        .route(
            "/clients",
            get(protected::clients::get)
                .post(protected::clients::create)
                .put(protected::clients::update)
                .delete(protected::clients::delete)
                .fallback(handlers::method_not_allowed),
        )
        .route(
            "/invoices",
            get(protected::invoices::get)
                .post(protected::invoices::create)
                .put(protected::invoices::update)
                .delete(protected::invoices::delete)
                .fallback(handlers::method_not_allowed),
        )
        .route(
            "/projects",
            get(protected::projects::get)
                .post(protected::projects::create)
                .put(protected::projects::update)
                .delete(protected::projects::delete)
                .fallback(handlers::method_not_allowed),
        )
        .route(
            "/tasks",
            get(protected::tasks::get)
                .post(protected::tasks::create)
                .put(protected::tasks::update)
                .delete(protected::tasks::delete)
                .fallback(handlers::method_not_allowed),
        )
        .route_layer(from_fn(middleware::require_auth))
}
