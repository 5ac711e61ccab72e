//! # crmctl: organisation-scoped CRM service
//!
//! `crmctl` keeps track of sales leads for many independent organisations. Each
//! organisation is run by an organisor, who creates leads, files them into
//! categories and hands them to agents. Agents only ever see the leads they
//! have been given.
//!
//! ## Architecture
//!
//! The application is built on [Axum](https://github.com/tokio-rs/axum) for the HTTP layer.
//! Persistence goes through the [`db::Storage`] trait, backed by PostgreSQL in production or
//! by in-memory tables for development and tests.
//!
//! ### Request Flow
//!
//! A request to `/api/v1/*` carries a session token, either as the session cookie or as a
//! bearer token. The [`access::Actor`] extractor verifies the token and loads the account
//! together with its organisation or agent profile. The handler passes the actor to the
//! [`access::AccessEngine`], which decides from the actor's role which rows it may see for
//! the requested operation and hands that scope to storage, so every query is filtered by
//! organisation (and, for agents, by assignment) in the statement itself.
//!
//! ### Core Components
//!
//! - [`api`]: handlers and JSON models
//! - [`access`]: the scoping engine and all CRM operations
//! - [`auth`]: password hashing, session tokens and extractors
//! - [`db`]: the storage trait with Postgres and in-memory backends
//! - [`notifications`]: emails sent after leads and agents are created
//!
//! ## Quick Start
//!
//! ```no_run
//! use clap::Parser;
//! use crmctl::{Application, Config};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let args = crmctl::config::Args::parse();
//!     let config = Config::load(&args)?;
//!     crmctl::telemetry::init_telemetry()?;
//!
//!     let app = Application::new(config).await?;
//!     app.serve(async {
//!         let _ = tokio::signal::ctrl_c().await;
//!     })
//!     .await?;
//!     Ok(())
//! }
//! ```
//!
//! ## Agent accounts
//!
//! Creating an agent provisions its account with a random password that is hashed straight
//! away and never returned, logged or emailed. The invitation email only tells the agent the
//! account exists. crmctl has no password reset, so until one is deployed alongside it an
//! agent cannot log in on its own: operators must set the agent's password hash directly in
//! the `accounts` table, or issue a session token signed with the configured `secret_key`.
//!
//! ## Configuration
//!
//! See the [`config`] module for configuration options.

pub mod access;
pub mod api;
pub mod auth;
pub mod config;
pub mod db;
mod email;
pub mod errors;
pub mod notifications;
mod openapi;
pub mod telemetry;
pub mod types;

#[cfg(test)]
mod test;
#[cfg(test)]
mod test_utils;

use std::sync::Arc;

use axum::{
    Json, Router,
    http::{self, HeaderValue},
    routing::{get, post, put},
};
use bon::Builder;
use sqlx::{PgPool, postgres::PgPoolOptions};
use tokio::net::TcpListener;
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::{Level, info};
use utoipa::OpenApi;
use utoipa_scalar::{Scalar, Servable};

use crate::{
    access::AccessEngine,
    config::{CorsOrigin, DatabaseConfig, PoolSettings},
    db::{MemoryStorage, PostgresStorage, Storage},
    openapi::ApiDoc,
};
pub use config::Config;

/// Application state shared across all request handlers.
///
/// ```ignore
/// let state = AppState::builder()
///     .config(config)
///     .engine(engine)
///     .build();
/// ```
#[derive(Clone, Builder)]
pub struct AppState {
    pub config: Config,
    pub engine: AccessEngine,
}

/// Get the crmctl database migrator
pub fn migrator() -> sqlx::migrate::Migrator {
    sqlx::migrate!("./migrations")
}

async fn connect_pool(url: &str, pool: &PoolSettings) -> anyhow::Result<PgPool> {
    let pool = PgPoolOptions::new()
        .max_connections(pool.max_connections)
        .min_connections(pool.min_connections)
        .acquire_timeout(pool.acquire_timeout)
        .idle_timeout(pool.idle_timeout)
        .connect(url)
        .await?;
    Ok(pool)
}

fn create_cors_layer(config: &Config) -> anyhow::Result<CorsLayer> {
    let mut origins = Vec::new();
    for origin in &config.auth.security.cors.allowed_origins {
        let header_value = match origin {
            CorsOrigin::Wildcard => "*".parse::<HeaderValue>()?,
            CorsOrigin::Url(url) => url.as_str().trim_end_matches('/').parse::<HeaderValue>()?,
        };
        origins.push(header_value);
    }

    let mut cors = CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([
            http::Method::GET,
            http::Method::POST,
            http::Method::PUT,
            http::Method::PATCH,
            http::Method::DELETE,
        ])
        .allow_headers([http::header::CONTENT_TYPE, http::header::AUTHORIZATION])
        .allow_credentials(config.auth.security.cors.allow_credentials)
        .expose_headers(vec![http::header::LOCATION]);

    if let Some(max_age) = config.auth.security.cors.max_age {
        cors = cors.max_age(std::time::Duration::from_secs(max_age));
    }

    Ok(cors)
}

/// Build the application router: authentication, the CRM API under `/api/v1`,
/// health and API docs, wrapped in CORS and request tracing.
pub fn build_router(state: AppState) -> anyhow::Result<Router> {
    use api::handlers::{agents, auth, categories, leads, me};

    let auth_routes = Router::new()
        .route("/authentication/register", post(auth::register))
        .route("/authentication/login", post(auth::login))
        .route("/authentication/logout", post(auth::logout))
        .with_state(state.clone());

    let api_routes = Router::new()
        .route("/me", get(me::get_me))
        // Leads
        .route("/leads", get(leads::list_leads).post(leads::create_lead))
        .route("/leads/unassigned", get(leads::list_unassigned_leads))
        .route(
            "/leads/{lead_id}",
            get(leads::get_lead).patch(leads::update_lead).delete(leads::delete_lead),
        )
        .route("/leads/{lead_id}/assignable-agents", get(leads::list_assignable_agents))
        .route("/leads/{lead_id}/agent", put(leads::assign_agent))
        .route("/leads/{lead_id}/category", put(leads::update_lead_category))
        // Categories
        .route("/categories", get(categories::list_categories).post(categories::create_category))
        .route(
            "/categories/{category_id}",
            get(categories::get_category)
                .patch(categories::update_category)
                .delete(categories::delete_category),
        )
        // Agents
        .route("/agents", get(agents::list_agents).post(agents::create_agent))
        .route(
            "/agents/{agent_id}",
            get(agents::get_agent).patch(agents::update_agent).delete(agents::delete_agent),
        )
        .with_state(state.clone());

    let router = Router::new()
        .route("/healthz", get(|| async { "OK" }))
        .route("/api-docs/openapi.json", get(|| async { Json(ApiDoc::openapi()) }))
        .merge(Scalar::with_url("/docs", ApiDoc::openapi()))
        .merge(auth_routes)
        .nest("/api/v1", api_routes)
        .layer(create_cors_layer(&state.config)?)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_request(DefaultOnRequest::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        );

    Ok(router)
}

/// The assembled service: storage, engine and router.
pub struct Application {
    router: Router,
    app_state: AppState,
    config: Config,
    pool: Option<PgPool>,
}

impl Application {
    /// Connect storage, run migrations, seed the initial organisor and build the router.
    pub async fn new(config: Config) -> anyhow::Result<Self> {
        let (storage, pool): (Arc<dyn Storage>, Option<PgPool>) = match &config.database {
            DatabaseConfig::Memory => {
                info!("Using in-memory storage; data will not survive a restart");
                (Arc::new(MemoryStorage::new()), None)
            }
            DatabaseConfig::External {
                url,
                pool,
                run_migrations,
            } => {
                let pool = connect_pool(url, pool).await?;
                if *run_migrations {
                    info!("Running database migrations");
                    migrator().run(&pool).await?;
                }
                (Arc::new(PostgresStorage::new(pool.clone())), Some(pool))
            }
        };

        let notifier = notifications::notifier_for(&config)?;
        let engine = AccessEngine::new(storage, notifier, &config);

        if let Some(seed) = &config.initial_organisor {
            let account = engine.ensure_organisor(seed).await?;
            info!(username = %account.username, "Initial organisor ready");
        }

        let app_state = AppState::builder().config(config.clone()).engine(engine).build();
        let router = build_router(app_state.clone())?;

        Ok(Self {
            router,
            app_state,
            config,
            pool,
        })
    }

    /// Shared state, for callers that build their own router around it
    pub fn state(&self) -> &AppState {
        &self.app_state
    }

    #[cfg(test)]
    pub fn into_test_server(self) -> axum_test::TestServer {
        axum_test::TestServer::new(self.router.into_make_service()).expect("Failed to create test server")
    }

    /// Start serving the application
    pub async fn serve<F>(self, shutdown: F) -> anyhow::Result<()>
    where
        F: std::future::Future<Output = ()> + Send + 'static,
    {
        let bind_addr = self.config.bind_address();
        let listener = TcpListener::bind(&bind_addr).await?;
        info!("crmctl listening on http://{}, available at http://localhost:{}", bind_addr, self.config.port);

        axum::serve(listener, self.router.into_make_service())
            .with_graceful_shutdown(shutdown)
            .await?;

        if let Some(pool) = self.pool {
            info!("Closing database connections...");
            pool.close().await;
        }

        Ok(())
    }
}
