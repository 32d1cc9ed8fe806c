use crate::cli::{Args, StorageBackend};
use crate::engine::ProgressEngine;
use crate::store::{GamificationStore, MemoryStore, PgStore};
use anyhow::Context;
use axum::Router;
use axum::routing::{get, post};
use axum_keycloak_auth::PassthroughMode;
use axum_keycloak_auth::instance::{KeycloakAuthInstance, KeycloakConfig};
use axum_keycloak_auth::layer::KeycloakAuthLayer;
use std::sync::Arc;
use tracing::{info, warn};

pub mod catalog;
pub mod cli;
pub mod engine;
pub mod errors;
pub mod model;
pub mod payloads;
pub mod response;
pub mod schema;
pub mod store;

mod api;

pub fn init_router(args: &Args) -> anyhow::Result<Router> {
    info!("Initializing {:?} storage backend...", args.storage_backend);
    let store = init_store(args).context("Failed to initialize storage backend")?;
    let engine = ProgressEngine::new(store, args.requirement_mode);
    info!("Evaluating achievements in {:?} mode", engine.mode());

    if args.auth_disabled {
        warn!("Keycloak authentication is disabled, all routes are public");
        return Ok(init_test_router(engine));
    }

    info!("Initializing Keycloak authentication layer...");
    let keycloak_layer =
        init_protection_layer(args).context("Failed to initialize Keycloak layer")?;

    info!("Initializing router...");
    Ok(init_router_internal(engine, keycloak_layer))
}

pub fn init_test_router(engine: ProgressEngine) -> Router {
    Router::new()
        .nest("/progress", progress_routes())
        .nest("/achievements", achievement_routes())
        .with_state(engine)
}

fn init_router_internal(engine: ProgressEngine, keycloak_layer: KeycloakAuthLayer<String>) -> Router {
    let progress_api = progress_routes().layer(keycloak_layer.clone());
    let achievement_api = achievement_routes().layer(keycloak_layer);

    Router::new()
        .nest("/progress", progress_api)
        .nest("/achievements", achievement_api)
        .with_state(engine)
}

fn init_store(args: &Args) -> anyhow::Result<Arc<dyn GamificationStore>> {
    match args.storage_backend {
        StorageBackend::Postgres => {
            let conn_str = args
                .connection_str
                .as_deref()
                .context("DATABASE_URL is required for the postgres storage backend")?;
            let store = PgStore::connect(conn_str, args.db_pool_max_size)
                .context("Failed to initialize database pool")?;
            Ok(Arc::new(store))
        }
        StorageBackend::Memory => {
            warn!("Using in-memory storage, progress will not survive a restart");
            Ok(Arc::new(MemoryStore::with_catalog(
                catalog::default_catalog(),
            )))
        }
    }
}

fn init_protection_layer(args: &Args) -> anyhow::Result<KeycloakAuthLayer<String>> {
    let config = KeycloakConfig::builder()
        .server(args.keycloak_server_url.clone())
        .realm(args.keycloak_realm.clone())
        .build();

    let instance = KeycloakAuthInstance::new(config);

    let layer = KeycloakAuthLayer::builder()
        .instance(instance)
        .passthrough_mode(PassthroughMode::Block)
        .persist_raw_claims(false)
        .expected_audiences(vec![args.keycloak_audiences.clone()])
        .build();

    Ok(layer)
}

fn progress_routes() -> Router<ProgressEngine> {
    Router::new()
        .route("/award_xp", post(api::progress::award_xp))
        .route(
            "/check_achievements",
            post(api::progress::check_achievements),
        )
        .route("/record_streak_day", post(api::progress::record_streak_day))
        .route(
            "/get_progress/{user_id}",
            get(api::progress::get_progress),
        )
        .route("/get_stats/{user_id}", get(api::progress::get_stats))
        .route("/get_activities", get(api::progress::get_activities))
}

fn achievement_routes() -> Router<ProgressEngine> {
    Router::new()
        .route("/list_catalog", get(api::achievements::list_catalog))
        .route(
            "/save_achievement",
            post(api::achievements::save_achievement),
        )
}
