//! Web layer: axum `Router`, `AppState`, and route registration.
//!
//! Grounded on the teacher's `web/mod.rs` `WebServer`/`create_router`
//! shape (a struct wrapping `Router` + bound `SocketAddr`, routes
//! registered against a `Clone` `AppState`, CORS applied as the outermost
//! layer) generalized to the SCIM surface of spec §6: every resource
//! route is registered twice, once under `/v2` and once at root, for
//! backward compatibility with clients that don't prefix.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use axum::routing::{delete, get, patch, post, put};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::config::Config;
use crate::upstream::UpstreamClient;

pub mod handlers;

#[derive(Clone)]
pub struct AppState {
    pub upstream: Arc<dyn UpstreamClient>,
    pub config: Arc<Config>,
}

pub struct WebServer {
    app: Router,
    addr: SocketAddr,
}

impl WebServer {
    pub fn new(config: Config, upstream: Arc<dyn UpstreamClient>) -> Result<Self> {
        let addr: SocketAddr = format!("{}:{}", config.proxy_host, config.proxy_port).parse()?;
        let state = AppState {
            upstream,
            config: Arc::new(config),
        };
        Ok(Self {
            app: create_router(state),
            addr,
        })
    }

    pub async fn serve(self) -> Result<()> {
        let listener = tokio::net::TcpListener::bind(self.addr).await?;
        tracing::info!(addr = %self.addr, "scim-proxy listening");
        axum::serve(listener, self.app).await?;
        Ok(())
    }

    /// Exposed for integration tests, which drive the router in-process
    /// via `tower::ServiceExt::oneshot` instead of binding a socket.
    pub fn into_router(self) -> Router {
        self.app
    }
}

pub fn create_router(state: AppState) -> Router {
    let cors = build_cors_layer(&state.config.cors_origins_list());

    Router::new()
        .route("/health", get(handlers::health::health_check))
        .merge(resource_routes("/v2"))
        .merge(resource_routes(""))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

fn resource_routes(prefix: &str) -> Router<AppState> {
    Router::new()
        .route(&format!("{prefix}/Users"), get(handlers::users::list_users))
        .route(&format!("{prefix}/Users"), post(handlers::users::create_user))
        .route(&format!("{prefix}/Users/:id"), get(handlers::users::get_user))
        .route(&format!("{prefix}/Users/:id"), put(handlers::users::update_user))
        .route(&format!("{prefix}/Users/:id"), patch(handlers::users::patch_user))
        .route(&format!("{prefix}/Users/:id"), delete(handlers::users::delete_user))
        .route(&format!("{prefix}/Groups"), get(handlers::groups::list_groups))
        .route(&format!("{prefix}/Groups"), post(handlers::groups::create_group))
        .route(&format!("{prefix}/Groups/:id"), get(handlers::groups::get_group))
        .route(&format!("{prefix}/Groups/:id"), put(handlers::groups::update_group))
        .route(&format!("{prefix}/Groups/:id"), patch(handlers::groups::patch_group))
        .route(&format!("{prefix}/Groups/:id"), delete(handlers::groups::delete_group))
        .route(
            &format!("{prefix}/ServiceProviderConfig"),
            get(handlers::discovery::service_provider_config),
        )
        .route(&format!("{prefix}/ResourceTypes"), get(handlers::discovery::resource_types))
}

fn build_cors_layer(origins: &[String]) -> CorsLayer {
    if origins.iter().any(|o| o == "*") {
        CorsLayer::permissive()
    } else {
        let parsed: Vec<axum::http::HeaderValue> = origins
            .iter()
            .filter_map(|o| o.parse().ok())
            .collect();
        CorsLayer::new().allow_origin(parsed)
    }
}
