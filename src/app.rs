use std::sync::Arc;

use axum::{
    extract::DefaultBodyLimit,
    http::HeaderValue,
    middleware,
    routing::get,
    Router,
};
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    trace::TraceLayer,
};

use crate::auth::TokenValidator;
use crate::config::AppConfig;
use crate::database::ContactStore;
use crate::handlers;
use crate::middleware::bearer_auth_middleware;
use crate::observer::ObserverPipeline;

/// Shared handles for every request
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn ContactStore>,
    pub validator: Arc<dyn TokenValidator>,
    pub pipeline: Arc<ObserverPipeline>,
    pub config: Arc<AppConfig>,
}

impl AppState {
    pub fn new(store: Arc<dyn ContactStore>, validator: Arc<dyn TokenValidator>, config: AppConfig) -> Self {
        Self {
            store,
            validator,
            pipeline: Arc::new(ObserverPipeline::with_default_observers()),
            config: Arc::new(config),
        }
    }
}

/// Full application router
pub fn router(state: AppState) -> Router {
    let max_body = state.config.api.max_request_size_bytes;
    let cors = cors_layer(&state.config);

    let router = Router::new()
        // Public
        .route("/", get(handlers::public::root))
        .route("/api", get(handlers::public::api_index))
        .route("/api/health", get(handlers::public::health))
        // Protected
        .merge(contact_routes(state.clone()))
        .fallback(handlers::fallback::fallback)
        .layer(DefaultBodyLimit::max(max_body))
        .layer(TraceLayer::new_for_http());

    let router = match cors {
        Some(cors) => router.layer(cors),
        None => router,
    };

    router.with_state(state)
}

fn contact_routes(state: AppState) -> Router<AppState> {
    use handlers::protected::contacts;

    Router::new()
        .route(
            "/api/contacts",
            get(contacts::contact_list).post(contacts::contact_create),
        )
        .route("/api/contacts/find-by-email", get(contacts::contact_find_by_email))
        .route(
            "/api/contacts/:id",
            get(contacts::contact_get)
                .patch(contacts::contact_patch)
                .delete(contacts::contact_delete),
        )
        .route_layer(middleware::from_fn_with_state(state, bearer_auth_middleware))
}

fn cors_layer(config: &AppConfig) -> Option<CorsLayer> {
    if !config.security.enable_cors {
        return None;
    }

    let origins = &config.security.cors_origins;
    if origins.is_empty() {
        tracing::warn!("CORS enabled but SECURITY_CORS_ORIGINS is empty; no CORS headers will be sent");
        return None;
    }
    if origins.iter().any(|o| o == "*") {
        return Some(CorsLayer::permissive());
    }

    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|o| match HeaderValue::from_str(o) {
            Ok(v) => Some(v),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin '{}'", o);
                None
            }
        })
        .collect();

    Some(
        CorsLayer::new()
            .allow_origin(AllowOrigin::list(allowed))
            .allow_methods(Any)
            .allow_headers(Any),
    )
}
