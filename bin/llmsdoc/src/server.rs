//! HTTP server for the llms endpoints

use std::{
    collections::BTreeMap,
    sync::{Arc, PoisonError, RwLock},
};

use axum::{
    Router,
    extract::State,
    http::{HeaderValue, StatusCode, Uri, header},
    response::{IntoResponse, Response},
    routing::get,
};
use llmsdoc_core::{CategoryKey, CategoryRegistry, Config, Resolution, Resolver, SharedRegistry};
use llmsdoc_generator::{
    AggregateError, AggregatedArtifact, Aggregator, ContentCollector, IndexGenerator, fallback,
    precompute,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

/// Content type of every document the server returns.
pub const MARKDOWN: &str = "text/markdown; charset=utf-8";

/// Artifacts computed ahead of time for one registry snapshot.
#[derive(Debug)]
struct Precomputed {
    registry: Arc<CategoryRegistry>,
    artifacts: BTreeMap<CategoryKey, AggregatedArtifact>,
}

/// Shared server state.
#[derive(Clone)]
pub struct AppState {
    config: Arc<Config>,
    registry: SharedRegistry,
    resolver: Resolver,
    index: Arc<IndexGenerator>,
    aggregator: Arc<Aggregator>,
    cache: Arc<RwLock<Option<Arc<Precomputed>>>>,
}

impl AppState {
    /// Create server state over a registry that may be replaced later.
    pub fn new(config: Config, registry: SharedRegistry) -> Self {
        let collector = ContentCollector::new(&config.content.root)
            .with_extensions(&config.content.extensions);
        Self {
            resolver: Resolver::new(config.routes.prefix.clone()),
            index: Arc::new(IndexGenerator::new(config.clone())),
            aggregator: Arc::new(Aggregator::new(collector)),
            config: Arc::new(config),
            registry,
            cache: Arc::new(RwLock::new(None)),
        }
    }

    /// The site configuration.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// The replaceable registry.
    pub fn registry(&self) -> &SharedRegistry {
        &self.registry
    }

    /// Aggregate every category of the current registry and serve those
    /// results until the registry changes. Blocks; returns the artifact count.
    pub fn precompute(&self) -> Result<usize, AggregateError> {
        let registry = self.registry.snapshot();
        let artifacts = precompute(&self.aggregator, &registry)?;
        let count = artifacts.len();

        let mut cache = self.cache.write().unwrap_or_else(PoisonError::into_inner);
        *cache = Some(Arc::new(Precomputed {
            registry,
            artifacts,
        }));
        Ok(count)
    }

    /// Cached artifact, if it was computed for this very snapshot.
    fn cached(&self, registry: &Arc<CategoryRegistry>, key: &CategoryKey) -> Option<String> {
        let cache = self.cache.read().unwrap_or_else(PoisonError::into_inner);
        let precomputed = cache.as_ref()?;
        if !Arc::ptr_eq(&precomputed.registry, registry) {
            return None;
        }
        precomputed.artifacts.get(key).map(|a| a.content.clone())
    }
}

/// Create the router.
pub fn create_router(state: AppState) -> Router {
    let prefix = state.resolver.prefix().to_string();
    Router::new()
        .route(&format!("/{prefix}"), get(index_handler))
        .route(&format!("/{prefix}/"), get(index_handler))
        .route(&format!("/{prefix}/{{*path}}"), get(category_handler))
        .fallback(fallback_handler)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::new().allow_origin(Any).allow_methods(Any))
        .with_state(state)
}

fn markdown(status: StatusCode, body: String) -> Response {
    (status, [(header::CONTENT_TYPE, MARKDOWN)], body).into_response()
}

fn redirect(location: &str) -> Option<Response> {
    let value = HeaderValue::from_str(location).ok()?;
    Some((StatusCode::FOUND, [(header::LOCATION, value)]).into_response())
}

/// `/x/y.txt` redirects to `/x/y`; anything unusable redirects to the index.
fn text_redirect(state: &AppState, uri: &Uri) -> Option<Response> {
    let stripped = uri
        .path()
        .strip_suffix(state.config.routes.text_suffix.as_str())?;

    let index_path = state.resolver.index_path();
    let target = if stripped.trim_matches('/').is_empty() {
        index_path.clone()
    } else {
        match uri.query() {
            Some(query) => format!("{stripped}?{query}"),
            None => stripped.to_string(),
        }
    };

    tracing::debug!(from = %uri, to = %target, "plain-text redirect");
    redirect(&target)
        .or_else(|| redirect(&index_path))
        .or_else(|| Some(StatusCode::FOUND.into_response()))
}

async fn index_handler(State(state): State<AppState>) -> Response {
    let registry = state.registry.snapshot();
    markdown(StatusCode::OK, state.index.generate(&registry))
}

async fn category_handler(State(state): State<AppState>, uri: Uri) -> Response {
    if let Some(response) = text_redirect(&state, &uri) {
        return response;
    }

    let registry = state.registry.snapshot();
    match state.resolver.resolve(&registry, uri.path()) {
        Resolution::Index => markdown(StatusCode::OK, state.index.generate(&registry)),
        Resolution::NotFound {
            attempted,
            available,
        } => markdown(
            StatusCode::NOT_FOUND,
            fallback::not_found(&state.resolver, &attempted, &available),
        ),
        Resolution::Found { key, config } => {
            if let Some(content) = state.cached(&registry, &key) {
                tracing::debug!(category = %key, "serving precomputed artifact");
                return markdown(StatusCode::OK, content);
            }

            let aggregator = state.aggregator.clone();
            let result = tokio::task::spawn_blocking(move || aggregator.aggregate(&config)).await;

            let reason = match result {
                Ok(Ok(artifact)) => return markdown(StatusCode::OK, artifact.content),
                Ok(Err(e)) => e.to_string(),
                Err(e) => format!("aggregation task failed: {e}"),
            };
            tracing::error!(category = %key, error = %reason, "aggregation failed");
            markdown(
                StatusCode::INTERNAL_SERVER_ERROR,
                fallback::aggregation_failed(&state.resolver, &key, &reason),
            )
        }
    }
}

async fn fallback_handler(State(state): State<AppState>, uri: Uri) -> Response {
    if let Some(response) = text_redirect(&state, &uri) {
        return response;
    }
    markdown(
        StatusCode::NOT_FOUND,
        format!(
            "# Not found\n\nNothing is served at `{}`. The documentation index is at {}.\n",
            uri.path(),
            state.resolver.index_path()
        ),
    )
}
