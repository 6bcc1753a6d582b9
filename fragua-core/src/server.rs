//! The server: one shared registration state behind a mutex.
//!
//! Routes, the OpenAPI document, the schema registry and the hook set all
//! live in [`ServerInner`]; groups and routes hold a cloned handle and
//! lock it for the duration of each registration, so concurrent
//! registrations serialize instead of racing.

use crate::context::ReadOptions;
use crate::group::RouterGroup;
use crate::handler::{ErrorHandlerFn, Hooks, TransformFn};
use crate::serialize::{EncoderFn, SerializerFn};
use axum::routing::MethodRouter;
use axum::Router;
use fragua_openapi::{
    register_operation, GroupMeta, OpenApi, ResponseDecl, RouteMeta, SchemaDecl, SchemaRegistry,
    SecurityScheme,
};
use http::header;
use std::io;
use std::sync::{Arc, Mutex};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub title: String,
    pub version: String,
    pub description: Option<String>,
    pub openapi_path: String,
    pub disable_openapi: bool,
    pub pretty_spec: bool,
    pub auto_group_tags: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            title: "OpenAPI".to_string(),
            version: "0.0.1".to_string(),
            description: None,
            openapi_path: "/openapi.json".to_string(),
            disable_openapi: false,
            pretty_spec: true,
            auto_group_tags: true,
        }
    }
}

impl ServerConfig {
    pub fn title(mut self, title: &str) -> Self {
        self.title = title.to_string();
        self
    }

    pub fn version(mut self, version: &str) -> Self {
        self.version = version.to_string();
        self
    }

    pub fn description(mut self, description: &str) -> Self {
        self.description = Some(description.to_string());
        self
    }

    pub fn openapi_path(mut self, path: &str) -> Self {
        self.openapi_path = path.to_string();
        self
    }

    pub fn disable_openapi(mut self) -> Self {
        self.disable_openapi = true;
        self
    }

    pub fn disable_auto_group_tags(mut self) -> Self {
        self.auto_group_tags = false;
        self
    }

    pub fn compact_spec(mut self) -> Self {
        self.pretty_spec = false;
        self
    }
}

struct ServerInner {
    config: ServerConfig,
    router: Router,
    spec: OpenApi,
    registry: SchemaRegistry,
    global_responses: Vec<ResponseDecl>,
    hooks: Hooks,
}

/// Handle to the shared registration state. Clones point at the same
/// server.
#[derive(Clone)]
pub struct Server {
    inner: Arc<Mutex<ServerInner>>,
}

impl Default for Server {
    fn default() -> Self {
        Self::new(ServerConfig::default())
    }
}

impl Server {
    pub fn new(config: ServerConfig) -> Self {
        let spec = OpenApi::new(&config.title, &config.version, config.description.as_deref());
        Self {
            inner: Arc::new(Mutex::new(ServerInner {
                config,
                router: Router::new(),
                spec,
                registry: SchemaRegistry::new(),
                global_responses: Vec::new(),
                hooks: Hooks::default(),
            })),
        }
    }

    /// Root registration scope: no prefix, no tags.
    pub fn routes(&self) -> RouterGroup {
        RouterGroup::root(self.clone())
    }

    pub fn group(&self, path: &str) -> RouterGroup {
        self.routes().group(path)
    }

    /// Declare a response documented on every route. Route-local
    /// declarations for the same status code win over it.
    pub fn global_response(self, code: u16, schema: SchemaDecl) -> Self {
        self.lock().global_responses.push(ResponseDecl { code, schema });
        self
    }

    /// Rewrite every error before it is serialized. Applies to routes
    /// registered after this call.
    pub fn with_error_handler(self, handler: ErrorHandlerFn) -> Self {
        self.lock().hooks.error_handler = Some(handler);
        self
    }

    /// Transform every success value before encoding. Applies to routes
    /// registered after this call.
    pub fn with_transform(self, transform: TransformFn) -> Self {
        self.lock().hooks.transform = Some(transform);
        self
    }

    /// Replace content negotiation entirely for success responses.
    pub fn with_serializer(self, serializer: SerializerFn) -> Self {
        self.lock().hooks.custom_serializer = Some(serializer);
        self
    }

    /// Add or replace the encoder for one content type.
    pub fn with_encoder(self, content_type: &str, encoder: EncoderFn) -> Self {
        self.lock().hooks.encoders.insert(content_type, encoder);
        self
    }

    pub fn with_read_options(self, options: ReadOptions) -> Self {
        self.lock().hooks.read_options = options;
        self
    }

    pub fn with_security_scheme(self, name: &str, scheme: SecurityScheme) -> Self {
        self.lock()
            .spec
            .components
            .security_schemes
            .insert(name.to_string(), scheme);
        self
    }

    /// The document as registered so far, with the schema registry merged
    /// into its components. Validation problems are logged, never fatal.
    pub fn openapi_spec(&self) -> OpenApi {
        let inner = self.lock();
        let mut spec = inner.spec.clone();
        spec.components
            .schemas
            .extend(inner.registry.schemas().clone());
        if let Err(err) = spec.validate() {
            error!(%err, "openapi document failed validation");
        }
        spec
    }

    pub fn marshal_spec(&self) -> Result<String, serde_json::Error> {
        let pretty = self.lock().config.pretty_spec;
        self.openapi_spec().to_json(pretty)
    }

    /// Freeze registration into a plain axum router, with the document
    /// endpoint mounted and request tracing applied.
    pub fn into_router(self) -> Router {
        let spec_json = self.marshal_spec().unwrap_or_else(|err| {
            error!(%err, "cannot serialize openapi document");
            "{}".to_string()
        });
        let mut inner = self.lock();
        let mut router = std::mem::take(&mut inner.router);
        if !inner.config.disable_openapi {
            let payload = spec_json;
            router = router.route(
                &inner.config.openapi_path,
                axum::routing::get(move || {
                    let payload = payload.clone();
                    async move {
                        (
                            [(header::CONTENT_TYPE, "application/json")],
                            payload,
                        )
                    }
                }),
            );
            info!(path = %inner.config.openapi_path, "openapi document mounted");
        }
        router.layer(TraceLayer::new_for_http())
    }

    pub async fn serve(self, addr: &str) -> io::Result<()> {
        let router = self.into_router();
        let listener = tokio::net::TcpListener::bind(addr).await?;
        info!(%addr, "listening");
        axum::serve(listener, router).await
    }

    pub(crate) fn hooks_snapshot(&self) -> Hooks {
        self.lock().hooks.clone()
    }

    pub(crate) fn register_route(
        &self,
        group: &GroupMeta,
        route: &RouteMeta,
        path: &str,
        method_router: MethodRouter,
    ) {
        let mut inner = self.lock();
        let inner = &mut *inner;
        register_operation(
            &mut inner.spec,
            &mut inner.registry,
            &inner.global_responses,
            group,
            route,
            inner.config.auto_group_tags,
        );
        let router = std::mem::take(&mut inner.router);
        inner.router = router.route(path, method_router);
    }

    pub(crate) fn mount(&self, path: &str, method_router: MethodRouter) {
        let mut inner = self.lock();
        let router = std::mem::take(&mut inner.router);
        inner.router = router.route(path, method_router);
    }

    pub(crate) fn document_route(&self, group: &GroupMeta, route: &RouteMeta) {
        let mut inner = self.lock();
        let inner = &mut *inner;
        register_operation(
            &mut inner.spec,
            &mut inner.registry,
            &inner.global_responses,
            group,
            route,
            inner.config.auto_group_tags,
        );
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, ServerInner> {
        match self.inner.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

/// Console subscriber honoring `RUST_LOG`, defaulting to `info`.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

/// Permissive CORS for development setups.
pub fn default_cors() -> CorsLayer {
    CorsLayer::permissive()
}
