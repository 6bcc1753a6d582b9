//! Route groups and route registration.
//!
//! A group carries a path prefix, a snapshot of tags and inheritable
//! parameters, and a middleware stack. Registering a handler on it wires
//! the axum route and documents the operation in the same call; the
//! returned [`Route`] lets the caller refine the documentation afterwards.

use crate::context::RequestContext;
use crate::error::HttpError;
use crate::handler::{into_method_router, method_filter};
use crate::server::Server;
use axum::routing::MethodRouter;
use fragua_openapi::{
    normalize_pattern, ApiType, GroupMeta, Operation, ParamDecl, ParamLocation, RouteMeta,
    SchemaDecl,
};
use http::Method;
use serde::Serialize;
use std::convert::Infallible;
use std::future::Future;
use std::sync::Arc;

type MiddlewareFn = Arc<dyn Fn(MethodRouter) -> MethodRouter + Send + Sync>;

/// A registration scope: path prefix, tag chain, inherited parameters and
/// middleware. Cheap to clone; children snapshot the parent at creation,
/// so later parent changes never leak into already-created children.
#[derive(Clone)]
pub struct RouterGroup {
    server: Server,
    prefix: String,
    meta: GroupMeta,
    middlewares: Vec<MiddlewareFn>,
    hidden: bool,
}

impl RouterGroup {
    pub(crate) fn root(server: Server) -> Self {
        Self {
            server,
            prefix: String::new(),
            meta: GroupMeta::default(),
            middlewares: Vec::new(),
            hidden: false,
        }
    }

    /// Child group under `path`. The last path segment becomes the child's
    /// group tag, applied to its routes when auto group tags are enabled.
    pub fn group(&self, path: &str) -> Self {
        let path = normalize_pattern(path);
        let group_tag = path
            .trim_matches('/')
            .rsplit('/')
            .next()
            .filter(|segment| !segment.is_empty())
            .map(String::from);
        Self {
            server: self.server.clone(),
            prefix: join_paths(&self.prefix, &path),
            meta: GroupMeta {
                tags: self.meta.tags.clone(),
                group_tag,
                hide_group_tag: false,
                params: self.meta.params.clone(),
            },
            middlewares: self.middlewares.clone(),
            hidden: self.hidden,
        }
    }

    /// Keep serving this group's routes but leave them out of the OpenAPI
    /// document. Child groups inherit the flag.
    pub fn hide(mut self) -> Self {
        self.hidden = true;
        self
    }

    pub fn show(mut self) -> Self {
        self.hidden = false;
        self
    }

    /// Replace the tag chain applied to every route of this group.
    pub fn tags(mut self, tags: &[&str]) -> Self {
        self.meta.tags = tags.iter().map(|tag| tag.to_string()).collect();
        self
    }

    pub fn add_tags(mut self, tags: &[&str]) -> Self {
        for tag in tags {
            if !self.meta.tags.iter().any(|existing| existing == tag) {
                self.meta.tags.push(tag.to_string());
            }
        }
        self
    }

    pub fn remove_tags(mut self, tags: &[&str]) -> Self {
        self.meta.tags.retain(|existing| !tags.contains(&existing.as_str()));
        self
    }

    /// Keep tagging routes with the group tag but leave it out of the
    /// document's top-level tag list.
    pub fn hide_group_tag(mut self) -> Self {
        self.meta.hide_group_tag = true;
        self
    }

    pub fn show_group_tag(mut self) -> Self {
        self.meta.hide_group_tag = false;
        self
    }

    /// Declare a parameter inherited by every route registered afterwards.
    pub fn param(mut self, param: ParamDecl) -> Self {
        self.meta.params.push(param);
        self
    }

    pub fn query_param(self, name: &str, description: &str) -> Self {
        self.param(ParamDecl {
            name: name.to_string(),
            location: ParamLocation::Query,
            description: description.to_string(),
            required: false,
            example: None,
        })
    }

    pub fn header_param(self, name: &str, description: &str) -> Self {
        self.param(ParamDecl {
            name: name.to_string(),
            location: ParamLocation::Header,
            description: description.to_string(),
            required: false,
            example: None,
        })
    }

    /// Wrap every route registered afterwards in `layer`. Middleware added
    /// first runs outermost.
    pub fn use_middleware<L>(mut self, layer: L) -> Self
    where
        L: tower::Layer<axum::routing::Route> + Clone + Send + Sync + 'static,
        L::Service: tower::Service<
                axum::extract::Request,
                Error = Infallible,
            > + Clone
            + Send
            + Sync
            + 'static,
        <L::Service as tower::Service<axum::extract::Request>>::Response:
            axum::response::IntoResponse + 'static,
        <L::Service as tower::Service<axum::extract::Request>>::Future: Send + 'static,
    {
        self.middlewares
            .push(Arc::new(move |router| router.layer(layer.clone())));
        self
    }

    pub fn get<C, T, F, Fut>(&self, path: &str, handler: F) -> Route
    where
        C: RequestContext + 'static,
        T: Serialize + ApiType + Send + 'static,
        F: Fn(C) -> Fut + Clone + Send + Sync + 'static,
        Fut: Future<Output = Result<T, HttpError>> + Send + 'static,
    {
        self.handle(Method::GET, path, handler)
    }

    pub fn post<C, T, F, Fut>(&self, path: &str, handler: F) -> Route
    where
        C: RequestContext + 'static,
        T: Serialize + ApiType + Send + 'static,
        F: Fn(C) -> Fut + Clone + Send + Sync + 'static,
        Fut: Future<Output = Result<T, HttpError>> + Send + 'static,
    {
        self.handle(Method::POST, path, handler)
    }

    pub fn put<C, T, F, Fut>(&self, path: &str, handler: F) -> Route
    where
        C: RequestContext + 'static,
        T: Serialize + ApiType + Send + 'static,
        F: Fn(C) -> Fut + Clone + Send + Sync + 'static,
        Fut: Future<Output = Result<T, HttpError>> + Send + 'static,
    {
        self.handle(Method::PUT, path, handler)
    }

    pub fn patch<C, T, F, Fut>(&self, path: &str, handler: F) -> Route
    where
        C: RequestContext + 'static,
        T: Serialize + ApiType + Send + 'static,
        F: Fn(C) -> Fut + Clone + Send + Sync + 'static,
        Fut: Future<Output = Result<T, HttpError>> + Send + 'static,
    {
        self.handle(Method::PATCH, path, handler)
    }

    pub fn delete<C, T, F, Fut>(&self, path: &str, handler: F) -> Route
    where
        C: RequestContext + 'static,
        T: Serialize + ApiType + Send + 'static,
        F: Fn(C) -> Fut + Clone + Send + Sync + 'static,
        Fut: Future<Output = Result<T, HttpError>> + Send + 'static,
    {
        self.handle(Method::DELETE, path, handler)
    }

    /// Register `handler` for every HTTP method. Without a single method
    /// to document under, the route stays out of the OpenAPI document.
    pub fn all<C, T, F, Fut>(&self, path: &str, handler: F)
    where
        C: RequestContext + 'static,
        T: Serialize + ApiType + Send + 'static,
        F: Fn(C) -> Fut + Clone + Send + Sync + 'static,
        Fut: Future<Output = Result<T, HttpError>> + Send + 'static,
    {
        let method_router = into_method_router::<C, T, F, Fut>(
            None,
            Arc::new(self.server.hooks_snapshot()),
            handler,
        );
        self.mount(path, method_router);
    }

    /// Mount a plain axum method router under this group's prefix and
    /// middleware. Bypasses documentation entirely.
    pub fn mount(&self, path: &str, mut method_router: MethodRouter) {
        let full_path = join_paths(&self.prefix, &normalize_pattern(path));
        for middleware in self.middlewares.iter().rev() {
            method_router = middleware(method_router);
        }
        self.server.mount(&full_path, method_router);
    }

    /// Register `handler` under one HTTP method.
    pub fn handle<C, T, F, Fut>(&self, method: Method, path: &str, handler: F) -> Route
    where
        C: RequestContext + 'static,
        T: Serialize + ApiType + Send + 'static,
        F: Fn(C) -> Fut + Clone + Send + Sync + 'static,
        Fut: Future<Output = Result<T, HttpError>> + Send + 'static,
    {
        let doc_method = method.as_str().to_ascii_lowercase();
        self.register(method_filter(&method), &doc_method, path, handler)
    }

    fn register<C, T, F, Fut>(
        &self,
        filter: Option<axum::routing::MethodFilter>,
        doc_method: &str,
        path: &str,
        handler: F,
    ) -> Route
    where
        C: RequestContext + 'static,
        T: Serialize + ApiType + Send + 'static,
        F: Fn(C) -> Fut + Clone + Send + Sync + 'static,
        Fut: Future<Output = Result<T, HttpError>> + Send + 'static,
    {
        let full_path = join_paths(&self.prefix, &normalize_pattern(path));

        let mut meta = RouteMeta::new(doc_method, &full_path);
        meta.request = SchemaDecl::of(<C::Body as ApiType>::descriptor());
        meta.response = SchemaDecl::of(T::descriptor());

        let mut method_router = into_method_router::<C, T, F, Fut>(
            filter,
            Arc::new(self.server.hooks_snapshot()),
            handler,
        );
        for middleware in self.middlewares.iter().rev() {
            method_router = middleware(method_router);
        }

        if self.hidden {
            self.server.mount(&full_path, method_router);
        } else {
            self.server
                .register_route(&self.meta, &meta, &full_path, method_router);
        }

        Route {
            server: self.server.clone(),
            group: self.meta.clone(),
            meta,
            hidden: self.hidden,
        }
    }
}

/// Handle to one registered route, used to refine its documentation.
/// Every setter rebuilds the operation, so later calls on the same route
/// replace what earlier calls wrote at the same spot.
pub struct Route {
    server: Server,
    group: GroupMeta,
    meta: RouteMeta,
    hidden: bool,
}

impl Route {
    pub fn summary(mut self, text: &str) -> Self {
        self.caller_operation().summary = Some(text.to_string());
        self.commit()
    }

    pub fn description(mut self, text: &str) -> Self {
        self.caller_operation().description = Some(text.to_string());
        self.commit()
    }

    pub fn operation_id(mut self, id: &str) -> Self {
        self.caller_operation().operation_id = id.to_string();
        self.commit()
    }

    pub fn deprecated(mut self) -> Self {
        self.caller_operation().deprecated = true;
        self.commit()
    }

    pub fn add_tags(mut self, tags: &[&str]) -> Self {
        let operation = self.caller_operation();
        for tag in tags {
            if !operation.tags.iter().any(|existing| existing == tag) {
                operation.tags.push(tag.to_string());
            }
        }
        self.commit()
    }

    /// Drop tags from this route, group-inherited ones included.
    pub fn remove_tags(mut self, tags: &[&str]) -> Self {
        self.group
            .tags
            .retain(|existing| !tags.contains(&existing.as_str()));
        if let Some(operation) = &mut self.meta.operation {
            operation.tags.retain(|existing| !tags.contains(&existing.as_str()));
        }
        self.commit()
    }

    pub fn query_param(self, name: &str, description: &str) -> Self {
        self.param(name, ParamLocation::Query, description)
    }

    pub fn header_param(self, name: &str, description: &str) -> Self {
        self.param(name, ParamLocation::Header, description)
    }

    pub fn cookie_param(self, name: &str, description: &str) -> Self {
        self.param(name, ParamLocation::Cookie, description)
    }

    fn param(mut self, name: &str, location: ParamLocation, description: &str) -> Self {
        self.group.params.push(ParamDecl {
            name: name.to_string(),
            location,
            description: description.to_string(),
            required: false,
            example: None,
        });
        self.commit()
    }

    /// Declare a non-success response. A declaration for a code already
    /// present, including a server-wide one, wins over it.
    pub fn response(mut self, code: u16, schema: SchemaDecl) -> Self {
        self.meta
            .errors
            .push(fragua_openapi::ResponseDecl { code, schema });
        self.commit()
    }

    /// Override the documented request body.
    pub fn request(mut self, schema: SchemaDecl) -> Self {
        self.meta.request = schema;
        self.commit()
    }

    /// Replace the documented success schema.
    pub fn returns(mut self, schema: SchemaDecl) -> Self {
        self.meta.response = schema;
        self.commit()
    }

    fn caller_operation(&mut self) -> &mut Operation {
        self.meta.operation.get_or_insert_with(Operation::default)
    }

    fn commit(self) -> Self {
        if !self.hidden {
            self.server.document_route(&self.group, &self.meta);
        }
        self
    }
}

fn join_paths(prefix: &str, path: &str) -> String {
    let prefix = prefix.trim_end_matches('/');
    let joined = if path.starts_with('/') {
        format!("{prefix}{path}")
    } else {
        format!("{prefix}/{path}")
    };
    if joined.is_empty() {
        "/".to_string()
    } else {
        joined
    }
}
