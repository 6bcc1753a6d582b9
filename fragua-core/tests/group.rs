use axum::body::Body;
use fragua_core::{ContextNoBody, ContextWithBody, HttpError, Server, ServerConfig};
use fragua_openapi::{
    ApiType, FieldDescriptor, SchemaDecl, StructDescriptor, TypeDescriptor,
};
use http::{Request, StatusCode};
use serde::{Deserialize, Serialize};
use tower::ServiceExt;

#[derive(Serialize, Deserialize)]
struct Article {
    slug: String,
}

impl ApiType for Article {
    fn descriptor() -> TypeDescriptor {
        StructDescriptor::new::<Self>()
            .field(FieldDescriptor::new::<String>("slug").validate("required"))
            .build()
    }
}

#[derive(Serialize, Deserialize)]
struct NewArticle {
    slug: String,
}

impl ApiType for NewArticle {
    fn descriptor() -> TypeDescriptor {
        StructDescriptor::new::<Self>()
            .field(FieldDescriptor::new::<String>("slug"))
            .build()
    }
}

#[derive(Serialize)]
struct Problem {
    code: String,
}

impl ApiType for Problem {
    fn descriptor() -> TypeDescriptor {
        StructDescriptor::new::<Self>()
            .field(FieldDescriptor::new::<String>("code"))
            .build()
    }
}

async fn list(_ctx: ContextNoBody) -> Result<Vec<Article>, HttpError> {
    Ok(Vec::new())
}

async fn create(ctx: ContextWithBody<NewArticle>) -> Result<Article, HttpError> {
    Ok(Article {
        slug: ctx.body.slug.clone(),
    })
}

fn spec_json(server: &Server) -> serde_json::Value {
    serde_json::to_value(server.openapi_spec()).unwrap()
}

// ── Document metadata ───────────────────────────────────────────────────

#[test]
fn server_config_lands_in_the_info_block() {
    let server = Server::new(
        ServerConfig::default()
            .title("blog api")
            .version("2.1.0")
            .description("articles and comments"),
    );
    let json = spec_json(&server);

    assert_eq!(json["info"]["title"], "blog api");
    assert_eq!(json["info"]["version"], "2.1.0");
    assert_eq!(json["info"]["description"], "articles and comments");
}

// ── Group tags ──────────────────────────────────────────────────────────

#[test]
fn group_path_segment_becomes_the_operation_tag() {
    let server = Server::default();
    server.group("/articles").get("/", list);
    let spec = server.openapi_spec();

    let operation = spec.operation("/articles/", "get").unwrap();
    assert_eq!(operation.tags, vec!["articles"]);
    assert!(spec.tags.iter().any(|tag| tag.name == "articles"));
}

#[test]
fn nested_groups_keep_the_innermost_tag() {
    let server = Server::default();
    server
        .group("/api/v1")
        .group("/articles")
        .get("/{slug}", list);
    let spec = server.openapi_spec();

    let operation = spec.operation("/api/v1/articles/{slug}", "get").unwrap();
    assert_eq!(operation.tags, vec!["articles"]);
}

#[test]
fn hidden_group_tag_stays_off_the_tag_list() {
    let server = Server::default();
    server.group("/internal").hide_group_tag().get("/", list);
    let spec = server.openapi_spec();

    let operation = spec.operation("/internal/", "get").unwrap();
    assert_eq!(operation.tags, vec!["internal"]);
    assert!(spec.tags.is_empty());
}

#[test]
fn explicit_tags_precede_the_group_tag() {
    let server = Server::default();
    server.group("/articles").add_tags(&["public"]).get("/", list);
    let spec = server.openapi_spec();

    let operation = spec.operation("/articles/", "get").unwrap();
    assert_eq!(operation.tags, vec!["public", "articles"]);
}

// ── Inherited parameters ────────────────────────────────────────────────

#[test]
fn group_params_are_inherited_by_routes() {
    let server = Server::default();
    server
        .group("/articles")
        .query_param("lang", "response language")
        .header_param("X-Request-Id", "correlation id")
        .get("/", list);
    let spec = server.openapi_spec();

    let operation = spec.operation("/articles/", "get").unwrap();
    let names: Vec<&str> = operation
        .parameters
        .iter()
        .map(|param| param.name.as_str())
        .collect();
    assert_eq!(names, vec!["lang", "X-Request-Id"]);
}

// ── Bodies and responses ────────────────────────────────────────────────

#[test]
fn typed_body_documents_a_shared_request_body() {
    let server = Server::default();
    server.routes().post("/articles", create);
    let spec = server.openapi_spec();

    assert!(spec.components.request_bodies.contains_key("NewArticle"));
    assert!(spec.components.schemas.contains_key("NewArticle"));
    let operation = spec.operation("/articles", "post").unwrap();
    assert!(operation.request_body.is_some());
}

#[test]
fn success_schema_comes_from_the_handler_output_type() {
    let server = Server::default();
    server.routes().get("/articles", list);
    let spec = server.openapi_spec();

    assert!(spec.components.schemas.contains_key("Article"));
    let operation = spec.operation("/articles", "get").unwrap();
    assert!(operation.responses.contains_key("200"));
}

#[test]
fn route_local_response_wins_over_the_global_one() {
    let server = Server::default().global_response(
        422,
        SchemaDecl::of(Problem::descriptor()).describe("global validation error"),
    );
    server
        .routes()
        .post("/articles", create)
        .response(
            422,
            SchemaDecl::of(Problem::descriptor()).describe("slug already taken"),
        );
    let spec = server.openapi_spec();

    let operation = spec.operation("/articles", "post").unwrap();
    assert_eq!(operation.responses["422"].description, "slug already taken");
}

#[test]
fn global_response_applies_to_every_route() {
    let server = Server::default().global_response(
        500,
        SchemaDecl::of(Problem::descriptor()).describe("internal error"),
    );
    server.routes().get("/articles", list);
    let spec = server.openapi_spec();

    let operation = spec.operation("/articles", "get").unwrap();
    assert_eq!(operation.responses["500"].description, "internal error");
}

// ── Per-route documentation ─────────────────────────────────────────────

#[test]
fn route_builder_refines_the_documented_operation() {
    let server = Server::default();
    server
        .routes()
        .get("/articles", list)
        .summary("list articles")
        .operation_id("listArticles")
        .deprecated();
    let spec = server.openapi_spec();

    let operation = spec.operation("/articles", "get").unwrap();
    assert_eq!(operation.summary.as_deref(), Some("list articles"));
    assert_eq!(operation.operation_id, "listArticles");
    assert!(operation.deprecated);
}

#[test]
fn colon_patterns_are_accepted_and_documented_in_brace_form() {
    let server = Server::default();
    server.routes().get("/articles/:slug", list);
    let spec = server.openapi_spec();

    let operation = spec.operation("/articles/{slug}", "get").unwrap();
    assert_eq!(operation.parameters[0].name, "slug");
}

#[test]
fn catch_all_routes_document_the_stripped_parameter() {
    let server = Server::default();
    server.routes().get("/files/{*path}", list);
    let spec = server.openapi_spec();

    let operation = spec.operation("/files/{path}", "get").unwrap();
    assert_eq!(operation.parameters[0].name, "path");
    assert_eq!(
        operation.parameters[0].description.as_deref(),
        Some("might contain slashes")
    );
}

#[test]
fn document_validates_after_registration() {
    let server = Server::default();
    let routes = server.routes();
    routes.get("/articles", list);
    routes.post("/articles", create);

    assert_eq!(server.openapi_spec().validate(), Ok(()));
}

// ── Hidden groups ───────────────────────────────────────────────────────

#[tokio::test]
async fn hidden_group_routes_are_served_but_not_documented() {
    let server = Server::default();
    server.group("/internal").hide().get("/health", list);
    server.group("/articles").get("/", list);

    let spec = server.openapi_spec();
    assert!(spec.operation("/internal/health", "get").is_none());
    assert!(spec.operation("/articles/", "get").is_some());

    let router = server.into_router();
    let response = router
        .oneshot(
            Request::get("/internal/health")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[test]
fn hidden_flag_extends_to_child_groups() {
    let server = Server::default();
    let internal = server.group("/internal").hide();
    internal.group("/jobs").get("/", list);
    server.group("/articles").get("/", list);
    let spec = server.openapi_spec();

    assert!(spec.operation("/internal/jobs/", "get").is_none());
    assert!(spec.operation("/articles/", "get").is_some());
}

#[test]
fn show_reenables_documentation() {
    let server = Server::default();
    server.group("/internal").hide().show().get("/", list);

    assert!(server.openapi_spec().operation("/internal/", "get").is_some());
}

// ── Group snapshots ─────────────────────────────────────────────────────

#[test]
fn child_snapshot_ignores_later_parent_tag_changes() {
    let server = Server::default();
    let parent = server.group("/api").add_tags(&["v1"]);
    let child = parent.group("/articles");
    let parent = parent.add_tags(&["admin"]);
    parent.get("/status", list);
    child.get("/", list);
    let spec = server.openapi_spec();

    let child_op = spec.operation("/api/articles/", "get").unwrap();
    assert_eq!(child_op.tags, vec!["v1", "articles"]);
    let parent_op = spec.operation("/api/status", "get").unwrap();
    assert!(parent_op.tags.contains(&"admin".to_string()));
}

#[test]
fn group_params_do_not_leak_into_the_parent_group() {
    let server = Server::default();
    let parent = server.group("/api");
    parent
        .group("/articles")
        .query_param("lang", "response language")
        .get("/", list);
    parent.get("/status", list);
    let spec = server.openapi_spec();

    let child_op = spec.operation("/api/articles/", "get").unwrap();
    assert!(child_op.parameters.iter().any(|param| param.name == "lang"));
    let parent_op = spec.operation("/api/status", "get").unwrap();
    assert!(parent_op.parameters.iter().all(|param| param.name != "lang"));
}

#[test]
fn group_params_do_not_leak_into_a_sibling_group() {
    let server = Server::default();
    let root = server.routes();
    root.group("/a").query_param("lang", "language").get("/", list);
    root.group("/b").get("/", list);
    let spec = server.openapi_spec();

    let sibling = spec.operation("/b/", "get").unwrap();
    assert!(sibling.parameters.iter().all(|param| param.name != "lang"));
}
