use fragua_openapi::{
    OpenApi, Operation, Parameter, RequestBodyRef, Response, Schema, SchemaRef, SpecError, Tag,
};

fn base_spec() -> OpenApi {
    OpenApi::new("api", "1.0.0", Some("test document"))
}

fn success(schema: SchemaRef) -> Response {
    Response::with_content("OK", &schema, &["application/json".to_string()])
}

// ── Serialization shape ─────────────────────────────────────────────────

#[test]
fn document_serializes_with_the_pinned_version() {
    let spec = base_spec();
    let json: serde_json::Value = serde_json::from_str(&spec.to_json(false).unwrap()).unwrap();

    assert_eq!(json["openapi"], "3.1.0");
    assert_eq!(json["info"]["title"], "api");
    assert_eq!(json["info"]["description"], "test document");
    // Empty collections are left out entirely.
    assert!(json.get("components").is_none());
    assert!(json.get("tags").is_none());
}

#[test]
fn operations_nest_under_path_and_method() {
    let mut spec = base_spec();
    let mut operation = Operation::default();
    operation.operation_id = "listPosts".to_string();
    operation
        .responses
        .insert("200".to_string(), success(SchemaRef::inline(Schema::object())));
    spec.add_operation("/posts", "get", operation);

    let json: serde_json::Value = serde_json::from_str(&spec.to_json(true).unwrap()).unwrap();
    assert_eq!(json["paths"]["/posts"]["get"]["operationId"], "listPosts");
    assert!(json["paths"]["/posts"]["get"]["responses"]["200"].is_object());
}

#[test]
fn schema_refs_serialize_as_ref_objects() {
    let json = serde_json::to_value(SchemaRef::component("Post")).unwrap();
    assert_eq!(json["$ref"], "#/components/schemas/Post");

    let round_trip: SchemaRef = serde_json::from_value(json).unwrap();
    assert_eq!(round_trip, SchemaRef::component("Post"));
}

// ── Tag registry ────────────────────────────────────────────────────────

#[test]
fn duplicate_tags_register_once() {
    let mut spec = base_spec();
    spec.add_tag(Tag { name: "posts".to_string(), description: None });
    spec.add_tag(Tag { name: "posts".to_string(), description: None });

    assert_eq!(spec.tags.len(), 1);
}

// ── Validation ──────────────────────────────────────────────────────────

#[test]
fn valid_document_passes_validation() {
    let mut spec = base_spec();
    let mut operation = Operation::default();
    operation.operation_id = "getPost".to_string();
    operation.add_parameter(Parameter::path("id"));
    operation
        .responses
        .insert("200".to_string(), success(SchemaRef::component("Post")));
    spec.components.schemas.insert("Post".to_string(), Schema::object());
    spec.add_operation("/posts/{id}", "get", operation);

    assert_eq!(spec.validate(), Ok(()));
}

#[test]
fn dangling_schema_reference_is_reported() {
    let mut spec = base_spec();
    let mut operation = Operation::default();
    operation.operation_id = "getPost".to_string();
    operation
        .responses
        .insert("200".to_string(), success(SchemaRef::component("Missing")));
    spec.add_operation("/posts", "get", operation);

    assert_eq!(
        spec.validate(),
        Err(SpecError::UndefinedReference {
            reference: "#/components/schemas/Missing".to_string()
        })
    );
}

#[test]
fn dangling_request_body_reference_is_reported() {
    let mut spec = base_spec();
    let mut operation = Operation::default();
    operation.operation_id = "createPost".to_string();
    operation.request_body = Some(RequestBodyRef::component("Missing"));
    spec.add_operation("/posts", "post", operation);

    assert_eq!(
        spec.validate(),
        Err(SpecError::UndefinedReference {
            reference: "#/components/requestBodies/Missing".to_string()
        })
    );
}

#[test]
fn duplicate_operation_ids_are_reported() {
    let mut spec = base_spec();
    let mut first = Operation::default();
    first.operation_id = "same".to_string();
    let mut second = Operation::default();
    second.operation_id = "same".to_string();
    spec.add_operation("/a", "get", first);
    spec.add_operation("/b", "get", second);

    assert_eq!(
        spec.validate(),
        Err(SpecError::DuplicateOperationId {
            operation_id: "same".to_string()
        })
    );
}
