use fragua_openapi::{
    resolve, resolve_with_depth, ApiType, FieldDescriptor, Schema, SchemaRef, SchemaRegistry,
    StructDescriptor, TypeDescriptor, UNKNOWN_INTERFACE,
};

struct Author {
    _name: String,
}

impl ApiType for Author {
    fn descriptor() -> TypeDescriptor {
        StructDescriptor::new::<Self>()
            .field(FieldDescriptor::new::<String>("name"))
            .build()
    }
}

struct Post {
    _id: i64,
    _author: Author,
    _labels: Vec<String>,
}

impl ApiType for Post {
    fn descriptor() -> TypeDescriptor {
        StructDescriptor::new::<Self>()
            .field(FieldDescriptor::new::<i64>("id"))
            .field(FieldDescriptor::new::<Author>("author"))
            .field(FieldDescriptor::new::<Vec<String>>("labels"))
            .build()
    }
}

struct Paged<T> {
    _items: Vec<T>,
    _page: i64,
}

impl<T: ApiType> ApiType for Paged<T> {
    fn descriptor() -> TypeDescriptor {
        StructDescriptor::new::<Self>()
            .field(FieldDescriptor::new::<Vec<T>>("items"))
            .field(FieldDescriptor::new::<i64>("page"))
            .build()
    }
}

struct Renamed;

impl ApiType for Renamed {
    fn descriptor() -> TypeDescriptor {
        StructDescriptor::new::<Self>().build()
    }

    fn openapi_name() -> Option<&'static str> {
        Some("PublicName")
    }
}

fn schema_of<'a>(registry: &'a SchemaRegistry, name: &str) -> &'a Schema {
    registry.get(name).unwrap()
}

// ── Struct resolution ───────────────────────────────────────────────────

#[test]
fn struct_resolves_to_component_reference() {
    let mut registry = SchemaRegistry::new();
    let tag = resolve(&mut registry, Some(&Post::descriptor()));

    assert_eq!(tag.name, "Post");
    assert_eq!(tag.schema.as_ref_path(), Some("#/components/schemas/Post"));

    let schema = schema_of(&registry, "Post");
    assert!(schema.properties.contains_key("id"));
    assert!(schema.properties.contains_key("author"));
    assert!(schema.properties.contains_key("labels"));
}

#[test]
fn nested_struct_properties_become_shared_references() {
    let mut registry = SchemaRegistry::new();
    resolve(&mut registry, Some(&Post::descriptor()));

    let post = schema_of(&registry, "Post");
    assert_eq!(
        post.properties["author"].as_ref_path(),
        Some("#/components/schemas/Author")
    );
    assert!(registry.contains("Author"));
}

#[test]
fn repeated_resolution_registers_once() {
    let mut registry = SchemaRegistry::new();
    resolve(&mut registry, Some(&Author::descriptor()));
    let before = registry.len();
    let tag = resolve(&mut registry, Some(&Author::descriptor()));

    assert_eq!(tag.name, "Author");
    assert_eq!(registry.len(), before);
}

// ── Indirections and sequences ──────────────────────────────────────────

#[test]
fn option_and_box_are_transparent() {
    let mut registry = SchemaRegistry::new();
    let plain = resolve(&mut registry, Some(&Author::descriptor()));
    let wrapped = resolve(&mut registry, Some(&Option::<Box<Author>>::descriptor()));

    assert_eq!(plain, wrapped);
}

#[test]
fn sequence_shares_element_name_with_array_schema() {
    let mut registry = SchemaRegistry::new();
    let tag = resolve(&mut registry, Some(&Vec::<Author>::descriptor()));

    assert_eq!(tag.name, "Author");
    let schema = tag.schema.as_inline().unwrap();
    assert_eq!(
        schema.items.as_deref(),
        Some(&SchemaRef::component("Author"))
    );
}

#[test]
fn primitive_registers_under_kind_name() {
    let mut registry = SchemaRegistry::new();
    let tag = resolve(&mut registry, Some(&i64::descriptor()));

    assert_eq!(tag.name, "integer");
    assert!(schema_of(&registry, "integer").is_integer());
}

// ── Depth guard ─────────────────────────────────────────────────────────

#[test]
fn four_indirections_still_resolve() {
    let mut registry = SchemaRegistry::new();
    type Deep = Option<Box<Option<Box<Author>>>>;
    let tag = resolve(&mut registry, Some(&Deep::descriptor()));

    assert_eq!(tag.name, "Author");
}

#[test]
fn exhausted_depth_returns_default_sentinel() {
    let mut registry = SchemaRegistry::new();
    type TooDeep = Option<Box<Option<Box<Option<Author>>>>>;
    let tag = resolve(&mut registry, Some(&TooDeep::descriptor()));

    assert_eq!(tag.name, "default");
}

#[test]
fn zero_depth_budget_short_circuits() {
    let mut registry = SchemaRegistry::new();
    let tag = resolve_with_depth(&mut registry, Some(&Author::descriptor()), 0);

    assert_eq!(tag.name, "default");
    // The sentinel schema itself is materialized so the reference resolves.
    assert!(registry.contains("default"));
    assert!(!registry.contains("Author"));
}

// ── Unknown types ───────────────────────────────────────────────────────

#[test]
fn absent_type_maps_to_unknown_interface() {
    let mut registry = SchemaRegistry::new();
    let tag = resolve(&mut registry, None);

    assert_eq!(tag.name, UNKNOWN_INTERFACE);
    assert!(registry.contains(UNKNOWN_INTERFACE));
}

#[test]
fn erased_value_type_maps_to_unknown_interface() {
    let mut registry = SchemaRegistry::new();
    let tag = resolve(&mut registry, Some(&serde_json::Value::descriptor()));

    assert_eq!(tag.name, UNKNOWN_INTERFACE);
}

// ── Canonical naming ────────────────────────────────────────────────────

#[test]
fn generic_instantiations_get_distinct_names() {
    let mut registry = SchemaRegistry::new();
    let ints = resolve(&mut registry, Some(&Paged::<i32>::descriptor()));
    let strings = resolve(&mut registry, Some(&Paged::<String>::descriptor()));

    assert_eq!(ints.name, "PagedI32");
    assert_eq!(strings.name, "PagedString");
    assert!(registry.contains("PagedI32"));
    assert!(registry.contains("PagedString"));
}

#[test]
fn custom_name_overrides_canonical_naming() {
    let mut registry = SchemaRegistry::new();
    let tag = resolve(&mut registry, Some(&Renamed::descriptor()));

    assert_eq!(tag.name, "PublicName");
}

// ── Reference cycles ────────────────────────────────────────────────────

struct Employee {
    _name: String,
    _team: Option<Box<Team>>,
}

impl ApiType for Employee {
    fn descriptor() -> TypeDescriptor {
        StructDescriptor::new::<Self>()
            .field(FieldDescriptor::new::<String>("name"))
            .field(FieldDescriptor::new::<Option<Box<Team>>>("team"))
            .build()
    }
}

struct Team {
    _name: String,
    _members: Vec<Employee>,
}

impl ApiType for Team {
    fn descriptor() -> TypeDescriptor {
        StructDescriptor::new::<Self>()
            .field(FieldDescriptor::new::<String>("name"))
            .field(FieldDescriptor::new::<Vec<Employee>>("members"))
            .build()
    }
}

struct Category {
    _label: String,
    _children: Vec<Category>,
}

impl ApiType for Category {
    fn descriptor() -> TypeDescriptor {
        StructDescriptor::new::<Self>()
            .field(FieldDescriptor::new::<String>("label"))
            .field(FieldDescriptor::new::<Vec<Category>>("children"))
            .build()
    }
}

#[test]
fn mutually_recursive_structs_resolve_to_cross_references() {
    let mut registry = SchemaRegistry::new();
    let tag = resolve(&mut registry, Some(&Employee::descriptor()));

    assert_eq!(tag.name, "Employee");
    assert!(registry.contains("Team"));

    let employee = schema_of(&registry, "Employee");
    assert_eq!(
        employee.properties["team"].as_ref_path(),
        Some("#/components/schemas/Team")
    );

    let team = schema_of(&registry, "Team");
    let members = team.properties["members"].as_inline().unwrap();
    assert_eq!(
        members.items.as_deref().unwrap().as_ref_path(),
        Some("#/components/schemas/Employee")
    );
}

#[test]
fn self_referential_struct_resolves_to_its_own_reference() {
    let mut registry = SchemaRegistry::new();
    let tag = resolve(&mut registry, Some(&Category::descriptor()));

    assert_eq!(tag.name, "Category");
    let category = schema_of(&registry, "Category");
    let children = category.properties["children"].as_inline().unwrap();
    assert_eq!(
        children.items.as_deref().unwrap().as_ref_path(),
        Some("#/components/schemas/Category")
    );
    // The finished schema replaced the reservation placeholder.
    assert!(category.properties.contains_key("label"));
}
