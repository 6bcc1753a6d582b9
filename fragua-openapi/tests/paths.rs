use fragua_openapi::{
    brace_to_colon, colon_to_brace, default_operation_id, normalize_pattern, openapi_path,
    parse_path_params,
};

// ── Parameter extraction ────────────────────────────────────────────────

#[test]
fn plain_path_has_no_params() {
    assert!(parse_path_params("/posts").is_empty());
}

#[test]
fn braced_tokens_are_listed_in_order() {
    assert_eq!(
        parse_path_params("/posts/{postId}/comments/{commentId}"),
        vec!["postId".to_string(), "commentId".to_string()]
    );
}

#[test]
fn dollar_token_is_kept_raw() {
    assert_eq!(parse_path_params("/posts/{$}"), vec!["$".to_string()]);
}

#[test]
fn catch_all_token_keeps_its_star() {
    assert_eq!(parse_path_params("/files/{*path}"), vec!["*path".to_string()]);
}

#[test]
fn unclosed_brace_stops_the_scan() {
    assert!(parse_path_params("/posts/{id").is_empty());
}

// ── Pattern conversion ──────────────────────────────────────────────────

#[test]
fn colon_form_converts_to_brace_form() {
    assert_eq!(colon_to_brace("/a/:name/b/:other"), "/a/{name}/b/{other}");
    assert_eq!(colon_to_brace("/a/:name"), "/a/{name}");
    assert_eq!(colon_to_brace("/plain"), "/plain");
}

#[test]
fn brace_form_converts_back_to_colon_form() {
    assert_eq!(brace_to_colon("/a/{name}/b"), "/a/:name/b");
}

#[test]
fn conversions_are_inverse_on_simple_patterns() {
    let pattern = "/item/{id}/sub/{key}";
    assert_eq!(colon_to_brace(&brace_to_colon(pattern)), pattern);
}

#[test]
fn normalize_accepts_both_forms() {
    assert_eq!(normalize_pattern("/item/:id"), "/item/{id}");
    assert_eq!(normalize_pattern("/item/{id}"), "/item/{id}");
}

// ── Document path and operation id ──────────────────────────────────────

#[test]
fn openapi_path_drops_the_catch_all_star() {
    assert_eq!(openapi_path("/files/{*path}"), "/files/{path}");
    assert_eq!(openapi_path("/posts/{id}"), "/posts/{id}");
}

#[test]
fn default_operation_id_uses_colon_tokens() {
    assert_eq!(default_operation_id("get", "/posts/{id}"), "get_/posts/:id");
    assert_eq!(default_operation_id("post", "/posts"), "post_/posts");
}
