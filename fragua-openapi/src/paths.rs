//! Path-pattern handling.
//!
//! OpenAPI records templates in brace form (`/item/{id}`); routing engines
//! may use a colon form (`/item/:id`). The two transforms here are lossless
//! in both directions: a contiguous run of the parameter prefix up to the
//! next separator maps 1:1 to a bracketed token and back.

/// List the `{token}` parameters of a path, in declaration order.
///
/// Tokens are returned raw: `/item/{$}` yields `["$"]`, a catch-all
/// `/files/{*path}` yields `["*path"]`. A path without tokens yields an
/// empty list.
pub fn parse_path_params(path: &str) -> Vec<String> {
    let mut params = Vec::new();
    let mut rest = path;
    while let Some(open) = rest.find('{') {
        let Some(close) = rest[open + 1..].find('}') else {
            break;
        };
        let token = &rest[open + 1..open + 1 + close];
        if !token.is_empty() {
            params.push(token.to_string());
        }
        rest = &rest[open + 1 + close + 1..];
    }
    params
}

/// Convert a colon-form pattern to brace form: `/a/:name/b` → `/a/{name}/b`.
/// Already-braced segments pass through untouched.
pub fn colon_to_brace(path: &str) -> String {
    let mut out = String::with_capacity(path.len());
    let mut rest = path;
    while !rest.is_empty() {
        let Some(colon) = rest.find(':') else {
            out.push_str(rest);
            break;
        };
        out.push_str(&rest[..colon]);
        rest = &rest[colon + 1..];
        let end = rest.find('/').unwrap_or(rest.len());
        out.push('{');
        out.push_str(&rest[..end]);
        out.push('}');
        rest = &rest[end..];
    }
    out
}

/// Inverse of [`colon_to_brace`]: `/a/{name}/b` → `/a/:name/b`.
pub fn brace_to_colon(path: &str) -> String {
    let mut out = String::with_capacity(path.len());
    let mut rest = path;
    while !rest.is_empty() {
        let Some(open) = rest.find('{') else {
            out.push_str(rest);
            break;
        };
        let Some(close) = rest[open + 1..].find('}') else {
            out.push_str(rest);
            break;
        };
        out.push_str(&rest[..open]);
        out.push(':');
        out.push_str(&rest[open + 1..open + 1 + close]);
        rest = &rest[open + 1 + close + 1..];
    }
    out
}

/// Canonical brace form for any accepted pattern.
pub fn normalize_pattern(path: &str) -> String {
    if path.contains(':') {
        colon_to_brace(path)
    } else {
        path.to_string()
    }
}

/// Document key for a pattern: catch-all markers are dropped so
/// `/files/{*path}` is recorded as `/files/{path}`.
pub fn openapi_path(path: &str) -> String {
    let mut out = String::with_capacity(path.len());
    let mut chars = path.chars().peekable();
    while let Some(c) = chars.next() {
        out.push(c);
        if c == '{' && chars.peek() == Some(&'*') {
            chars.next();
        }
    }
    out
}

/// Default operation id: `METHOD_path` with template delimiters rewritten
/// to a stable token form (`GET /post/{id}` → `GET_/post/:id`).
pub fn default_operation_id(method: &str, path: &str) -> String {
    let normalized = path.replace('{', ":").replace('}', "");
    format!("{method}_{normalized}")
}
