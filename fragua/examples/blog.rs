//! Small blog API showing typed handlers and the derived document.
//!
//! Run with `cargo run --example blog`, then:
//!
//! ```sh
//! curl localhost:8080/posts/1
//! curl localhost:8080/openapi.json
//! ```

use fragua::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize)]
struct Post {
    id: i64,
    title: String,
    body: Option<String>,
}

impl ApiType for Post {
    fn descriptor() -> TypeDescriptor {
        StructDescriptor::new::<Self>()
            .field(
                FieldDescriptor::new::<i64>("id")
                    .description("post identifier")
                    .example("1"),
            )
            .field(FieldDescriptor::new::<String>("title").validate("required,min=1,max=120"))
            .field(FieldDescriptor::new::<Option<String>>("body").omit_empty())
            .build()
    }
}

#[derive(Serialize, Deserialize)]
struct NewPost {
    title: String,
}

impl ApiType for NewPost {
    fn descriptor() -> TypeDescriptor {
        StructDescriptor::new::<Self>()
            .field(FieldDescriptor::new::<String>("title").validate("required,min=1,max=120"))
            .build()
    }
}

async fn list_posts(_ctx: ContextNoBody) -> Result<Vec<Post>, HttpError> {
    Ok(vec![Post {
        id: 1,
        title: "hello".to_string(),
        body: None,
    }])
}

async fn get_post(ctx: ContextNoBody) -> Result<Post, HttpError> {
    let id: i64 = ctx
        .path_param("id")
        .and_then(|raw| raw.parse().ok())
        .ok_or_else(|| HttpError::BadRequest("id must be an integer".to_string()))?;
    if id != 1 {
        return Err(HttpError::NotFound(format!("no post with id {id}")));
    }
    Ok(Post {
        id,
        title: "hello".to_string(),
        body: Some("first post".to_string()),
    })
}

async fn create_post(ctx: ContextWithBody<NewPost>) -> Result<Post, HttpError> {
    Ok(Post {
        id: 2,
        title: ctx.body.title.clone(),
        body: None,
    })
}

#[tokio::main]
async fn main() -> std::io::Result<()> {
    fragua::init_tracing();

    let server = Server::new(
        ServerConfig::default()
            .title("blog api")
            .version("1.0.0")
            .description("posts, minus the comments"),
    );

    let posts = server.group("/posts");
    posts.get("/", list_posts).summary("List posts");
    posts.get("/{id}", get_post).summary("Fetch one post");
    posts
        .post("/", create_post)
        .summary("Create a post")
        .response(
            422,
            SchemaDecl::of(fragua::ErrorBody::descriptor()).describe("title rejected"),
        );

    server.serve("0.0.0.0:8080").await
}
