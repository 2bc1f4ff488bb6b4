//! A pretend storefront that refuses to be framed.
//!
//! Run it, then point the proxy at it:
//!
//! ```text
//! cargo run --example mock_upstream
//! FRAME_PROXY_UPSTREAM=http://127.0.0.1:8081 cargo run -- --config demos/local.toml
//! ```

use axum::{
    http::header,
    response::{Html, IntoResponse, Redirect},
    routing::{get, post},
    Router,
};
use std::net::SocketAddr;

const ORIGIN: &str = "http://127.0.0.1:8081";

async fn home() -> impl IntoResponse {
    let page = format!(
        r#"<!doctype html>
<html>
  <head><link rel="stylesheet" href="/assets/site.css"></head>
  <body>
    <h1>Pretend Shop</h1>
    <a href="/products/widget">Widget</a>
    <a href="{ORIGIN}/cart">Cart</a>
    <form action="/cart/add" method="post"><button>Add to cart</button></form>
  </body>
</html>
"#
    );
    (
        [
            (header::X_FRAME_OPTIONS, "DENY"),
            (header::CONTENT_SECURITY_POLICY, "frame-ancestors 'none'"),
        ],
        Html(page),
    )
}

async fn stylesheet() -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "text/css")],
        "body { font-family: sans-serif; }\n",
    )
}

async fn add_to_cart() -> Redirect {
    Redirect::to(&format!("{ORIGIN}/cart"))
}

async fn cart() -> Html<&'static str> {
    Html("<html><body><p>Cart is empty.</p><a href=\"/\">Home</a></body></html>")
}

#[tokio::main]
async fn main() {
    let app = Router::new()
        .route("/", get(home))
        .route("/products/widget", get(home))
        .route("/assets/site.css", get(stylesheet))
        .route("/cart", get(cart))
        .route("/cart/add", post(add_to_cart));

    let addr = SocketAddr::from(([127, 0, 0, 1], 8081));
    println!("Pretend shop is listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await.unwrap();
    axum::serve(listener, app).await.unwrap();
}
