//! Failure injection tests for the framing proxy.

use std::time::Duration;

use axum::http::StatusCode;
use tokio::net::TcpListener;

mod common;

use common::{proxy_config, start_mock_upstream, start_proxy, test_client, MockResponse};

#[tokio::test]
async fn test_unreachable_upstream_returns_bad_gateway() {
    // Reserve a port, then free it so nothing is listening there.
    let dead_addr = {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        listener.local_addr().unwrap()
    };

    let (proxy_addr, _shutdown) =
        start_proxy(proxy_config(&format!("http://{}", dead_addr))).await;

    let res = test_client()
        .get(format!("http://{}/proxy/products", proxy_addr))
        .send()
        .await
        .expect("Proxy unreachable");

    assert_eq!(res.status(), StatusCode::BAD_GATEWAY);
    assert_eq!(res.headers().get("content-type").unwrap(), "text/plain; charset=utf-8");
    let body = res.text().await.unwrap();
    assert!(body.starts_with("Proxy error:"), "body was {:?}", body);
}

#[tokio::test]
async fn test_slow_upstream_returns_gateway_timeout() {
    let upstream = start_mock_upstream(|_, _| {
        MockResponse::new(200, "late").delayed(Duration::from_secs(3))
    })
    .await;

    let mut config = proxy_config(&upstream.origin());
    config.timeouts.request_secs = 1;
    let (proxy_addr, _shutdown) = start_proxy(config).await;

    let started = std::time::Instant::now();
    let res = test_client()
        .get(format!("http://{}/proxy/slow", proxy_addr))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::GATEWAY_TIMEOUT);
    assert!(started.elapsed() < Duration::from_secs(3));
    assert!(!res.text().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_undecodable_html_is_relayed_raw() {
    let raw: Vec<u8> = b"<html><body><a href=\"/x\">\xff\xfe</a></body></html>".to_vec();
    let expected = raw.clone();
    let upstream = start_mock_upstream(move |_, _| {
        MockResponse::new(200, raw.clone()).header("Content-Type", "text/html")
    })
    .await;

    let (proxy_addr, _shutdown) = start_proxy(proxy_config(&upstream.origin())).await;
    let res = test_client()
        .get(format!("http://{}/proxy/", proxy_addr))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(res.headers().get("x-frame-options").unwrap(), "ALLOWALL");
    assert_eq!(res.bytes().await.unwrap().as_ref(), expected.as_slice());
}

#[tokio::test]
async fn test_upstream_closing_without_response() {
    // Accepts and immediately drops every connection.
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        while let Ok((socket, _)) = listener.accept().await {
            drop(socket);
        }
    });

    let (proxy_addr, _shutdown) = start_proxy(proxy_config(&format!("http://{}", addr))).await;
    let res = test_client()
        .get(format!("http://{}/proxy/", proxy_addr))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::BAD_GATEWAY);
}

#[tokio::test]
async fn test_shutdown_stops_accepting() {
    let upstream = start_mock_upstream(|_, _| MockResponse::new(200, "ok")).await;
    let (proxy_addr, shutdown) = start_proxy(proxy_config(&upstream.origin())).await;
    let client = test_client();

    let res = client
        .get(format!("http://{}/proxy/", proxy_addr))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    shutdown.trigger();
    tokio::time::sleep(Duration::from_millis(200)).await;

    let res = client
        .get(format!("http://{}/proxy/", proxy_addr))
        .timeout(Duration::from_secs(2))
        .send()
        .await;
    assert!(res.is_err(), "proxy should be down after shutdown");
}
