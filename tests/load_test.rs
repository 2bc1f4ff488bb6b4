//! Load testing for the framing proxy.

use std::time::{Duration, Instant};

mod common;

use common::{proxy_config, start_mock_upstream, start_proxy, MockResponse};

#[tokio::test]
async fn test_load_performance() {
    // 1. Setup mock upstream serving a small page
    let upstream = start_mock_upstream(|origin, req| {
        let body = format!(
            "<html><body><a href=\"{origin}{}\">self</a><img src=\"/pixel.gif\"></body></html>",
            req.target
        );
        MockResponse::new(200, body).header("Content-Type", "text/html")
    })
    .await;

    // 2. Start proxy
    let (proxy_addr, _shutdown) = start_proxy(proxy_config(&upstream.origin())).await;

    // 3. Run load test
    let concurrency = 20;
    let requests_per_task = 25;
    let total_requests = concurrency * requests_per_task;

    let client = reqwest::Client::builder().no_proxy().build().unwrap();
    let start = Instant::now();

    let mut handles = Vec::new();
    for task in 0..concurrency {
        let client = client.clone();
        let url = format!("http://{}/proxy/page/{}", proxy_addr, task);
        handles.push(tokio::spawn(async move {
            let mut success = 0;
            for _ in 0..requests_per_task {
                if let Ok(res) = client.get(&url).send().await {
                    if res.status().is_success() {
                        let body = res.text().await.unwrap_or_default();
                        // Each response carries the link for its own request.
                        let expected = format!("href=\"/proxy/page/{}\"", task);
                        if body.contains(&expected) && body.contains("src=\"/proxy/pixel.gif\"") {
                            success += 1;
                        }
                    }
                }
            }
            success
        }));
    }

    let mut total_success = 0;
    for handle in handles {
        total_success += handle.await.unwrap();
    }

    let duration = start.elapsed();
    let rps = total_requests as f64 / duration.as_secs_f64();

    println!("Load Test Results:");
    println!("  Total Requests: {}", total_requests);
    println!("  Successful:     {}", total_success);
    println!("  Duration:       {:?}", duration);
    println!("  Throughput:     {:.2} req/s", rps);

    assert_eq!(total_success, total_requests);
    assert!(duration < Duration::from_secs(60));
}
