//! Concurrent load against a live gateway.
//!
//! Each task carries its own token; the upstream echoes the token it saw, so
//! any cross-talk between in-flight requests shows up as a mismatch.

use std::time::{Duration, Instant};

use serde_json::json;

use booking_gateway::{GatewayServer, ResponseEnvelope, Shutdown};

mod common;
use common::{gateway_config, start_programmable_upstream, MockReply};

#[tokio::test]
async fn test_concurrent_requests_are_isolated() {
    // 1. Upstream echoes the credential back, with a little jitter.
    let upstream = start_programmable_upstream(|request| {
        let token = request
            .headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string();
        let jitter = Duration::from_millis((token.len() % 7) as u64);
        MockReply::json(200, json!({ "data": { "seen": token, "path": request.path_and_query } }))
            .delayed(jitter)
    })
    .await;

    // 2. Start gateway on an ephemeral port.
    let shutdown = Shutdown::new();
    let server = GatewayServer::new(gateway_config(&upstream.base_url())).unwrap();
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let gateway_addr = listener.local_addr().unwrap();
    let server_shutdown = shutdown.subscribe();
    let server_task = tokio::spawn(async move { server.run(listener, server_shutdown).await });

    // 3. Fire requests in parallel.
    let concurrency = 20;
    let requests_per_task = 25;
    let total_requests = concurrency * requests_per_task;

    let client = reqwest::Client::new();
    let start = Instant::now();

    let mut tasks = Vec::new();
    for task_id in 0..concurrency {
        let client = client.clone();
        tasks.push(tokio::spawn(async move {
            let mut latencies = Vec::new();
            for n in 0..requests_per_task {
                let token = format!("user-{task_id}-req-{n}");
                let url = format!("http://{gateway_addr}/api/bookings/{task_id}-{n}");
                let req_start = Instant::now();
                let res = client.get(&url).bearer_auth(&token).send().await.unwrap();
                assert_eq!(res.status(), 200);

                let envelope: ResponseEnvelope = res.json().await.unwrap();
                let data = envelope.data.unwrap();
                assert_eq!(data["seen"], format!("Bearer {token}").as_str());
                assert_eq!(data["path"], format!("/api/bookings/{task_id}-{n}").as_str());
                latencies.push(req_start.elapsed());
            }
            latencies
        }));
    }

    let mut all_latencies = Vec::new();
    for task in tasks {
        all_latencies.extend(task.await.unwrap());
    }

    let duration = start.elapsed();
    assert_eq!(all_latencies.len(), total_requests);
    assert_eq!(upstream.hits(), total_requests);

    all_latencies.sort();
    let p50 = all_latencies[all_latencies.len() / 2];
    let p99 = all_latencies[(all_latencies.len() as f64 * 0.99) as usize];

    println!("\n--- Gateway Load Results ---");
    println!("Total Requests: {}", total_requests);
    println!("Concurrency:    {}", concurrency);
    println!("Total Duration: {:?}", duration);
    println!("Requests/sec:   {:.2}", total_requests as f64 / duration.as_secs_f64());
    println!("P50 Latency:    {:?}", p50);
    println!("P99 Latency:    {:?}", p99);
    println!("----------------------------\n");

    // 4. Graceful shutdown.
    shutdown.trigger();
    tokio::time::timeout(Duration::from_secs(5), server_task)
        .await
        .expect("server stops after shutdown")
        .unwrap()
        .unwrap();
}

#[tokio::test]
async fn test_failures_do_not_affect_neighbours() {
    let upstream = start_programmable_upstream(|request| {
        if request.path_and_query.ends_with("/fail") {
            MockReply::raw(502, "text/html", "<h1>Bad Gateway</h1>")
        } else {
            MockReply::json(200, json!({ "data": "ok" }))
        }
    })
    .await;

    let shutdown = Shutdown::new();
    let server = GatewayServer::new(gateway_config(&upstream.base_url())).unwrap();
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let gateway_addr = listener.local_addr().unwrap();
    let server_shutdown = shutdown.subscribe();
    tokio::spawn(async move { server.run(listener, server_shutdown).await });

    let client = reqwest::Client::new();
    let mut tasks = Vec::new();
    for i in 0..40 {
        let client = client.clone();
        tasks.push(tokio::spawn(async move {
            let failing = i % 2 == 0;
            let suffix = if failing { "fail" } else { "ok" };
            let res = client
                .get(format!("http://{gateway_addr}/api/rooms/{i}/{suffix}"))
                .bearer_auth("tok")
                .send()
                .await
                .unwrap();
            (failing, res.status().as_u16())
        }));
    }

    for task in tasks {
        let (failing, status) = task.await.unwrap();
        if failing {
            assert_eq!(status, 500);
        } else {
            assert_eq!(status, 200);
        }
    }

    shutdown.trigger();
}
