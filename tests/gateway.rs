//! End-to-end tests against a gateway bound to a real socket.

use std::sync::Arc;
use std::time::{Duration, Instant};

use console_gateway::config::{HandlerKind, RouteConfig};
use console_gateway::monitor::{Epoch, WatchStateSource};
use reqwest::StatusCode;

mod common;

#[tokio::test]
async fn monitor_returns_immediately_when_client_is_behind() {
    let source = Arc::new(WatchStateSource::new());
    source.publish(Epoch::from("5"));
    let gateway = common::start_gateway(
        vec![RouteConfig::new("/status", HandlerKind::Monitor, None)],
        source,
        Duration::from_secs(5),
    )
    .await;

    let start = Instant::now();
    let res = common::client()
        .get(gateway.url("/status.json?4"))
        .header("origin", "http://console.local")
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(res.headers()["content-type"], "application/json");
    assert_eq!(res.headers()["cache-control"], "no-cache");
    assert_eq!(
        res.headers()["access-control-allow-origin"],
        "http://console.local"
    );
    assert_eq!(res.text().await.unwrap(), "{\"epoch\":\"5\"}\n");
    assert!(start.elapsed() < Duration::from_secs(2));
}

#[tokio::test]
async fn monitor_long_poll_wakes_on_change() {
    let source = Arc::new(WatchStateSource::new());
    source.publish(Epoch::from("5"));
    let gateway = common::start_gateway(
        vec![RouteConfig::new("/status", HandlerKind::Monitor, None)],
        source.clone(),
        Duration::from_secs(5),
    )
    .await;

    let publisher = source.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(200)).await;
        publisher.publish(Epoch::from("6"));
    });

    let res = common::client()
        .get(gateway.url("/status?5"))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    assert!(!res.headers().contains_key("access-control-allow-origin"));
    assert_eq!(res.text().await.unwrap(), "{\"epoch\":\"6\"}\n");
}

#[tokio::test]
async fn monitor_times_out_with_current_epoch() {
    let source = Arc::new(WatchStateSource::new());
    source.publish(Epoch::from("5"));
    let gateway = common::start_gateway(
        vec![RouteConfig::new("/status", HandlerKind::Monitor, None)],
        source,
        Duration::from_millis(300),
    )
    .await;

    let start = Instant::now();
    let res = common::client()
        .get(gateway.url("/status?5"))
        .send()
        .await
        .unwrap();
    assert_eq!(res.text().await.unwrap(), "{\"epoch\":\"5\"}\n");
    assert!(start.elapsed() >= Duration::from_millis(300));
}

#[tokio::test]
async fn monitor_headers_arrive_before_the_wait_ends() {
    let source = Arc::new(WatchStateSource::new());
    source.publish(Epoch::from("5"));
    let gateway = common::start_gateway(
        vec![RouteConfig::new("/status", HandlerKind::Monitor, None)],
        source,
        Duration::from_secs(2),
    )
    .await;

    let start = Instant::now();
    let res = common::client()
        .get(gateway.url("/status?5"))
        .send()
        .await
        .unwrap();
    let headers_at = start.elapsed();
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(res.headers()["content-type"], "application/json");
    assert!(headers_at < Duration::from_secs(1), "headers took {headers_at:?}");

    assert_eq!(res.text().await.unwrap(), "{\"epoch\":\"5\"}\n");
    assert!(start.elapsed() >= Duration::from_secs(2));
}

#[tokio::test]
async fn file_route_serves_post_like_get() {
    let www = tempfile::tempdir().unwrap();
    std::fs::write(www.path().join("a.txt"), "hi").unwrap();
    let gateway = common::start_gateway(
        vec![RouteConfig::new("/", HandlerKind::File, www.path().to_str())],
        Arc::new(WatchStateSource::new()),
        Duration::from_secs(1),
    )
    .await;

    let res = common::client()
        .post(gateway.url("/a.txt"))
        .body("x")
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(res.text().await.unwrap(), "hi");
}

#[tokio::test]
async fn files_are_served_with_validators() {
    let www = tempfile::tempdir().unwrap();
    std::fs::write(www.path().join("app.js"), "console.log(1);").unwrap();
    let gateway = common::start_gateway(
        vec![RouteConfig::new("/", HandlerKind::File, www.path().to_str())],
        Arc::new(WatchStateSource::new()),
        Duration::from_secs(1),
    )
    .await;
    let client = common::client();

    let res = client.get(gateway.url("/app.js")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(res.headers()["cache-control"], "public, max-age=2592000");
    let etag = res.headers()["etag"].to_str().unwrap().to_string();
    assert!(etag.starts_with("W/\""));
    assert!(etag.ends_with("-f\""));
    assert_eq!(res.text().await.unwrap(), "console.log(1);");

    let res = client
        .get(gateway.url("/app.js"))
        .header("if-none-match", &etag)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NOT_MODIFIED);
    assert!(res.text().await.unwrap().is_empty());
}

#[tokio::test]
async fn missing_file_is_unmatched() {
    let www = tempfile::tempdir().unwrap();
    let gateway = common::start_gateway(
        vec![RouteConfig::new("/", HandlerKind::File, www.path().to_str())],
        Arc::new(WatchStateSource::new()),
        Duration::from_secs(1),
    )
    .await;

    let res = common::client()
        .get(gateway.url("/missing.png"))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(res.text().await.unwrap(), "Unmatched request: /missing.png.");
}

#[tokio::test]
async fn proxy_forwards_path_query_and_client_address() {
    let backend = common::start_echo_backend().await;
    let target = format!("http://{backend}/base");
    let gateway = common::start_gateway(
        vec![RouteConfig::new("/api", HandlerKind::Proxy, Some(&target))],
        Arc::new(WatchStateSource::new()),
        Duration::from_secs(1),
    )
    .await;

    let res = common::client()
        .get(gateway.url("/api/v1/pods?watch=true"))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body = res.text().await.unwrap();
    let mut lines = body.lines();
    assert_eq!(lines.next(), Some("GET /base/api/v1/pods?watch=true HTTP/1.1"));
    assert_eq!(lines.next(), Some("127.0.0.1"));
}

#[tokio::test]
async fn proxy_with_bad_target_is_a_configuration_error() {
    let gateway = common::start_gateway(
        vec![RouteConfig::new("/api", HandlerKind::Proxy, Some("::not a url"))],
        Arc::new(WatchStateSource::new()),
        Duration::from_secs(1),
    )
    .await;

    let res = common::client()
        .get(gateway.url("/api/x"))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(res.text().await.unwrap(), "Bad web server configuration.");
}

#[tokio::test]
async fn proxy_to_dead_backend_is_bad_gateway() {
    let dead = {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap()
    };
    let target = format!("http://{dead}");
    let gateway = common::start_gateway(
        vec![RouteConfig::new("/api", HandlerKind::Proxy, Some(&target))],
        Arc::new(WatchStateSource::new()),
        Duration::from_secs(1),
    )
    .await;

    let res = common::client()
        .get(gateway.url("/api/x"))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_GATEWAY);
}
