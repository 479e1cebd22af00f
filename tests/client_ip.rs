//! End-to-end client IP resolution over real TCP connections.

use std::net::SocketAddr;
use std::time::Duration;

use client_ip_telemetry::config::AppConfig;
use serde_json::Value;

mod common;

async fn get_json(server: &common::TestServer, path: &str, headers: &[(&str, &str)]) -> Value {
    let mut req = common::client().get(format!("http://{}{}", server.addr, path));
    for (name, value) in headers {
        req = req.header(*name, *value);
    }
    let res = req.send().await.expect("server unreachable");
    assert_eq!(res.status(), 200);
    res.json().await.unwrap()
}

#[tokio::test]
async fn test_forwarded_header_wins_over_peer() {
    let addr: SocketAddr = "127.0.0.1:28381".parse().unwrap();
    let server = common::start_server(addr, AppConfig::default()).await;

    let body = get_json(&server, "/ip", &[("X-Forwarded-For", "203.0.113.7:51000, 10.1.1.1")]).await;
    assert_eq!(body["ip"], "203.0.113.7");

    server.shutdown.trigger();
}

#[tokio::test]
async fn test_invalid_header_falls_back_to_peer_address() {
    let addr: SocketAddr = "127.0.0.1:28382".parse().unwrap();
    let server = common::start_server(addr, AppConfig::default()).await;

    let body = get_json(&server, "/ip", &[("X-Forwarded-For", "::1")]).await;
    assert_eq!(body["ip"], "127.0.0.1");

    let body = get_json(&server, "/ip", &[]).await;
    assert_eq!(body["ip"], "127.0.0.1");

    server.shutdown.trigger();
}

#[tokio::test]
async fn test_configured_header_order_and_last_ip() {
    let addr: SocketAddr = "127.0.0.1:28383".parse().unwrap();
    let mut config = AppConfig::default();
    config.client_ip.header_names = vec!["X-Client-IP".into(), "X-Forwarded-For".into()];
    config.client_ip.header_value_separators = ";".into();
    config.client_ip.use_first_ip = false;
    let server = common::start_server(addr, config).await;

    let body = get_json(
        &server,
        "/checkout",
        &[
            ("X-Client-IP", "garbage"),
            ("X-Forwarded-For", "198.51.100.1;198.51.100.2"),
        ],
    )
    .await;
    assert_eq!(body["request"]["context"]["location"]["ip"], "198.51.100.2");
    assert_eq!(body["item"]["context"]["location"]["ip"], "198.51.100.2");

    server.shutdown.trigger();
}

#[tokio::test]
async fn test_reload_replaces_resolver() {
    let addr: SocketAddr = "127.0.0.1:28384".parse().unwrap();
    let server = common::start_server(addr, AppConfig::default()).await;
    let headers = [("X-Forwarded-For", "1.1.1.1, 2.2.2.2")];

    let body = get_json(&server, "/ip", &headers).await;
    assert_eq!(body["ip"], "1.1.1.1");

    let mut reloaded = AppConfig::default();
    reloaded.client_ip.use_first_ip = false;
    server.config_tx.send(reloaded).unwrap();
    tokio::time::sleep(Duration::from_millis(100)).await;

    let body = get_json(&server, "/ip", &headers).await;
    assert_eq!(body["ip"], "2.2.2.2");

    server.shutdown.trigger();
}
