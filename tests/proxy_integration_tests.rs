//! Integration Tests for the Proxy
//!
//! Drives a real listener over TCP against a local fake origin.

use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use cache_proxy::{cache::CacheStore, proxy::ProxySettings, AppState, ProxyServer};
use tokio::io::{AsyncBufReadExt, AsyncReadExt, AsyncWriteExt, BufReader};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::{oneshot, Mutex};

// == Helper Functions ==

/// Fake origin: answers every connection with `body` after the blank line
/// and records the request head it received.
struct Origin {
    addr: SocketAddr,
    connections: Arc<AtomicUsize>,
    last_request: Arc<Mutex<String>>,
}

async fn spawn_origin(body: Vec<u8>) -> Origin {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let connections = Arc::new(AtomicUsize::new(0));
    let last_request = Arc::new(Mutex::new(String::new()));

    let counter = connections.clone();
    let recorded = last_request.clone();
    tokio::spawn(async move {
        loop {
            let (mut stream, _) = listener.accept().await.unwrap();
            counter.fetch_add(1, Ordering::SeqCst);
            let body = body.clone();
            let recorded = recorded.clone();
            tokio::spawn(async move {
                let mut head = String::new();
                let mut reader = BufReader::new(&mut stream);
                loop {
                    let mut line = String::new();
                    if reader.read_line(&mut line).await.unwrap() == 0 {
                        break;
                    }
                    head.push_str(&line);
                    if line == "\r\n" {
                        break;
                    }
                }
                *recorded.lock().await = head;
                stream.write_all(&body).await.unwrap();
                stream.shutdown().await.unwrap();
            });
        }
    });

    Origin {
        addr,
        connections,
        last_request,
    }
}

fn http_response(body: &[u8]) -> Vec<u8> {
    let mut response = format!(
        "HTTP/1.0 200 OK\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
        body.len()
    )
    .into_bytes();
    response.extend_from_slice(body);
    response
}

async fn start_proxy(max_cache_size: usize, max_object_size: usize) -> (SocketAddr, AppState, oneshot::Sender<()>) {
    let state = AppState::new(
        CacheStore::new(max_cache_size),
        ProxySettings {
            max_object_size,
            ..ProxySettings::default()
        },
    );
    let server = ProxyServer::bind("127.0.0.1:0".parse().unwrap(), state.clone())
        .await
        .unwrap();
    let addr = server.local_addr().unwrap();
    let (tx, rx) = oneshot::channel();
    tokio::spawn(server.run_until(async move {
        let _ = rx.await;
    }));
    (addr, state, tx)
}

/// Sends a raw request and reads until the proxy closes.
async fn send(proxy: SocketAddr, request: &str) -> Vec<u8> {
    let mut stream = TcpStream::connect(proxy).await.unwrap();
    stream.write_all(request.as_bytes()).await.unwrap();
    let mut received = Vec::new();
    // A reset after a dropped request reads as empty
    let _ = stream.read_to_end(&mut received).await;
    received
}

// == Cache Behavior ==

#[tokio::test]
async fn test_second_request_served_from_cache() {
    let response = http_response(b"<html>index</html>");
    let origin = spawn_origin(response.clone()).await;
    let (proxy, state, _tx) = start_proxy(1_049_000, 102_400).await;
    let request = format!("GET http://{}/index.html HTTP/1.0\r\n\r\n", origin.addr);

    let first = send(proxy, &request).await;
    let second = send(proxy, &request).await;

    assert_eq!(first, response);
    assert_eq!(second, first);
    assert_eq!(origin.connections.load(Ordering::SeqCst), 1);

    let stats = state.cache.stats().await;
    assert_eq!(stats.hits, 1);
    assert_eq!(stats.misses, 1);
    assert_eq!(stats.total_bytes, response.len());
}

#[tokio::test]
async fn test_oversized_response_never_cached() {
    let response = http_response(&vec![b'x'; 200_000]);
    let origin = spawn_origin(response.clone()).await;
    let (proxy, state, _tx) = start_proxy(1_049_000, 102_400).await;
    let request = format!("GET http://{}/big.bin HTTP/1.0\r\n\r\n", origin.addr);

    assert_eq!(send(proxy, &request).await, response);
    assert_eq!(send(proxy, &request).await, response);

    assert_eq!(origin.connections.load(Ordering::SeqCst), 2);
    assert_eq!(state.cache.stats().await.total_entries, 0);
}

#[tokio::test]
async fn test_distinct_request_lines_cached_separately() {
    let origin = spawn_origin(http_response(b"same")).await;
    let (proxy, state, _tx) = start_proxy(1_049_000, 102_400).await;

    send(proxy, &format!("GET http://{}/a HTTP/1.0\r\n\r\n", origin.addr)).await;
    send(proxy, &format!("GET http://{}/a HTTP/1.1\r\n\r\n", origin.addr)).await;

    assert_eq!(origin.connections.load(Ordering::SeqCst), 2);
    assert_eq!(state.cache.stats().await.total_entries, 2);
}

#[tokio::test]
async fn test_capacity_evicts_least_recent() {
    let body = vec![b'y'; 400_000];
    let origin = spawn_origin(body.clone()).await;
    // Object limit above the payload so all three are cacheable
    let (proxy, state, _tx) = start_proxy(1_049_000, 500_000).await;

    for path in ["one", "two", "three"] {
        let received = send(proxy, &format!("GET http://{}/{} HTTP/1.0\r\n\r\n", origin.addr, path)).await;
        assert_eq!(received.len(), body.len());
    }

    let cache = state.cache.read().await;
    assert_eq!(cache.len(), 2);
    assert_eq!(cache.total_size(), 800_000);
    assert!(!cache.contains(&format!("GET http://{}/one HTTP/1.0", origin.addr)));
}

// == Forwarding ==

#[tokio::test]
async fn test_origin_receives_rebuilt_request() {
    let origin = spawn_origin(http_response(b"ok")).await;
    let (proxy, _state, _tx) = start_proxy(1_049_000, 102_400).await;

    send(
        proxy,
        &format!(
            "GET http://{}/path?q=1 HTTP/1.1\r\nAccept: */*\r\nConnection: keep-alive\r\n\r\n",
            origin.addr
        ),
    )
    .await;

    let head = origin.last_request.lock().await.clone();
    assert!(head.starts_with("GET /path?q=1 HTTP/1.0\r\n"));
    assert!(head.contains("Accept: */*\r\n"));
    assert!(head.contains("Connection: close\r\n"));
    assert!(head.contains("Proxy-Connection: close\r\n"));
    assert!(!head.contains("keep-alive"));
}

#[tokio::test]
async fn test_query_without_path_forwarded() {
    let response = http_response(b"queried");
    let origin = spawn_origin(response.clone()).await;
    let (proxy, _state, _tx) = start_proxy(1_049_000, 102_400).await;

    let received = send(proxy, &format!("GET http://{}?x=1 HTTP/1.0\r\n\r\n", origin.addr)).await;

    assert_eq!(received, response);
    let head = origin.last_request.lock().await.clone();
    assert!(head.starts_with("GET /?x=1 HTTP/1.0\r\n"));
}

#[tokio::test]
async fn test_non_get_closed_without_response() {
    let origin = spawn_origin(http_response(b"never")).await;
    let (proxy, _state, _tx) = start_proxy(1_049_000, 102_400).await;

    let received = send(proxy, &format!("POST http://{}/ HTTP/1.0\r\n\r\n", origin.addr)).await;

    assert!(received.is_empty());
    assert_eq!(origin.connections.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_concurrent_clients() {
    let response = http_response(b"shared");
    let origin = spawn_origin(response.clone()).await;
    let (proxy, _state, _tx) = start_proxy(1_049_000, 102_400).await;

    let mut clients = vec![];
    for i in 0..16 {
        let request = format!("GET http://{}/{} HTTP/1.0\r\n\r\n", origin.addr, i % 4);
        clients.push(tokio::spawn(async move { send(proxy, &request).await }));
    }
    for client in clients {
        assert_eq!(client.await.unwrap(), response);
    }
}

// == Real HTTP Client ==

#[tokio::test]
async fn test_reqwest_through_proxy() {
    let origin = spawn_origin(http_response(b"via proxy")).await;
    let (proxy, _state, _tx) = start_proxy(1_049_000, 102_400).await;

    let client = reqwest::Client::builder()
        .proxy(reqwest::Proxy::http(format!("http://{}", proxy)).unwrap())
        .pool_max_idle_per_host(0)
        .build()
        .unwrap();
    let url = format!("http://{}/greeting", origin.addr);

    for _ in 0..2 {
        let response = client.get(&url).send().await.unwrap();
        assert_eq!(response.status(), reqwest::StatusCode::OK);
        assert_eq!(response.text().await.unwrap(), "via proxy");
    }
    assert_eq!(origin.connections.load(Ordering::SeqCst), 1);
}

// == Process Startup ==

#[tokio::test]
async fn test_missing_port_exits_non_zero() {
    let status = tokio::process::Command::new(env!("CARGO_BIN_EXE_cache_proxy"))
        .status()
        .await
        .unwrap();
    assert!(!status.success());
}

#[tokio::test]
async fn test_port_in_use_exits_non_zero() {
    let taken = std::net::TcpListener::bind("0.0.0.0:0").unwrap();
    let port = taken.local_addr().unwrap().port();

    let mut child = tokio::process::Command::new(env!("CARGO_BIN_EXE_cache_proxy"))
        .arg(port.to_string())
        .kill_on_drop(true)
        .spawn()
        .unwrap();
    let status = tokio::time::timeout(Duration::from_secs(10), child.wait())
        .await
        .expect("proxy should exit when the port is taken")
        .unwrap();
    assert!(!status.success());
}
