//! Integration Tests for Peer Delegation
//!
//! Starts real nodes on ephemeral ports and routes lookups between them.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use geecache::{create_router, AppState, Group, GroupRegistry, HttpPool};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

// == Helper Functions ==

struct Node {
    addr: String,
    group: Arc<Group>,
    pool: Arc<HttpPool>,
    loads: Arc<AtomicUsize>,
    server: JoinHandle<()>,
}

impl Drop for Node {
    fn drop(&mut self) {
        self.server.abort();
    }
}

/// Binds a node on 127.0.0.1 with a source that answers `value-{key}`.
async fn start_node() -> Node {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = format!("http://{}", listener.local_addr().unwrap());

    let loads = Arc::new(AtomicUsize::new(0));
    let counter = loads.clone();

    let registry = GroupRegistry::new();
    let group = registry.new_group("scores", 2 << 10, move |key: &str| -> anyhow::Result<Vec<u8>> {
        counter.fetch_add(1, Ordering::SeqCst);
        if key == "missing" {
            return Err(anyhow::anyhow!("{} not exist", key));
        }
        Ok(format!("value-{}", key).into_bytes())
    });

    let pool = Arc::new(HttpPool::new(&addr).with_timeout(Duration::from_secs(1)));
    group.register_peers(pool.clone());

    let app = create_router(AppState::new(registry, &pool));
    let server = tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    Node {
        addr,
        group,
        pool,
        loads,
        server,
    }
}

/// Returns an address nothing is listening on.
async fn dead_addr() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = format!("http://{}", listener.local_addr().unwrap());
    drop(listener);
    addr
}

/// Returns an address that accepts connections and never answers.
async fn silent_addr() -> (String, JoinHandle<()>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = format!("http://{}", listener.local_addr().unwrap());
    let server = tokio::spawn(async move {
        let mut open = Vec::new();
        while let Ok((socket, _)) = listener.accept().await {
            open.push(socket);
        }
    });
    (addr, server)
}

/// Finds a key that `pool` routes to `owner`.
fn key_owned_by(pool: &HttpPool, owner: &str) -> String {
    (0..1000)
        .map(|i| format!("key{}", i))
        .find(|key| pool.owner_of(key).as_deref() == Some(owner))
        .expect("some key should land on the requested node")
}

// == Delegation Tests ==

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_remote_key_is_loaded_by_owner() {
    let a = start_node().await;
    let b = start_node().await;
    let peers = [a.addr.clone(), b.addr.clone()];
    a.pool.set(&peers);
    b.pool.set(&peers);

    let key = key_owned_by(&a.pool, &b.addr);

    let value = a.group.get(&key).await.unwrap();
    assert_eq!(value.as_string(), format!("value-{}", key));
    assert_eq!(b.loads.load(Ordering::SeqCst), 1);
    assert_eq!(a.loads.load(Ordering::SeqCst), 0);

    // Owner caches, requester does not
    let value = a.group.get(&key).await.unwrap();
    assert_eq!(value.as_string(), format!("value-{}", key));
    assert_eq!(b.loads.load(Ordering::SeqCst), 1);

    let a_stats = a.group.stats();
    assert_eq!(a_stats.peer_loads, 2);
    assert_eq!(a_stats.cache.total_entries, 0);

    let b_stats = b.group.stats();
    assert_eq!(b_stats.local_loads, 1);
    assert_eq!(b_stats.cache.hits, 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_own_key_is_loaded_locally() {
    let a = start_node().await;
    let b = start_node().await;
    let peers = [a.addr.clone(), b.addr.clone()];
    a.pool.set(&peers);
    b.pool.set(&peers);

    let key = key_owned_by(&a.pool, &a.addr);

    assert_eq!(
        a.group.get(&key).await.unwrap().as_string(),
        format!("value-{}", key)
    );
    assert_eq!(a.loads.load(Ordering::SeqCst), 1);
    assert_eq!(b.loads.load(Ordering::SeqCst), 0);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_dead_peer_falls_back_to_local_load() {
    let a = start_node().await;
    let dead = dead_addr().await;
    a.pool.set([a.addr.clone(), dead.clone()]);

    let key = key_owned_by(&a.pool, &dead);

    let value = a.group.get(&key).await.unwrap();
    assert_eq!(value.as_string(), format!("value-{}", key));
    assert_eq!(a.loads.load(Ordering::SeqCst), 1);
    assert_eq!(a.group.stats().peer_errors, 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_silent_peer_times_out_and_falls_back() {
    let (silent, server) = silent_addr().await;
    let self_addr = "http://127.0.0.1:8001".to_string();

    let pool = Arc::new(HttpPool::new(&self_addr).with_timeout(Duration::from_millis(200)));
    pool.set([self_addr.clone(), silent.clone()]);
    let key = key_owned_by(&pool, &silent);

    let loads = Arc::new(AtomicUsize::new(0));
    let counter = loads.clone();
    let group = Group::new("scores", 0, move |key: &str| -> anyhow::Result<Vec<u8>> {
        counter.fetch_add(1, Ordering::SeqCst);
        Ok(format!("local-{}", key).into_bytes())
    });
    group.register_peers(pool);

    let started = std::time::Instant::now();
    let value = tokio::time::timeout(Duration::from_secs(5), group.get(&key))
        .await
        .expect("a silent peer must not block the lookup")
        .unwrap();

    assert!(started.elapsed() < Duration::from_secs(2));
    assert_eq!(value.as_string(), format!("local-{}", key));
    assert_eq!(loads.load(Ordering::SeqCst), 1);
    assert_eq!(group.stats().peer_errors, 1);
    server.abort();
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_remote_load_error_falls_back_to_local_load() {
    let a = start_node().await;
    let b = start_node().await;
    // a routes every key to b
    a.pool.set([b.addr.clone()]);
    b.pool.set([b.addr.clone()]);

    let err = a.group.get("missing").await.unwrap_err();
    assert_eq!(err.to_string(), "missing not exist");
    assert_eq!(b.loads.load(Ordering::SeqCst), 1);
    assert_eq!(a.loads.load(Ordering::SeqCst), 1);
}

// == HTTP Surface Tests ==

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_http_get_returns_raw_bytes() {
    let a = start_node().await;
    a.pool.set([a.addr.clone()]);

    let response = reqwest::get(format!("{}/_geecache/scores/Tom", a.addr))
        .await
        .unwrap();

    assert_eq!(response.status(), reqwest::StatusCode::OK);
    assert_eq!(
        response.headers()[reqwest::header::CONTENT_TYPE],
        "application/octet-stream"
    );
    assert_eq!(response.text().await.unwrap(), "value-Tom");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_http_unknown_group_is_not_found() {
    let a = start_node().await;
    a.pool.set([a.addr.clone()]);

    let response = reqwest::get(format!("{}/_geecache/scores111/Tom", a.addr))
        .await
        .unwrap();

    assert_eq!(response.status(), reqwest::StatusCode::NOT_FOUND);
    assert!(response.text().await.unwrap().contains("scores111"));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_http_stats_reports_groups() {
    let a = start_node().await;
    a.pool.set([a.addr.clone()]);
    a.group.get("Tom").await.unwrap();

    let stats: serde_json::Value = reqwest::get(format!("{}/stats", a.addr))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert_eq!(stats["node"], a.addr.as_str());
    assert_eq!(stats["groups"][0]["name"], "scores");
    assert_eq!(stats["groups"][0]["local_loads"], 1);
}
