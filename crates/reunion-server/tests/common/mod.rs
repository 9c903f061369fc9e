use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use reunion_server::build_app;
use reunion_server::config::ServerConfig;
use reunion_server::store::MemoryStore;

pub struct TestServer {
    pub addr: SocketAddr,
    _shutdown: tokio::task::JoinHandle<()>,
}

impl TestServer {
    /// Start a test server backed by an empty in-memory store.
    pub async fn new() -> Self {
        Self::from_config(ServerConfig::default()).await
    }

    pub async fn from_config(config: ServerConfig) -> Self {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let (app, _state) = build_app(config, Arc::new(MemoryStore::new()));

        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        // Give the server a moment to start accepting
        tokio::time::sleep(Duration::from_millis(20)).await;

        Self {
            addr,
            _shutdown: handle,
        }
    }

    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn url(&self, path: &str) -> String {
        format!("http://{}{path}", self.addr)
    }
}

/// POST a JSON body and return (status, parsed body).
pub async fn post_json(
    client: &reqwest::Client,
    url: &str,
    body: &serde_json::Value,
) -> (u16, serde_json::Value) {
    let resp = client.post(url).json(body).send().await.unwrap();
    let status = resp.status().as_u16();
    let json = resp.json().await.unwrap_or(serde_json::Value::Null);
    (status, json)
}

/// GET a URL and return (status, parsed body).
pub async fn get_json(client: &reqwest::Client, url: &str) -> (u16, serde_json::Value) {
    let resp = client.get(url).send().await.unwrap();
    let status = resp.status().as_u16();
    let json = resp.json().await.unwrap_or(serde_json::Value::Null);
    (status, json)
}

/// Submit a guess and return the response body.
pub async fn submit_guess(
    client: &reqwest::Client,
    server: &TestServer,
    latitude: f64,
    longitude: f64,
    attempt: u32,
) -> (u16, serde_json::Value) {
    post_json(
        client,
        &server.url("/api/game/guess"),
        &serde_json::json!({
            "latitude": latitude,
            "longitude": longitude,
            "attempt": attempt,
        }),
    )
    .await
}

pub fn survey_body(email: &str, budget: u32, location: &str) -> serde_json::Value {
    serde_json::json!({
        "email": email,
        "budget": budget,
        "location": location,
        "transportation": "train",
        "eventTypes": ["networking", "social"],
        "venues": ["pubs"],
        "academicStatus": "phd",
        "availability": [{ "date": "2025-02-01", "times": ["7:00 PM", "8:00 PM"] }],
        "alcoholPreference": "beer_wine",
        "couchSurfing": false,
    })
}
