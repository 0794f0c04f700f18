#![allow(dead_code)]

use axum::extract::{Json, Request};
use axum::http::{HeaderMap, StatusCode, header};
use axum::middleware::Next;
use axum::response::{Html, Redirect};
use axum::routing::{get, post};
use axum::{Extension, Router};
use serde_json::Value;
use std::net::SocketAddr;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio::time::sleep;
use xhs_video_extractor::Config;

pub const EXAMPLE_PAGE: &str = r#"<!DOCTYPE html>
<html>
  <head><title>example</title></head>
  <body>
    <video src="http://cdn.example.com/a.mp4" controls></video>
    <video src="http://cdn.example.com/b.webm"></video>
  </body>
</html>"#;

pub const MIXED_PAGE: &str = r#"<html><body>
  <video src="https://cdn.example.com/first.mp4"></video>
  <video src="https://cdn.example.com/clip.MP4"></video>
  <div class="feed">
    <video src="https://cdn.example.com/second.mp4"></video>
    <video src="https://cdn.example.com/signed.mp4?token=1"></video>
    <video><source src="https://cdn.example.com/nested.mp4" type="video/mp4"></video>
  </div>
  <video src="https://cdn.example.com/first.mp4"></video>
  <video></video>
</body></html>"#;

pub const EMPTY_PAGE: &str = "<html><body><p>No videos here</p></body></html>";

/// Extraction service running in-process on a free local port
pub struct TestServer {
    handle: JoinHandle<()>,
    pub port: u16,
}

impl TestServer {
    pub async fn start() -> Self {
        Self::start_with(Config::default()).await
    }

    pub async fn start_with(config: Config) -> Self {
        // Only open when debugging
        // tracing_subscriber::fmt::init();

        let port = portpicker::pick_unused_port().expect("No available port");
        let config = Config {
            listen_addr: "127.0.0.1".into(),
            listen_on_port: port,
            no_proxy: true,
            ..config
        };

        let handle = tokio::spawn(async move {
            if let Err(error) = xhs_video_extractor::run(config).await {
                eprintln!("test server stopped: {error:?}");
            }
        });

        let server = TestServer { handle, port };
        let client = server.client();

        // Poll until server is ready
        for _ in 0..200 {
            if let Ok(response) = client.get(server.url("/")).send().await
                && response.status().is_success()
            {
                break;
            }

            sleep(Duration::from_millis(10)).await;
        }

        server
    }

    pub fn url(&self, path: &str) -> String {
        format!("http://127.0.0.1:{}{}", self.port, path)
    }

    pub fn client(&self) -> reqwest::Client {
        reqwest::Client::builder()
            .no_proxy()
            .timeout(Duration::from_secs(30))
            .build()
            .unwrap()
    }

    /// POST /get with the given page url
    pub async fn extract(&self, client: &reqwest::Client, page_url: &str) -> reqwest::Response {
        client
            .post(self.url("/get"))
            .json(&serde_json::json!({ "url": page_url }))
            .send()
            .await
            .unwrap()
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

/// Mock page server standing in for the remote site and the relay service
pub struct MockUpstream {
    handle: JoinHandle<()>,
    pub addr: SocketAddr,
    pub relay_calls: Arc<Mutex<Vec<Value>>>,
    hits: Arc<AtomicUsize>,
}

impl MockUpstream {
    pub async fn start() -> Self {
        let relay_calls = Arc::new(Mutex::new(Vec::new()));
        let hits = Arc::new(AtomicUsize::new(0));
        let hits_c = hits.clone();

        let app = Router::new()
            .route("/page", get(|| async { Html(EXAMPLE_PAGE) }))
            .route("/mixed", get(|| async { Html(MIXED_PAGE) }))
            .route("/empty", get(|| async { Html(EMPTY_PAGE) }))
            .route("/moved", get(|| async { Redirect::permanent("/page") }))
            .route(
                "/missing",
                get(|| async { (StatusCode::NOT_FOUND, Html("<video src=\"/x.mp4\">")) }),
            )
            .route(
                "/created",
                get(|| async { (StatusCode::CREATED, Html("<video src=\"/x.mp4\">")) }),
            )
            .route(
                "/slow",
                get(|| async {
                    sleep(Duration::from_secs(3)).await;
                    Html(EXAMPLE_PAGE)
                }),
            )
            .route("/ua", get(echo_user_agent))
            .route("/relay", post(relay))
            .route(
                "/relay-broken",
                post(|| async { (StatusCode::BAD_GATEWAY, "upstream down") }),
            )
            .layer(Extension(relay_calls.clone()))
            .layer(axum::middleware::from_fn(move |req: Request, next: Next| {
                let hits = hits_c.clone();
                async move {
                    hits.fetch_add(1, Ordering::SeqCst);
                    next.run(req).await
                }
            }));

        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind mock upstream");
        let addr = listener.local_addr().unwrap();

        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        MockUpstream {
            handle,
            addr,
            relay_calls,
            hits,
        }
    }

    /// Number of requests the mock has received on any route
    pub fn hits(&self) -> usize {
        self.hits.load(Ordering::SeqCst)
    }

    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    pub async fn relay_calls(&self) -> Vec<Value> {
        self.relay_calls.lock().await.clone()
    }
}

impl Drop for MockUpstream {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

/// Put the caller's user agent into a video src so it shows up in the extraction result
async fn echo_user_agent(headers: HeaderMap) -> Html<String> {
    let user_agent = headers
        .get(header::USER_AGENT)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default();
    Html(format!("<video src=\"{user_agent}.mp4\"></video>"))
}

async fn relay(
    Extension(calls): Extension<Arc<Mutex<Vec<Value>>>>,
    Json(body): Json<Value>,
) -> Json<Value> {
    calls.lock().await.push(body.clone());
    Json(serde_json::json!({ "received": body["url"], "source": "relay" }))
}
