use std::time::{Duration, Instant};

use reqwest::header;
use tracing::info;

use cronhook_core::{HttpMethod, RequestSpec};

use crate::error::{DispatchError, Result};

/// Sends one HTTP request per [`RequestSpec`] and classifies the outcome.
///
/// The call is awaited to completion: the invoking occurrence task is held
/// for the full round trip. Exactly HTTP 200 counts as success; every other
/// status surfaces as [`DispatchError::RequestFailed`] with the buffered
/// response body for diagnostics.
pub struct RequestDispatcher {
    client: reqwest::Client,
}

impl RequestDispatcher {
    /// Build a dispatcher whose calls time out after `timeout`.
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self { client })
    }

    /// Send `spec` once. No retry, no redirect of the outcome back into the
    /// schedule — the caller decides what a failure means.
    pub async fn send(&self, spec: &RequestSpec) -> Result<()> {
        let method = HttpMethod::parse(&spec.method)
            .ok_or_else(|| DispatchError::UnsupportedMethod(spec.method.clone()))?;

        let mut req = match method {
            HttpMethod::Get => self.client.get(&spec.url),
            HttpMethod::Post => self.client.post(&spec.url),
            HttpMethod::Put => self.client.put(&spec.url),
            HttpMethod::Delete => self.client.delete(&spec.url),
        };

        if let Some(ref cookie) = spec.cookie {
            req = req.header(
                header::COOKIE,
                format!("{}={}", cookie.name, cookie.content),
            );
        }
        if let Some(ref auth) = spec.basic_auth {
            req = req.basic_auth(&auth.username, Some(&auth.password));
        }

        let started = Instant::now();
        let response = req.send().await?;
        let status = response.status().as_u16();
        // Fully buffer the body so a non-200 outcome carries diagnostics.
        let body = response.text().await?;
        let elapsed_ms = started.elapsed().as_millis() as u64;

        if status == 200 {
            info!(url = %spec.url, status, elapsed_ms, "request processed successfully");
            Ok(())
        } else {
            info!(url = %spec.url, status, elapsed_ms, body = %body, "request processed with error status");
            Err(DispatchError::RequestFailed { status, body })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::net::SocketAddr;
    use std::sync::{Arc, Mutex};

    use axum::extract::State;
    use axum::http::{HeaderMap, StatusCode};
    use axum::routing::get;
    use axum::Router;

    /// (cookie, authorization) header values observed per request.
    type Seen = Arc<Mutex<Vec<(Option<String>, Option<String>)>>>;

    fn record(seen: &Seen, headers: &HeaderMap) {
        let grab = |name: &str| {
            headers
                .get(name)
                .and_then(|v| v.to_str().ok())
                .map(String::from)
        };
        seen.lock()
            .unwrap()
            .push((grab("cookie"), grab("authorization")));
    }

    async fn ok(State(seen): State<Seen>, headers: HeaderMap) -> &'static str {
        record(&seen, &headers);
        "done"
    }

    async fn fail() -> (StatusCode, &'static str) {
        (StatusCode::INTERNAL_SERVER_ERROR, "boom")
    }

    async fn spawn_server() -> (SocketAddr, Seen) {
        let seen: Seen = Arc::default();
        let app = Router::new()
            .route("/ok", get(ok).post(ok).put(ok).delete(ok))
            .route("/fail", get(fail))
            .with_state(seen.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move { axum::serve(listener, app).await.unwrap() });
        (addr, seen)
    }

    fn dispatcher() -> RequestDispatcher {
        RequestDispatcher::new(Duration::from_secs(5)).unwrap()
    }

    #[tokio::test]
    async fn status_200_completes() {
        let (addr, _) = spawn_server().await;
        let spec = RequestSpec::new("GET", format!("http://{addr}/ok"));
        dispatcher().send(&spec).await.unwrap();
    }

    #[tokio::test]
    async fn lowercase_method_is_accepted() {
        let (addr, _) = spawn_server().await;
        let spec = RequestSpec::new("get", format!("http://{addr}/ok"));
        dispatcher().send(&spec).await.unwrap();
    }

    #[tokio::test]
    async fn non_200_fails_with_status_and_body() {
        let (addr, _) = spawn_server().await;
        let spec = RequestSpec::new("GET", format!("http://{addr}/fail"));
        match dispatcher().send(&spec).await {
            Err(DispatchError::RequestFailed { status, body }) => {
                assert_eq!(status, 500);
                assert_eq!(body, "boom");
            }
            other => panic!("expected RequestFailed, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn unsupported_method_fails_before_any_network_io() {
        // Port 9 (discard) is never listened on — a transport error here
        // would mean the dispatcher touched the network first.
        let spec = RequestSpec::new("PATCH", "http://127.0.0.1:9/never");
        match dispatcher().send(&spec).await {
            Err(DispatchError::UnsupportedMethod(m)) => assert_eq!(m, "PATCH"),
            other => panic!("expected UnsupportedMethod, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn cookie_pair_sets_exact_header() {
        let (addr, seen) = spawn_server().await;
        let spec =
            RequestSpec::new("POST", format!("http://{addr}/ok")).with_cookie("session", "abc123");
        dispatcher().send(&spec).await.unwrap();

        let observed = seen.lock().unwrap();
        assert_eq!(observed.len(), 1);
        assert_eq!(observed[0].0.as_deref(), Some("session=abc123"));
    }

    #[tokio::test]
    async fn no_cookie_pair_means_no_cookie_header() {
        let (addr, seen) = spawn_server().await;
        let spec = RequestSpec::new("GET", format!("http://{addr}/ok"));
        dispatcher().send(&spec).await.unwrap();

        let observed = seen.lock().unwrap();
        assert_eq!(observed.len(), 1);
        assert!(observed[0].0.is_none());
    }

    #[tokio::test]
    async fn basic_auth_pair_sets_authorization_header() {
        let (addr, seen) = spawn_server().await;
        let spec =
            RequestSpec::new("GET", format!("http://{addr}/ok")).with_basic_auth("svc", "hunter2");
        dispatcher().send(&spec).await.unwrap();

        let observed = seen.lock().unwrap();
        let auth = observed[0].1.as_deref().unwrap();
        assert!(auth.starts_with("Basic "), "got {auth}");
    }

    #[tokio::test]
    async fn connection_failure_surfaces_as_transport_error() {
        // Port 1 is reserved and unbound — the connect fails immediately.
        let spec = RequestSpec::new("GET", "http://127.0.0.1:1/");
        match dispatcher().send(&spec).await {
            Err(DispatchError::Transport(_)) => {}
            other => panic!("expected Transport, got {other:?}"),
        }
    }
}
