// HTTP route handlers for the compile proxy

use axum::{
    body::Bytes,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, error};

use crate::AppState;

fn failure(message: impl std::fmt::Display) -> Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(serde_json::json!({
            "success": false,
            "message": message.to_string(),
        })),
    )
        .into_response()
}

async fn forward(state: &AppState, body: &[u8]) -> anyhow::Result<Value> {
    let payload: Value = serde_json::from_slice(body)?;

    let response = state
        .http
        .post(&state.upstream_url)
        .json(&payload)
        .send()
        .await?;

    debug!(status = %response.status(), "Upstream responded");
    Ok(response.json::<Value>().await?)
}

/// POST /api/compile - Relay a compile request to the execution service
///
/// The upstream JSON is passed back untouched. Anything that goes wrong on
/// the way becomes a `{success: false, message}` envelope with status 500.
pub async fn compile(State(state): State<Arc<AppState>>, body: Bytes) -> Response {
    match forward(&state, &body).await {
        Ok(data) => (StatusCode::OK, Json(data)).into_response(),
        Err(e) => {
            error!(error = %e, upstream = %state.upstream_url, "Compile relay failed");
            failure(e)
        }
    }
}

/// GET /status - Health check endpoint
pub async fn health_check() -> impl IntoResponse {
    (StatusCode::OK, "OK")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app;
    use axum::routing::post;
    use axum::Router;
    use tokio::net::TcpListener;

    async fn serve(app: Router) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{}", addr)
    }

    /// Proxy in front of `upstream_url`, returning its base URL
    async fn serve_proxy(upstream_url: String) -> String {
        let state = Arc::new(AppState {
            http: reqwest::Client::new(),
            upstream_url,
        });
        serve(app(state)).await
    }

    #[tokio::test]
    async fn test_relays_request_and_response_verbatim() {
        let upstream = Router::new().route(
            "/compile",
            post(|Json(body): Json<Value>| async move {
                Json(serde_json::json!({ "echo": body, "stdout": "ok" }))
            }),
        );
        let upstream_url = format!("{}/compile", serve(upstream).await);
        let proxy = serve_proxy(upstream_url).await;

        let sent = serde_json::json!({"source_code": "print(1)", "language_id": 71, "stdin": ""});
        let response = reqwest::Client::new()
            .post(format!("{}/api/compile", proxy))
            .json(&sent)
            .send()
            .await
            .unwrap();

        assert_eq!(response.status(), reqwest::StatusCode::OK);
        let body: Value = response.json().await.unwrap();
        assert_eq!(body["echo"], sent);
        assert_eq!(body["stdout"], "ok");
    }

    #[tokio::test]
    async fn test_unreachable_upstream_returns_failure_envelope() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let dead = format!("http://{}/compile", listener.local_addr().unwrap());
        drop(listener);
        let proxy = serve_proxy(dead).await;

        let response = reqwest::Client::new()
            .post(format!("{}/api/compile", proxy))
            .json(&serde_json::json!({"stdin": ""}))
            .send()
            .await
            .unwrap();

        assert_eq!(response.status(), reqwest::StatusCode::INTERNAL_SERVER_ERROR);
        let body: Value = response.json().await.unwrap();
        assert_eq!(body["success"], false);
        assert!(body["message"].as_str().is_some_and(|m| !m.is_empty()));
    }

    #[tokio::test]
    async fn test_invalid_json_body_returns_failure_envelope() {
        let proxy = serve_proxy("http://127.0.0.1:9/never-called".to_string()).await;

        let response = reqwest::Client::new()
            .post(format!("{}/api/compile", proxy))
            .body("not json")
            .send()
            .await
            .unwrap();

        assert_eq!(response.status(), reqwest::StatusCode::INTERNAL_SERVER_ERROR);
        let body: Value = response.json().await.unwrap();
        assert_eq!(body["success"], false);
    }

    #[tokio::test]
    async fn test_health_check() {
        let proxy = serve_proxy("http://127.0.0.1:9/unused".to_string()).await;

        let response = reqwest::get(format!("{}/status", proxy)).await.unwrap();

        assert_eq!(response.status(), reqwest::StatusCode::OK);
        assert_eq!(response.text().await.unwrap(), "OK");
    }
}
