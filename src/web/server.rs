use axum::{routing::get, routing::post, Router};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use super::api::poller as poller_handlers;
use super::api_doc::ApiDoc;
use super::state::AppState;
use crate::config::Config;

pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/api/poller/start", post(poller_handlers::start))
        .route("/api/poller/stop", post(poller_handlers::stop))
        .route("/api/poller/status", get(poller_handlers::status))
        .route("/api/position", get(poller_handlers::position))
        // OpenAPI / Swagger
        .merge(SwaggerUi::new("/swagger-ui").url("/api-doc/openapi.json", ApiDoc::openapi()))
        // Middleware
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

pub async fn run_server(config: Config) -> std::io::Result<()> {
    let bind_addr = config.web.bind.clone();
    let state = AppState::new(config).map_err(std::io::Error::other)?;
    let app = router(state.clone());

    log::info!("Starting server on {}", bind_addr);

    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    let poller = state.poller.lock().await;
    poller.stop();
    if let Some(handle) = poller.current() {
        handle.join().await;
    }
    Ok(())
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => log::info!("Shutdown requested"),
        Err(e) => {
            log::error!("Cannot listen for Ctrl-C, serving until killed: {}", e);
            std::future::pending::<()>().await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::poller::RequestParameters;
    use crate::position::PositionRecord;
    use crate::soap::SoapEndpoint;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use std::time::Duration;
    use tower::ServiceExt;

    const START_BODY: &str = r#"{"platform_id":"27424","caller_ip":"10.0.0.5","window_seconds":1,"license_key":"ABC"}"#;

    fn test_state() -> AppState {
        state_with_request(None)
    }

    fn state_with_request(request: Option<RequestParameters>) -> AppState {
        let config = Config {
            request,
            service: SoapEndpoint {
                url: "http://127.0.0.1:9/satws.php".to_string(),
                timeout: Duration::from_millis(200),
                ..SoapEndpoint::default()
            },
            ..Config::default()
        };
        AppState::new(config).unwrap()
    }

    fn post_json(uri: &str, body: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn get(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    async fn json(response: axum::response::Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_status_before_start_is_null() {
        let app = router(test_state());
        let response = app.oneshot(get("/api/poller/status")).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert!(json(response).await.is_null());
    }

    #[tokio::test]
    async fn test_start_then_conflict_then_stop() {
        let state = test_state();

        let response = router(state.clone())
            .oneshot(post_json("/api/poller/start", START_BODY))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = json(response).await;
        assert_eq!(body["platform_id"], "27424");
        assert_eq!(body["state"], "running");

        let response = router(state.clone())
            .oneshot(post_json("/api/poller/start", START_BODY))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CONFLICT);
        assert_eq!(json(response).await["error"], "poller_running");

        let response = router(state.clone())
            .oneshot(post_json("/api/poller/stop", ""))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let handle = state.poller.lock().await.current().cloned().unwrap();
        handle.join().await;
        let response = router(state)
            .oneshot(get("/api/poller/status"))
            .await
            .unwrap();
        assert_eq!(json(response).await["state"], "stopped");
    }

    #[tokio::test]
    async fn test_start_without_body_uses_configured_request() {
        let configured = RequestParameters::new("25544", "10.0.0.5", 1, "ABC");
        let state = state_with_request(Some(configured));

        let request = Request::builder()
            .method("POST")
            .uri("/api/poller/start")
            .body(Body::empty())
            .unwrap();
        let response = router(state.clone()).oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = json(response).await;
        assert_eq!(body["platform_id"], "25544");
        assert_eq!(body["state"], "running");

        state.poller.lock().await.stop();
    }

    #[tokio::test]
    async fn test_start_without_body_or_configured_request() {
        let request = Request::builder()
            .method("POST")
            .uri("/api/poller/start")
            .body(Body::empty())
            .unwrap();
        let response = router(test_state()).oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(json(response).await["error"], "validation_failed");
    }

    #[tokio::test]
    async fn test_start_with_invalid_parameters() {
        let body = r#"{"platform_id":"","caller_ip":"10.0.0.5","window_seconds":1,"license_key":"ABC"}"#;
        let response = router(test_state())
            .oneshot(post_json("/api/poller/start", body))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(json(response).await["error"], "validation_failed");
    }

    #[tokio::test]
    async fn test_position_follows_published_records() {
        let state = test_state();

        let response = router(state.clone())
            .oneshot(get("/api/position"))
            .await
            .unwrap();
        assert!(json(response).await.is_null());

        let record = PositionRecord {
            id: "27424".into(),
            short_name: "ISS".into(),
            latitude: 12.34,
            longitude: -56.78,
            altitude: 408.0,
        };
        {
            let poller = state.poller.lock().await;
            let topic = poller.config().topic.clone();
            assert_eq!(poller.channel().publish(&topic, record), 1);
        }

        let mut latest = None;
        for _ in 0..50 {
            latest = state.latest_position();
            if latest.is_some() {
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        assert_eq!(latest.unwrap().short_name, "ISS");

        let response = router(state).oneshot(get("/api/position")).await.unwrap();
        assert_eq!(json(response).await["latitude"], 12.34);
    }

    #[tokio::test]
    async fn test_shutdown_signal_waits() {
        let result = tokio::time::timeout(Duration::from_millis(50), shutdown_signal()).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_openapi_document_lists_routes() {
        let response = router(test_state())
            .oneshot(get("/api-doc/openapi.json"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let doc = json(response).await;
        assert!(doc["paths"]["/api/poller/start"].is_object());
        assert!(doc["paths"]["/api/position"].is_object());
    }
}
