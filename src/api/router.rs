//! Intake API router.
//!
//! Returns a composable `Router` that can be mounted on any axum server.
//! Routes are nested under `/api/`. Every response is marked
//! `Cache-Control: no-store` since bodies carry patient data.

use std::sync::Arc;

use axum::http::{header, HeaderValue};
use axum::routing::{get, post};
use axum::Router;
use tower_http::set_header::SetResponseHeaderLayer;

use crate::api::endpoints;
use crate::api::middleware;
use crate::api::types::ApiContext;
use crate::core_state::CoreState;

/// Build the intake API router.
///
/// Endpoint handlers use `State<ApiContext>` (provided via `with_state`).
/// NOTE: Path params use `:param` syntax (matchit 0.7 / axum 0.7).
pub fn intake_api_router(core: Arc<CoreState>) -> Router {
    let ctx = ApiContext::new(core);

    let api = Router::new()
        .route("/health", get(endpoints::health::check))
        .route("/stats", get(endpoints::dashboard::stats))
        .route("/dashboard", get(endpoints::dashboard::overview))
        .route(
            "/intakes",
            get(endpoints::intakes::list).post(endpoints::intakes::create),
        )
        .route("/intakes/:id", get(endpoints::intakes::detail))
        .route("/intakes/:id/steps", post(endpoints::intakes::update_step))
        .route("/intakes/:id/flag", post(endpoints::intakes::flag))
        .route("/patients/:id", get(endpoints::patients::detail))
        .route("/demo/seed", post(endpoints::demo::seed))
        .with_state(ctx);

    Router::new()
        .nest("/api", api)
        .layer(SetResponseHeaderLayer::overriding(
            header::CACHE_CONTROL,
            HeaderValue::from_static("no-store"),
        ))
        .layer(axum::middleware::from_fn(middleware::access_log::log_access))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt;

    fn test_core_state() -> Arc<CoreState> {
        Arc::new(CoreState::in_memory().unwrap())
    }

    fn make_request(method: &str, uri: &str, body: Option<serde_json::Value>) -> Request<Body> {
        let builder = Request::builder().method(method).uri(uri);
        match body {
            Some(json) => builder
                .header("Content-Type", "application/json")
                .body(Body::from(json.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        }
    }

    async fn response_json(response: axum::http::Response<Body>) -> serde_json::Value {
        let body = axum::body::to_bytes(response.into_body(), 65536)
            .await
            .unwrap();
        serde_json::from_slice(&body).unwrap()
    }

    async fn send(
        core: &Arc<CoreState>,
        method: &str,
        uri: &str,
        body: Option<serde_json::Value>,
    ) -> axum::http::Response<Body> {
        intake_api_router(core.clone())
            .oneshot(make_request(method, uri, body))
            .await
            .unwrap()
    }

    async fn create_sarah(core: &Arc<CoreState>) -> serde_json::Value {
        let response = send(
            core,
            "POST",
            "/api/intakes",
            Some(serde_json::json!({
                "first_name": "Sarah",
                "last_name": "Johnson",
                "date_of_birth": "1985-03-15",
                "email": "sarah.j@email.com"
            })),
        )
        .await;
        assert_eq!(response.status(), StatusCode::CREATED);
        response_json(response).await
    }

    #[tokio::test]
    async fn health_response_shape() {
        let core = test_core_state();
        let response = send(&core, "GET", "/api/health", None).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers().get("Cache-Control").unwrap(),
            "no-store"
        );

        let json = response_json(response).await;
        assert_eq!(json["status"], "ok");
        assert!(!json["version"].as_str().unwrap().is_empty());
    }

    #[tokio::test]
    async fn not_found_for_unknown_route() {
        let core = test_core_state();
        let response = send(&core, "GET", "/api/nonexistent", None).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn stats_empty_store_all_zero() {
        let core = test_core_state();
        let response = send(&core, "GET", "/api/stats", None).await;
        assert_eq!(response.status(), StatusCode::OK);
        let json = response_json(response).await;
        for key in ["total", "pending", "in_progress", "complete", "flagged"] {
            assert_eq!(json[key], 0, "{key}");
        }
    }

    #[tokio::test]
    async fn create_intake_response_shape() {
        let core = test_core_state();
        let json = create_sarah(&core).await;
        assert_eq!(json["patient"]["first_name"], "Sarah");
        assert_eq!(json["patient"]["date_of_birth"], "1985-03-15");
        assert_eq!(json["intake"]["status"], "pending");
        assert_eq!(json["intake"]["personal_info_complete"], true);
        assert_eq!(json["intake"]["patient_id"], json["patient"]["id"]);
    }

    #[tokio::test]
    async fn create_intake_validation_error_is_400() {
        let core = test_core_state();
        let response = send(
            &core,
            "POST",
            "/api/intakes",
            Some(serde_json::json!({
                "first_name": "Sarah",
                "last_name": "Johnson",
                "date_of_birth": "March 15"
            })),
        )
        .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let json = response_json(response).await;
        assert_eq!(json["error"]["code"], "BAD_REQUEST");
    }

    #[tokio::test]
    async fn malformed_create_body_is_400_envelope() {
        let core = test_core_state();
        let response = intake_api_router(core.clone())
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/intakes")
                    .header("Content-Type", "application/json")
                    .body(Body::from("{\"first_name\": "))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let json = response_json(response).await;
        assert_eq!(json["error"]["code"], "BAD_REQUEST");
        assert!(!json["error"]["message"].as_str().unwrap().is_empty());
    }

    #[tokio::test]
    async fn step_body_without_step_is_400_envelope() {
        let core = test_core_state();
        let created = create_sarah(&core).await;
        let id = created["intake"]["id"].as_str().unwrap().to_string();

        let response = send(
            &core,
            "POST",
            &format!("/api/intakes/{id}/steps"),
            Some(serde_json::json!({ "value": true })),
        )
        .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let json = response_json(response).await;
        assert_eq!(json["error"]["code"], "BAD_REQUEST");
    }

    #[tokio::test]
    async fn flag_without_json_content_type_is_400_envelope() {
        let core = test_core_state();
        let created = create_sarah(&core).await;
        let id = created["intake"]["id"].as_str().unwrap().to_string();

        let response = send(&core, "POST", &format!("/api/intakes/{id}/flag"), None).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let json = response_json(response).await;
        assert_eq!(json["error"]["code"], "BAD_REQUEST");
    }

    #[tokio::test]
    async fn step_flow_reaches_complete() {
        let core = test_core_state();
        let created = create_sarah(&core).await;
        let id = created["intake"]["id"].as_str().unwrap().to_string();

        let mut last = serde_json::Value::Null;
        for step in [
            "insurance_verified",
            "medical_history_complete",
            "consent_forms_signed",
            "id_verified",
        ] {
            let payload = match step {
                "insurance_verified" => serde_json::json!({
                    "kind": "insurance",
                    "provider": "Blue Cross",
                    "policy_number": "BC-1"
                }),
                _ => serde_json::json!({ "kind": "none" }),
            };
            let response = send(
                &core,
                "POST",
                &format!("/api/intakes/{id}/steps"),
                Some(serde_json::json!({ "step": step, "payload": payload })),
            )
            .await;
            assert_eq!(response.status(), StatusCode::OK, "{step}");
            last = response_json(response).await;
        }

        assert_eq!(last["status"], "complete");
        assert!(last["completed_at"].is_string());
        assert_eq!(last["insurance_provider"], "Blue Cross");

        let stats = response_json(send(&core, "GET", "/api/stats", None).await).await;
        assert_eq!(stats["complete"], 1);
        assert_eq!(stats["total"], 1);
    }

    #[tokio::test]
    async fn unknown_step_is_400() {
        let core = test_core_state();
        let created = create_sarah(&core).await;
        let id = created["intake"]["id"].as_str().unwrap().to_string();

        let response = send(
            &core,
            "POST",
            &format!("/api/intakes/{id}/steps"),
            Some(serde_json::json!({ "step": "status", "value": true })),
        )
        .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn step_on_missing_intake_is_404() {
        let core = test_core_state();
        let response = send(
            &core,
            "POST",
            &format!("/api/intakes/{}/steps", uuid::Uuid::new_v4()),
            Some(serde_json::json!({ "step": "id_verified" })),
        )
        .await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn malformed_id_is_400() {
        let core = test_core_state();
        let response = send(&core, "GET", "/api/intakes/42", None).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn flag_defaults_reason_and_shows_on_dashboard() {
        let core = test_core_state();
        let created = create_sarah(&core).await;
        let id = created["intake"]["id"].as_str().unwrap().to_string();

        let response = send(
            &core,
            "POST",
            &format!("/api/intakes/{id}/flag"),
            Some(serde_json::json!({})),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
        let json = response_json(response).await;
        assert_eq!(json["status"], "flagged");
        assert_eq!(json["flagged_reason"], "Needs review");
        assert_eq!(json["personal_info_complete"], true);

        let dashboard = response_json(send(&core, "GET", "/api/dashboard", None).await).await;
        assert_eq!(dashboard["stats"]["flagged"], 1);
        assert_eq!(dashboard["flagged"].as_array().unwrap().len(), 1);
        assert_eq!(dashboard["recent_intakes"].as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn seed_then_filter_list() {
        let core = test_core_state();
        let seeded = response_json(send(&core, "POST", "/api/demo/seed", None).await).await;
        assert_eq!(seeded["seeded"], 5);

        let response = send(&core, "GET", "/api/intakes?status=in_progress", None).await;
        assert_eq!(response.status(), StatusCode::OK);
        let json = response_json(response).await;
        assert_eq!(json["intakes"].as_array().unwrap().len(), 2);

        let response = send(&core, "GET", "/api/intakes?status=archived", None).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn patient_detail_response_shape() {
        let core = test_core_state();
        let created = create_sarah(&core).await;
        let patient_id = created["patient"]["id"].as_str().unwrap().to_string();

        let response = send(&core, "GET", &format!("/api/patients/{patient_id}"), None).await;
        assert_eq!(response.status(), StatusCode::OK);
        let json = response_json(response).await;
        assert_eq!(json["patient"]["last_name"], "Johnson");
        assert_eq!(json["completion_percentage"], 20);
        assert_eq!(json["pending_steps"].as_array().unwrap().len(), 4);

        let missing = send(
            &core,
            "GET",
            &format!("/api/patients/{}", uuid::Uuid::new_v4()),
            None,
        )
        .await;
        assert_eq!(missing.status(), StatusCode::NOT_FOUND);
    }
}
