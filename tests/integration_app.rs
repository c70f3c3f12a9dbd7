mod common;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use common::setup_test_app;
use tower::ServiceExt;

#[tokio::test]
async fn test_api_info() {
    let app = setup_test_app().await;

    let (status, body) = app.send("GET", "/api", None, None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["message"], "API REST - Desafio Técnico +A Educação");
    assert_eq!(body["version"], "1.0.0");
    assert_eq!(body["environment"], "test");
}

#[tokio::test]
async fn test_unknown_route() {
    let app = setup_test_app().await;

    let (status, body) = app.send("GET", "/api/nada-aqui", None, None).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["status"], "error");
    assert_eq!(body["message"], "Rota não encontrada: /api/nada-aqui");
}

#[tokio::test]
async fn test_security_headers_on_every_response() {
    let app = setup_test_app().await;

    for uri in ["/api", "/api/users/profile", "/missing"] {
        let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
        let response = app.router.clone().oneshot(request).await.unwrap();
        let headers = response.headers();

        assert_eq!(headers["x-content-type-options"], "nosniff", "{uri}");
        assert_eq!(headers["x-frame-options"], "DENY", "{uri}");
        assert_eq!(headers["x-xss-protection"], "1; mode=block", "{uri}");
    }
}

#[tokio::test]
async fn test_cors_preflight_for_allowed_origin() {
    let app = setup_test_app().await;

    let request = Request::builder()
        .method("OPTIONS")
        .uri("/api/students")
        .header("origin", "http://localhost:5173")
        .header("access-control-request-method", "POST")
        .body(Body::empty())
        .unwrap();
    let response = app.router.clone().oneshot(request).await.unwrap();

    assert_eq!(
        response.headers()["access-control-allow-origin"],
        "http://localhost:5173"
    );
}

#[tokio::test]
async fn test_openapi_document_served() {
    let app = setup_test_app().await;

    let (status, body) = app.send("GET", "/api-docs/openapi.json", None, None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["info"]["title"], "Matrícula API");
    assert!(body["paths"]["/api/enrollments/enroll"].is_object());
}
