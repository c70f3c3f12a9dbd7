mod common;

use axum::http::StatusCode;
use common::setup_test_app;
use serde_json::json;

fn new_user(email: &str, role: &str) -> serde_json::Value {
    json!({
        "name": "Carla Mendes",
        "email": email,
        "password": "Segura123",
        "confirmPassword": "Segura123",
        "role": role
    })
}

#[tokio::test]
async fn test_get_profile() {
    let app = setup_test_app().await;

    let (status, body) = app
        .send("GET", "/api/users/profile", Some(&app.student_token), None)
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["object"], "user");
    assert_eq!(body["message"], "Perfil do usuário");
    assert_eq!(body["data"]["email"], "student@example.com");
    assert_eq!(body["data"]["role"], "student");
    assert!(body["data"].get("password_hash").is_none());
}

#[tokio::test]
async fn test_update_profile_ignores_role() {
    let app = setup_test_app().await;

    let (status, body) = app
        .send(
            "PUT",
            "/api/users/profile",
            Some(&app.student_token),
            Some(json!({ "name": "Estudante Renomeado", "role": "admin" })),
        )
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Perfil atualizado com sucesso");
    assert_eq!(body["data"]["name"], "Estudante Renomeado");
    assert_eq!(body["data"]["role"], "student");
}

#[tokio::test]
async fn test_update_profile_rejects_password_and_taken_email() {
    let app = setup_test_app().await;

    let (status, body) = app
        .send(
            "PUT",
            "/api/users/profile",
            Some(&app.student_token),
            Some(json!({ "password": "Outra1234" })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["errors"][0]["field"], "password");

    let (status, body) = app
        .send(
            "PUT",
            "/api/users/profile",
            Some(&app.student_token),
            Some(json!({ "email": "admin@example.com" })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["errors"][0]["message"], "Este email já está em uso");
}

#[tokio::test]
async fn test_admin_routes_forbidden_for_students() {
    let app = setup_test_app().await;

    for (method, uri) in [
        ("GET", "/api/users".to_string()),
        ("GET", format!("/api/users/{}", app.admin.id)),
        ("DELETE", format!("/api/users/{}", app.admin.id)),
    ] {
        let (status, body) = app.send(method, &uri, Some(&app.student_token), None).await;
        assert_eq!(status, StatusCode::FORBIDDEN, "{method} {uri}");
        assert_eq!(body["message"], "Acesso permitido apenas para administradores");
    }

    let (status, _) = app
        .send(
            "POST",
            "/api/users",
            Some(&app.student_token),
            Some(new_user("carla@escola.com", "student")),
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_create_user_as_admin() {
    let app = setup_test_app().await;

    let (status, body) = app
        .admin("POST", "/api/users", Some(new_user("carla@escola.com", "admin")))
        .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["object"], "user");
    assert_eq!(body["message"], "Usuário criado com sucesso");
    assert_eq!(body["data"]["role"], "admin");
    assert!(body["data"].get("password_hash").is_none());

    let (status, _) = app
        .send(
            "POST",
            "/api/users/login",
            None,
            Some(json!({ "email": "carla@escola.com", "password": "Segura123" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_create_user_validation() {
    let app = setup_test_app().await;

    let (status, body) = app
        .admin(
            "POST",
            "/api/users",
            Some(json!({
                "name": "Carla",
                "email": "carla@escola.com",
                "password": "Segura123",
                "confirmPassword": "Diferente1",
                "role": "teacher"
            })),
        )
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    let fields: Vec<&str> = body["errors"]
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["field"].as_str().unwrap())
        .collect();
    assert_eq!(fields, vec!["confirmPassword", "role"]);

    let (status, body) = app
        .admin("POST", "/api/users", Some(new_user("admin@example.com", "student")))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["errors"][0]["field"], "email");
}

#[tokio::test]
async fn test_list_users_with_filters() {
    let app = setup_test_app().await;
    app.admin("POST", "/api/users", Some(new_user("carla@escola.com", "student")))
        .await;

    let (status, body) = app.admin("GET", "/api/users?role=student&limit=1", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["object"], "users");
    assert_eq!(body["message"], "Lista de usuários");
    assert_eq!(body["data"]["users"].as_array().unwrap().len(), 1);
    assert_eq!(body["data"]["total"], 2);
    assert_eq!(body["data"]["totalPages"], 2);
    assert_eq!(body["data"]["currentPage"], 1);

    let (_, body) = app
        .admin("GET", "/api/users?email=admin@example.com", None)
        .await;
    assert_eq!(body["data"]["total"], 1);
    assert_eq!(body["data"]["users"][0]["role"], "admin");
}

#[tokio::test]
async fn test_get_update_and_delete_user() {
    let app = setup_test_app().await;
    let student_uri = format!("/api/users/{}", app.student.id);

    let (status, body) = app.admin("GET", &student_uri, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Usuário encontrado");

    let (status, body) = app
        .admin("PUT", &student_uri, Some(json!({ "role": "admin" })))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Usuário atualizado com sucesso");
    assert_eq!(body["data"]["role"], "admin");

    // The promotion applies to the existing token on the next request.
    let (status, _) = app
        .send("GET", "/api/users", Some(&app.student_token), None)
        .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = app.admin("DELETE", &student_uri, None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert!(body.is_null());

    let (status, body) = app.admin("GET", &student_uri, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Usuário não encontrado(a)");
}

#[tokio::test]
async fn test_admin_cannot_delete_self() {
    let app = setup_test_app().await;

    let (status, body) = app
        .admin("DELETE", &format!("/api/users/{}", app.admin.id), None)
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Você não pode remover seu próprio usuário");
}

#[tokio::test]
async fn test_invalid_user_id() {
    let app = setup_test_app().await;

    let (status, body) = app.admin("GET", "/api/users/123", None).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["status"], "error");
}
