mod common;

use axum::http::StatusCode;
use common::{setup_test_app, student_payload};
use serde_json::json;

fn error_fields(body: &serde_json::Value) -> Vec<String> {
    body["errors"]
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["field"].as_str().unwrap().to_string())
        .collect()
}

#[tokio::test]
async fn test_create_student_as_admin() {
    let app = setup_test_app().await;

    let (status, body) = app
        .admin(
            "POST",
            "/api/students",
            Some(json!({
                "name": "Maria Silva",
                "email": "maria@escola.com",
                "ra": "RA2025001",
                "cpf": "529.982.247-25"
            })),
        )
        .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["object"], "student");
    assert_eq!(body["message"], "Estudante criado com sucesso");
    assert_eq!(body["data"]["student"]["cpf"], "52998224725");
    assert_eq!(body["data"]["student"]["ra"], "RA2025001");
    assert!(body["data"].get("enrollments").is_none());
}

#[tokio::test]
async fn test_create_student_as_student_forbidden() {
    let app = setup_test_app().await;

    let (status, body) = app
        .send(
            "POST",
            "/api/students",
            Some(&app.student_token),
            Some(student_payload("Maria Silva")),
        )
        .await;

    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["message"], "Acesso permitido apenas para administradores");
}

#[tokio::test]
async fn test_create_student_without_token() {
    let app = setup_test_app().await;

    let (status, _) = app
        .send("POST", "/api/students", None, Some(student_payload("Maria Silva")))
        .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_create_student_lists_every_missing_field() {
    let app = setup_test_app().await;

    let (status, body) = app.admin("POST", "/api/students", Some(json!({}))).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Erro de validação");
    assert_eq!(error_fields(&body), vec!["name", "email", "ra", "cpf"]);
}

#[tokio::test]
async fn test_repeated_digit_cpf_rejected() {
    let app = setup_test_app().await;
    let mut payload = student_payload("Maria Silva");
    payload["cpf"] = json!("111.111.111-11");

    let (status, body) = app.admin("POST", "/api/students", Some(payload)).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["errors"], json!([{ "field": "cpf", "message": "CPF inválido" }]));
}

#[tokio::test]
async fn test_duplicate_unique_fields_reported_together() {
    let app = setup_test_app().await;
    let payload = student_payload("Maria Silva");
    app.create_student(payload.clone()).await;

    let (status, body) = app.admin("POST", "/api/students", Some(payload)).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error_fields(&body), vec!["cpf", "ra", "email"]);
    assert_eq!(body["errors"][2]["message"], "Este email já está cadastrado");
}

#[tokio::test]
async fn test_create_student_with_course_groups() {
    let app = setup_test_app().await;
    let first = app.create_course_group("Turma A").await;
    let second = app.create_course_group("Turma B").await;

    let mut payload = student_payload("Maria Silva");
    payload["courseGroupIds"] = json!([first, second, first]);
    let (status, body) = app.admin("POST", "/api/students", Some(payload)).await;

    assert_eq!(status, StatusCode::CREATED);
    let enrollments = body["data"]["enrollments"].as_array().unwrap();
    assert_eq!(enrollments.len(), 2);
    assert!(enrollments.iter().all(|e| e["status"] == "active"));
}

#[tokio::test]
async fn test_create_student_with_unknown_course_group_writes_nothing() {
    let app = setup_test_app().await;
    let mut payload = student_payload("Maria Silva");
    payload["courseGroupIds"] = json!([uuid::Uuid::new_v4()]);

    let (status, body) = app.admin("POST", "/api/students", Some(payload)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["errors"][0]["field"], "courseGroupIds");

    let (_, body) = app.admin("GET", "/api/students", None).await;
    assert_eq!(body["data"]["total"], 0);
}

#[tokio::test]
async fn test_get_student_with_enrollments() {
    let app = setup_test_app().await;
    let group = app.create_course_group("Turma A").await;
    let mut payload = student_payload("Maria Silva");
    payload["courseGroupIds"] = json!([group]);
    let id = app.create_student(payload).await;

    for uri in [format!("/api/students/{id}"), format!("/api/students/{id}/enrollments")] {
        let (status, body) = app.admin("GET", &uri, None).await;
        assert_eq!(status, StatusCode::OK, "{uri}");
        assert_eq!(body["message"], "Estudante encontrado");
        assert_eq!(body["data"]["id"], id.as_str());
        assert_eq!(body["data"]["enrollments"][0]["courseGroup"]["name"], "Turma A");
    }
}

#[tokio::test]
async fn test_get_student_not_found_and_invalid_id() {
    let app = setup_test_app().await;

    let (status, body) = app
        .admin("GET", &format!("/api/students/{}", uuid::Uuid::new_v4()), None)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Estudante não encontrado(a)");

    let (status, _) = app.admin("GET", "/api/students/abc", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_list_students_with_filters_and_active_count() {
    let app = setup_test_app().await;
    let group = app.create_course_group("Turma A").await;

    let mut maria = student_payload("Maria Silva");
    maria["courseGroupIds"] = json!([group]);
    app.create_student(maria).await;
    app.create_student(student_payload("João Pereira")).await;
    app.create_student(student_payload("Mariana Costa")).await;

    let (status, body) = app.admin("GET", "/api/students?name=MARIA", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["object"], "student");
    assert_eq!(body["message"], "Lista de estudantes");
    assert_eq!(body["data"]["total"], 2);

    let students = body["data"]["students"].as_array().unwrap();
    let maria = students.iter().find(|s| s["name"] == "Maria Silva").unwrap();
    assert_eq!(maria["activeCourseCount"], 1);
    let mariana = students.iter().find(|s| s["name"] == "Mariana Costa").unwrap();
    assert_eq!(mariana["activeCourseCount"], 0);
}

#[tokio::test]
async fn test_list_students_pagination_defaults_on_garbage() {
    let app = setup_test_app().await;
    for name in ["Aluno Um", "Aluno Dois", "Aluno Três"] {
        app.create_student(student_payload(name)).await;
    }

    let (status, body) = app
        .admin("GET", "/api/students?page=abc&limit=2", None)
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["students"].as_array().unwrap().len(), 2);
    assert_eq!(body["data"]["totalPages"], 2);
    assert_eq!(body["data"]["currentPage"], 1);
}

#[tokio::test]
async fn test_list_students_page_far_past_the_end() {
    let app = setup_test_app().await;
    app.create_student(student_payload("Maria Silva")).await;

    let (status, body) = app
        .admin("GET", "/api/students?page=9223372036854775807", None)
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["students"], json!([]));
    assert_eq!(body["data"]["total"], 1);
    assert_eq!(body["data"]["currentPage"], i64::MAX);
}

#[tokio::test]
async fn test_update_student_rejects_immutable_fields() {
    let app = setup_test_app().await;
    let payload = student_payload("Maria Silva");
    let id = app.create_student(payload.clone()).await;

    let (status, body) = app
        .admin(
            "PUT",
            &format!("/api/students/{id}"),
            Some(json!({ "ra": payload["ra"], "cpf": payload["cpf"] })),
        )
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error_fields(&body), vec!["ra", "cpf"]);
    assert_eq!(body["errors"][0]["message"], "O RA não pode ser alterado");
}

#[tokio::test]
async fn test_update_student_and_add_course_groups() {
    let app = setup_test_app().await;
    let first = app.create_course_group("Turma A").await;
    let second = app.create_course_group("Turma B").await;
    let mut payload = student_payload("Maria Silva");
    payload["courseGroupIds"] = json!([first]);
    let id = app.create_student(payload).await;

    let (status, body) = app
        .admin(
            "PUT",
            &format!("/api/students/{id}"),
            Some(json!({ "name": "Maria Souza", "courseGroupIds": [first, second] })),
        )
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Estudante atualizado com sucesso");
    assert_eq!(body["data"]["student"]["name"], "Maria Souza");
    let added = body["data"]["newEnrollments"].as_array().unwrap();
    assert_eq!(added.len(), 1);
    assert_eq!(added[0]["course_group_id"], second.as_str());
}

#[tokio::test]
async fn test_update_student_email_taken() {
    let app = setup_test_app().await;
    let taken = student_payload("Maria Silva");
    app.create_student(taken.clone()).await;
    let id = app.create_student(student_payload("João Pereira")).await;

    let (status, body) = app
        .admin(
            "PUT",
            &format!("/api/students/{id}"),
            Some(json!({ "email": taken["email"] })),
        )
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["errors"][0]["message"], "Este email já está cadastrado");
}

#[tokio::test]
async fn test_delete_student_cascades_enrollments() {
    let app = setup_test_app().await;
    let group = app.create_course_group("Turma A").await;
    let mut payload = student_payload("Maria Silva");
    payload["courseGroupIds"] = json!([group]);
    let id = app.create_student(payload).await;

    let (status, body) = app.admin("DELETE", &format!("/api/students/{id}"), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert!(body.is_null());

    let (status, _) = app.admin("GET", &format!("/api/students/{id}"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    // With its only enrollment gone the course group can be deleted.
    let (status, _) = app
        .admin("DELETE", &format!("/api/course-groups/{group}"), None)
        .await;
    assert_eq!(status, StatusCode::NO_CONTENT);
}
