mod common;

use axum::http::StatusCode;
use common::{setup_test_app, student_payload};
use serde_json::json;

const DATE_RANGE_MESSAGE: &str = "A data de início deve ser anterior à data de término";

fn group(name: &str, start: &str, end: &str) -> serde_json::Value {
    json!({ "name": name, "start_date": start, "end_date": end })
}

#[tokio::test]
async fn test_create_course_group() {
    let app = setup_test_app().await;

    let (status, body) = app
        .admin(
            "POST",
            "/api/course-groups",
            Some(json!({
                "name": "Turma A",
                "description": "Turma da manhã",
                "start_date": "2025-02-01",
                "end_date": "2025-06-30",
                "max_students": 30
            })),
        )
        .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["object"], "courseGroup");
    assert_eq!(body["message"], "Turma criada com sucesso");
    assert_eq!(body["data"]["name"], "Turma A");
    assert_eq!(body["data"]["description"], "Turma da manhã");
    assert_eq!(body["data"]["max_students"], 30);
}

#[tokio::test]
async fn test_students_can_read_but_not_write() {
    let app = setup_test_app().await;
    let id = app.create_course_group("Turma A").await;

    let (status, body) = app
        .send("GET", "/api/course-groups", Some(&app.student_token), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["total"], 1);

    let (status, body) = app
        .send("GET", &format!("/api/course-groups/{id}"), Some(&app.student_token), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Turma encontrada");

    let (status, _) = app
        .send(
            "POST",
            "/api/course-groups",
            Some(&app.student_token),
            Some(group("Turma B", "2025-02-01", "2025-06-30")),
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    for method in ["PUT", "DELETE"] {
        let (status, _) = app
            .send(
                method,
                &format!("/api/course-groups/{id}"),
                Some(&app.student_token),
                Some(json!({ "name": "Outro nome" })),
            )
            .await;
        assert_eq!(status, StatusCode::FORBIDDEN, "{method}");
    }

    let (status, _) = app
        .send(
            "GET",
            &format!("/api/course-groups/{id}/enrollments"),
            Some(&app.student_token),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_reads_require_a_token() {
    let app = setup_test_app().await;

    let (status, body) = app.send("GET", "/api/course-groups", None, None).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "Token não fornecido");
}

#[tokio::test]
async fn test_create_validation() {
    let app = setup_test_app().await;

    let (status, body) = app.admin("POST", "/api/course-groups", Some(json!({}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let fields: Vec<&str> = body["errors"]
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["field"].as_str().unwrap())
        .collect();
    assert_eq!(fields, vec!["name", "start_date", "end_date"]);

    let (status, body) = app
        .admin(
            "POST",
            "/api/course-groups",
            Some(json!({
                "name": "Turma A",
                "start_date": "2025-02-01",
                "end_date": "2025-06-30",
                "max_students": -1
            })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["errors"][0]["field"], "max_students");

    let (status, body) = app
        .admin("POST", "/api/course-groups", Some(group("TA", "2025-02-01", "2025-06-30")))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body["errors"][0]["message"],
        "O nome da turma deve ter entre 3 e 100 caracteres"
    );

    let (status, body) = app
        .admin("POST", "/api/course-groups", Some(group("Turma A", "ontem", "2025-06-30")))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["errors"][0]["message"], "A data de início é inválida");
}

#[tokio::test]
async fn test_create_rejects_inverted_or_equal_dates() {
    let app = setup_test_app().await;

    for (start, end) in [("2025-06-30", "2025-02-01"), ("2025-02-01", "2025-02-01")] {
        let (status, body) = app
            .admin("POST", "/api/course-groups", Some(group("Turma A", start, end)))
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{start} {end}");
        assert_eq!(
            body["errors"],
            json!([{ "field": "date_range", "message": DATE_RANGE_MESSAGE }])
        );
    }
}

#[tokio::test]
async fn test_update_checks_changed_date_against_stored_one() {
    let app = setup_test_app().await;
    let id = app.create_course_group("Turma A").await;
    let uri = format!("/api/course-groups/{id}");

    // Stored range is 2025-02-01 to 2025-06-30.
    let (status, body) = app
        .admin("PUT", &uri, Some(json!({ "end_date": "2025-01-15" })))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["errors"][0]["field"], "date_range");

    let (status, body) = app
        .admin("PUT", &uri, Some(json!({ "start_date": "2025-07-01" })))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["errors"][0]["message"], DATE_RANGE_MESSAGE);

    let (status, body) = app
        .admin(
            "PUT",
            &uri,
            Some(json!({ "start_date": "2025-07-01", "end_date": "2025-12-15" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Turma atualizada com sucesso");
    assert!(body["data"]["start_date"].as_str().unwrap().starts_with("2025-07-01"));
}

#[tokio::test]
async fn test_update_clears_nullable_fields() {
    let app = setup_test_app().await;
    let id = app.create_course_group("Turma A").await;

    let (status, body) = app
        .admin(
            "PUT",
            &format!("/api/course-groups/{id}"),
            Some(json!({ "max_students": null, "description": null })),
        )
        .await;

    assert_eq!(status, StatusCode::OK);
    assert!(body["data"]["max_students"].is_null());
    assert!(body["data"]["description"].is_null());
    assert_eq!(body["data"]["name"], "Turma A");
}

#[tokio::test]
async fn test_duplicate_name_rejected() {
    let app = setup_test_app().await;
    app.create_course_group("Turma A").await;
    let other = app.create_course_group("Turma B").await;

    let (status, body) = app
        .admin("POST", "/api/course-groups", Some(group("Turma A", "2025-02-01", "2025-06-30")))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["errors"][0]["message"], "Uma turma com este nome já existe");

    let (status, _) = app
        .admin(
            "PUT",
            &format!("/api/course-groups/{other}"),
            Some(json!({ "name": "Turma A" })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    // Keeping its own name is fine.
    let (status, _) = app
        .admin(
            "PUT",
            &format!("/api/course-groups/{other}"),
            Some(json!({ "name": "Turma B" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_list_course_groups_with_filters() {
    let app = setup_test_app().await;
    app.create_course_group("Matemática Manhã").await;
    app.create_course_group("Matemática Noite").await;
    app.create_course_group("História").await;
    app.admin(
        "POST",
        "/api/course-groups",
        Some(group("Matemática Verão", "2026-01-05", "2026-02-20")),
    )
    .await;

    let (status, body) = app
        .admin("GET", "/api/course-groups?name=MATEM", None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Lista de turmas");
    assert_eq!(body["data"]["total"], 3);
    assert_eq!(body["data"]["courseGroups"].as_array().unwrap().len(), 3);

    let (_, body) = app
        .admin("GET", "/api/course-groups?startDate=2026-01-01", None)
        .await;
    assert_eq!(body["data"]["total"], 1);
    assert_eq!(body["data"]["courseGroups"][0]["name"], "Matemática Verão");

    let (_, body) = app
        .admin("GET", "/api/course-groups?endDate=2025-12-31", None)
        .await;
    assert_eq!(body["data"]["total"], 3);
}

#[tokio::test]
async fn test_list_rejects_invalid_filter_date() {
    let app = setup_test_app().await;

    let (status, body) = app
        .admin("GET", "/api/course-groups?startDate=amanha", None)
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["errors"][0]["field"], "startDate");
}

#[tokio::test]
async fn test_course_group_enrollments_listing() {
    let app = setup_test_app().await;
    let id = app.create_course_group("Turma A").await;
    let mut payload = student_payload("Maria Silva");
    payload["courseGroupIds"] = json!([id]);
    app.create_student(payload).await;

    let (status, body) = app
        .admin("GET", &format!("/api/course-groups/{id}/enrollments"), None)
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["object"], "enrollment");
    assert_eq!(body["message"], "Matrículas da turma");
    let enrollments = body["data"].as_array().unwrap();
    assert_eq!(enrollments.len(), 1);
    assert_eq!(enrollments[0]["student"]["name"], "Maria Silva");
    assert_eq!(enrollments[0]["status"], "active");
}

#[tokio::test]
async fn test_delete_blocked_while_enrollments_exist() {
    let app = setup_test_app().await;
    let id = app.create_course_group("Turma A").await;
    let mut payload = student_payload("Maria Silva");
    payload["courseGroupIds"] = json!([id]);
    let student = app.create_student(payload).await;

    // Cancelled enrollments still block the delete.
    let (status, _) = app
        .admin(
            "PUT",
            "/api/enrollments/cancel",
            Some(json!({ "student_id": student, "course_group_id": id })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = app
        .admin("DELETE", &format!("/api/course-groups/{id}"), None)
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body["message"],
        "Não é possível excluir uma turma com matrículas ativas"
    );
}

#[tokio::test]
async fn test_delete_course_group() {
    let app = setup_test_app().await;
    let id = app.create_course_group("Turma A").await;
    let uri = format!("/api/course-groups/{id}");

    let (status, body) = app.admin("DELETE", &uri, None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert!(body.is_null());

    let (status, body) = app.admin("GET", &uri, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Turma não encontrado(a)");

    let (status, _) = app.admin("DELETE", &uri, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
