#![allow(dead_code)]

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use matricula::matricula_auth::create_access_token;
use matricula::matricula_config::{CorsConfig, JwtConfig, ServerConfig};
use matricula::modules::users::model::{NewUser, User, UserRole};
use matricula::modules::users::repository::UserRepository;
use matricula::router::init_router;
use matricula::state::{AppState, Repositories};
use matricula::testing::MemoryStore;
use serde_json::{Value, json};
use tower::ServiceExt;
use uuid::Uuid;

pub const ADMIN_PASSWORD: &str = "Admin123";
pub const STUDENT_PASSWORD: &str = "Aluno123";

pub fn test_jwt_config() -> JwtConfig {
    JwtConfig {
        secret: "test_secret_key_for_testing_purposes".to_string(),
        expiry: 3600,
    }
}

/// The router over an in-memory store, seeded with one admin and one
/// student account.
pub struct TestApp {
    pub router: Router,
    pub store: MemoryStore,
    pub admin: User,
    pub student: User,
    pub admin_token: String,
    pub student_token: String,
}

async fn seed_user(store: &MemoryStore, name: &str, email: &str, password: &str, role: UserRole) -> User {
    UserRepository::create(
        store,
        NewUser {
            name: name.to_string(),
            email: email.to_string(),
            // Low cost keeps the suite fast
            password_hash: bcrypt::hash(password, 4).unwrap(),
            role,
        },
    )
    .await
    .unwrap()
}

pub fn token_for(user: &User) -> String {
    create_access_token(user.id.into_inner(), user.role.as_str(), &test_jwt_config()).unwrap()
}

pub async fn setup_test_app() -> TestApp {
    let store = MemoryStore::new();
    let admin = seed_user(&store, "Administrador", "admin@example.com", ADMIN_PASSWORD, UserRole::Admin).await;
    let student = seed_user(&store, "Estudante", "student@example.com", STUDENT_PASSWORD, UserRole::Student).await;

    let state = AppState::new(
        Repositories::in_memory(store.clone()),
        test_jwt_config(),
        CorsConfig {
            allowed_origins: vec!["http://localhost:5173".to_string()],
        },
        ServerConfig {
            environment: "test".to_string(),
            ..ServerConfig::default()
        },
    );

    TestApp {
        router: init_router(state, None),
        admin_token: token_for(&admin),
        student_token: token_for(&student),
        store,
        admin,
        student,
    }
}

impl TestApp {
    /// Sends a request and returns the status with the parsed JSON body
    /// (`Value::Null` for empty bodies).
    pub async fn send(
        &self,
        method: &str,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header("authorization", format!("Bearer {}", token));
        }
        let request = match body {
            Some(body) => builder
                .header("content-type", "application/json")
                .body(Body::from(serde_json::to_string(&body).unwrap()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, body)
    }

    pub async fn admin(&self, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        self.send(method, uri, Some(&self.admin_token), body).await
    }

    /// Creates a course group through the API and returns its id.
    pub async fn create_course_group(&self, name: &str) -> String {
        let (status, body) = self
            .admin(
                "POST",
                "/api/course-groups",
                Some(json!({
                    "name": name,
                    "start_date": "2025-02-01",
                    "end_date": "2025-06-30",
                    "max_students": 30
                })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "{body}");
        body["data"]["id"].as_str().unwrap().to_string()
    }

    /// Creates a student through the API and returns its id.
    pub async fn create_student(&self, payload: Value) -> String {
        let (status, body) = self.admin("POST", "/api/students", Some(payload)).await;
        assert_eq!(status, StatusCode::CREATED, "{body}");
        body["data"]["student"]["id"].as_str().unwrap().to_string()
    }
}

/// A valid student payload with unique email, RA and CPF.
pub fn student_payload(name: &str) -> Value {
    let seed = Uuid::new_v4().as_u128();
    json!({
        "name": name,
        "email": format!("aluno-{}@escola.com", Uuid::new_v4()),
        "ra": format!("RA{}", seed % 1_000_000_000),
        "cpf": unique_cpf(seed),
    })
}

/// Eleven digits that are never all the same.
pub fn unique_cpf(seed: u128) -> String {
    format!("1{:010}", seed % 10_000_000_000)
}
