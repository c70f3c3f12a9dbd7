use matricula::matricula_auth::jwt::INVALID_TOKEN_MESSAGE;
use matricula::matricula_auth::{create_access_token, verify_token};
use matricula::matricula_config::JwtConfig;
use matricula::modules::users::model::UserRole;
use uuid::Uuid;

fn get_test_jwt_config() -> JwtConfig {
    JwtConfig {
        secret: "test_secret_key_for_testing_purposes".to_string(),
        expiry: 3600,
    }
}

#[test]
fn test_token_carries_role_for_every_role() {
    let jwt_config = get_test_jwt_config();

    for role in [UserRole::Admin, UserRole::Student] {
        let user_id = Uuid::new_v4();
        let token = create_access_token(user_id, role.as_str(), &jwt_config).unwrap();
        let claims = verify_token(&token, &jwt_config).unwrap();

        assert_eq!(claims.sub, user_id.to_string());
        assert_eq!(claims.role.parse::<UserRole>().unwrap(), role);
        assert_eq!(claims.user_id().unwrap(), user_id);
    }
}

#[test]
fn test_token_expiry_follows_config() {
    let jwt_config = JwtConfig {
        expiry: 120,
        ..get_test_jwt_config()
    };

    let token = create_access_token(Uuid::new_v4(), "student", &jwt_config).unwrap();
    let claims = verify_token(&token, &jwt_config).unwrap();

    assert_eq!(claims.exp - claims.iat, 120);
}

#[test]
fn test_verify_token_rejections_share_one_message() {
    let jwt_config = get_test_jwt_config();
    let token = create_access_token(Uuid::new_v4(), "admin", &jwt_config).unwrap();
    let wrong_secret = JwtConfig {
        secret: "different_secret_key".to_string(),
        ..get_test_jwt_config()
    };

    let tampered = format!("{}x", token);
    for (candidate, config) in [
        ("", &jwt_config),
        ("invalid.token.here", &jwt_config),
        (tampered.as_str(), &jwt_config),
        (token.as_str(), &wrong_secret),
    ] {
        let error = verify_token(candidate, config).unwrap_err();
        assert_eq!(error.status.as_u16(), 401);
        assert_eq!(error.message(), INVALID_TOKEN_MESSAGE);
    }
}

#[test]
fn test_different_users_get_different_tokens() {
    let jwt_config = get_test_jwt_config();

    let first = create_access_token(Uuid::new_v4(), "student", &jwt_config).unwrap();
    let second = create_access_token(Uuid::new_v4(), "student", &jwt_config).unwrap();

    assert_ne!(first, second);
}
