use matricula::matricula_core::password::BCRYPT_COST;
use matricula::matricula_core::{hash_password, verify_password};

#[test]
fn test_hash_password_success() {
    let password = "Senha123";
    let hash = hash_password(password).unwrap();

    assert!(!hash.is_empty());
    assert_ne!(hash, password);
    assert!(hash.starts_with(&format!("$2b${BCRYPT_COST}$")));
}

#[test]
fn test_verify_password_correct_and_incorrect() {
    let hash = hash_password("Senha123").unwrap();

    assert!(verify_password("Senha123", &hash).unwrap());
    assert!(!verify_password("senha123", &hash).unwrap());
}

#[test]
fn test_verify_password_invalid_hash() {
    let error = verify_password("Senha123", "not_a_valid_bcrypt_hash").unwrap_err();

    assert!(error.status.is_server_error());
}

#[test]
fn test_hash_generates_unique_hashes() {
    let first = hash_password("Senha123").unwrap();
    let second = hash_password("Senha123").unwrap();

    assert_ne!(first, second);
    assert!(verify_password("Senha123", &first).unwrap());
    assert!(verify_password("Senha123", &second).unwrap());
}

#[test]
fn test_verify_accepts_hashes_from_other_costs() {
    let cheap = bcrypt::hash("Senha123", 4).unwrap();

    assert!(verify_password("Senha123", &cheap).unwrap());
}
