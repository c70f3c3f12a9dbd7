//! JWT claim structures for access tokens.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// JWT claims for access tokens.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Claims {
    /// User ID (subject claim)
    pub sub: String,
    /// User role at the time the token was issued (`admin` or `student`)
    pub role: String,
    /// Token expiration timestamp (Unix timestamp)
    pub exp: usize,
    /// Token issued-at timestamp (Unix timestamp)
    pub iat: usize,
}

impl Claims {
    /// The subject as a UUID, if it is one.
    pub fn user_id(&self) -> Option<Uuid> {
        Uuid::parse_str(&self.sub).ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_claims_serialize() {
        let claims = Claims {
            sub: "user-id-123".to_string(),
            role: "admin".to_string(),
            exp: 1234567890,
            iat: 1234567800,
        };
        let serialized = serde_json::to_string(&claims).unwrap();
        assert!(serialized.contains(r#""sub":"user-id-123""#));
        assert!(serialized.contains(r#""role":"admin""#));
    }

    #[test]
    fn test_claims_deserialize() {
        let json = r#"{"sub":"user-id-456","role":"student","exp":9999999999,"iat":9999999900}"#;
        let claims: Claims = serde_json::from_str(json).unwrap();
        assert_eq!(claims.sub, "user-id-456");
        assert_eq!(claims.role, "student");
        assert_eq!(claims.exp, 9999999999);
    }

    #[test]
    fn test_user_id_parses_uuid_subject() {
        let id = Uuid::new_v4();
        let claims = Claims {
            sub: id.to_string(),
            role: "admin".to_string(),
            exp: 0,
            iat: 0,
        };
        assert_eq!(claims.user_id(), Some(id));

        let bogus = Claims {
            sub: "not-a-uuid".to_string(),
            ..claims
        };
        assert_eq!(bogus.user_id(), None);
    }
}
