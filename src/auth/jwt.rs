use std::time::{SystemTime, UNIX_EPOCH};

use crate::models::{Claims, TokenType};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode, errors::Error};
use uuid::Uuid;

fn now() -> usize {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("system clock before unix epoch")
        .as_secs() as usize
}

/// Mint an access or refresh token for a user. The claims are returned
/// alongside the encoded token so the caller can persist the `jti`.
pub fn issue_token(
    user_id: u64,
    username: String,
    role: u8,
    employee_id: Option<u64>,
    token_type: TokenType,
    secret: &str,
    ttl: usize,
) -> Result<(String, Claims), Error> {
    let claims = Claims {
        user_id,
        sub: username,
        role,
        exp: now() + ttl,
        jti: Uuid::new_v4().to_string(),
        token_type,
        employee_id,
    };

    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )?;

    Ok((token, claims))
}

pub fn verify_token(token: &str, secret: &str) -> Result<Claims, Error> {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn issue_then_verify_roundtrip() {
        let (token, claims) =
            issue_token(7, "jane".into(), 2, Some(1001), TokenType::Access, "k1", 300).unwrap();

        let decoded = verify_token(&token, "k1").unwrap();
        assert_eq!(decoded.user_id, 7);
        assert_eq!(decoded.sub, "jane");
        assert_eq!(decoded.role, 2);
        assert_eq!(decoded.employee_id, Some(1001));
        assert_eq!(decoded.token_type, TokenType::Access);
        assert_eq!(decoded.jti, claims.jti);
    }

    #[test]
    fn wrong_secret_rejected() {
        let (token, _) =
            issue_token(7, "jane".into(), 2, None, TokenType::Refresh, "k1", 300).unwrap();
        assert!(verify_token(&token, "k2").is_err());
    }

    #[test]
    fn each_token_gets_a_fresh_jti() {
        let (_, a) = issue_token(1, "x".into(), 4, None, TokenType::Refresh, "k", 300).unwrap();
        let (_, b) = issue_token(1, "x".into(), 4, None, TokenType::Refresh, "k", 300).unwrap();
        assert_ne!(a.jti, b.jti);
    }
}
