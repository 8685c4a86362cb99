use crate::token::{Expiring, HmacSha256Verifier, Token};

use base64::engine::general_purpose::URL_SAFE as b64_urlsafe;
use base64::Engine;
use hmac::Mac;
use serde::{Deserialize, Serialize};
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use uuid::Uuid;

use super::HmacSha256;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthTokenClaims {
    #[serde(rename = "jti")]
    pub token_id: String,
    #[serde(rename = "uid")]
    pub user_id: i32,
    #[serde(rename = "exp")]
    pub expiration: u64,
}

impl AuthTokenClaims {
    /// Claims for a fresh token with a new, unique ID.
    pub fn new(user_id: i32, lifetime: Duration) -> Self {
        let expiration = (SystemTime::now() + lifetime)
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0);

        AuthTokenClaims {
            token_id: Uuid::now_v7().to_string(),
            user_id,
            expiration,
        }
    }
}

impl Expiring for AuthTokenClaims {
    fn expiration(&self) -> u64 {
        self.expiration
    }
}

pub struct AuthToken {}

impl AuthToken {
    pub fn sign_new(claims: &AuthTokenClaims, signing_key: &[u8]) -> String {
        let mut token_unencoded =
            serde_json::to_vec(claims).expect("Failed to transform claims into JSON");

        let mut mac = HmacSha256::new_from_slice(signing_key).expect("HMAC key should not fail");
        mac.update(&token_unencoded);
        let signature = mac.finalize();
        token_unencoded.extend_from_slice(&signature.into_bytes());

        b64_urlsafe.encode(&token_unencoded)
    }
}

impl Token for AuthToken {
    type Claims = AuthTokenClaims;
    type Verifier = HmacSha256Verifier;

    fn token_name() -> &'static str {
        "Authorization"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::token::TokenError;

    #[test]
    fn test_sign_and_verify() {
        let signing_key = [9; 64];
        let claims = AuthTokenClaims::new(42, Duration::from_secs(10));

        let token = AuthToken::sign_new(&claims, &signing_key);
        let decoded = AuthToken::decode(&token).unwrap();
        let verified = decoded.verify(&signing_key).unwrap();

        assert_eq!(verified, &claims);
        assert_eq!(verified.user_id, 42);

        let json = String::from_utf8_lossy(&b64_urlsafe.decode(&token).unwrap()).to_string();
        assert!(json.contains(&format!("\"jti\":\"{}\"", claims.token_id)));
        assert!(json.contains("\"uid\":42"));
        assert!(json.contains(&format!("\"exp\":{}", claims.expiration)));

        assert_eq!(
            decoded.verify(&[8; 64]).unwrap_err(),
            TokenError::TokenInvalid
        );
    }

    #[test]
    fn test_token_ids_are_unique() {
        let claims1 = AuthTokenClaims::new(1, Duration::from_secs(10));
        let claims2 = AuthTokenClaims::new(1, Duration::from_secs(10));

        assert_ne!(claims1.token_id, claims2.token_id);
        assert_ne!(
            AuthToken::sign_new(&claims1, &[1; 64]),
            AuthToken::sign_new(&claims2, &[1; 64])
        );
    }

    #[test]
    fn test_expired_token() {
        let signing_key = [9; 64];
        let mut claims = AuthTokenClaims::new(7, Duration::from_secs(10));
        claims.expiration -= 20;

        let token = AuthToken::sign_new(&claims, &signing_key);
        let decoded = AuthToken::decode(&token).unwrap();

        assert_eq!(
            decoded.verify(&signing_key).unwrap_err(),
            TokenError::TokenExpired
        );
    }
}
