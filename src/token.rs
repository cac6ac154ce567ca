use chrono::Utc;
use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use thiserror::Error;

type HmacSha256 = Hmac<Sha256>;

/// Tokens are stateless, so expiry is the only thing bounding their life.
/// There is no refresh endpoint: clients log in again after 30 days.
pub const TOKEN_VALIDITY_SECS: i64 = 30 * 24 * 60 * 60;

#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    sub: String,
    iat: i64,
    exp: i64,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TokenError {
    #[error("token is malformed")]
    Malformed,
    #[error("token signature does not match")]
    BadSignature,
    #[error("token has expired")]
    Expired,
}

/// Issues and verifies self-contained session tokens. A token is
/// `hex(claims json) + "." + hex(hmac-sha256 over the first part)`, signed
/// with the process-wide secret. Verification needs no store lookup, which
/// also means rotating the secret invalidates every outstanding token.
#[derive(Clone)]
pub struct TokenService {
    key: Vec<u8>,
}

impl TokenService {
    pub fn new(secret: &[u8]) -> Self {
        TokenService {
            key: secret.to_vec(),
        }
    }

    pub fn issue(&self, user_id: &str) -> String {
        let now = Utc::now().timestamp();
        let claims = Claims {
            sub: user_id.to_owned(),
            iat: now,
            exp: now + TOKEN_VALIDITY_SECS,
        };
        self.issue_claims(&claims)
    }

    fn issue_claims(&self, claims: &Claims) -> String {
        let payload = hex::encode(serde_json::to_vec(claims).expect("claims serialize to JSON"));
        let signature = self.sign(payload.as_bytes());
        format!("{}.{}", payload, signature)
    }

    fn sign(&self, payload: &[u8]) -> String {
        let mut mac =
            HmacSha256::new_from_slice(&self.key).expect("HMAC accepts keys of any size");
        mac.update(payload);
        hex::encode(mac.finalize().into_bytes())
    }

    /// Checks the signature before looking at the payload at all, so a
    /// forged token never gets its claims parsed.
    pub fn verify(&self, token: &str) -> Result<String, TokenError> {
        let (payload, signature) = token.split_once('.').ok_or(TokenError::Malformed)?;
        let signature = hex::decode(signature).map_err(|_| TokenError::Malformed)?;
        let mut mac =
            HmacSha256::new_from_slice(&self.key).expect("HMAC accepts keys of any size");
        mac.update(payload.as_bytes());
        mac.verify_slice(&signature)
            .map_err(|_| TokenError::BadSignature)?;
        let claims = hex::decode(payload).map_err(|_| TokenError::Malformed)?;
        let claims: Claims = serde_json::from_slice(&claims).map_err(|_| TokenError::Malformed)?;
        if claims.exp < Utc::now().timestamp() {
            return Err(TokenError::Expired);
        }
        Ok(claims.sub)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn issued_token_verifies_to_the_same_identity() {
        let tokens = TokenService::new(b"a process-wide secret");
        let token = tokens.issue("6606d8f4a3c1");
        assert_eq!(tokens.verify(&token).unwrap(), "6606d8f4a3c1");
    }

    #[test]
    fn token_signed_with_another_key_is_rejected() {
        let ours = TokenService::new(b"our key");
        let theirs = TokenService::new(b"their key");
        let token = theirs.issue("6606d8f4a3c1");
        assert_eq!(ours.verify(&token), Err(TokenError::BadSignature));
    }

    #[test]
    fn tampered_payload_is_rejected() {
        let tokens = TokenService::new(b"secret");
        let token = tokens.issue("6606d8f4a3c1");
        let (payload, signature) = token.split_once('.').unwrap();
        // Flip one nibble of the payload while keeping the old signature.
        let mut tampered: Vec<char> = payload.chars().collect();
        tampered[0] = if tampered[0] == '7' { '6' } else { '7' };
        let tampered = format!("{}.{}", String::from_iter(tampered), signature);
        assert_eq!(tokens.verify(&tampered), Err(TokenError::BadSignature));
    }

    #[test]
    fn malformed_tokens_are_rejected() {
        let tokens = TokenService::new(b"secret");
        assert_eq!(tokens.verify(""), Err(TokenError::Malformed));
        assert_eq!(tokens.verify("no-separator"), Err(TokenError::Malformed));
        assert_eq!(
            tokens.verify("nothexatall.nothexatall"),
            Err(TokenError::Malformed)
        );
    }

    #[test]
    fn expired_token_is_rejected() {
        let tokens = TokenService::new(b"secret");
        let stale = Claims {
            sub: "6606d8f4a3c1".to_owned(),
            iat: Utc::now().timestamp() - TOKEN_VALIDITY_SECS - 60,
            exp: Utc::now().timestamp() - 60,
        };
        let token = tokens.issue_claims(&stale);
        assert_eq!(tokens.verify(&token), Err(TokenError::Expired));
    }

    #[test]
    fn signature_with_valid_hex_but_wrong_bytes_is_rejected() {
        let tokens = TokenService::new(b"secret");
        let token = tokens.issue("6606d8f4a3c1");
        let (payload, _) = token.split_once('.').unwrap();
        let forged = format!("{}.{}", payload, "ab".repeat(32));
        assert_eq!(tokens.verify(&forged), Err(TokenError::BadSignature));
    }
}
