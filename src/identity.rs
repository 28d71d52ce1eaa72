//! Signed identity cookie.
//!
//! The cookie value is `base64url(json) "." base64url(hmac_sha256(json_b64))`.
//! Nothing in the payload is trusted until the signature checks out.

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use ring::{
    hmac,
    rand::{SecureRandom, SystemRandom},
};

use crate::model::User;

/// Name of the cookie carrying the signed identity.
pub const IDENTITY_COOKIE: &str = "user";

#[derive(Debug, thiserror::Error)]
pub enum IdentityError {
    #[error("identity cookie is not in `payload.signature` form")]
    Malformed,

    #[error("identity cookie is not valid base64: {0}")]
    Encoding(#[from] base64::DecodeError),

    #[error("identity cookie signature mismatch")]
    BadSignature,

    #[error("identity cookie payload is not a user: {0}")]
    Payload(#[from] serde_json::Error),

    #[error("could not generate a signing key")]
    KeyGeneration,
}

/// Signs and verifies identity cookie values.
#[derive(Clone)]
pub struct IdentityCodec {
    key: hmac::Key,
}

impl std::fmt::Debug for IdentityCodec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IdentityCodec").finish_non_exhaustive()
    }
}

impl IdentityCodec {
    pub fn new(secret: &[u8]) -> Self {
        Self {
            key: hmac::Key::new(hmac::HMAC_SHA256, secret),
        }
    }

    /// Builds a codec around a freshly generated random key.
    pub fn random() -> Result<Self, IdentityError> {
        let mut secret = [0u8; 32];
        SystemRandom::new()
            .fill(&mut secret)
            .map_err(|_| IdentityError::KeyGeneration)?;
        Ok(Self::new(&secret))
    }

    pub fn encode(&self, user: &User) -> Result<String, IdentityError> {
        let payload = URL_SAFE_NO_PAD.encode(serde_json::to_vec(user)?);
        let signature = hmac::sign(&self.key, payload.as_bytes());
        Ok(format!(
            "{}.{}",
            payload,
            URL_SAFE_NO_PAD.encode(signature.as_ref())
        ))
    }

    pub fn decode(&self, value: &str) -> Result<User, IdentityError> {
        let (payload, signature) = value.split_once('.').ok_or(IdentityError::Malformed)?;
        let signature = URL_SAFE_NO_PAD.decode(signature)?;

        hmac::verify(&self.key, payload.as_bytes(), &signature)
            .map_err(|_| IdentityError::BadSignature)?;

        let json = URL_SAFE_NO_PAD.decode(payload)?;
        Ok(serde_json::from_slice(&json)?)
    }
}
