use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::core::error::Error;
use crate::types::{Identity, Role};

pub(crate) const ISSUER: &str = "tasktrack";

/// Algorithm used when signing. Verification accepts only the HMAC family.
const SIGNING_ALGORITHM: Algorithm = Algorithm::HS256;
const ACCEPTED_ALGORITHMS: [Algorithm; 3] = [Algorithm::HS256, Algorithm::HS384, Algorithm::HS512];

#[derive(Deserialize, Serialize, Debug, Clone)]
pub(crate) struct Claims {
    pub(crate) sub: String,
    pub(crate) role: Role,
    pub(crate) iat: i64,
    pub(crate) exp: i64,
    pub(crate) iss: String,
}

#[derive(Clone)]
pub(crate) struct TokenIssuer {
    encoding_key: EncodingKey,
    ttl: Duration,
}

impl std::fmt::Debug for TokenIssuer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenIssuer").field("ttl", &self.ttl).finish()
    }
}

impl TokenIssuer {
    pub(crate) fn new(secret: &str, ttl: Duration) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            ttl,
        }
    }

    pub(crate) fn issue(&self, identity: &Identity) -> Result<String, Error> {
        self.issue_at(identity, Utc::now())
    }

    pub(crate) fn issue_at(
        &self,
        identity: &Identity,
        issued_at: DateTime<Utc>,
    ) -> Result<String, Error> {
        let claims = Claims {
            sub: identity.id.to_string(),
            role: identity.role,
            iat: issued_at.timestamp(),
            exp: (issued_at + self.ttl).timestamp(),
            iss: ISSUER.into(),
        };

        Ok(jsonwebtoken::encode(
            &Header::new(SIGNING_ALGORITHM),
            &claims,
            &self.encoding_key,
        )?)
    }
}

#[derive(Clone)]
pub(crate) struct TokenVerifier {
    decoding_key: DecodingKey,
    validation: Validation,
}

impl std::fmt::Debug for TokenVerifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenVerifier")
            .field("algorithms", &self.validation.algorithms)
            .finish()
    }
}

impl TokenVerifier {
    pub(crate) fn new(secret: &str) -> Self {
        let mut validation = Validation::new(SIGNING_ALGORITHM);
        validation.algorithms = ACCEPTED_ALGORITHMS.to_vec();
        // expiry is compared against the gate's clock, not the decoder's
        validation.validate_exp = false;
        validation.validate_aud = false;
        validation.set_issuer(&[ISSUER]);
        validation.set_required_spec_claims(&["exp", "sub", "iss"]);

        Self {
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
        }
    }

    /// Checks format, algorithm and signature. Does not look at expiry.
    pub(crate) fn verify(&self, token: &str) -> Result<Claims, Error> {
        jsonwebtoken::decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map(|data| data.claims)
            .map_err(Error::InvalidCredential)
    }
}
