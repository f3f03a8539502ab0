use axum::extract::{Request, State};
use axum::middleware::Next;
use axum::response::Response;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use std::time::Duration;

use crate::auth::cookie;
use crate::auth::token::TokenVerifier;
use crate::core::error::Error;
use crate::core::state::AppState;
use crate::store::{Store, bounded};
use crate::types::{Identity, Role};

/// The identity a request was authenticated as. Handlers read it from the
/// request extensions; the token is never consulted again downstream.
#[derive(Clone, Debug)]
pub(crate) struct CurrentUser {
    pub(crate) id: i64,
    pub(crate) username: String,
    pub(crate) email: String,
    pub(crate) role: Role,
}

impl From<&Identity> for CurrentUser {
    fn from(identity: &Identity) -> Self {
        Self {
            id: identity.id,
            username: identity.username.clone(),
            email: identity.email.clone(),
            role: identity.role,
        }
    }
}

/// Turns an inbound session token into a [`CurrentUser`].
///
/// A request moves through: token present, signature verified, not expired,
/// subject resolved against the store. Failing any step rejects it. The store
/// lookup is repeated on every request so deleted users and role changes take
/// effect before the token runs out.
#[derive(Clone)]
pub(crate) struct AuthGate {
    verifier: TokenVerifier,
    store: Arc<dyn Store>,
    lookup_timeout: Duration,
}

impl AuthGate {
    pub(crate) fn new(verifier: TokenVerifier, store: Arc<dyn Store>, lookup_timeout: Duration) -> Self {
        Self {
            verifier,
            store,
            lookup_timeout,
        }
    }

    pub(crate) async fn authenticate(&self, token: Option<&str>) -> Result<CurrentUser, Error> {
        self.authenticate_at(token, Utc::now()).await
    }

    pub(crate) async fn authenticate_at(
        &self,
        token: Option<&str>,
        now: DateTime<Utc>,
    ) -> Result<CurrentUser, Error> {
        let token = token
            .filter(|token| !token.is_empty())
            .ok_or(Error::MissingCredential)?;

        let claims = self.verifier.verify(token)?;

        if now.timestamp() > claims.exp {
            return Err(Error::ExpiredCredential);
        }

        let id: i64 = claims.sub.parse().map_err(|_| Error::MalformedSubject)?;

        let identity = bounded(self.lookup_timeout, self.store.find_identity_by_id(id))
            .await?
            .ok_or(Error::UnknownIdentity)?;

        if identity.role != claims.role {
            tracing::debug!(
                user_id = identity.id,
                "role changed since issuance: {} -> {}",
                claims.role,
                identity.role
            );
        }

        Ok(CurrentUser::from(&identity))
    }
}

pub(crate) async fn require_auth(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, Error> {
    let token = cookie::extract_token(request.headers()).map(str::to_owned);

    let user = match state.gate.authenticate(token.as_deref()).await {
        Ok(user) => user,
        Err(e) => {
            tracing::debug!(path = %request.uri().path(), "rejected request: {}", e);
            return Err(e);
        }
    };

    request.extensions_mut().insert(user);

    Ok(next.run(request).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::token::{Claims, ISSUER, TokenIssuer};
    use crate::store::memory::MemoryStore;
    use crate::types::NewIdentity;

    const SECRET: &str = "k8Jw2nQv6TzX0pLr4sYb9mFhC3dGa7Ue";

    async fn setup() -> (Arc<MemoryStore>, AuthGate, TokenIssuer, Identity) {
        let store = Arc::new(MemoryStore::new());
        let identity = store
            .create_identity(NewIdentity {
                username: "alice".into(),
                email: "a@x.com".into(),
                password_hash: "unused".into(),
                role: Role::User,
            })
            .await
            .unwrap();

        let gate = AuthGate::new(
            TokenVerifier::new(SECRET),
            store.clone(),
            Duration::from_millis(100),
        );
        let issuer = TokenIssuer::new(SECRET, chrono::Duration::days(30));

        (store, gate, issuer, identity)
    }

    #[tokio::test]
    async fn fresh_token_resolves_to_its_identity() {
        let (_store, gate, issuer, identity) = setup().await;
        let token = issuer.issue(&identity).unwrap();

        let user = gate.authenticate(Some(&token)).await.unwrap();

        assert_eq!(user.id, identity.id);
        assert_eq!(user.username, "alice");
        assert_eq!(user.role, Role::User);
    }

    #[tokio::test]
    async fn missing_or_empty_token_is_rejected() {
        let (_store, gate, _issuer, _identity) = setup().await;

        assert!(matches!(
            gate.authenticate(None).await,
            Err(Error::MissingCredential)
        ));
        assert!(matches!(
            gate.authenticate(Some("")).await,
            Err(Error::MissingCredential)
        ));
    }

    #[tokio::test]
    async fn token_past_expiry_is_rejected() {
        let (_store, gate, issuer, identity) = setup().await;
        let issued_at = Utc::now() - chrono::Duration::days(31);
        let token = issuer.issue_at(&identity, issued_at).unwrap();

        assert!(matches!(
            gate.authenticate(Some(&token)).await,
            Err(Error::ExpiredCredential)
        ));
    }

    #[tokio::test]
    async fn expiry_is_judged_against_the_supplied_clock() {
        let (_store, gate, issuer, identity) = setup().await;
        let issued_at = Utc::now();
        let token = issuer.issue_at(&identity, issued_at).unwrap();

        let just_before = issued_at + chrono::Duration::days(30);
        let just_after = just_before + chrono::Duration::seconds(1);

        assert!(gate.authenticate_at(Some(&token), just_before).await.is_ok());
        assert!(matches!(
            gate.authenticate_at(Some(&token), just_after).await,
            Err(Error::ExpiredCredential)
        ));
    }

    #[tokio::test]
    async fn token_signed_with_another_secret_is_rejected() {
        let (_store, gate, _issuer, identity) = setup().await;
        let foreign = TokenIssuer::new("some-other-secret-entirely-000000", chrono::Duration::days(1));
        let token = foreign.issue(&identity).unwrap();

        assert!(matches!(
            gate.authenticate(Some(&token)).await,
            Err(Error::InvalidCredential(_))
        ));
    }

    #[tokio::test]
    async fn signed_token_with_non_numeric_subject_is_rejected() {
        let (_store, gate, _issuer, _identity) = setup().await;
        let now = Utc::now().timestamp();
        let claims = Claims {
            sub: "abc".into(),
            role: Role::Admin,
            iat: now,
            exp: now + 3600,
            iss: ISSUER.into(),
        };
        let token = jsonwebtoken::encode(
            &jsonwebtoken::Header::default(),
            &claims,
            &jsonwebtoken::EncodingKey::from_secret(SECRET.as_bytes()),
        )
        .unwrap();

        let err = gate.authenticate(Some(&token)).await.unwrap_err();

        assert!(matches!(err, Error::MalformedSubject));
        assert_eq!(err.status(), axum::http::StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn token_for_removed_identity_is_rejected() {
        let (store, gate, issuer, identity) = setup().await;
        let token = issuer.issue(&identity).unwrap();

        store.remove_identity(identity.id).await;

        assert!(matches!(
            gate.authenticate(Some(&token)).await,
            Err(Error::UnknownIdentity)
        ));
    }

    #[tokio::test]
    async fn current_role_comes_from_the_store_not_the_token() {
        let (store, gate, issuer, identity) = setup().await;
        let token = issuer.issue(&identity).unwrap();

        store.set_role(identity.id, Role::Admin).await;

        let user = gate.authenticate(Some(&token)).await.unwrap();
        assert_eq!(user.role, Role::Admin);
    }

    #[tokio::test]
    async fn store_failures_surface_as_upstream_errors() {
        let (store, gate, issuer, identity) = setup().await;
        let token = issuer.issue(&identity).unwrap();

        store.set_unavailable(true);
        assert!(matches!(
            gate.authenticate(Some(&token)).await,
            Err(Error::Sql(_))
        ));

        store.set_unavailable(false);
        store.set_latency(Some(Duration::from_secs(5))).await;
        assert!(matches!(
            gate.authenticate(Some(&token)).await,
            Err(Error::StoreTimeout)
        ));
    }
}
