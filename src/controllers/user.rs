use regex::Regex;
use std::sync::Arc;
use std::time::Duration;

use crate::auth::{CurrentUser, PasswordHasher, TokenIssuer, require_role};
use crate::core::error::{ConfigError, Error};
use crate::store::{Store, bounded};
use crate::types::{Identity, NewIdentity, Role};

#[derive(Clone)]
pub(crate) struct UserController {
    store: Arc<dyn Store>,
    issuer: TokenIssuer,
    hasher: PasswordHasher,
    lookup_timeout: Duration,
    username_pattern: Regex,
    email_pattern: Regex,
    // verified against when the identifier is unknown, so both login
    // failures cost one bcrypt check
    decoy_hash: String,
}

impl std::fmt::Debug for UserController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UserController")
            .field("issuer", &self.issuer)
            .field("hasher", &self.hasher)
            .field("username_pattern", &self.username_pattern.as_str())
            .finish()
    }
}

impl UserController {
    pub(crate) fn new(
        store: Arc<dyn Store>,
        issuer: TokenIssuer,
        hasher: PasswordHasher,
        lookup_timeout: Duration,
    ) -> Result<Self, ConfigError> {
        Ok(Self {
            store,
            issuer,
            hasher,
            lookup_timeout,
            username_pattern: Regex::new(r"^[a-zA-Z0-9_-]{3,20}$")?,
            email_pattern: Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$")?,
            decoy_hash: bcrypt::hash("decoy password", hasher.cost())?,
        })
    }

    pub(crate) async fn signup(
        &self,
        username: &str,
        email: &str,
        password: &str,
    ) -> Result<Identity, Error> {
        if !self.username_pattern.is_match(username) {
            return Err(Error::InvalidUsername);
        }

        let email = email.trim().to_lowercase();

        if !self.email_pattern.is_match(&email) {
            return Err(Error::InvalidEmail);
        }

        let password_hash = self.hasher.hash(password).await?;

        let identity = bounded(
            self.lookup_timeout,
            self.store.create_identity(NewIdentity {
                username: username.to_owned(),
                email,
                password_hash,
                role: Role::User,
            }),
        )
        .await?;

        tracing::info!(user_id = identity.id, "registered {}", identity.username);

        Ok(identity)
    }

    /// Unknown identifiers and wrong passwords fail identically.
    pub(crate) async fn login(
        &self,
        identifier: &str,
        password: &str,
    ) -> Result<(Identity, String), Error> {
        let identity = bounded(
            self.lookup_timeout,
            self.store.find_identity_by_unique_field(identifier.trim()),
        )
        .await?;

        let Some(identity) = identity else {
            self.hasher.verify(password, &self.decoy_hash).await?;
            return Err(Error::InvalidLogin);
        };

        if !self.hasher.verify(password, &identity.password_hash).await? {
            return Err(Error::InvalidLogin);
        }

        let token = self.issuer.issue(&identity)?;

        Ok((identity, token))
    }

    pub(crate) async fn list_users(&self, user: &CurrentUser) -> Result<Vec<Identity>, Error> {
        require_role(user, Role::Admin)?;

        bounded(self.lookup_timeout, self.store.list_identities()).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::TokenVerifier;
    use crate::store::memory::MemoryStore;

    const SECRET: &str = "k8Jw2nQv6TzX0pLr4sYb9mFhC3dGa7Ue";

    fn controller(store: Arc<MemoryStore>) -> UserController {
        UserController::new(
            store,
            TokenIssuer::new(SECRET, chrono::Duration::days(30)),
            PasswordHasher::new(4),
            Duration::from_millis(200),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn signup_then_login_by_email_or_username() {
        let users = controller(Arc::new(MemoryStore::new()));
        let alice = users.signup("alice", "A@X.com", "pw123").await.unwrap();

        assert_eq!(alice.email, "a@x.com");
        assert_eq!(alice.role, Role::User);
        assert_ne!(alice.password_hash, "pw123");

        for identifier in ["a@x.com", "A@X.COM", "alice"] {
            let (identity, token) = users.login(identifier, "pw123").await.unwrap();
            let claims = TokenVerifier::new(SECRET).verify(&token).unwrap();

            assert_eq!(identity.id, alice.id);
            assert_eq!(claims.sub, alice.id.to_string());
        }
    }

    #[tokio::test]
    async fn wrong_password_and_unknown_identifier_fail_alike() {
        let users = controller(Arc::new(MemoryStore::new()));
        users.signup("alice", "a@x.com", "pw123").await.unwrap();

        let wrong_password = users.login("a@x.com", "nope").await.unwrap_err();
        let unknown = users.login("nobody@x.com", "pw123").await.unwrap_err();

        assert!(matches!(wrong_password, Error::InvalidLogin));
        assert!(matches!(unknown, Error::InvalidLogin));
    }

    #[tokio::test]
    async fn duplicate_username_or_email_conflicts() {
        let users = controller(Arc::new(MemoryStore::new()));
        users.signup("alice", "a@x.com", "pw123").await.unwrap();

        assert!(matches!(
            users.signup("alice", "other@x.com", "pw123").await,
            Err(Error::UserAlreadyExists)
        ));
        assert!(matches!(
            users.signup("alice2", "A@x.com", "pw123").await,
            Err(Error::UserAlreadyExists)
        ));
    }

    #[tokio::test]
    async fn signup_validates_its_input() {
        let users = controller(Arc::new(MemoryStore::new()));

        assert!(matches!(
            users.signup("a", "a@x.com", "pw123").await,
            Err(Error::InvalidUsername)
        ));
        assert!(matches!(
            users.signup("alice", "not-an-email", "pw123").await,
            Err(Error::InvalidEmail)
        ));
        assert!(matches!(
            users.signup("alice", "a@x.com", "").await,
            Err(Error::InvalidPassword(_))
        ));
    }

    #[tokio::test]
    async fn only_admins_list_users() {
        let store = Arc::new(MemoryStore::new());
        let users = controller(store.clone());
        let alice = users.signup("alice", "a@x.com", "pw123").await.unwrap();
        let mut current = CurrentUser::from(&alice);

        assert!(matches!(
            users.list_users(&current).await,
            Err(Error::Forbidden)
        ));

        current.role = Role::Admin;
        assert_eq!(users.list_users(&current).await.unwrap().len(), 1);
    }
}
