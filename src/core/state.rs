use std::sync::Arc;

use crate::auth::{AuthGate, PasswordHasher, ResourceGuard, SessionCookie, TokenIssuer, TokenVerifier};
use crate::controllers::attachment::AttachmentController;
use crate::controllers::task::TaskController;
use crate::controllers::user::UserController;
use crate::core::config::Args;
use crate::core::error::ConfigError;
use crate::store::Store;
use crate::store::objects::ObjectStore;

/// Everything a request handler may touch. The signing secret lives only
/// inside the issuer and the verifier; the stores are shared handles.
#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) gate: AuthGate,
    pub(crate) session_cookie: SessionCookie,
    pub(crate) user_controller: UserController,
    pub(crate) task_controller: TaskController,
    pub(crate) attachment_controller: AttachmentController,
}

impl AppState {
    pub(crate) fn new(
        store: Arc<dyn Store>,
        objects: Arc<dyn ObjectStore>,
        config: &Args,
    ) -> Result<Self, ConfigError> {
        config.validate()?;

        let lookup_timeout = config.store_timeout();
        let guard = ResourceGuard::new(store.clone(), lookup_timeout);

        Ok(AppState {
            gate: AuthGate::new(
                TokenVerifier::new(&config.secret),
                store.clone(),
                lookup_timeout,
            ),
            session_cookie: SessionCookie::new(config.token_ttl(), config.cookie_secure),
            user_controller: UserController::new(
                store.clone(),
                TokenIssuer::new(&config.secret, config.token_ttl()),
                PasswordHasher::new(config.bcrypt_cost),
                lookup_timeout,
            )?,
            task_controller: TaskController::new(store, guard.clone(), lookup_timeout),
            attachment_controller: AttachmentController::new(
                objects,
                guard,
                &config.public_base_url,
            ),
        })
    }
}
