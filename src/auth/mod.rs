pub(crate) mod access;
pub(crate) mod cookie;
pub(crate) mod gate;
pub(crate) mod password;
pub(crate) mod token;

pub(crate) use access::{Operation, ResourceGuard, require_role};
pub(crate) use cookie::SessionCookie;
pub(crate) use gate::{AuthGate, CurrentUser, require_auth};
pub(crate) use password::PasswordHasher;
pub(crate) use token::{TokenIssuer, TokenVerifier};
