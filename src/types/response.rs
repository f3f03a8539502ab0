use serde::Serialize;

use crate::auth::CurrentUser;
use crate::types::{Identity, Role};

#[derive(Clone, Debug, Serialize)]
pub(crate) struct User {
    pub(crate) id: i64,
    pub(crate) username: String,
    pub(crate) email: String,
    pub(crate) role: Role,
}

impl From<&Identity> for User {
    fn from(identity: &Identity) -> Self {
        Self {
            id: identity.id,
            username: identity.username.clone(),
            email: identity.email.clone(),
            role: identity.role,
        }
    }
}

impl From<&CurrentUser> for User {
    fn from(user: &CurrentUser) -> Self {
        Self {
            id: user.id,
            username: user.username.clone(),
            email: user.email.clone(),
            role: user.role,
        }
    }
}

#[derive(Serialize)]
pub(crate) struct Message {
    pub(crate) message: &'static str,
}

#[derive(Serialize)]
pub(crate) struct Signup {
    pub(crate) message: &'static str,
    pub(crate) user: User,
}

#[derive(Serialize)]
pub(crate) struct Login {
    pub(crate) message: &'static str,
    pub(crate) token: String,
    pub(crate) user: User,
}

impl Login {
    pub(crate) fn new(identity: &Identity, token: &str) -> Self {
        Self {
            message: "Logged in successfully",
            token: token.to_owned(),
            user: identity.into(),
        }
    }
}

#[derive(Serialize)]
pub(crate) struct Validate {
    pub(crate) message: &'static str,
    pub(crate) user: User,
}

#[derive(Serialize)]
pub(crate) struct Uploaded {
    pub(crate) message: &'static str,
    pub(crate) files: Vec<String>,
}

#[derive(Serialize)]
pub(crate) struct Attachments {
    pub(crate) attachments: Vec<String>,
}
