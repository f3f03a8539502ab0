use serde::Deserialize;

use crate::types::TaskStatus;

#[derive(Deserialize)]
pub(crate) struct SignupData {
    pub(crate) username: String,
    pub(crate) email: String,
    pub(crate) password: String,
}

#[derive(Deserialize)]
pub(crate) struct LoginData {
    /// Username or email address.
    #[serde(alias = "email", alias = "username")]
    pub(crate) identifier: String,
    pub(crate) password: String,
}

#[derive(Deserialize)]
pub(crate) struct CreateTaskData {
    pub(crate) title: String,
    #[serde(default)]
    pub(crate) description: String,
    #[serde(default)]
    pub(crate) status: TaskStatus,
}

#[derive(Deserialize, Default)]
pub(crate) struct UpdateTaskData {
    pub(crate) title: Option<String>,
    pub(crate) description: Option<String>,
    pub(crate) status: Option<TaskStatus>,
}
