pub(crate) mod request;
pub(crate) mod response;
pub(crate) mod task;
pub(crate) mod user;

pub(crate) use task::{NewTask, Task, TaskChanges, TaskStatus};
pub(crate) use user::{Identity, NewIdentity, Role};
