pub(crate) mod admin;
pub(crate) mod attachment;
pub(crate) mod extract;
pub(crate) mod router;
pub(crate) mod task;
pub(crate) mod user;
