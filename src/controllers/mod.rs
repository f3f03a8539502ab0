pub(crate) mod attachment;
pub(crate) mod task;
pub(crate) mod user;
