use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use crate::auth::gate::CurrentUser;
use crate::core::error::Error;
use crate::store::{Store, bounded};
use crate::types::{Role, Task};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Operation {
    Read,
    Update,
    Delete,
    Upload,
    ListAttachments,
    Download,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Operation::Read => "read",
            Operation::Update => "update",
            Operation::Delete => "delete",
            Operation::Upload => "upload",
            Operation::ListAttachments => "list attachments",
            Operation::Download => "download",
        })
    }
}

/// Ownership check shared by every task-scoped operation.
#[derive(Clone)]
pub(crate) struct ResourceGuard {
    store: Arc<dyn Store>,
    lookup_timeout: Duration,
}

impl ResourceGuard {
    pub(crate) fn new(store: Arc<dyn Store>, lookup_timeout: Duration) -> Self {
        Self {
            store,
            lookup_timeout,
        }
    }

    /// Returns the task when `user` owns it. A task owned by someone else is
    /// reported exactly like a missing one.
    pub(crate) async fn authorize(
        &self,
        user: &CurrentUser,
        task_id: i64,
        operation: Operation,
    ) -> Result<Task, Error> {
        let task = bounded(self.lookup_timeout, self.store.find_task_by_id(task_id)).await?;

        match task {
            Some(task) if task.owner_id == user.id => Ok(task),
            _ => {
                tracing::debug!(user_id = user.id, task_id, "denied {}", operation);
                Err(Error::NotFound)
            }
        }
    }
}

pub(crate) fn require_role(user: &CurrentUser, role: Role) -> Result<(), Error> {
    if user.role == role {
        Ok(())
    } else {
        Err(Error::Forbidden)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::memory::MemoryStore;
    use crate::types::{NewTask, TaskStatus};

    fn user(id: i64, role: Role) -> CurrentUser {
        CurrentUser {
            id,
            username: format!("user{id}"),
            email: format!("user{id}@x.com"),
            role,
        }
    }

    async fn guard_with_task(owner_id: i64) -> (ResourceGuard, Task) {
        let store = Arc::new(MemoryStore::new());
        let task = store
            .create_task(
                owner_id,
                NewTask {
                    title: "write report".into(),
                    description: String::new(),
                    status: TaskStatus::Pending,
                },
            )
            .await
            .unwrap();

        (ResourceGuard::new(store, Duration::from_millis(100)), task)
    }

    #[tokio::test]
    async fn owner_is_allowed_every_operation() {
        let (guard, task) = guard_with_task(1).await;

        for operation in [
            Operation::Read,
            Operation::Update,
            Operation::Delete,
            Operation::Upload,
            Operation::ListAttachments,
        ] {
            let allowed = guard.authorize(&user(1, Role::User), task.id, operation).await;
            assert_eq!(allowed.unwrap().id, task.id);
        }
    }

    #[tokio::test]
    async fn non_owner_sees_not_found() {
        let (guard, task) = guard_with_task(1).await;

        for role in [Role::User, Role::Admin] {
            let denied = guard.authorize(&user(2, role), task.id, Operation::Read).await;
            assert!(matches!(denied, Err(Error::NotFound)));
        }
    }

    #[tokio::test]
    async fn missing_task_looks_the_same_as_a_foreign_one() {
        let (guard, task) = guard_with_task(1).await;

        let foreign = guard.authorize(&user(2, Role::User), task.id, Operation::Delete).await;
        let missing = guard.authorize(&user(2, Role::User), 999, Operation::Delete).await;

        assert_eq!(
            foreign.unwrap_err().to_string(),
            missing.unwrap_err().to_string()
        );
    }

    #[test]
    fn role_gate_requires_exact_role() {
        assert!(require_role(&user(1, Role::Admin), Role::Admin).is_ok());
        assert!(matches!(
            require_role(&user(1, Role::User), Role::Admin),
            Err(Error::Forbidden)
        ));
    }
}
