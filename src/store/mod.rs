pub(crate) mod objects;
pub(crate) mod postgres;

#[cfg(test)]
pub(crate) mod memory;

use async_trait::async_trait;
use std::future::Future;
use std::time::Duration;

use crate::core::error::Error;
use crate::types::{Identity, NewIdentity, NewTask, Task, TaskChanges};

/// Persistence for users and tasks.
///
/// Lookups have no side effects. `update_task` and `delete_task` are scoped
/// by owner, so the act itself cannot touch another user's task even if the
/// caller skipped the ownership check.
#[async_trait]
pub(crate) trait Store: Send + Sync {
    async fn find_identity_by_id(&self, id: i64) -> Result<Option<Identity>, Error>;

    /// Matches `value` against the username, or the email case-insensitively.
    async fn find_identity_by_unique_field(&self, value: &str) -> Result<Option<Identity>, Error>;

    async fn create_identity(&self, identity: NewIdentity) -> Result<Identity, Error>;

    async fn list_identities(&self) -> Result<Vec<Identity>, Error>;

    async fn find_task_by_id(&self, id: i64) -> Result<Option<Task>, Error>;

    async fn list_tasks_for_owner(&self, owner_id: i64) -> Result<Vec<Task>, Error>;

    async fn create_task(&self, owner_id: i64, task: NewTask) -> Result<Task, Error>;

    async fn update_task(
        &self,
        id: i64,
        owner_id: i64,
        changes: TaskChanges,
    ) -> Result<Option<Task>, Error>;

    async fn delete_task(&self, id: i64, owner_id: i64) -> Result<bool, Error>;
}

/// Bounds a store call so a slow backend cannot pin a request indefinitely.
pub(crate) async fn bounded<T, F>(limit: Duration, call: F) -> Result<T, Error>
where
    F: Future<Output = Result<T, Error>>,
{
    match tokio::time::timeout(limit, call).await {
        Ok(result) => result,
        Err(_) => Err(Error::StoreTimeout),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn bounded_passes_through_fast_calls() {
        let value = bounded(Duration::from_millis(50), async { Ok::<_, Error>(7) })
            .await
            .unwrap();

        assert_eq!(value, 7);
    }

    #[tokio::test]
    async fn bounded_turns_slow_calls_into_store_timeouts() {
        let result = bounded(Duration::from_millis(10), async {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Ok::<_, Error>(())
        })
        .await;

        assert!(matches!(result, Err(Error::StoreTimeout)));
    }
}
