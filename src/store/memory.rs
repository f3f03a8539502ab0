use async_trait::async_trait;
use chrono::Utc;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tokio::sync::RwLock;

use crate::core::error::Error;
use crate::store::Store;
use crate::types::{Identity, NewIdentity, NewTask, Task, TaskChanges};

#[derive(Default)]
struct Tables {
    next_user_id: i64,
    next_task_id: i64,
    users: BTreeMap<i64, Identity>,
    tasks: BTreeMap<i64, Task>,
}

/// In-process store for tests, with switches to simulate an unhealthy backend.
#[derive(Default)]
pub(crate) struct MemoryStore {
    tables: RwLock<Tables>,
    unavailable: AtomicBool,
    latency: RwLock<Option<Duration>>,
}

impl MemoryStore {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) async fn remove_identity(&self, id: i64) {
        self.tables.write().await.users.remove(&id);
    }

    pub(crate) async fn set_role(&self, id: i64, role: crate::types::Role) {
        if let Some(user) = self.tables.write().await.users.get_mut(&id) {
            user.role = role;
        }
    }

    pub(crate) fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    pub(crate) async fn set_latency(&self, latency: Option<Duration>) {
        *self.latency.write().await = latency;
    }

    async fn check(&self) -> Result<(), Error> {
        let latency = *self.latency.read().await;

        if let Some(latency) = latency {
            tokio::time::sleep(latency).await;
        }

        if self.unavailable.load(Ordering::SeqCst) {
            return Err(Error::Sql(sqlx::Error::PoolTimedOut));
        }

        Ok(())
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn find_identity_by_id(&self, id: i64) -> Result<Option<Identity>, Error> {
        self.check().await?;

        Ok(self.tables.read().await.users.get(&id).cloned())
    }

    async fn find_identity_by_unique_field(&self, value: &str) -> Result<Option<Identity>, Error> {
        self.check().await?;

        Ok(self
            .tables
            .read()
            .await
            .users
            .values()
            .find(|user| user.username == value || user.email.eq_ignore_ascii_case(value))
            .cloned())
    }

    async fn create_identity(&self, identity: NewIdentity) -> Result<Identity, Error> {
        self.check().await?;

        let mut tables = self.tables.write().await;

        if tables.users.values().any(|user| {
            user.username == identity.username || user.email.eq_ignore_ascii_case(&identity.email)
        }) {
            return Err(Error::UserAlreadyExists);
        }

        tables.next_user_id += 1;

        let user = Identity {
            id: tables.next_user_id,
            username: identity.username,
            email: identity.email,
            password_hash: identity.password_hash,
            role: identity.role,
        };

        tables.users.insert(user.id, user.clone());

        Ok(user)
    }

    async fn list_identities(&self) -> Result<Vec<Identity>, Error> {
        self.check().await?;

        Ok(self.tables.read().await.users.values().cloned().collect())
    }

    async fn find_task_by_id(&self, id: i64) -> Result<Option<Task>, Error> {
        self.check().await?;

        Ok(self.tables.read().await.tasks.get(&id).cloned())
    }

    async fn list_tasks_for_owner(&self, owner_id: i64) -> Result<Vec<Task>, Error> {
        self.check().await?;

        Ok(self
            .tables
            .read()
            .await
            .tasks
            .values()
            .filter(|task| task.owner_id == owner_id)
            .cloned()
            .collect())
    }

    async fn create_task(&self, owner_id: i64, task: NewTask) -> Result<Task, Error> {
        self.check().await?;

        let mut tables = self.tables.write().await;
        tables.next_task_id += 1;

        let now = Utc::now();
        let task = Task {
            id: tables.next_task_id,
            owner_id,
            title: task.title,
            description: task.description,
            status: task.status,
            created_at: now,
            updated_at: now,
        };

        tables.tasks.insert(task.id, task.clone());

        Ok(task)
    }

    async fn update_task(
        &self,
        id: i64,
        owner_id: i64,
        changes: TaskChanges,
    ) -> Result<Option<Task>, Error> {
        self.check().await?;

        let mut tables = self.tables.write().await;

        Ok(match tables.tasks.get_mut(&id) {
            Some(task) if task.owner_id == owner_id => {
                if let Some(title) = changes.title {
                    task.title = title;
                }
                if let Some(description) = changes.description {
                    task.description = description;
                }
                if let Some(status) = changes.status {
                    task.status = status;
                }
                task.updated_at = Utc::now();
                Some(task.clone())
            }
            _ => None,
        })
    }

    async fn delete_task(&self, id: i64, owner_id: i64) -> Result<bool, Error> {
        self.check().await?;

        let mut tables = self.tables.write().await;

        match tables.tasks.get(&id) {
            Some(task) if task.owner_id == owner_id => {
                tables.tasks.remove(&id);
                Ok(true)
            }
            _ => Ok(false),
        }
    }
}
