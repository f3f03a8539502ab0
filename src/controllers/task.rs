use std::sync::Arc;
use std::time::Duration;

use crate::auth::{CurrentUser, Operation, ResourceGuard};
use crate::core::error::Error;
use crate::store::{Store, bounded};
use crate::types::request::{CreateTaskData, UpdateTaskData};
use crate::types::{NewTask, Task, TaskChanges};

#[derive(Clone)]
pub(crate) struct TaskController {
    store: Arc<dyn Store>,
    guard: ResourceGuard,
    lookup_timeout: Duration,
}

impl TaskController {
    pub(crate) fn new(store: Arc<dyn Store>, guard: ResourceGuard, lookup_timeout: Duration) -> Self {
        Self {
            store,
            guard,
            lookup_timeout,
        }
    }

    pub(crate) async fn create(
        &self,
        user: &CurrentUser,
        params: CreateTaskData,
    ) -> Result<Task, Error> {
        let title = validate_title(&params.title)?;

        bounded(
            self.lookup_timeout,
            self.store.create_task(
                user.id,
                NewTask {
                    title,
                    description: params.description,
                    status: params.status,
                },
            ),
        )
        .await
    }

    pub(crate) async fn list(&self, user: &CurrentUser) -> Result<Vec<Task>, Error> {
        bounded(self.lookup_timeout, self.store.list_tasks_for_owner(user.id)).await
    }

    pub(crate) async fn get(&self, user: &CurrentUser, id: i64) -> Result<Task, Error> {
        self.guard.authorize(user, id, Operation::Read).await
    }

    pub(crate) async fn update(
        &self,
        user: &CurrentUser,
        id: i64,
        params: UpdateTaskData,
    ) -> Result<Task, Error> {
        self.guard.authorize(user, id, Operation::Update).await?;

        let changes = TaskChanges {
            title: params.title.as_deref().map(validate_title).transpose()?,
            description: params.description,
            status: params.status,
        };

        bounded(
            self.lookup_timeout,
            self.store.update_task(id, user.id, changes),
        )
        .await?
        .ok_or(Error::NotFound)
    }

    pub(crate) async fn delete(&self, user: &CurrentUser, id: i64) -> Result<(), Error> {
        self.guard.authorize(user, id, Operation::Delete).await?;

        match bounded(self.lookup_timeout, self.store.delete_task(id, user.id)).await? {
            true => Ok(()),
            false => Err(Error::NotFound),
        }
    }
}

fn validate_title(title: &str) -> Result<String, Error> {
    let title = title.trim();

    if title.is_empty() {
        return Err(Error::InvalidTask("Title must not be empty".into()));
    }

    Ok(title.to_owned())
}
