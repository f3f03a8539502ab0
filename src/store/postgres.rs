use async_trait::async_trait;
use chrono::Utc;
use sqlx::postgres::{PgPool, PgPoolOptions, PgRow};
use sqlx::Row;
use std::time::Duration;

use crate::core::error::{ConfigError, Error};
use crate::store::Store;
use crate::types::{Identity, NewIdentity, NewTask, Task, TaskChanges};

const IDENTITY_COLUMNS: &str = "id, username, email, password_hash, role";
const TASK_COLUMNS: &str = "id, owner_id, title, description, status, created_at, updated_at";

#[derive(Clone, Debug)]
pub(crate) struct PgStore {
    pub(crate) pool: PgPool,
}

impl PgStore {
    pub(crate) async fn connect(
        database_url: &str,
        max_connections: u32,
        acquire_timeout: Duration,
    ) -> Result<Self, ConfigError> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .acquire_timeout(acquire_timeout)
            .connect(database_url)
            .await?;

        Ok(Self { pool })
    }

    pub(crate) async fn migrate(&self) -> Result<(), ConfigError> {
        sqlx::migrate!().run(&self.pool).await?;

        Ok(())
    }
}

#[async_trait]
impl Store for PgStore {
    async fn find_identity_by_id(&self, id: i64) -> Result<Option<Identity>, Error> {
        let query = format!("SELECT {IDENTITY_COLUMNS} FROM users WHERE id = $1;");

        Ok(sqlx::query(&query)
            .bind(id)
            .try_map(map_identity)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn find_identity_by_unique_field(&self, value: &str) -> Result<Option<Identity>, Error> {
        let query = format!(
            "SELECT {IDENTITY_COLUMNS} FROM users WHERE username = $1 OR lower(email) = lower($1) LIMIT 1;"
        );

        Ok(sqlx::query(&query)
            .bind(value)
            .try_map(map_identity)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn create_identity(&self, identity: NewIdentity) -> Result<Identity, Error> {
        let query = format!(
            "INSERT INTO users (username, email, password_hash, role) VALUES ($1, $2, $3, $4) RETURNING {IDENTITY_COLUMNS};"
        );

        match sqlx::query(&query)
            .bind(&identity.username)
            .bind(&identity.email)
            .bind(&identity.password_hash)
            .bind(identity.role.as_str())
            .try_map(map_identity)
            .fetch_one(&self.pool)
            .await
        {
            Ok(identity) => Ok(identity),
            Err(sqlx::Error::Database(db_err)) if db_err.is_unique_violation() => {
                Err(Error::UserAlreadyExists)
            }
            Err(e) => Err(Error::Sql(e)),
        }
    }

    async fn list_identities(&self) -> Result<Vec<Identity>, Error> {
        let query = format!("SELECT {IDENTITY_COLUMNS} FROM users ORDER BY id;");

        Ok(sqlx::query(&query)
            .try_map(map_identity)
            .fetch_all(&self.pool)
            .await?)
    }

    async fn find_task_by_id(&self, id: i64) -> Result<Option<Task>, Error> {
        let query = format!("SELECT {TASK_COLUMNS} FROM tasks WHERE id = $1;");

        Ok(sqlx::query(&query)
            .bind(id)
            .try_map(map_task)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn list_tasks_for_owner(&self, owner_id: i64) -> Result<Vec<Task>, Error> {
        let query = format!("SELECT {TASK_COLUMNS} FROM tasks WHERE owner_id = $1 ORDER BY id;");

        Ok(sqlx::query(&query)
            .bind(owner_id)
            .try_map(map_task)
            .fetch_all(&self.pool)
            .await?)
    }

    async fn create_task(&self, owner_id: i64, task: NewTask) -> Result<Task, Error> {
        let query = format!(
            "INSERT INTO tasks (owner_id, title, description, status) VALUES ($1, $2, $3, $4) RETURNING {TASK_COLUMNS};"
        );

        Ok(sqlx::query(&query)
            .bind(owner_id)
            .bind(&task.title)
            .bind(&task.description)
            .bind(task.status.as_str())
            .try_map(map_task)
            .fetch_one(&self.pool)
            .await?)
    }

    async fn update_task(
        &self,
        id: i64,
        owner_id: i64,
        changes: TaskChanges,
    ) -> Result<Option<Task>, Error> {
        let query = format!(
            "UPDATE tasks SET
                title = COALESCE($3, title),
                description = COALESCE($4, description),
                status = COALESCE($5, status),
                updated_at = $6
            WHERE id = $1 AND owner_id = $2
            RETURNING {TASK_COLUMNS};"
        );

        Ok(sqlx::query(&query)
            .bind(id)
            .bind(owner_id)
            .bind(changes.title)
            .bind(changes.description)
            .bind(changes.status.map(|status| status.as_str()))
            .bind(Utc::now())
            .try_map(map_task)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn delete_task(&self, id: i64, owner_id: i64) -> Result<bool, Error> {
        let result = sqlx::query("DELETE FROM tasks WHERE id = $1 AND owner_id = $2;")
            .bind(id)
            .bind(owner_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

fn map_identity(row: PgRow) -> Result<Identity, sqlx::Error> {
    let role: String = row.try_get("role")?;

    Ok(Identity {
        id: row.try_get("id")?,
        username: row.try_get("username")?,
        email: row.try_get("email")?,
        password_hash: row.try_get("password_hash")?,
        role: role.parse().map_err(|e| sqlx::Error::Decode(Box::new(e)))?,
    })
}

fn map_task(row: PgRow) -> Result<Task, sqlx::Error> {
    let status: String = row.try_get("status")?;

    Ok(Task {
        id: row.try_get("id")?,
        owner_id: row.try_get("owner_id")?,
        title: row.try_get("title")?,
        description: row.try_get("description")?,
        status: status.parse().map_err(|e| sqlx::Error::Decode(Box::new(e)))?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}
