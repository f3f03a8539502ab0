use axum::body::Bytes;
use std::sync::Arc;

use crate::auth::{CurrentUser, Operation, ResourceGuard};
use crate::core::error::Error;
use crate::store::objects::{
    ObjectStore, StoredObject, attachment_key, attachment_name, attachment_prefix,
};

pub(crate) struct UploadedFile {
    pub(crate) file_name: String,
    pub(crate) content_type: String,
    pub(crate) bytes: Bytes,
}

/// Proof that the caller owns the task an upload is headed for. Only
/// [`AttachmentController::authorize_upload`] hands these out, so the
/// ownership check always runs before the request body is read.
#[derive(Debug)]
pub(crate) struct UploadTarget {
    task_id: i64,
}

#[derive(Clone)]
pub(crate) struct AttachmentController {
    objects: Arc<dyn ObjectStore>,
    guard: ResourceGuard,
    base_url: String,
}

impl AttachmentController {
    pub(crate) fn new(objects: Arc<dyn ObjectStore>, guard: ResourceGuard, base_url: &str) -> Self {
        Self {
            objects,
            guard,
            base_url: base_url.trim_end_matches('/').to_owned(),
        }
    }

    /// Where the download route serves `name` from.
    fn url(&self, task_id: i64, name: &str) -> String {
        format!("{}/tasks/{task_id}/attachments/{name}", self.base_url)
    }

    pub(crate) async fn authorize_upload(
        &self,
        user: &CurrentUser,
        task_id: i64,
    ) -> Result<UploadTarget, Error> {
        let task = self.guard.authorize(user, task_id, Operation::Upload).await?;

        Ok(UploadTarget { task_id: task.id })
    }

    pub(crate) async fn upload(
        &self,
        target: UploadTarget,
        files: Vec<UploadedFile>,
    ) -> Result<Vec<String>, Error> {
        if files.is_empty() {
            return Err(Error::InvalidUpload("No files provided".into()));
        }

        let names = files
            .iter()
            .map(|file| {
                attachment_name(&file.file_name)
                    .ok_or_else(|| Error::InvalidUpload(format!("Invalid file name: {}", file.file_name)))
            })
            .collect::<Result<Vec<_>, _>>()?;

        let prefix = attachment_prefix(target.task_id);
        let mut urls = Vec::with_capacity(files.len());

        for (file, name) in files.iter().zip(names) {
            self.objects
                .put(&format!("{prefix}{name}"), &file.content_type, &file.bytes)
                .await?;
            urls.push(self.url(target.task_id, &name));
        }

        tracing::info!(task_id = target.task_id, "stored {} attachment(s)", urls.len());

        Ok(urls)
    }

    pub(crate) async fn list(&self, user: &CurrentUser, task_id: i64) -> Result<Vec<String>, Error> {
        let task = self
            .guard
            .authorize(user, task_id, Operation::ListAttachments)
            .await?;

        let prefix = attachment_prefix(task.id);

        Ok(self
            .objects
            .list(&prefix)
            .await?
            .iter()
            .filter_map(|key| key.strip_prefix(&prefix))
            .map(|name| self.url(task.id, name))
            .collect())
    }

    pub(crate) async fn download(
        &self,
        user: &CurrentUser,
        task_id: i64,
        name: &str,
    ) -> Result<StoredObject, Error> {
        let task = self.guard.authorize(user, task_id, Operation::Download).await?;

        let key = attachment_key(task.id, name).ok_or(Error::NotFound)?;

        self.objects.get(&key).await?.ok_or(Error::NotFound)
    }
}
