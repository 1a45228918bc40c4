use std::sync::Arc;

use anyhow::Context;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use super::repo_types::Photo;
use crate::{db::StoreTx, error::AppResult, storage::StorageClient};

/// Pre-signed target for a profile photo upload.
#[derive(Debug, Clone)]
pub struct UploadDescriptor {
    pub photo_id: Uuid,
    pub upload_url: String,
    pub s3_key: String,
}

/// Ties photo rows to objects in the photo bucket.
#[derive(Clone)]
pub struct PhotoService {
    storage: Arc<dyn StorageClient>,
    url_ttl_secs: u64,
}

impl PhotoService {
    pub fn new(storage: Arc<dyn StorageClient>, url_ttl_secs: u64) -> Self {
        Self {
            storage,
            url_ttl_secs,
        }
    }

    /// Issues an upload URL for `file_name` and records the photo row in `tx`.
    #[instrument(skip(self, tx))]
    pub async fn generate_upload(
        &self,
        tx: &mut dyn StoreTx,
        user_id: Uuid,
        file_name: &str,
    ) -> AppResult<UploadDescriptor> {
        let photo_id = Uuid::new_v4();
        let s3_key = object_key(user_id, photo_id, file_name);
        let upload_url = self
            .storage
            .presign_put(&s3_key, self.url_ttl_secs)
            .await
            .with_context(|| format!("presign upload for {}", s3_key))?;
        tx.insert_photo(photo_id, user_id, &s3_key).await?;
        info!(%photo_id, %user_id, "photo upload registered");
        Ok(UploadDescriptor {
            photo_id,
            upload_url,
            s3_key,
        })
    }

    /// Displayable URL for the photo; empty when there is none.
    pub async fn file_path(&self, photo: Option<&Photo>) -> AppResult<String> {
        let Some(photo) = photo else {
            return Ok(String::new());
        };
        let url = self
            .storage
            .presign_get(&photo.s3_key, self.url_ttl_secs)
            .await
            .with_context(|| format!("presign url for s3_key {}", photo.s3_key))?;
        Ok(url)
    }

    /// Deletes the photo row in `tx` and returns the object key to purge once
    /// the transaction has committed. `None` is a no-op.
    pub async fn delete_photo(
        &self,
        tx: &mut dyn StoreTx,
        photo: Option<&Photo>,
    ) -> AppResult<Option<String>> {
        let Some(photo) = photo else {
            return Ok(None);
        };
        tx.delete_photo(photo.id).await?;
        Ok(Some(photo.s3_key.clone()))
    }

    /// Removes the backing object. A failure leaves an orphaned object behind
    /// and is only logged.
    pub async fn purge_object(&self, s3_key: &str) {
        match self.storage.delete_object(s3_key).await {
            Ok(()) => info!(%s3_key, "photo object deleted"),
            Err(e) => warn!(error = %e, %s3_key, "photo object left orphaned"),
        }
    }
}

fn object_key(user_id: Uuid, photo_id: Uuid, file_name: &str) -> String {
    let base = file_name
        .rsplit(|c: char| c == '/' || c == '\\')
        .next()
        .unwrap_or(file_name);
    let clean: String = base
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect();
    format!("profiles/{}/{}-{}", user_id, photo_id, clean)
}

#[cfg(test)]
mod photo_tests {
    use super::*;
    use crate::{
        db::{memory::MemoryStore, Store},
        error::AppError,
        storage::fake::FakeStorage,
    };
    use std::sync::atomic::Ordering;

    fn service(storage: &FakeStorage) -> PhotoService {
        PhotoService::new(Arc::new(storage.clone()), 600)
    }

    #[test]
    fn object_key_strips_directories_and_odd_chars() {
        let user = Uuid::nil();
        let photo = Uuid::nil();
        let key = object_key(user, photo, "../../etc/my cat?.png");
        assert_eq!(
            key,
            format!("profiles/{}/{}-my_cat_.png", user, photo)
        );
        assert!(object_key(user, photo, r"C:\pics\me.jpg").ends_with("-me.jpg"));
    }

    #[tokio::test]
    async fn file_path_is_empty_without_photo() {
        let storage = FakeStorage::default();
        assert_eq!(service(&storage).file_path(None).await.unwrap(), "");
    }

    #[tokio::test]
    async fn generate_upload_records_photo_row() {
        let storage = FakeStorage::default();
        let store = MemoryStore::new();
        let mut tx = store.begin().await.unwrap();
        let user_id = Uuid::new_v4();

        let desc = service(&storage)
            .generate_upload(tx.as_mut(), user_id, "me.png")
            .await
            .unwrap();
        assert!(desc.upload_url.contains(&desc.s3_key));
        let row = tx.find_photo_by_id(desc.photo_id).await.unwrap().unwrap();
        assert_eq!(row.user_id, user_id);
        assert_eq!(row.s3_key, desc.s3_key);
    }

    #[tokio::test]
    async fn generate_upload_fails_without_row_when_presign_fails() {
        let storage = FakeStorage::default();
        storage.fail_presign_put.store(true, Ordering::SeqCst);
        let store = MemoryStore::new();
        let mut tx = store.begin().await.unwrap();

        let err = service(&storage)
            .generate_upload(tx.as_mut(), Uuid::new_v4(), "me.png")
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Internal(_)));
    }

    #[tokio::test]
    async fn delete_photo_none_is_noop() {
        let storage = FakeStorage::default();
        let store = MemoryStore::new();
        let mut tx = store.begin().await.unwrap();
        let key = service(&storage).delete_photo(tx.as_mut(), None).await.unwrap();
        assert!(key.is_none());
    }

    #[tokio::test]
    async fn purge_failure_is_swallowed() {
        let storage = FakeStorage::default();
        storage.fail_delete.store(true, Ordering::SeqCst);
        service(&storage).purge_object("profiles/x/y.png").await;
        assert!(storage.deleted_keys().is_empty());
    }
}
