//! In-memory [`Store`] used by the service tests.
//!
//! A transaction works on a staged copy of the tables and swaps it in on
//! commit, so an uncommitted transaction leaves no trace. Meant for a single
//! writer at a time.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use time::OffsetDateTime;
use uuid::Uuid;

use super::{Store, StoreTx};
use crate::{
    error::{AppError, AppResult},
    photos::repo_types::Photo,
    users::repo_types::{NewUser, User},
};

#[derive(Debug, Clone, Default)]
pub struct Tables {
    pub users: Vec<User>,
    pub photos: Vec<Photo>,
}

#[derive(Clone, Default)]
pub struct MemoryStore {
    tables: Arc<Mutex<Tables>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn snapshot(&self) -> Tables {
        self.tables.lock().unwrap().clone()
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn exists_by_email(&self, email: &str) -> AppResult<bool> {
        Ok(self.snapshot().users.iter().any(|u| u.email == email))
    }

    async fn exists_by_nickname(&self, nickname: &str) -> AppResult<bool> {
        Ok(self.snapshot().users.iter().any(|u| u.nickname == nickname))
    }

    async fn find_user_by_id(&self, id: Uuid) -> AppResult<Option<User>> {
        Ok(self.snapshot().users.into_iter().find(|u| u.id == id))
    }

    async fn find_user_by_email(&self, email: &str) -> AppResult<Option<User>> {
        Ok(self.snapshot().users.into_iter().find(|u| u.email == email))
    }

    async fn find_all_users(&self) -> AppResult<Vec<User>> {
        Ok(self.snapshot().users)
    }

    async fn find_photo_by_id(&self, id: Uuid) -> AppResult<Option<Photo>> {
        Ok(self.snapshot().photos.into_iter().find(|p| p.id == id))
    }

    async fn begin(&self) -> AppResult<Box<dyn StoreTx>> {
        Ok(Box::new(MemoryStoreTx {
            staged: self.snapshot(),
            target: self.tables.clone(),
        }))
    }
}

pub struct MemoryStoreTx {
    staged: Tables,
    target: Arc<Mutex<Tables>>,
}

#[async_trait]
impl StoreTx for MemoryStoreTx {
    async fn insert_user(&mut self, user: NewUser) -> AppResult<User> {
        // Same precedence as the Postgres constraints: email first.
        if self.staged.users.iter().any(|u| u.email == user.email) {
            return Err(AppError::DuplicateEmail);
        }
        if self.staged.users.iter().any(|u| u.nickname == user.nickname) {
            return Err(AppError::DuplicateNickname);
        }
        let row = User {
            id: user.id,
            email: user.email,
            nickname: user.nickname,
            password_hash: user.password_hash,
            photo_id: None,
            created_at: OffsetDateTime::now_utc(),
        };
        self.staged.users.push(row.clone());
        Ok(row)
    }

    async fn set_user_photo(&mut self, user_id: Uuid, photo_id: Option<Uuid>) -> AppResult<()> {
        let user = self
            .staged
            .users
            .iter_mut()
            .find(|u| u.id == user_id)
            .ok_or(AppError::UserNotFound)?;
        user.photo_id = photo_id;
        Ok(())
    }

    async fn delete_user(&mut self, id: Uuid) -> AppResult<()> {
        let before = self.staged.users.len();
        self.staged.users.retain(|u| u.id != id);
        if self.staged.users.len() == before {
            return Err(AppError::UserNotFound);
        }
        // photos.user_id is ON DELETE CASCADE
        self.staged.photos.retain(|p| p.user_id != id);
        Ok(())
    }

    async fn insert_photo(
        &mut self,
        photo_id: Uuid,
        user_id: Uuid,
        s3_key: &str,
    ) -> AppResult<Photo> {
        let photo = Photo {
            id: photo_id,
            user_id,
            s3_key: s3_key.to_string(),
            created_at: OffsetDateTime::now_utc(),
        };
        self.staged.photos.push(photo.clone());
        Ok(photo)
    }

    async fn find_photo_by_id(&mut self, id: Uuid) -> AppResult<Option<Photo>> {
        Ok(self.staged.photos.iter().find(|p| p.id == id).cloned())
    }

    async fn delete_photo(&mut self, id: Uuid) -> AppResult<()> {
        self.staged.photos.retain(|p| p.id != id);
        for user in self.staged.users.iter_mut() {
            if user.photo_id == Some(id) {
                user.photo_id = None;
            }
        }
        Ok(())
    }

    async fn commit(self: Box<Self>) -> AppResult<()> {
        *self.target.lock().unwrap() = self.staged;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_user(email: &str, nickname: &str) -> NewUser {
        NewUser {
            id: Uuid::new_v4(),
            email: email.into(),
            nickname: nickname.into(),
            password_hash: "hash".into(),
        }
    }

    #[tokio::test]
    async fn uncommitted_transaction_leaves_no_rows() {
        let store = MemoryStore::new();
        {
            let mut tx = store.begin().await.unwrap();
            tx.insert_user(new_user("a@b.io", "a")).await.unwrap();
        }
        assert!(store.snapshot().users.is_empty());
    }

    #[tokio::test]
    async fn insert_enforces_uniqueness() {
        let store = MemoryStore::new();
        let mut tx = store.begin().await.unwrap();
        tx.insert_user(new_user("a@b.io", "a")).await.unwrap();
        let err = tx.insert_user(new_user("a@b.io", "b")).await.unwrap_err();
        assert!(matches!(err, AppError::DuplicateEmail));
        let err = tx.insert_user(new_user("c@b.io", "a")).await.unwrap_err();
        assert!(matches!(err, AppError::DuplicateNickname));
        tx.commit().await.unwrap();
        assert_eq!(store.snapshot().users.len(), 1);
    }

    #[tokio::test]
    async fn deleting_photo_clears_user_reference() {
        let store = MemoryStore::new();
        let mut tx = store.begin().await.unwrap();
        let user = tx.insert_user(new_user("a@b.io", "a")).await.unwrap();
        let photo_id = Uuid::new_v4();
        tx.insert_photo(photo_id, user.id, "k").await.unwrap();
        tx.set_user_photo(user.id, Some(photo_id)).await.unwrap();
        tx.delete_photo(photo_id).await.unwrap();
        tx.commit().await.unwrap();

        let tables = store.snapshot();
        assert!(tables.photos.is_empty());
        assert_eq!(tables.users[0].photo_id, None);
    }
}
