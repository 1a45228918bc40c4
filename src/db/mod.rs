//! Persistence ports for users and photos.
//!
//! Reads go straight through [`Store`]; every write happens inside a
//! [`StoreTx`] obtained from [`Store::begin`] and becomes visible only on
//! [`StoreTx::commit`]. Dropping a transaction without committing rolls it
//! back.

#[cfg(test)]
pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use uuid::Uuid;

use crate::{
    error::AppResult,
    photos::repo_types::Photo,
    users::repo_types::{NewUser, User},
};

pub use postgres::PgStore;

#[async_trait]
pub trait Store: Send + Sync {
    async fn exists_by_email(&self, email: &str) -> AppResult<bool>;
    async fn exists_by_nickname(&self, nickname: &str) -> AppResult<bool>;
    async fn find_user_by_id(&self, id: Uuid) -> AppResult<Option<User>>;
    async fn find_user_by_email(&self, email: &str) -> AppResult<Option<User>>;
    /// All users in store iteration order.
    async fn find_all_users(&self) -> AppResult<Vec<User>>;
    async fn find_photo_by_id(&self, id: Uuid) -> AppResult<Option<Photo>>;
    async fn begin(&self) -> AppResult<Box<dyn StoreTx>>;
}

#[async_trait]
pub trait StoreTx: Send {
    /// Inserts a user. A clash on the email or nickname uniqueness
    /// constraint yields `DuplicateEmail` / `DuplicateNickname`.
    async fn insert_user(&mut self, user: NewUser) -> AppResult<User>;
    async fn set_user_photo(&mut self, user_id: Uuid, photo_id: Option<Uuid>) -> AppResult<()>;
    async fn delete_user(&mut self, id: Uuid) -> AppResult<()>;
    async fn insert_photo(&mut self, photo_id: Uuid, user_id: Uuid, s3_key: &str)
        -> AppResult<Photo>;
    async fn find_photo_by_id(&mut self, id: Uuid) -> AppResult<Option<Photo>>;
    /// Deletes a photo row; users referencing it lose the reference.
    async fn delete_photo(&mut self, id: Uuid) -> AppResult<()>;
    async fn commit(self: Box<Self>) -> AppResult<()>;
}
