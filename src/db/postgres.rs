use anyhow::Context;
use async_trait::async_trait;
use sqlx::{postgres::PgPoolOptions, PgPool, Postgres, Transaction};
use uuid::Uuid;

use super::{Store, StoreTx};
use crate::{
    error::{AppError, AppResult},
    photos::repo_types::Photo,
    users::repo_types::{NewUser, User},
};

const USER_COLUMNS: &str = "id, email, nickname, password_hash, photo_id, created_at";
const PHOTO_COLUMNS: &str = "id, user_id, s3_key, created_at";

#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub async fn connect(database_url: &str) -> anyhow::Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(10)
            .connect(database_url)
            .await
            .context("connect to database")?;
        Ok(Self { pool })
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl Store for PgStore {
    async fn exists_by_email(&self, email: &str) -> AppResult<bool> {
        let exists: bool =
            sqlx::query_scalar(r#"SELECT EXISTS (SELECT 1 FROM users WHERE email = $1)"#)
                .bind(email)
                .fetch_one(&self.pool)
                .await?;
        Ok(exists)
    }

    async fn exists_by_nickname(&self, nickname: &str) -> AppResult<bool> {
        let exists: bool =
            sqlx::query_scalar(r#"SELECT EXISTS (SELECT 1 FROM users WHERE nickname = $1)"#)
                .bind(nickname)
                .fetch_one(&self.pool)
                .await?;
        Ok(exists)
    }

    async fn find_user_by_id(&self, id: Uuid) -> AppResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    async fn find_user_by_email(&self, email: &str) -> AppResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE email = $1"
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    async fn find_all_users(&self) -> AppResult<Vec<User>> {
        let users = sqlx::query_as::<_, User>(&format!("SELECT {USER_COLUMNS} FROM users"))
            .fetch_all(&self.pool)
            .await?;
        Ok(users)
    }

    async fn find_photo_by_id(&self, id: Uuid) -> AppResult<Option<Photo>> {
        let photo = sqlx::query_as::<_, Photo>(&format!(
            "SELECT {PHOTO_COLUMNS} FROM photos WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(photo)
    }

    async fn begin(&self) -> AppResult<Box<dyn StoreTx>> {
        let tx = self.pool.begin().await?;
        Ok(Box::new(PgStoreTx { tx }))
    }
}

pub struct PgStoreTx {
    tx: Transaction<'static, Postgres>,
}

#[async_trait]
impl StoreTx for PgStoreTx {
    async fn insert_user(&mut self, user: NewUser) -> AppResult<User> {
        sqlx::query_as::<_, User>(&format!(
            "INSERT INTO users (id, email, nickname, password_hash) \
             VALUES ($1, $2, $3, $4) \
             RETURNING {USER_COLUMNS}"
        ))
        .bind(user.id)
        .bind(&user.email)
        .bind(&user.nickname)
        .bind(&user.password_hash)
        .fetch_one(&mut *self.tx)
        .await
        .map_err(user_conflict_or_database)
    }

    async fn set_user_photo(&mut self, user_id: Uuid, photo_id: Option<Uuid>) -> AppResult<()> {
        let done = sqlx::query(r#"UPDATE users SET photo_id = $2 WHERE id = $1"#)
            .bind(user_id)
            .bind(photo_id)
            .execute(&mut *self.tx)
            .await?;
        if done.rows_affected() == 0 {
            return Err(AppError::UserNotFound);
        }
        Ok(())
    }

    async fn delete_user(&mut self, id: Uuid) -> AppResult<()> {
        let done = sqlx::query(r#"DELETE FROM users WHERE id = $1"#)
            .bind(id)
            .execute(&mut *self.tx)
            .await?;
        if done.rows_affected() == 0 {
            return Err(AppError::UserNotFound);
        }
        Ok(())
    }

    async fn insert_photo(
        &mut self,
        photo_id: Uuid,
        user_id: Uuid,
        s3_key: &str,
    ) -> AppResult<Photo> {
        let photo = sqlx::query_as::<_, Photo>(&format!(
            "INSERT INTO photos (id, user_id, s3_key) \
             VALUES ($1, $2, $3) \
             RETURNING {PHOTO_COLUMNS}"
        ))
        .bind(photo_id)
        .bind(user_id)
        .bind(s3_key)
        .fetch_one(&mut *self.tx)
        .await?;
        Ok(photo)
    }

    async fn find_photo_by_id(&mut self, id: Uuid) -> AppResult<Option<Photo>> {
        let photo = sqlx::query_as::<_, Photo>(&format!(
            "SELECT {PHOTO_COLUMNS} FROM photos WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&mut *self.tx)
        .await?;
        Ok(photo)
    }

    async fn delete_photo(&mut self, id: Uuid) -> AppResult<()> {
        // users.photo_id is ON DELETE SET NULL
        sqlx::query(r#"DELETE FROM photos WHERE id = $1"#)
            .bind(id)
            .execute(&mut *self.tx)
            .await?;
        Ok(())
    }

    async fn commit(self: Box<Self>) -> AppResult<()> {
        self.tx.commit().await?;
        Ok(())
    }
}

fn user_conflict_or_database(error: sqlx::Error) -> AppError {
    if let sqlx::Error::Database(ref db_err) = error {
        if db_err.code().as_deref() == Some("23505") {
            match db_err.constraint() {
                Some("users_email_key") => return AppError::DuplicateEmail,
                Some("users_nickname_key") => return AppError::DuplicateNickname,
                _ => {}
            }
        }
    }
    AppError::Database(error)
}
