use std::sync::Arc;

use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use super::{
    dto::{normalize_email, IdResponse, SignUpRequest, UserInfo},
    repo_types::{NewUser, User},
};
use crate::{
    auth::{bearer_credential, jwt::TokenDecoder, password::CredentialHasher},
    db::Store,
    error::{AppError, AppResult},
    photos::services::PhotoService,
};

/// Signup, account deletion and profile reads over the user and photo stores.
#[derive(Clone)]
pub struct UserService {
    store: Arc<dyn Store>,
    photos: PhotoService,
    tokens: Arc<dyn TokenDecoder>,
    hasher: Arc<dyn CredentialHasher>,
}

impl UserService {
    pub fn new(
        store: Arc<dyn Store>,
        photos: PhotoService,
        tokens: Arc<dyn TokenDecoder>,
        hasher: Arc<dyn CredentialHasher>,
    ) -> Self {
        Self {
            store,
            photos,
            tokens,
            hasher,
        }
    }

    pub async fn is_email_duplicate(&self, email: &str) -> AppResult<bool> {
        self.store.exists_by_email(&normalize_email(email)).await
    }

    pub async fn is_nickname_duplicate(&self, nickname: &str) -> AppResult<bool> {
        self.store.exists_by_nickname(nickname.trim()).await
    }

    /// Creates the account and, when a file name is given, registers the
    /// profile photo upload. Nothing is persisted unless every step succeeds.
    ///
    /// The existence checks only give an early answer; the uniqueness
    /// constraints on insert are what actually reject a duplicate.
    #[instrument(skip(self, request), fields(email = %request.email))]
    pub async fn sign_up(&self, request: SignUpRequest) -> AppResult<IdResponse> {
        let request = request.validate()?;

        if self.is_email_duplicate(&request.email).await? {
            warn!("email already registered");
            return Err(AppError::DuplicateEmail);
        }
        if self.is_nickname_duplicate(&request.nickname).await? {
            warn!(nickname = %request.nickname, "nickname already in use");
            return Err(AppError::DuplicateNickname);
        }

        let password_hash = self.hasher.hash(&request.password)?;

        let mut tx = self.store.begin().await?;
        let user = tx
            .insert_user(NewUser {
                id: Uuid::new_v4(),
                email: request.email,
                nickname: request.nickname,
                password_hash,
            })
            .await?;

        let mut upload_url = None;
        if let Some(file_name) = request.file_name.as_deref() {
            let upload = self
                .photos
                .generate_upload(tx.as_mut(), user.id, file_name)
                .await?;
            let photo = tx
                .find_photo_by_id(upload.photo_id)
                .await?
                .ok_or(AppError::PhotoNotFound)?;
            tx.set_user_photo(user.id, Some(photo.id)).await?;
            debug!(s3_key = %upload.s3_key, "profile photo attached");
            upload_url = Some(upload.upload_url);
        }
        tx.commit().await?;

        info!(user_id = %user.id, with_photo = upload_url.is_some(), "user signed up");
        Ok(IdResponse {
            id: user.id,
            upload_url,
        })
    }

    /// Deletes the caller's account together with its profile photo.
    #[instrument(skip_all)]
    pub async fn delete_account(&self, token: &str) -> AppResult<()> {
        let user = self.user_by_token(token).await?;

        let mut tx = self.store.begin().await?;
        let photo = match user.photo_id {
            Some(id) => tx.find_photo_by_id(id).await?,
            None => None,
        };
        let orphan = self.photos.delete_photo(tx.as_mut(), photo.as_ref()).await?;
        tx.delete_user(user.id).await?;
        tx.commit().await?;

        // Object storage is not transactional; only touch it once the rows are gone.
        if let Some(s3_key) = orphan {
            self.photos.purge_object(&s3_key).await;
        }
        info!(user_id = %user.id, "account deleted");
        Ok(())
    }

    #[instrument(skip_all)]
    pub async fn get_user_info(&self, token: &str) -> AppResult<UserInfo> {
        let user = self.user_by_token(token).await?;
        self.project(user).await
    }

    #[instrument(skip(self))]
    pub async fn get_user_info_by_id(&self, id: Uuid) -> AppResult<UserInfo> {
        let user = self
            .store
            .find_user_by_id(id)
            .await?
            .ok_or(AppError::UserNotFound)?;
        self.project(user).await
    }

    #[instrument(skip(self))]
    pub async fn get_all_user_info(&self) -> AppResult<Vec<UserInfo>> {
        let users = self.store.find_all_users().await?;
        let mut out = Vec::with_capacity(users.len());
        for user in users {
            out.push(self.project(user).await?);
        }
        Ok(out)
    }

    async fn user_by_token(&self, token: &str) -> AppResult<User> {
        let raw = bearer_credential(token)?;
        let email = self.tokens.extract_email(raw).map_err(|e| {
            warn!(error = %e, "invalid or expired token");
            AppError::Unauthorized("invalid or expired token".into())
        })?;
        self.store
            .find_user_by_email(&normalize_email(&email))
            .await?
            .ok_or(AppError::UserNotFound)
    }

    async fn project(&self, user: User) -> AppResult<UserInfo> {
        let photo = match user.photo_id {
            Some(photo_id) => {
                let photo = self.store.find_photo_by_id(photo_id).await?;
                if photo.is_none() {
                    warn!(user_id = %user.id, %photo_id, "user references a missing photo");
                }
                photo
            }
            None => None,
        };
        let photo_path = self.photos.file_path(photo.as_ref()).await?;
        Ok(UserInfo {
            id: user.id,
            email: user.email,
            nickname: user.nickname,
            photo_path,
        })
    }
}
