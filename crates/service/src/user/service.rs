use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, info, instrument};
use validator::Validate;

use models::user::{NewUser, STATUS_DISABLED};

use super::domain::{ChangePasswordInput, LoginInput, RegisterInput, UpdateUserInput};
use super::password::Hasher;
use super::repository::UserRepository;
use super::User;
use crate::errors::{ServiceError, USERNAME_TAKEN};
use crate::pagination::{Page, PageRequest};

const BAD_CREDENTIALS: &str = "invalid username or password";

/// User account business service independent of web framework
pub struct UserService<R: UserRepository + ?Sized> {
    repo: Arc<R>,
    hasher: Hasher,
}

impl<R: UserRepository + ?Sized> UserService<R> {
    pub fn new(repo: Arc<R>) -> Self { Self { repo, hasher: Hasher::default() } }

    /// Same as `new` with custom Argon2 cost settings.
    pub fn with_hasher(repo: Arc<R>, hasher: Hasher) -> Self { Self { repo, hasher } }

    /// Register a new user with a hashed password.
    ///
    /// # Examples
    /// ```
    /// use service::user::{UserService, repository::mock::InMemoryUserRepository, domain::RegisterInput};
    /// use std::sync::Arc;
    /// let svc = UserService::new(Arc::new(InMemoryUserRepository::default()));
    /// let input = RegisterInput { username: "alice".into(), password: "Secret123".into(), email: Some("alice@example.com".into()), phone: None, nickname: None };
    /// let user = tokio_test::block_on(svc.register(input)).unwrap();
    /// assert_eq!(user.username, "alice");
    /// assert_ne!(user.password, "Secret123");
    /// ```
    #[instrument(skip(self, input), fields(username = %input.username))]
    pub async fn register(&self, input: RegisterInput) -> Result<User, ServiceError> {
        input.validate()?;
        if self.repo.exists_by_username(&input.username).await? {
            debug!("username taken");
            return Err(ServiceError::Conflict(USERNAME_TAKEN.into()));
        }
        let password_hash = self.hasher.hash(&input.password)?;
        let user = self.repo.insert(NewUser {
            username: input.username,
            password_hash,
            email: input.email,
            phone: input.phone,
            nickname: input.nickname,
        }).await?;
        info!(user_id = user.id, "user_registered");
        Ok(user)
    }

    /// Check credentials and return the matching user.
    ///
    /// Unknown usernames and wrong passwords fail the same way.
    ///
    /// # Examples
    /// ```
    /// use service::user::{UserService, repository::mock::InMemoryUserRepository, domain::{RegisterInput, LoginInput}};
    /// use std::sync::Arc;
    /// let svc = UserService::new(Arc::new(InMemoryUserRepository::default()));
    /// let _ = tokio_test::block_on(svc.register(RegisterInput { username: "bob".into(), password: "Passw0rd".into(), email: None, phone: None, nickname: None }));
    /// let user = tokio_test::block_on(svc.login(LoginInput { username: "bob".into(), password: "Passw0rd".into() })).unwrap();
    /// assert_eq!(user.username, "bob");
    /// assert!(tokio_test::block_on(svc.login(LoginInput { username: "bob".into(), password: "wrong".into() })).is_err());
    /// ```
    #[instrument(skip(self, input), fields(username = %input.username))]
    pub async fn login(&self, input: LoginInput) -> Result<User, ServiceError> {
        input.validate()?;
        let user = self.repo
            .find_by_username(&input.username)
            .await?
            .ok_or_else(|| ServiceError::Unauthorized(BAD_CREDENTIALS.into()))?;
        if !self.hasher.verify(&input.password, &user.password)? {
            return Err(ServiceError::Unauthorized(BAD_CREDENTIALS.into()));
        }
        if user.status == STATUS_DISABLED {
            return Err(ServiceError::Unauthorized("account disabled".into()));
        }
        info!(user_id = user.id, "user_logged_in");
        Ok(user)
    }

    pub async fn get_user(&self, id: i32) -> Result<User, ServiceError> {
        self.repo.find_by_id(id).await?.ok_or_else(|| ServiceError::not_found("user"))
    }

    /// Apply the present fields of `input`; a new username must still be unique.
    #[instrument(skip(self, input))]
    pub async fn update_user(&self, id: i32, input: UpdateUserInput) -> Result<User, ServiceError> {
        input.validate()?;
        let mut user = self.get_user(id).await?;

        if let Some(username) = input.username {
            if username != user.username {
                if self.repo.exists_by_username(&username).await? {
                    return Err(ServiceError::Conflict(USERNAME_TAKEN.into()));
                }
                user.username = username;
            }
        }
        if let Some(email) = input.email { user.email = Some(email); }
        if let Some(phone) = input.phone { user.phone = Some(phone); }
        if let Some(nickname) = input.nickname { user.nickname = Some(nickname); }
        if let Some(avatar) = input.avatar { user.avatar = Some(avatar); }
        if let Some(status) = input.status { user.status = status; }
        user.update_time = Utc::now().into();

        let updated = self.repo.update(user).await?;
        info!(user_id = updated.id, "user_updated");
        Ok(updated)
    }

    /// Replace the password after checking the current one; on mismatch the
    /// stored hash is left as it was.
    #[instrument(skip(self, input))]
    pub async fn update_password(&self, id: i32, input: ChangePasswordInput) -> Result<(), ServiceError> {
        input.validate()?;
        let mut user = self.get_user(id).await?;
        if !self.hasher.verify(&input.old_password, &user.password)? {
            return Err(ServiceError::Unauthorized("old password is incorrect".into()));
        }
        user.password = self.hasher.hash(&input.new_password)?;
        user.update_time = Utc::now().into();
        self.repo.update(user).await?;
        info!(user_id = id, "password_changed");
        Ok(())
    }

    #[instrument(skip(self))]
    pub async fn delete_user(&self, id: i32) -> Result<(), ServiceError> {
        if !self.repo.delete_by_id(id).await? {
            return Err(ServiceError::not_found("user"));
        }
        info!(user_id = id, "user_deleted");
        Ok(())
    }

    /// `true` when no account uses `username` yet.
    pub async fn check_username_available(&self, username: &str) -> Result<bool, ServiceError> {
        if username.trim().is_empty() {
            return Err(ServiceError::Validation("username is required".into()));
        }
        Ok(!self.repo.exists_by_username(username).await?)
    }

    pub async fn list_users(&self, req: PageRequest) -> Result<Page<User>, ServiceError> {
        self.repo.find_page(&req).await
    }

    #[instrument(skip(self))]
    pub async fn search_users(&self, keyword: &str, req: PageRequest) -> Result<Page<User>, ServiceError> {
        let keyword = keyword.trim();
        if keyword.is_empty() {
            return Err(ServiceError::Validation("keyword is required".into()));
        }
        self.repo.search_page(keyword, &req).await
    }
}
