use bcrypt::{hash, verify};
use chrono::{DateTime, Utc};
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set};

use crate::entity::user;
use crate::error::StoreError;
use crate::repository::{Document, Record, Repository};

const HASH_COST: u32 = 10;

/// bcrypt only reads this many bytes of input; anything longer would
/// silently collide with its own prefix.
pub const MAX_PASSWORD_BYTES: usize = 72;

#[derive(Clone, Debug, PartialEq)]
pub struct User {
    pub username: String,
    pub email: String,
    pub password_hash: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl User {
    /// Builds an unsaved user with a salted bcrypt hash of `password`.
    pub fn new(username: &str, email: &str, password: &str) -> Result<Self, StoreError> {
        if password.len() > MAX_PASSWORD_BYTES {
            return Err(StoreError::PasswordTooLong { max: MAX_PASSWORD_BYTES });
        }
        Ok(Self {
            username: username.to_string(),
            email: email.to_string(),
            password_hash: Some(hash(password, HASH_COST)?),
            created_at: Utc::now(),
        })
    }

    /// Missing or unreadable hashes never match.
    pub fn verify_password(&self, password: &str) -> bool {
        self.password_hash
            .as_deref()
            .filter(|_| password.len() <= MAX_PASSWORD_BYTES)
            .map(|stored| verify(password, stored).unwrap_or(false))
            .unwrap_or(false)
    }
}

impl Document for User {
    type Entity = user::Entity;
    type ActiveModel = user::ActiveModel;

    fn to_active_model(&self) -> user::ActiveModel {
        user::ActiveModel {
            username: Set(self.username.clone()),
            email: Set(self.email.clone()),
            password_hash: Set(self.password_hash.clone()),
            created_at: Set(self.created_at),
            ..Default::default()
        }
    }

    fn from_model(model: user::Model) -> (i32, Self) {
        (
            model.id,
            Self {
                username: model.username,
                email: model.email,
                password_hash: model.password_hash,
                created_at: model.created_at,
            },
        )
    }
}

impl Repository<User> {
    /// Stores a new account and returns its id. Username and email
    /// uniqueness is left to the caller.
    pub async fn create(&self, username: &str, email: &str, password: &str) -> Result<i32, StoreError> {
        let user = User::new(username, email, password)?;
        self.insert(&user).await
    }

    pub async fn find_by_username(&self, username: &str) -> Result<Option<Record<User>>, StoreError> {
        self.fetch_one(user::Entity::find().filter(user::Column::Username.eq(username)))
            .await
    }

    pub async fn find_by_email(&self, email: &str) -> Result<Option<Record<User>>, StoreError> {
        self.fetch_one(user::Entity::find().filter(user::Column::Email.eq(email)))
            .await
    }

    pub async fn list_all(&self) -> Result<Vec<Record<User>>, StoreError> {
        self.fetch_all(user::Entity::find().order_by_asc(user::Column::Id))
            .await
    }
}
