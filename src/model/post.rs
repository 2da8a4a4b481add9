use chrono::{DateTime, Utc};
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set};

use crate::entity::post;
use crate::error::StoreError;
use crate::repository::{Document, Record, Repository};

#[derive(Clone, Debug, PartialEq)]
pub struct Post {
    pub title: String,
    pub content: String,
    pub user_id: i32,
    pub created_at: DateTime<Utc>,
}

impl Document for Post {
    type Entity = post::Entity;
    type ActiveModel = post::ActiveModel;

    fn to_active_model(&self) -> post::ActiveModel {
        post::ActiveModel {
            title: Set(self.title.clone()),
            content: Set(self.content.clone()),
            user_id: Set(self.user_id),
            created_at: Set(self.created_at),
            ..Default::default()
        }
    }

    fn from_model(model: post::Model) -> (i32, Self) {
        (
            model.id,
            Self {
                title: model.title,
                content: model.content,
                user_id: model.user_id,
                created_at: model.created_at,
            },
        )
    }
}

impl Repository<Post> {
    /// The author id is stored as given; it is not checked against users.
    pub async fn create(
        &self,
        title: &str,
        content: &str,
        user_id: i32,
        created_at: Option<DateTime<Utc>>,
    ) -> Result<i32, StoreError> {
        let post = Post {
            title: title.to_string(),
            content: content.to_string(),
            user_id,
            created_at: created_at.unwrap_or_else(Utc::now),
        };
        self.insert(&post).await
    }

    /// Newest first.
    pub async fn find_all(&self) -> Result<Vec<Record<Post>>, StoreError> {
        self.fetch_all(
            post::Entity::find()
                .order_by_desc(post::Column::CreatedAt)
                .order_by_desc(post::Column::Id),
        )
        .await
    }

    /// Newest first.
    pub async fn find_by_author(&self, user_id: i32) -> Result<Vec<Record<Post>>, StoreError> {
        self.fetch_all(
            post::Entity::find()
                .filter(post::Column::UserId.eq(user_id))
                .order_by_desc(post::Column::CreatedAt)
                .order_by_desc(post::Column::Id),
        )
        .await
    }
}
