use chrono::{DateTime, Utc};
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set};

use crate::entity::comment;
use crate::error::StoreError;
use crate::repository::{Document, Record, Repository};

#[derive(Clone, Debug, PartialEq)]
pub struct Comment {
    pub content: String,
    pub post_id: i32,
    pub user_id: i32,
    pub created_at: DateTime<Utc>,
}

impl Document for Comment {
    type Entity = comment::Entity;
    type ActiveModel = comment::ActiveModel;

    fn to_active_model(&self) -> comment::ActiveModel {
        comment::ActiveModel {
            content: Set(self.content.clone()),
            post_id: Set(self.post_id),
            user_id: Set(self.user_id),
            created_at: Set(self.created_at),
            ..Default::default()
        }
    }

    fn from_model(model: comment::Model) -> (i32, Self) {
        (
            model.id,
            Self {
                content: model.content,
                post_id: model.post_id,
                user_id: model.user_id,
                created_at: model.created_at,
            },
        )
    }
}

impl Repository<Comment> {
    pub async fn create(
        &self,
        content: &str,
        post_id: i32,
        user_id: i32,
        created_at: Option<DateTime<Utc>>,
    ) -> Result<i32, StoreError> {
        let comment = Comment {
            content: content.to_string(),
            post_id,
            user_id,
            created_at: created_at.unwrap_or_else(Utc::now),
        };
        self.insert(&comment).await
    }

    /// Reading order: oldest first.
    pub async fn find_by_post(&self, post_id: i32) -> Result<Vec<Record<Comment>>, StoreError> {
        self.fetch_all(
            comment::Entity::find()
                .filter(comment::Column::PostId.eq(post_id))
                .order_by_asc(comment::Column::CreatedAt)
                .order_by_asc(comment::Column::Id),
        )
        .await
    }

    /// Newest first.
    pub async fn find_by_author(&self, user_id: i32) -> Result<Vec<Record<Comment>>, StoreError> {
        self.fetch_all(
            comment::Entity::find()
                .filter(comment::Column::UserId.eq(user_id))
                .order_by_desc(comment::Column::CreatedAt)
                .order_by_desc(comment::Column::Id),
        )
        .await
    }
}
