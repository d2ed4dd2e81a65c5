//! Tag repository.

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter,
    QueryOrder, Set,
};
use uuid::Uuid;

use crate::entities::tags;

/// Error types for tag operations.
#[derive(Debug, thiserror::Error)]
pub enum TagError {
    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

/// Input for creating a tag.
#[derive(Debug, Clone)]
pub struct CreateTagInput {
    /// Owning user.
    pub user_id: Uuid,
    /// Display name.
    pub name: String,
    /// Display color (free-form, e.g. "#4caf50").
    pub color: String,
}

/// Tag repository for CRUD operations.
#[derive(Debug, Clone)]
pub struct TagRepository {
    db: DatabaseConnection,
}

impl TagRepository {
    /// Creates a new tag repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Creates a tag.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub async fn create(&self, input: CreateTagInput) -> Result<tags::Model, TagError> {
        let tag = tags::ActiveModel {
            id: Set(Uuid::now_v7()),
            user_id: Set(input.user_id),
            name: Set(input.name),
            color: Set(input.color),
            created_at: Set(Utc::now().into()),
        };

        let result = tag.insert(&self.db).await?;
        Ok(result)
    }

    /// Lists the user's tags.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub async fn find_for_user(&self, user_id: Uuid) -> Result<Vec<tags::Model>, TagError> {
        let rows = tags::Entity::find()
            .filter(tags::Column::UserId.eq(user_id))
            .order_by_asc(tags::Column::Name)
            .all(&self.db)
            .await?;

        Ok(rows)
    }
}
