//! Notification delivery.
//!
//! The rule evaluator hands triggered alerts to a [`NotificationSink`]
//! after its atomic unit commits. The default sink stores rows in the
//! notifications table, suppressing identical messages to the same user
//! inside a short window.

use async_trait::async_trait;
use centi_core::notification::{default_dedup_window, within_dedup_window};
use chrono::{Duration, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter,
    QueryOrder, Set,
};
use uuid::Uuid;

use crate::entities::notifications;

/// Error types for notification delivery.
#[derive(Debug, thiserror::Error)]
pub enum NotifyError {
    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

/// Delivery target for triggered alerts.
///
/// Implementations must tolerate being called with a message that was
/// already delivered: the evaluator guarantees at-most-once triggering per
/// rule, not per message.
#[async_trait]
pub trait NotificationSink: Send + Sync {
    /// Delivers a message to a user.
    ///
    /// # Errors
    ///
    /// Returns an error if delivery fails; callers log and move on.
    async fn notify(&self, user_id: Uuid, message: &str) -> Result<(), NotifyError>;
}

/// Sink that stores notifications as table rows.
#[derive(Debug, Clone)]
pub struct DbNotificationSink {
    db: DatabaseConnection,
    window: Duration,
}

impl DbNotificationSink {
    /// Creates a sink with the default dedup window.
    #[must_use]
    pub fn new(db: DatabaseConnection) -> Self {
        Self {
            db,
            window: default_dedup_window(),
        }
    }

    /// Creates a sink with a custom dedup window.
    #[must_use]
    pub fn with_window(db: DatabaseConnection, minutes: i64) -> Self {
        Self {
            db,
            window: Duration::minutes(minutes),
        }
    }
}

#[async_trait]
impl NotificationSink for DbNotificationSink {
    async fn notify(&self, user_id: Uuid, message: &str) -> Result<(), NotifyError> {
        let now = Utc::now();

        let latest = notifications::Entity::find()
            .filter(notifications::Column::UserId.eq(user_id))
            .filter(notifications::Column::Message.eq(message))
            .filter(notifications::Column::DeletedAt.is_null())
            .order_by_desc(notifications::Column::CreatedAt)
            .one(&self.db)
            .await?;

        if let Some(previous) = latest {
            if within_dedup_window(previous.created_at.with_timezone(&Utc), now, self.window) {
                tracing::debug!(%user_id, "suppressing duplicate notification");
                return Ok(());
            }
        }

        let notification = notifications::ActiveModel {
            id: Set(Uuid::now_v7()),
            user_id: Set(user_id),
            message: Set(message.to_string()),
            is_read: Set(false),
            deleted_at: Set(None),
            created_at: Set(now.into()),
        };
        notification.insert(&self.db).await?;

        Ok(())
    }
}
