use async_trait::async_trait;
use sea_orm::entity::prelude::*;
use sea_orm::{ActiveModelBehavior, ActiveValue, ActiveValue::Set};

#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "artists")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub name: String,
    #[sea_orm(unique)]
    pub spotify_id: String,
    /// Microseconds since the Unix epoch
    pub last_updated: i64,

    #[sea_orm(has_many, via = "artist_album")]
    pub albums: HasMany<super::album::Entity>,
}

/// Next `last_updated` value: the current time, but always past `previous`.
pub fn advance_last_updated(previous: i64) -> i64 {
    chrono::Utc::now().timestamp_micros().max(previous + 1)
}

#[async_trait]
impl ActiveModelBehavior for ActiveModel {
    fn new() -> Self {
        Self {
            last_updated: Set(chrono::Utc::now().timestamp_micros()),
            ..ActiveModelTrait::default()
        }
    }

    async fn before_save<C>(mut self, _db: &C, insert: bool) -> Result<Self, sea_orm::DbErr>
    where
        C: ConnectionTrait,
    {
        // Callers that set last_updated themselves keep their value
        if !insert && let ActiveValue::Unchanged(previous) = self.last_updated {
            self.last_updated = Set(advance_last_updated(previous));
        }
        Ok(self)
    }
}
