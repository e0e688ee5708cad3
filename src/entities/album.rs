use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;

#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "albums")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub name: String,
    /// Spotify's album type (`album`, `single`, `compilation`), empty when unknown
    pub album_type: String,
    /// Not unique in the schema, callers look it up before creating
    pub spotify_id: Option<String>,
    pub release_date: DateTime<Utc>,

    #[sea_orm(has_many, via = "artist_album")]
    pub artists: HasMany<super::artist::Entity>,
}

impl ActiveModelBehavior for ActiveModel {}
