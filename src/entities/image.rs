use sea_orm::entity::prelude::*;

/// Which table `owner_id` points into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::None)")]
pub enum OwnerKind {
    #[sea_orm(string_value = "artist")]
    Artist,
    #[sea_orm(string_value = "album")]
    Album,
}

#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "images")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub owner_kind: OwnerKind,
    pub owner_id: i64,
    pub url: String,
    /// Pixels
    pub width: i32,
    /// Pixels
    pub height: i32,
}

impl ActiveModelBehavior for ActiveModel {}
