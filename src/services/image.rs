//! Storage for polymorphically owned images.
//!
//! An image row points at its owner through `(owner_kind, owner_id)`; there
//! is no foreign key, so creation and cascade deletion go through here and
//! always run on the caller's transaction.

use std::collections::HashMap;

use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DbErr, EntityTrait, QueryFilter, QueryOrder,
    Set,
};

use crate::entities;
use crate::entities::image::OwnerKind;

/// Image metadata on its way into the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewImage {
    pub url: String,
    pub width: i32,
    pub height: i32,
}

/// Inserts `images` for one owner, keeping their order.
pub async fn insert_images<C: ConnectionTrait>(
    db: &C,
    owner_kind: OwnerKind,
    owner_id: i64,
    images: &[NewImage],
) -> Result<Vec<entities::image::Model>, DbErr> {
    let mut inserted = Vec::with_capacity(images.len());
    for image in images {
        let model = entities::image::ActiveModel {
            owner_kind: Set(owner_kind),
            owner_id: Set(owner_id),
            url: Set(image.url.clone()),
            width: Set(image.width),
            height: Set(image.height),
            ..Default::default()
        };
        inserted.push(model.insert(db).await?);
    }
    Ok(inserted)
}

pub async fn images_for_owner<C: ConnectionTrait>(
    db: &C,
    owner_kind: OwnerKind,
    owner_id: i64,
) -> Result<Vec<entities::image::Model>, DbErr> {
    entities::image::Entity::find()
        .filter(entities::image::Column::OwnerKind.eq(owner_kind))
        .filter(entities::image::Column::OwnerId.eq(owner_id))
        .order_by_asc(entities::image::Column::Id)
        .all(db)
        .await
}

/// Loads the images of many owners of the same kind in one query, grouped by owner id.
pub async fn images_for_owners<C: ConnectionTrait>(
    db: &C,
    owner_kind: OwnerKind,
    owner_ids: &[i64],
) -> Result<HashMap<i64, Vec<entities::image::Model>>, DbErr> {
    let mut grouped: HashMap<i64, Vec<entities::image::Model>> = HashMap::new();
    if owner_ids.is_empty() {
        return Ok(grouped);
    }

    let images = entities::image::Entity::find()
        .filter(entities::image::Column::OwnerKind.eq(owner_kind))
        .filter(entities::image::Column::OwnerId.is_in(owner_ids.iter().copied()))
        .order_by_asc(entities::image::Column::Id)
        .all(db)
        .await?;

    for image in images {
        grouped.entry(image.owner_id).or_default().push(image);
    }
    Ok(grouped)
}

/// Removes every image of one owner. Returns the number of rows deleted.
pub async fn delete_images_for_owner<C: ConnectionTrait>(
    db: &C,
    owner_kind: OwnerKind,
    owner_id: i64,
) -> Result<u64, DbErr> {
    let result = entities::image::Entity::delete_many()
        .filter(entities::image::Column::OwnerKind.eq(owner_kind))
        .filter(entities::image::Column::OwnerId.eq(owner_id))
        .exec(db)
        .await?;
    Ok(result.rows_affected)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::test_db;

    fn image(url: &str) -> NewImage {
        NewImage {
            url: url.into(),
            width: 640,
            height: 480,
        }
    }

    #[tokio::test]
    async fn test_images_are_scoped_by_owner_kind() {
        let db = test_db().await;
        insert_images(&db.conn, OwnerKind::Artist, 1, &[image("artist-1")])
            .await
            .unwrap();
        insert_images(&db.conn, OwnerKind::Album, 1, &[image("album-1")])
            .await
            .unwrap();

        let artist_images = images_for_owner(&db.conn, OwnerKind::Artist, 1)
            .await
            .unwrap();
        let album_images = images_for_owner(&db.conn, OwnerKind::Album, 1)
            .await
            .unwrap();

        assert_eq!(artist_images.len(), 1);
        assert_eq!(artist_images[0].url, "artist-1");
        assert_eq!(album_images.len(), 1);
        assert_eq!(album_images[0].url, "album-1");
    }

    #[tokio::test]
    async fn test_images_for_owners_groups_in_insert_order() {
        let db = test_db().await;
        insert_images(&db.conn, OwnerKind::Album, 1, &[image("a"), image("b")])
            .await
            .unwrap();
        insert_images(&db.conn, OwnerKind::Album, 2, &[image("c")])
            .await
            .unwrap();

        let grouped = images_for_owners(&db.conn, OwnerKind::Album, &[1, 2, 3])
            .await
            .unwrap();

        let urls: Vec<&str> = grouped[&1].iter().map(|i| i.url.as_str()).collect();
        assert_eq!(urls, vec!["a", "b"]);
        assert_eq!(grouped[&2].len(), 1);
        assert!(!grouped.contains_key(&3));
    }

    #[tokio::test]
    async fn test_delete_images_for_owner() {
        let db = test_db().await;
        insert_images(&db.conn, OwnerKind::Album, 5, &[image("a"), image("b")])
            .await
            .unwrap();
        insert_images(&db.conn, OwnerKind::Artist, 5, &[image("keep")])
            .await
            .unwrap();

        let deleted = delete_images_for_owner(&db.conn, OwnerKind::Album, 5)
            .await
            .unwrap();

        assert_eq!(deleted, 2);
        let remaining = entities::image::Entity::find().all(&db.conn).await.unwrap();
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].url, "keep");
    }
}
