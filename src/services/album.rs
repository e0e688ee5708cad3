use std::sync::Arc;

use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DbErr, EntityTrait, QueryFilter, QueryOrder,
    Set, TransactionTrait,
};

use crate::database::Database;
use crate::entities;
use crate::entities::image::OwnerKind;
use crate::error::{CatalogError, CatalogResult, DbResultExt};
use crate::services::artist;
use crate::services::image::{self, NewImage};

/// An album together with the images it owns.
#[derive(Debug, Clone, PartialEq)]
pub struct AlbumGraph {
    pub album: entities::album::Model,
    pub images: Vec<entities::image::Model>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewAlbum {
    pub name: String,
    pub album_type: String,
    pub spotify_id: Option<String>,
    pub release_date: DateTime<Utc>,
    pub images: Vec<NewImage>,
}

pub struct AlbumService {
    db: Arc<Database>,
}

impl AlbumService {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    /// Creates the album and its images atomically. No duplicate check is
    /// made; callers look the Spotify id up first.
    pub async fn create_album(&self, new_album: NewAlbum) -> CatalogResult<AlbumGraph> {
        let txn = self
            .db
            .conn
            .begin()
            .await
            .or_internal("begin transaction", &new_album.name)?;

        let graph = insert_album(&txn, &new_album)
            .await
            .or_internal("create album", &new_album.name)?;

        txn.commit()
            .await
            .or_internal("commit album", &new_album.name)?;

        log::info!("Album created: '{}' (ID: {})", graph.album.name, graph.album.id);
        Ok(graph)
    }

    pub async fn get_album_by_id(&self, id: i64) -> CatalogResult<AlbumGraph> {
        let album = entities::album::Entity::find_by_id(id)
            .one(&self.db.conn)
            .await
            .or_internal("fetch album", id)?
            .ok_or_else(|| CatalogError::not_found("album", id))?;

        load_album_images(&self.db.conn, album)
            .await
            .or_internal("fetch album images", id)
    }

    pub async fn get_album_by_spotify_id(&self, spotify_id: &str) -> CatalogResult<AlbumGraph> {
        let album = find_album_by_spotify_id(&self.db.conn, spotify_id)
            .await
            .or_internal("fetch album by spotify ID", spotify_id)?
            .ok_or_else(|| CatalogError::not_found("album with spotify ID", spotify_id))?;

        load_album_images(&self.db.conn, album)
            .await
            .or_internal("fetch album images", spotify_id)
    }

    /// Deletes the album along with its images and artist links. Every
    /// artist that lost the album gets its `last_updated` advanced.
    pub async fn delete_album(&self, id: i64) -> CatalogResult<()> {
        let txn = self
            .db
            .conn
            .begin()
            .await
            .or_internal("begin transaction", id)?;

        let album = entities::album::Entity::find_by_id(id)
            .one(&txn)
            .await
            .or_internal("fetch album", id)?
            .ok_or_else(|| CatalogError::not_found("album", id))?;

        let artist_ids: Vec<i64> = entities::artist_album::Entity::find()
            .filter(entities::artist_album::Column::AlbumId.eq(album.id))
            .all(&txn)
            .await
            .or_internal("fetch album links", id)?
            .into_iter()
            .map(|link| link.artist_id)
            .collect();

        image::delete_images_for_owner(&txn, OwnerKind::Album, album.id)
            .await
            .or_internal("delete album images", id)?;
        entities::artist_album::Entity::delete_many()
            .filter(entities::artist_album::Column::AlbumId.eq(album.id))
            .exec(&txn)
            .await
            .or_internal("unlink album", id)?;

        if !artist_ids.is_empty() {
            let artists = entities::artist::Entity::find()
                .filter(entities::artist::Column::Id.is_in(artist_ids))
                .all(&txn)
                .await
                .or_internal("fetch linked artists", id)?;
            for linked in artists {
                let artist_id = linked.id;
                artist::touch(&txn, linked)
                    .await
                    .or_internal("touch artist", artist_id)?;
            }
        }

        entities::album::Entity::delete_by_id(album.id)
            .exec(&txn)
            .await
            .or_internal("delete album", id)?;

        txn.commit().await.or_internal("commit album delete", id)?;

        log::info!("Album deleted: '{}' (ID: {})", album.name, id);
        Ok(())
    }
}

pub(crate) async fn insert_album<C: ConnectionTrait>(
    db: &C,
    new_album: &NewAlbum,
) -> Result<AlbumGraph, DbErr> {
    let album = entities::album::ActiveModel {
        name: Set(new_album.name.clone()),
        album_type: Set(new_album.album_type.clone()),
        spotify_id: Set(new_album.spotify_id.clone()),
        release_date: Set(new_album.release_date),
        ..Default::default()
    }
    .insert(db)
    .await?;

    let images = image::insert_images(db, OwnerKind::Album, album.id, &new_album.images).await?;

    Ok(AlbumGraph { album, images })
}

/// Returns the stored album with the same Spotify id, or inserts a new one.
pub(crate) async fn find_or_insert_album<C: ConnectionTrait>(
    db: &C,
    new_album: &NewAlbum,
) -> Result<entities::album::Model, DbErr> {
    if let Some(spotify_id) = new_album.spotify_id.as_deref()
        && let Some(existing) = find_album_by_spotify_id(db, spotify_id).await?
    {
        log::debug!(
            "Reusing album '{}' (ID: {}) for spotify ID {}",
            existing.name,
            existing.id,
            spotify_id
        );
        return Ok(existing);
    }

    Ok(insert_album(db, new_album).await?.album)
}

async fn find_album_by_spotify_id<C: ConnectionTrait>(
    db: &C,
    spotify_id: &str,
) -> Result<Option<entities::album::Model>, DbErr> {
    entities::album::Entity::find()
        .filter(entities::album::Column::SpotifyId.eq(spotify_id))
        .order_by_asc(entities::album::Column::Id)
        .one(db)
        .await
}

async fn load_album_images<C: ConnectionTrait>(
    db: &C,
    album: entities::album::Model,
) -> Result<AlbumGraph, DbErr> {
    let images = image::images_for_owner(db, OwnerKind::Album, album.id).await?;
    Ok(AlbumGraph { album, images })
}

/// Albums linked to an artist, with their images, in album id order. An
/// album reused by Spotify id keeps its original position in that order,
/// wherever it appeared in the request that linked it.
pub(crate) async fn albums_for_artist<C: ConnectionTrait>(
    db: &C,
    artist_id: i64,
) -> Result<Vec<AlbumGraph>, DbErr> {
    let album_ids: Vec<i64> = entities::artist_album::Entity::find()
        .filter(entities::artist_album::Column::ArtistId.eq(artist_id))
        .all(db)
        .await?
        .into_iter()
        .map(|link| link.album_id)
        .collect();

    if album_ids.is_empty() {
        return Ok(Vec::new());
    }

    let albums = entities::album::Entity::find()
        .filter(entities::album::Column::Id.is_in(album_ids.clone()))
        .order_by_asc(entities::album::Column::Id)
        .all(db)
        .await?;

    let mut images = image::images_for_owners(db, OwnerKind::Album, &album_ids).await?;

    Ok(albums
        .into_iter()
        .map(|album| AlbumGraph {
            images: images.remove(&album.id).unwrap_or_default(),
            album,
        })
        .collect())
}
