use std::sync::Arc;

use sea_orm::{
    ActiveModelBehavior, ActiveModelTrait, ColumnTrait, ConnectionTrait, DbErr, EntityTrait,
    QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};

use crate::database::Database;
use crate::entities;
use crate::entities::image::OwnerKind;
use crate::error::{CatalogError, CatalogResult, DbResultExt, is_unique_violation};
use crate::services::album::{self, AlbumGraph, NewAlbum};
use crate::services::artist_filter::ArtistQuery;
use crate::services::image::{self, NewImage};

/// An artist with its images and every linked album.
#[derive(Debug, Clone, PartialEq)]
pub struct ArtistGraph {
    pub artist: entities::artist::Model,
    pub images: Vec<entities::image::Model>,
    pub albums: Vec<AlbumGraph>,
}

/// What listings return: albums are never loaded.
#[derive(Debug, Clone, PartialEq)]
pub struct ArtistSummary {
    pub artist: entities::artist::Model,
    pub images: Vec<entities::image::Model>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewArtist {
    pub name: String,
    pub spotify_id: String,
    pub images: Vec<NewImage>,
    pub albums: Vec<NewAlbum>,
}

/// Partial update. `None` leaves the field alone; albums are only ever added.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ArtistUpdate {
    pub name: Option<String>,
    /// Replaces every image the artist owns
    pub images: Option<Vec<NewImage>>,
    pub albums: Vec<NewAlbum>,
}

pub struct ArtistService {
    db: Arc<Database>,
}

impl ArtistService {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    /// Persists the artist with its images, albums and album images as one
    /// unit. Albums whose Spotify id is already stored are linked rather
    /// than created again.
    ///
    /// Fails with `AlreadyExists` when the Spotify id is taken, including
    /// when a concurrent caller wins the race on the unique constraint.
    pub async fn create_artist(&self, new_artist: NewArtist) -> CatalogResult<ArtistGraph> {
        log::debug!(
            "Creating artist '{}' (spotify ID: {})",
            new_artist.name,
            new_artist.spotify_id
        );

        match self.insert_artist(&new_artist).await {
            Ok(graph) => {
                log::info!(
                    "Artist created: '{}' (ID: {})",
                    graph.artist.name,
                    graph.artist.id
                );
                Ok(graph)
            }
            Err(e) if is_unique_violation(&e) => {
                log::debug!(
                    "Lost create race for spotify ID {}, resolving existing artist",
                    new_artist.spotify_id
                );
                let existing = self
                    .find_by_spotify_id(&new_artist.spotify_id)
                    .await?
                    .ok_or_else(|| CatalogError::internal("create artist", &new_artist.spotify_id, e))?;
                Err(CatalogError::AlreadyExists {
                    id: existing.id,
                    spotify_id: new_artist.spotify_id,
                })
            }
            Err(e) => Err(CatalogError::internal(
                "create artist",
                &new_artist.spotify_id,
                e,
            )),
        }
    }

    /// Looks the Spotify id up first and only creates when it is free.
    /// Returns the new id, or `AlreadyExists` carrying the stored one.
    pub async fn create_artist_if_absent(&self, new_artist: NewArtist) -> CatalogResult<i64> {
        if let Some(existing) = self.find_by_spotify_id(&new_artist.spotify_id).await? {
            return Err(CatalogError::AlreadyExists {
                id: existing.id,
                spotify_id: new_artist.spotify_id,
            });
        }

        let graph = self.create_artist(new_artist).await?;
        Ok(graph.artist.id)
    }

    pub async fn get_artist_by_id(&self, id: i64) -> CatalogResult<ArtistGraph> {
        let artist = entities::artist::Entity::find_by_id(id)
            .one(&self.db.conn)
            .await
            .or_internal("fetch artist", id)?
            .ok_or_else(|| CatalogError::not_found("artist", id))?;

        load_artist_graph(&self.db.conn, artist)
            .await
            .or_internal("fetch artist relations", id)
    }

    pub async fn get_artist_by_spotify_id(&self, spotify_id: &str) -> CatalogResult<ArtistGraph> {
        let artist = self
            .find_by_spotify_id(spotify_id)
            .await?
            .ok_or_else(|| CatalogError::not_found("artist with spotify ID", spotify_id))?;

        load_artist_graph(&self.db.conn, artist)
            .await
            .or_internal("fetch artist relations", spotify_id)
    }

    /// One page of artists in id order, with images but without albums.
    ///
    /// Both bounds are bound as signed integers, so values past `i64::MAX`
    /// are rejected.
    pub async fn list_artists(&self, limit: u64, offset: u64) -> CatalogResult<Vec<ArtistSummary>> {
        if i64::try_from(limit).is_err() || i64::try_from(offset).is_err() {
            return Err(CatalogError::InvalidArgument(format!(
                "page out of range: limit={limit} offset={offset}"
            )));
        }

        let artists = entities::artist::Entity::find()
            .order_by_asc(entities::artist::Column::Id)
            .limit(limit)
            .offset(offset)
            .all(&self.db.conn)
            .await
            .or_internal("list artists", format!("limit={limit} offset={offset}"))?;

        summarize(&self.db.conn, artists)
            .await
            .or_internal("fetch artist images", "list")
    }

    pub async fn filter_artists(&self, query: &ArtistQuery) -> CatalogResult<Vec<ArtistSummary>> {
        log::debug!("Filtering artists: {:?}", query);
        let artists = query
            .to_select()
            .all(&self.db.conn)
            .await
            .or_internal("filter artists", format!("{query:?}"))?;

        summarize(&self.db.conn, artists)
            .await
            .or_internal("fetch artist images", "filter")
    }

    /// Links an existing album to an existing artist. Linking the same album
    /// again leaves a single association.
    pub async fn add_album_to_artist(
        &self,
        artist_id: i64,
        album_id: i64,
    ) -> CatalogResult<ArtistGraph> {
        let txn = self
            .db
            .conn
            .begin()
            .await
            .or_internal("begin transaction", artist_id)?;

        let artist = entities::artist::Entity::find_by_id(artist_id)
            .one(&txn)
            .await
            .or_internal("fetch artist", artist_id)?
            .ok_or_else(|| CatalogError::not_found("artist", artist_id))?;
        entities::album::Entity::find_by_id(album_id)
            .one(&txn)
            .await
            .or_internal("fetch album", album_id)?
            .ok_or_else(|| CatalogError::not_found("album", album_id))?;

        let linked = link_album(&txn, artist.id, album_id)
            .await
            .or_internal("link album", format!("{artist_id}/{album_id}"))?;

        let artist = if linked {
            touch(&txn, artist)
                .await
                .or_internal("touch artist", artist_id)?
        } else {
            log::debug!("Album {} already linked to artist {}", album_id, artist_id);
            artist
        };

        let graph = load_artist_graph(&txn, artist)
            .await
            .or_internal("fetch artist relations", artist_id)?;
        txn.commit()
            .await
            .or_internal("commit album link", artist_id)?;

        Ok(graph)
    }

    /// Applies a partial update in one transaction. The Spotify id is the
    /// artist's identity and never changes here.
    pub async fn update_artist(&self, id: i64, update: ArtistUpdate) -> CatalogResult<ArtistGraph> {
        let txn = self
            .db
            .conn
            .begin()
            .await
            .or_internal("begin transaction", id)?;

        let artist = entities::artist::Entity::find_by_id(id)
            .one(&txn)
            .await
            .or_internal("fetch artist", id)?
            .ok_or_else(|| CatalogError::not_found("artist", id))?;

        let mut active_artist: entities::artist::ActiveModel = artist.into();
        if let Some(name) = update.name {
            active_artist.name = Set(name);
        }
        let artist = active_artist
            .update(&txn)
            .await
            .or_internal("update artist", id)?;

        if let Some(images) = &update.images {
            image::delete_images_for_owner(&txn, OwnerKind::Artist, id)
                .await
                .or_internal("delete artist images", id)?;
            image::insert_images(&txn, OwnerKind::Artist, id, images)
                .await
                .or_internal("insert artist images", id)?;
        }

        for new_album in &update.albums {
            let album = album::find_or_insert_album(&txn, new_album)
                .await
                .or_internal("store album", &new_album.name)?;
            link_album(&txn, id, album.id)
                .await
                .or_internal("link album", format!("{id}/{}", album.id))?;
        }

        let graph = load_artist_graph(&txn, artist)
            .await
            .or_internal("fetch artist relations", id)?;
        txn.commit().await.or_internal("commit artist update", id)?;

        log::info!("Artist updated: '{}' (ID: {})", graph.artist.name, id);
        Ok(graph)
    }

    async fn find_by_spotify_id(
        &self,
        spotify_id: &str,
    ) -> CatalogResult<Option<entities::artist::Model>> {
        entities::artist::Entity::find()
            .filter(entities::artist::Column::SpotifyId.eq(spotify_id))
            .one(&self.db.conn)
            .await
            .or_internal("fetch artist by spotify ID", spotify_id)
    }

    async fn insert_artist(&self, new_artist: &NewArtist) -> Result<ArtistGraph, DbErr> {
        let txn = self.db.conn.begin().await?;

        let artist = entities::artist::ActiveModel {
            name: Set(new_artist.name.clone()),
            spotify_id: Set(new_artist.spotify_id.clone()),
            ..entities::artist::ActiveModel::new()
        }
        .insert(&txn)
        .await?;

        image::insert_images(&txn, OwnerKind::Artist, artist.id, &new_artist.images).await?;

        for new_album in &new_artist.albums {
            let album = album::find_or_insert_album(&txn, new_album).await?;
            link_album(&txn, artist.id, album.id).await?;
        }

        let graph = load_artist_graph(&txn, artist).await?;
        txn.commit().await?;

        Ok(graph)
    }
}

/// Inserts the association unless it is already there. Returns whether a
/// row was written.
async fn link_album<C: ConnectionTrait>(db: &C, artist_id: i64, album_id: i64) -> Result<bool, DbErr> {
    if entities::artist_album::Entity::find_by_id((artist_id, album_id))
        .one(db)
        .await?
        .is_some()
    {
        return Ok(false);
    }

    let link = entities::artist_album::ActiveModel {
        artist_id: Set(artist_id),
        album_id: Set(album_id),
    };
    entities::artist_album::Entity::insert(link).exec(db).await?;

    Ok(true)
}

/// Saves the artist unchanged so `before_save` advances `last_updated`.
pub(crate) async fn touch<C: ConnectionTrait>(
    db: &C,
    artist: entities::artist::Model,
) -> Result<entities::artist::Model, DbErr> {
    entities::artist::ActiveModel::from(artist).update(db).await
}

async fn load_artist_graph<C: ConnectionTrait>(
    db: &C,
    artist: entities::artist::Model,
) -> Result<ArtistGraph, DbErr> {
    let images = image::images_for_owner(db, OwnerKind::Artist, artist.id).await?;
    let albums = album::albums_for_artist(db, artist.id).await?;

    Ok(ArtistGraph {
        artist,
        images,
        albums,
    })
}

async fn summarize<C: ConnectionTrait>(
    db: &C,
    artists: Vec<entities::artist::Model>,
) -> Result<Vec<ArtistSummary>, DbErr> {
    let ids: Vec<i64> = artists.iter().map(|a| a.id).collect();
    let mut images = image::images_for_owners(db, OwnerKind::Artist, &ids).await?;

    Ok(artists
        .into_iter()
        .map(|artist| ArtistSummary {
            images: images.remove(&artist.id).unwrap_or_default(),
            artist,
        })
        .collect())
}
