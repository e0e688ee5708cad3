//! Conversions between stored catalog records and wire messages.
//!
//! Stored rows never leave the services directly: everything sent to a
//! caller is a fresh copy built here.

use chrono::{DateTime, Utc};

use crate::entities;
use crate::error::{CatalogError, CatalogResult};
use crate::services::album::{AlbumGraph, NewAlbum};
use crate::services::artist::{ArtistGraph, ArtistSummary, ArtistUpdate, NewArtist};
use crate::services::artist_filter::{ArtistQuery, LastUpdatedBound};
use crate::services::image::NewImage;
use crate::wire;

const MICROS_PER_SECOND: i64 = 1_000_000;
const NANOS_PER_MICRO: i64 = 1_000;

/// Largest page GetArtists hands out; bigger limits are clamped.
pub const MAX_PAGE_SIZE: u64 = 1_000;

impl From<entities::image::Model> for wire::Image {
    fn from(image: entities::image::Model) -> Self {
        Self {
            url: image.url,
            width: image.width,
            height: image.height,
        }
    }
}

impl From<wire::Image> for NewImage {
    fn from(image: wire::Image) -> Self {
        Self {
            url: image.url,
            width: image.width,
            height: image.height,
        }
    }
}

/// Release dates travel with whole-second precision.
fn release_date_to_wire(date: DateTime<Utc>) -> wire::Timestamp {
    wire::Timestamp {
        seconds: date.timestamp(),
        nanos: 0,
    }
}

fn micros_to_wire(micros: i64) -> wire::Timestamp {
    wire::Timestamp {
        seconds: micros.div_euclid(MICROS_PER_SECOND),
        nanos: (micros.rem_euclid(MICROS_PER_SECOND) * NANOS_PER_MICRO) as i32,
    }
}

fn check_nanos(timestamp: &wire::Timestamp) -> CatalogResult<()> {
    if !(0..1_000_000_000).contains(&timestamp.nanos) {
        return Err(CatalogError::InvalidArgument(format!(
            "timestamp nanos out of range: {}",
            timestamp.nanos
        )));
    }
    Ok(())
}

fn release_date_from_wire(timestamp: Option<wire::Timestamp>) -> CatalogResult<DateTime<Utc>> {
    let Some(timestamp) = timestamp else {
        return Ok(DateTime::UNIX_EPOCH);
    };
    check_nanos(&timestamp)?;

    DateTime::from_timestamp(timestamp.seconds, timestamp.nanos as u32).ok_or_else(|| {
        CatalogError::InvalidArgument(format!(
            "release date out of range: {}s",
            timestamp.seconds
        ))
    })
}

/// Converts a filter instant to microseconds, rounding toward the side the
/// bound excludes so sub-microsecond input never widens the match.
fn bound_from_wire(timestamp: wire::Timestamp, after: bool) -> CatalogResult<LastUpdatedBound> {
    check_nanos(&timestamp)?;

    let nanos = i64::from(timestamp.nanos);
    let mut micros = nanos / NANOS_PER_MICRO;
    if !after && nanos % NANOS_PER_MICRO != 0 {
        micros += 1;
    }
    let instant = timestamp
        .seconds
        .checked_mul(MICROS_PER_SECOND)
        .and_then(|base| base.checked_add(micros))
        .ok_or_else(|| {
            CatalogError::InvalidArgument(format!(
                "lastUpdated out of range: {}s",
                timestamp.seconds
            ))
        })?;

    Ok(if after {
        LastUpdatedBound::After(instant)
    } else {
        LastUpdatedBound::Before(instant)
    })
}

fn non_empty(value: String) -> Option<String> {
    if value.is_empty() { None } else { Some(value) }
}

fn spotify_id(externals: Option<wire::Externals>) -> Option<String> {
    externals.and_then(|externals| non_empty(externals.spotify))
}

impl From<AlbumGraph> for wire::Album {
    fn from(graph: AlbumGraph) -> Self {
        Self {
            name: graph.album.name,
            album_type: graph.album.album_type,
            release_date: Some(release_date_to_wire(graph.album.release_date)),
            images: graph.images.into_iter().map(Into::into).collect(),
            externals: graph
                .album
                .spotify_id
                .map(|spotify| wire::Externals { spotify }),
        }
    }
}

fn artist_to_wire(
    artist: entities::artist::Model,
    images: Vec<entities::image::Model>,
    albums: Option<Vec<AlbumGraph>>,
) -> wire::Artist {
    wire::Artist {
        id: artist.id.to_string(),
        name: artist.name,
        images: images.into_iter().map(Into::into).collect(),
        albums: albums.map(|albums| albums.into_iter().map(Into::into).collect()),
        externals: Some(wire::Externals {
            spotify: artist.spotify_id,
        }),
        last_updated: Some(micros_to_wire(artist.last_updated)),
    }
}

impl From<ArtistGraph> for wire::Artist {
    fn from(graph: ArtistGraph) -> Self {
        artist_to_wire(graph.artist, graph.images, Some(graph.albums))
    }
}

/// Listings leave `albums` out rather than sending an empty list.
impl From<ArtistSummary> for wire::Artist {
    fn from(summary: ArtistSummary) -> Self {
        artist_to_wire(summary.artist, summary.images, None)
    }
}

impl TryFrom<wire::Album> for NewAlbum {
    type Error = CatalogError;

    fn try_from(album: wire::Album) -> CatalogResult<Self> {
        Ok(Self {
            release_date: release_date_from_wire(album.release_date)?,
            name: album.name,
            album_type: album.album_type,
            spotify_id: spotify_id(album.externals),
            images: album.images.into_iter().map(Into::into).collect(),
        })
    }
}

fn albums_from_wire(albums: Option<Vec<wire::Album>>) -> CatalogResult<Vec<NewAlbum>> {
    albums
        .unwrap_or_default()
        .into_iter()
        .map(NewAlbum::try_from)
        .collect()
}

impl TryFrom<wire::Artist> for NewArtist {
    type Error = CatalogError;

    fn try_from(artist: wire::Artist) -> CatalogResult<Self> {
        let spotify_id = spotify_id(artist.externals).ok_or_else(|| {
            CatalogError::InvalidArgument("artist externals.spotify is required".to_string())
        })?;

        Ok(Self {
            name: artist.name,
            spotify_id,
            images: artist.images.into_iter().map(Into::into).collect(),
            albums: albums_from_wire(artist.albums)?,
        })
    }
}

impl TryFrom<wire::ArtistFilter> for ArtistQuery {
    type Error = CatalogError;

    fn try_from(filter: wire::ArtistFilter) -> CatalogResult<Self> {
        let last_updated = filter
            .last_updated
            .map(|instant| bound_from_wire(instant, filter.last_updated_gt))
            .transpose()?;

        Ok(Self {
            name_contains: filter.name.and_then(non_empty),
            last_updated,
        })
    }
}

/// Resolves a ListArtistsRequest into `(limit, offset)`. A missing limit
/// takes `default_limit`; every limit is clamped to `MAX_PAGE_SIZE`.
pub fn page_from_wire(
    request: &wire::ListArtistsRequest,
    default_limit: u64,
) -> CatalogResult<(u64, u64)> {
    let limit = request.limit.unwrap_or(default_limit);
    let offset = request.offset.unwrap_or_default();
    if i64::try_from(offset).is_err() {
        return Err(CatalogError::InvalidArgument(format!(
            "offset out of range: {offset}"
        )));
    }
    if i64::try_from(limit).is_err() {
        return Err(CatalogError::InvalidArgument(format!(
            "limit out of range: {limit}"
        )));
    }

    Ok((limit.min(MAX_PAGE_SIZE), offset))
}

/// Artist ids are decimal strings on the wire. Anything else can't name a
/// stored artist.
pub fn parse_artist_id(id: &str) -> CatalogResult<i64> {
    id.parse::<i64>()
        .map_err(|_| CatalogError::not_found("artist", id))
}

/// Reads an UpdateArtist request. Empty name and empty image list mean
/// "leave unchanged".
pub fn artist_update_from_wire(artist: wire::Artist) -> CatalogResult<(i64, ArtistUpdate)> {
    let id = parse_artist_id(&artist.id)?;
    let images = if artist.images.is_empty() {
        None
    } else {
        Some(artist.images.into_iter().map(Into::into).collect())
    };

    Ok((
        id,
        ArtistUpdate {
            name: non_empty(artist.name),
            images,
            albums: albums_from_wire(artist.albums)?,
        },
    ))
}
