//! JSON handlers for the artist service methods, one per `/rpc/<Method>`.

use std::sync::Arc;

use axum::{Json, extract::State};

use crate::http_server::{error::ApiError, state::AppState};
use crate::mapping::{artist_update_from_wire, page_from_wire, parse_artist_id};
use crate::services::artist::NewArtist;
use crate::services::artist_filter::ArtistQuery;
use crate::wire;

type RpcResult<T> = Result<Json<T>, ApiError>;

pub async fn create_artist(
    State(app_state): State<Arc<AppState>>,
    Json(artist): Json<wire::Artist>,
) -> RpcResult<wire::Id> {
    let new_artist = NewArtist::try_from(artist)?;
    let id = app_state.artists.create_artist_if_absent(new_artist).await?;

    Ok(Json(wire::Id { id: id.to_string() }))
}

pub async fn get_artist(
    State(app_state): State<Arc<AppState>>,
    Json(request): Json<wire::Id>,
) -> RpcResult<wire::Artist> {
    let id = parse_artist_id(&request.id)?;
    let graph = app_state.artists.get_artist_by_id(id).await?;

    Ok(Json(graph.into()))
}

pub async fn get_artists(
    State(app_state): State<Arc<AppState>>,
    Json(request): Json<wire::ListArtistsRequest>,
) -> RpcResult<wire::Artists> {
    let (limit, offset) = page_from_wire(&request, app_state.default_page_size)?;
    let artists = app_state.artists.list_artists(limit, offset).await?;

    Ok(Json(wire::Artists {
        artists: artists.into_iter().map(Into::into).collect(),
    }))
}

pub async fn update_artist(
    State(app_state): State<Arc<AppState>>,
    Json(artist): Json<wire::Artist>,
) -> RpcResult<wire::Artist> {
    let (id, update) = artist_update_from_wire(artist)?;
    let graph = app_state.artists.update_artist(id, update).await?;

    Ok(Json(graph.into()))
}

pub async fn filter_artists(
    State(app_state): State<Arc<AppState>>,
    Json(filter): Json<wire::ArtistFilter>,
) -> RpcResult<wire::Artists> {
    let query = ArtistQuery::try_from(filter)?;
    let artists = app_state.artists.filter_artists(&query).await?;

    Ok(Json(wire::Artists {
        artists: artists.into_iter().map(Into::into).collect(),
    }))
}
