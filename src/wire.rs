//! Messages exchanged with callers of the artist service.
//!
//! These are transient, caller-owned copies; the store never keeps them.
//! Field names follow the service's protobuf definitions (camelCase on the
//! JSON shim).

use serde::{Deserialize, Serialize};

/// An instant as seconds plus nanoseconds since the Unix epoch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Timestamp {
    pub seconds: i64,
    #[serde(default)]
    pub nanos: i32,
}

/// Identifiers the artist or album carries in other services.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Externals {
    #[serde(default)]
    pub spotify: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Image {
    pub url: String,
    pub width: i32,
    pub height: i32,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Album {
    pub name: String,
    #[serde(default)]
    pub album_type: String,
    #[serde(default)]
    pub release_date: Option<Timestamp>,
    #[serde(default)]
    pub images: Vec<Image>,
    /// Carries the album's Spotify id when it has one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub externals: Option<Externals>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Artist {
    /// Decimal form of the store's numeric key.
    #[serde(default)]
    pub id: String,
    /// Empty on an update that keeps the stored name.
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub images: Vec<Image>,
    /// `None` on listings, which leave the field out entirely.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub albums: Option<Vec<Album>>,
    #[serde(default)]
    pub externals: Option<Externals>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_updated: Option<Timestamp>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArtistFilter {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub last_updated: Option<Timestamp>,
    /// Only meaningful when `last_updated` is present.
    #[serde(default)]
    pub last_updated_gt: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Id {
    pub id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Artists {
    pub artists: Vec<Artist>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ListArtistsRequest {
    #[serde(default)]
    pub limit: Option<u64>,
    #[serde(default)]
    pub offset: Option<u64>,
}
