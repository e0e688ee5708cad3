pub mod album;
pub mod artist;
pub mod artist_filter;
pub mod image;
