pub mod album;
pub mod artist;
pub mod artist_album;
pub mod image;
