use std::sync::Arc;

use crate::database::Database;
use crate::services::artist::ArtistService;

pub struct AppState {
    pub artists: ArtistService,
    /// Used by GetArtists when the request carries no limit
    pub default_page_size: u64,
}

impl AppState {
    pub fn new(db: Arc<Database>, default_page_size: u64) -> Self {
        Self {
            artists: ArtistService::new(db),
            default_page_size,
        }
    }
}
