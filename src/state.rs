use crate::db::{DbPool, OrmConn};
use crate::render::HttpAssetFetcher;

#[derive(Clone)]
pub struct AppState {
    pub pool: DbPool,
    pub orm: OrmConn,
    /// Remote image fetcher for the PDF pipeline, bounded by the configured
    /// asset timeout.
    pub assets: HttpAssetFetcher,
    pub session_ttl_hours: i64,
}
