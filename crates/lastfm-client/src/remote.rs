use async_trait::async_trait;

use crate::{
    types::{Artist, Tag, Track, User},
    ClientError, LastFmClient,
};

/// The four lookups a suggestion run fans out to.
///
/// Each call is independent and read-only; implementations must be safe to
/// call concurrently from the same aggregation run.
#[async_trait]
pub trait RemoteSearchClient: Send + Sync {
    async fn search_artists(&self, text: &str) -> Result<Vec<Artist>, ClientError>;

    async fn search_tracks(&self, text: &str) -> Result<Vec<Track>, ClientError>;

    async fn search_tags(&self, text: &str) -> Result<Vec<Tag>, ClientError>;

    /// `Ok(None)` when the service has no profile under `username`.
    async fn get_user_profile(
        &self,
        username: &str,
        session_key: Option<&str>,
    ) -> Result<Option<User>, ClientError>;
}

#[async_trait]
impl RemoteSearchClient for LastFmClient {
    async fn search_artists(&self, text: &str) -> Result<Vec<Artist>, ClientError> {
        LastFmClient::search_artists(self, text).await
    }

    async fn search_tracks(&self, text: &str) -> Result<Vec<Track>, ClientError> {
        LastFmClient::search_tracks(self, text).await
    }

    async fn search_tags(&self, text: &str) -> Result<Vec<Tag>, ClientError> {
        LastFmClient::search_tags(self, text).await
    }

    async fn get_user_profile(
        &self,
        username: &str,
        session_key: Option<&str>,
    ) -> Result<Option<User>, ClientError> {
        LastFmClient::get_user_profile(self, username, session_key).await
    }
}
