pub mod remote;
pub mod types;

pub use remote::RemoteSearchClient;

use std::time::Duration;

use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, instrument, warn};

use crate::types::{
    Artist, ArtistSearchEnvelope, Tag, TagSearchEnvelope, Track, TrackSearchEnvelope, User,
    UserInfoEnvelope,
};

pub const DEFAULT_BASE_URL: &str = "https://ws.audioscrobbler.com/2.0/";

/// Error code returned by `user.getinfo` for an unknown username.
const USER_NOT_FOUND: u32 = 6;

#[derive(Debug, Clone, Error)]
pub enum ClientError {
    #[error("HTTP request failed: {0}")]
    Http(String),
    #[error("unexpected status code: {0}")]
    Status(StatusCode),
    #[error("Last.fm error {code}: {message}")]
    Service { code: u32, message: String },
    #[error("failed to decode response: {0}")]
    Decode(String),
    #[error("no Last.fm API key configured")]
    MissingApiKey,
}

#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub api_key: String,
    pub base_url: String,
    pub timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: Duration::from_secs(15),
        }
    }
}

#[derive(Debug)]
pub struct LastFmClient {
    http: Client,
    config: ClientConfig,
}

impl LastFmClient {
    pub fn with_config(config: ClientConfig) -> Result<Self, ClientError> {
        let http = Client::builder()
            .user_agent(concat!("LastFmSuggest/", env!("CARGO_PKG_VERSION")))
            .timeout(config.timeout)
            .gzip(true)
            .build()
            .map_err(|err| ClientError::Http(err.to_string()))?;

        Ok(Self { http, config })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    #[instrument(name = "lastfm_client.search_artists", skip(self))]
    pub async fn search_artists(&self, text: &str) -> Result<Vec<Artist>, ClientError> {
        let envelope: ArtistSearchEnvelope =
            self.call("artist.search", &[("artist", text)]).await?;
        Ok(envelope
            .results
            .artistmatches
            .artist
            .into_iter()
            .map(Artist::from)
            .collect())
    }

    #[instrument(name = "lastfm_client.search_tracks", skip(self))]
    pub async fn search_tracks(&self, text: &str) -> Result<Vec<Track>, ClientError> {
        let envelope: TrackSearchEnvelope = self.call("track.search", &[("track", text)]).await?;
        Ok(envelope
            .results
            .trackmatches
            .track
            .into_iter()
            .map(Track::from)
            .collect())
    }

    #[instrument(name = "lastfm_client.search_tags", skip(self))]
    pub async fn search_tags(&self, text: &str) -> Result<Vec<Tag>, ClientError> {
        let envelope: TagSearchEnvelope = self.call("tag.search", &[("tag", text)]).await?;
        Ok(envelope
            .results
            .tagmatches
            .tag
            .into_iter()
            .map(Tag::from)
            .collect())
    }

    /// Looks up a profile by username. An unknown user is `Ok(None)`.
    #[instrument(name = "lastfm_client.get_user_profile", skip(self, session_key))]
    pub async fn get_user_profile(
        &self,
        username: &str,
        session_key: Option<&str>,
    ) -> Result<Option<User>, ClientError> {
        let mut params = vec![("user", username)];
        if let Some(key) = session_key.filter(|key| !key.is_empty()) {
            params.push(("sk", key));
        }

        match self.call::<UserInfoEnvelope>("user.getinfo", &params).await {
            Ok(envelope) => Ok(Some(User::from(envelope.user))),
            Err(ClientError::Service { code, .. }) if code == USER_NOT_FOUND => {
                debug!(username, "user profile not found");
                Ok(None)
            }
            Err(error) => Err(error),
        }
    }

    async fn call<T>(&self, method: &str, params: &[(&str, &str)]) -> Result<T, ClientError>
    where
        T: DeserializeOwned,
    {
        if self.config.api_key.is_empty() {
            return Err(ClientError::MissingApiKey);
        }

        let mut query: Vec<(&str, &str)> = vec![
            ("method", method),
            ("api_key", self.config.api_key.as_str()),
            ("format", "json"),
        ];
        query.extend_from_slice(params);

        let response = self
            .http
            .get(&self.config.base_url)
            .query(&query)
            .send()
            .await
            .map_err(|err| ClientError::Http(err.to_string()))?;
        let status = response.status();
        let bytes = response
            .bytes()
            .await
            .map_err(|err| ClientError::Http(err.to_string()))?;

        decode_response(status, &bytes).inspect_err(|error| {
            warn!(method, status = %status, error = %error, "Last.fm request failed");
        })
    }
}

/// Splits a raw response into a typed payload or a [`ClientError`].
///
/// The service reports failures as `{"error": n, "message": "..."}`, sometimes
/// with a 200 status, so the envelope is checked before the status code.
pub(crate) fn decode_response<T>(status: StatusCode, bytes: &[u8]) -> Result<T, ClientError>
where
    T: DeserializeOwned,
{
    let value: Value = match serde_json::from_slice(bytes) {
        Ok(value) => value,
        Err(_) if !status.is_success() => return Err(ClientError::Status(status)),
        Err(err) => return Err(ClientError::Decode(err.to_string())),
    };

    if let Some(code) = value.get("error").and_then(Value::as_u64) {
        let message = value
            .get("message")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();
        return Err(ClientError::Service {
            code: u32::try_from(code).unwrap_or(u32::MAX),
            message,
        });
    }

    if !status.is_success() {
        return Err(ClientError::Status(status));
    }

    serde_json::from_value(value).map_err(|err| ClientError::Decode(err.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn service_envelope_becomes_service_error() {
        let body = br#"{"error": 6, "message": "User not found", "links": []}"#;
        let error = decode_response::<UserInfoEnvelope>(StatusCode::NOT_FOUND, body)
            .expect_err("envelope should fail");
        match error {
            ClientError::Service { code, message } => {
                assert_eq!(code, 6);
                assert_eq!(message, "User not found");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn non_json_failure_reports_status() {
        let error = decode_response::<UserInfoEnvelope>(StatusCode::BAD_GATEWAY, b"<html>")
            .expect_err("gateway error");
        assert!(matches!(error, ClientError::Status(StatusCode::BAD_GATEWAY)));
    }

    #[test]
    fn malformed_success_reports_decode() {
        let error = decode_response::<UserInfoEnvelope>(StatusCode::OK, br#"{"nope": 1}"#)
            .expect_err("missing user");
        assert!(matches!(error, ClientError::Decode(_)));
    }

    #[test]
    fn one_bad_record_is_a_decode_error() {
        let body = br#"{"results": {"tagmatches": {"tag": [
            {"name": "metal", "count": "4200"},
            {"name": "broken", "count": "n/a"}
        ]}}}"#;
        let error = decode_response::<TagSearchEnvelope>(StatusCode::OK, body)
            .expect_err("malformed count");
        assert!(matches!(error, ClientError::Decode(_)));
    }

    #[test]
    fn user_payload_decodes() {
        let body = br##"{"user": {
            "name": "RJ",
            "url": "https://www.last.fm/user/RJ",
            "image": [{"#text": "https://img/rj.png", "size": "small"}]
        }}"##;
        let envelope: UserInfoEnvelope =
            decode_response(StatusCode::OK, body).expect("user decodes");
        let user = User::from(envelope.user);
        assert_eq!(user.name, "RJ");
        assert_eq!(user.first_image(), Some("https://img/rj.png"));
    }

    #[tokio::test]
    async fn missing_api_key_fails_before_network() {
        let client = LastFmClient::with_config(ClientConfig::default()).expect("client builds");
        let error = client
            .search_artists("metallica")
            .await
            .expect_err("no key configured");
        assert!(matches!(error, ClientError::MissingApiKey));
    }
}
