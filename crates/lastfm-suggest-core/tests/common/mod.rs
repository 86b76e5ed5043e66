#![allow(dead_code)]

use std::{
    sync::atomic::{AtomicUsize, Ordering},
    time::Duration,
};

use async_trait::async_trait;
use lastfm_client::{
    types::{Artist, Image, Tag, Track, User},
    ClientError, RemoteSearchClient,
};

/// Canned reply for one category, optionally delayed.
#[derive(Clone)]
pub struct Reply<T> {
    pub value: Result<T, ClientError>,
    pub delay: Duration,
}

impl<T> Reply<T> {
    pub fn ok(value: T) -> Self {
        Self {
            value: Ok(value),
            delay: Duration::ZERO,
        }
    }

    pub fn fail() -> Self {
        Self {
            value: Err(ClientError::Service {
                code: 29,
                message: "Rate limit exceeded".to_string(),
            }),
            delay: Duration::ZERO,
        }
    }

    #[must_use]
    pub fn after(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }
}

pub struct ScriptedClient {
    pub artists: Reply<Vec<Artist>>,
    pub tracks: Reply<Vec<Track>>,
    pub tags: Reply<Vec<Tag>>,
    pub user: Reply<Option<User>>,
    pub calls: AtomicUsize,
}

impl Default for ScriptedClient {
    fn default() -> Self {
        Self {
            artists: Reply::ok(Vec::new()),
            tracks: Reply::ok(Vec::new()),
            tags: Reply::ok(Vec::new()),
            user: Reply::ok(None),
            calls: AtomicUsize::new(0),
        }
    }
}

impl ScriptedClient {
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    async fn play<T: Clone>(&self, reply: &Reply<T>) -> Result<T, ClientError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if !reply.delay.is_zero() {
            tokio::time::sleep(reply.delay).await;
        }
        reply.value.clone()
    }
}

#[async_trait]
impl RemoteSearchClient for ScriptedClient {
    async fn search_artists(&self, _text: &str) -> Result<Vec<Artist>, ClientError> {
        self.play(&self.artists).await
    }

    async fn search_tracks(&self, _text: &str) -> Result<Vec<Track>, ClientError> {
        self.play(&self.tracks).await
    }

    async fn search_tags(&self, _text: &str) -> Result<Vec<Tag>, ClientError> {
        self.play(&self.tags).await
    }

    async fn get_user_profile(
        &self,
        _username: &str,
        _session_key: Option<&str>,
    ) -> Result<Option<User>, ClientError> {
        self.play(&self.user).await
    }
}

pub fn artist(name: &str) -> Artist {
    Artist {
        name: name.to_string(),
        url: format!("last.fm/music/{name}"),
        images: Vec::new(),
    }
}

pub fn artists(count: usize) -> Vec<Artist> {
    (0..count).map(|i| artist(&format!("Artist {i}"))).collect()
}

pub fn track(artist: &str, name: &str) -> Track {
    Track {
        name: name.to_string(),
        artist: artist.to_string(),
        url: format!("http://www.last.fm/music/{artist}/_/{name}"),
        images: vec![Image {
            url: format!("http://img/{name}.png"),
            size: Some("small".to_string()),
        }],
    }
}

pub fn tag(name: &str, count: u64) -> Tag {
    Tag {
        name: name.to_string(),
        url: format!("www.last.fm/tag/{name}"),
        count,
    }
}

pub fn user(name: &str) -> User {
    User {
        name: name.to_string(),
        url: format!("last.fm/user/{name}"),
        images: Vec::new(),
    }
}
