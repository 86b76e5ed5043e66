use std::{sync::Arc, time::Duration};

use lastfm_client::{
    types::{Artist, Tag, Track, User},
    ClientError, RemoteSearchClient,
};
use serde::Serialize;
use tracing::{debug, warn};

use crate::{
    labels::{MessageCatalog, MessageId},
    model::{ActionTarget, Category, IconRef, SuggestionCandidate, Visual},
    session::SessionProvider,
    url,
};

/// Most raw results considered per category.
pub const CATEGORY_CAP: usize = 10;
/// Tags applied this many times or fewer are not offered as radio stations.
pub const TAG_MIN_COUNT: u64 = 100;

pub const DEFAULT_CATEGORY_TIMEOUT: Duration = Duration::from_secs(5);
pub const DEFAULT_RADIO_SCHEME: &str = "app";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "error", rename_all = "snake_case")]
pub enum CategoryOutcome {
    Completed,
    Failed(String),
    TimedOut,
}

/// What one category contributed to a run.
#[derive(Debug, Clone)]
pub struct CategoryBatch {
    pub category: Category,
    pub candidates: Vec<SuggestionCandidate>,
    pub outcome: CategoryOutcome,
}

#[derive(Debug, Clone)]
pub struct FetchOptions {
    pub timeout: Duration,
    pub radio_scheme: String,
}

impl Default for FetchOptions {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_CATEGORY_TIMEOUT,
            radio_scheme: DEFAULT_RADIO_SCHEME.to_string(),
        }
    }
}

#[derive(Clone)]
pub struct CategoryFetcher {
    client: Arc<dyn RemoteSearchClient>,
    labels: Arc<dyn MessageCatalog>,
    session: Arc<dyn SessionProvider>,
    options: FetchOptions,
}

impl CategoryFetcher {
    pub fn new(
        client: Arc<dyn RemoteSearchClient>,
        labels: Arc<dyn MessageCatalog>,
        session: Arc<dyn SessionProvider>,
        options: FetchOptions,
    ) -> Self {
        Self {
            client,
            labels,
            session,
            options,
        }
    }

    /// Runs one category. Remote errors and timeouts become an empty batch.
    pub async fn fetch(&self, category: Category, query: &str) -> CategoryBatch {
        let result = tokio::time::timeout(self.options.timeout, self.fetch_raw(category, query)).await;

        let (candidates, outcome) = match result {
            Ok(Ok(candidates)) => (candidates, CategoryOutcome::Completed),
            Ok(Err(error)) => {
                warn!(
                    target: "lastfm_suggest_core",
                    category = %category,
                    error = %error,
                    "category lookup failed; contributing no suggestions"
                );
                (Vec::new(), CategoryOutcome::Failed(error.to_string()))
            }
            Err(_) => {
                warn!(
                    target: "lastfm_suggest_core",
                    category = %category,
                    timeout_ms = u64::try_from(self.options.timeout.as_millis()).unwrap_or(u64::MAX),
                    "category lookup timed out; contributing no suggestions"
                );
                (Vec::new(), CategoryOutcome::TimedOut)
            }
        };

        CategoryBatch {
            category,
            candidates,
            outcome,
        }
    }

    async fn fetch_raw(
        &self,
        category: Category,
        query: &str,
    ) -> Result<Vec<SuggestionCandidate>, ClientError> {
        let candidates = match category {
            Category::Artist => self.artist_candidates(self.client.search_artists(query).await?),
            Category::Track => self.track_candidates(self.client.search_tracks(query).await?),
            Category::Tag => self.tag_candidates(self.client.search_tags(query).await?),
            Category::User => {
                let session_key = self.session.session_key();
                let profile = self
                    .client
                    .get_user_profile(query, session_key.as_deref())
                    .await?;
                self.user_candidates(query, profile)
            }
        };
        Ok(number(candidates))
    }

    fn artist_candidates(&self, artists: Vec<Artist>) -> Vec<SuggestionCandidate> {
        let label = self.labels.message(MessageId::ViewInfo);
        artists
            .into_iter()
            .take(CATEGORY_CAP)
            .filter(|artist| !artist.name.is_empty())
            .filter_map(|artist| {
                let target = page_target(Category::Artist, &artist.name, &artist.url)?;
                let visual = Visual::from_image(artist.first_image());
                Some(candidate(Category::Artist, artist.name, label.clone(), target, visual))
            })
            .collect()
    }

    fn track_candidates(&self, tracks: Vec<Track>) -> Vec<SuggestionCandidate> {
        let label = self.labels.message(MessageId::ViewInfo);
        tracks
            .into_iter()
            .take(CATEGORY_CAP)
            .filter_map(|track| {
                let title = format!("{} - {}", track.artist, track.name);
                let target = page_target(Category::Track, &title, &track.url)?;
                let visual = Visual::from_image(track.first_image());
                Some(candidate(Category::Track, title, label.clone(), target, visual))
            })
            .collect()
    }

    fn tag_candidates(&self, tags: Vec<Tag>) -> Vec<SuggestionCandidate> {
        let label = self.labels.message(MessageId::TagRadio);
        tags.into_iter()
            .take(CATEGORY_CAP)
            .filter(|tag| tag.count > TAG_MIN_COUNT && !tag.name.is_empty())
            .map(|tag| {
                candidate(
                    Category::Tag,
                    self.labels.tag_radio_station(&tag.name),
                    label.clone(),
                    ActionTarget::tag_radio(&self.options.radio_scheme, &tag.name),
                    Visual::Icon(IconRef::Radio),
                )
            })
            .collect()
    }

    /// Only an exact (case-insensitive) username match becomes a suggestion.
    fn user_candidates(&self, query: &str, profile: Option<User>) -> Vec<SuggestionCandidate> {
        let Some(user) = profile else {
            return Vec::new();
        };
        if user.name.to_lowercase() != query {
            debug!(
                target: "lastfm_suggest_core",
                query,
                username = %user.name,
                "profile name does not match query"
            );
            return Vec::new();
        }

        let Some(target) = page_target(Category::User, &user.name, &user.url) else {
            return Vec::new();
        };
        vec![candidate(
            Category::User,
            query.to_string(),
            self.labels.message(MessageId::ViewProfile),
            target,
            Visual::from_image(user.first_image()),
        )]
    }
}

fn page_target(category: Category, name: &str, raw_url: &str) -> Option<ActionTarget> {
    match url::normalize(raw_url) {
        Ok(target) => Some(target),
        Err(error) => {
            debug!(
                target: "lastfm_suggest_core",
                category = %category,
                name,
                error = %error,
                "skipping record without a page URL"
            );
            None
        }
    }
}

fn candidate(
    category: Category,
    primary_text: String,
    secondary_text: String,
    action_target: ActionTarget,
    visual: Visual,
) -> SuggestionCandidate {
    SuggestionCandidate {
        id: 0,
        category,
        primary_text,
        secondary_text,
        action_target,
        visual,
    }
}

/// Category-local numbering; the aggregator renumbers across the whole run.
fn number(mut candidates: Vec<SuggestionCandidate>) -> Vec<SuggestionCandidate> {
    for (id, candidate) in (0u64..).zip(candidates.iter_mut()) {
        candidate.id = id;
    }
    candidates
}
