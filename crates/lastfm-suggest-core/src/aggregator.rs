use std::{sync::Arc, time::Duration};

use lastfm_client::RemoteSearchClient;
use serde::Serialize;
use tracing::{debug, info, instrument};

use crate::{
    fetcher::{CategoryBatch, CategoryFetcher, CategoryOutcome, FetchOptions},
    labels::{Labels, MessageCatalog},
    model::{Category, SuggestionCandidate},
    session::{SessionProvider, StaticSession},
};

/// Lower-cases and trims the raw query. Absent input is the empty string.
pub fn normalize_query(raw: Option<&str>) -> String {
    raw.unwrap_or_default().trim().to_lowercase()
}

/// Per-category summary of a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategorySummary {
    pub category: Category,
    pub count: usize,
    pub outcome: CategoryOutcome,
}

#[derive(Debug, Clone, Serialize)]
pub struct AggregationReport {
    pub query: String,
    pub candidates: Vec<SuggestionCandidate>,
    pub categories: Vec<CategorySummary>,
}

#[derive(Clone)]
pub struct SuggestionAggregator {
    fetcher: CategoryFetcher,
}

pub struct SuggestionAggregatorBuilder {
    client: Arc<dyn RemoteSearchClient>,
    labels: Arc<dyn MessageCatalog>,
    session: Arc<dyn SessionProvider>,
    options: FetchOptions,
}

impl SuggestionAggregatorBuilder {
    pub fn new(client: Arc<dyn RemoteSearchClient>) -> Self {
        Self {
            client,
            labels: Arc::new(Labels::default()),
            session: Arc::new(StaticSession::anonymous()),
            options: FetchOptions::default(),
        }
    }

    #[must_use]
    pub fn labels(mut self, labels: Arc<dyn MessageCatalog>) -> Self {
        self.labels = labels;
        self
    }

    #[must_use]
    pub fn session(mut self, session: Arc<dyn SessionProvider>) -> Self {
        self.session = session;
        self
    }

    #[must_use]
    pub fn category_timeout(mut self, timeout: Duration) -> Self {
        self.options.timeout = timeout;
        self
    }

    #[must_use]
    pub fn radio_scheme(mut self, scheme: impl Into<String>) -> Self {
        self.options.radio_scheme = scheme.into();
        self
    }

    pub fn build(self) -> SuggestionAggregator {
        SuggestionAggregator {
            fetcher: CategoryFetcher::new(self.client, self.labels, self.session, self.options),
        }
    }
}

impl SuggestionAggregator {
    pub fn builder(client: Arc<dyn RemoteSearchClient>) -> SuggestionAggregatorBuilder {
        SuggestionAggregatorBuilder::new(client)
    }

    /// Suggestions for `raw_query`, or `None` when the query is empty after
    /// normalization.
    pub async fn aggregate(&self, raw_query: Option<&str>) -> Option<Vec<SuggestionCandidate>> {
        self.aggregate_report(raw_query)
            .await
            .map(|report| report.candidates)
    }

    /// Like [`aggregate`](Self::aggregate) but keeps the per-category outcomes.
    #[instrument(name = "suggestion_aggregator.aggregate", skip(self))]
    pub async fn aggregate_report(&self, raw_query: Option<&str>) -> Option<AggregationReport> {
        let query = normalize_query(raw_query);
        if query.is_empty() {
            debug!(target: "lastfm_suggest_core", "empty query; skipping aggregation");
            return None;
        }

        let batches = self.fetch_all(&query).await;
        let categories: Vec<CategorySummary> = batches
            .iter()
            .map(|batch| CategorySummary {
                category: batch.category,
                count: batch.candidates.len(),
                outcome: batch.outcome.clone(),
            })
            .collect();
        let candidates = merge(batches);

        info!(
            target: "lastfm_suggest_core",
            query = %query,
            total = candidates.len(),
            artists = categories[0].count,
            tracks = categories[1].count,
            tags = categories[2].count,
            users = categories[3].count,
            failed = categories
                .iter()
                .filter(|summary| summary.outcome != CategoryOutcome::Completed)
                .count(),
            "aggregation completed"
        );

        Some(AggregationReport {
            query,
            candidates,
            categories,
        })
    }

    /// Polls all four categories concurrently and waits for every one of
    /// them. The returned array is in [`Category::ALL`] order regardless of
    /// completion order.
    async fn fetch_all(&self, query: &str) -> [CategoryBatch; 4] {
        let (artists, tracks, tags, users) = tokio::join!(
            self.fetcher.fetch(Category::Artist, query),
            self.fetcher.fetch(Category::Track, query),
            self.fetcher.fetch(Category::Tag, query),
            self.fetcher.fetch(Category::User, query),
        );
        [artists, tracks, tags, users]
    }
}

/// Concatenates batches in the given order and renumbers `0..N`.
fn merge(batches: impl IntoIterator<Item = CategoryBatch>) -> Vec<SuggestionCandidate> {
    batches
        .into_iter()
        .flat_map(|batch| batch.candidates)
        .zip(0u64..)
        .map(|(mut candidate, id)| {
            candidate.id = id;
            candidate
        })
        .collect()
}
