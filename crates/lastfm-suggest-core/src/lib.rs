use std::sync::Arc;

use anyhow::{Context, Result};
use lastfm_client::{LastFmClient, RemoteSearchClient};

pub mod aggregator;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod fetcher;
pub mod labels;
pub mod model;
pub mod session;
pub mod transport;
pub mod url;

use time::OffsetDateTime;
use tracing::{info, warn};

pub use aggregator::{AggregationReport, SuggestionAggregator, SuggestionAggregatorBuilder};
pub use config::SuggestConfig;
pub use dispatch::{SuggestRequest, SuggestionDispatcher, SuggestionRow};
pub use error::SuggestError;
pub use model::{ActionTarget, Category, IconRef, SuggestionCandidate, Visual};

use labels::Labels;
use session::StaticSession;

/// Wired-up suggestion pipeline plus the settings it was built from.
#[derive(Clone)]
pub struct CoreRuntime {
    config: SuggestConfig,
    dispatcher: Arc<SuggestionDispatcher>,
    boot_timestamp: OffsetDateTime,
}

impl CoreRuntime {
    pub fn dispatcher(&self) -> Arc<SuggestionDispatcher> {
        self.dispatcher.clone()
    }

    pub fn aggregator(&self) -> Arc<SuggestionAggregator> {
        self.dispatcher.aggregator()
    }

    pub fn config(&self) -> &SuggestConfig {
        &self.config
    }

    pub fn boot_timestamp(&self) -> OffsetDateTime {
        self.boot_timestamp
    }

    /// Serves JSON-RPC over stdio until input closes.
    pub async fn serve(&self) -> Result<()> {
        transport::serve_stdio(transport::TransportContext {
            dispatcher: self.dispatcher.clone(),
            boot_timestamp: self.boot_timestamp,
        })
        .await
    }
}

/// Builds the runtime against the Last.fm web service.
pub fn bootstrap(config: SuggestConfig) -> Result<CoreRuntime> {
    if config.api_key.is_empty() {
        warn!(
            target: "lastfm_suggest_core",
            "no API key configured; every category will come back empty"
        );
    }
    let client = LastFmClient::with_config(config.client_config())
        .context("failed to build Last.fm client")?;
    Ok(bootstrap_with_client(config, Arc::new(client)))
}

/// Builds the runtime around any [`RemoteSearchClient`].
pub fn bootstrap_with_client(
    config: SuggestConfig,
    client: Arc<dyn RemoteSearchClient>,
) -> CoreRuntime {
    let aggregator = SuggestionAggregator::builder(client)
        .labels(Arc::new(Labels::with_overrides(&config.labels)))
        .session(Arc::new(StaticSession::new(config.session_key.clone())))
        .category_timeout(config.category_timeout())
        .radio_scheme(config.radio_scheme.clone())
        .build();
    let dispatcher = Arc::new(SuggestionDispatcher::new(Arc::new(aggregator)));
    let boot_timestamp = OffsetDateTime::now_utc();

    info!(
        target: "lastfm_suggest_core",
        base_url = %config.api_base_url,
        category_timeout_ms = config.category_timeout_ms,
        radio_scheme = %config.radio_scheme,
        session = config.session_key.is_some(),
        boot_timestamp = %boot_timestamp,
        "Suggestion core ready"
    );

    CoreRuntime {
        config,
        dispatcher,
        boot_timestamp,
    }
}
