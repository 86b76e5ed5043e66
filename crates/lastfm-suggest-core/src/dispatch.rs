use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{
    aggregator::SuggestionAggregator,
    error::SuggestError,
    model::{SuggestionCandidate, Visual},
};

pub const SUGGEST_PATH: &str = "search_suggest_query";
pub const SHORTCUT_PATH: &str = "search_suggest_shortcut";

/// Incoming suggestion request as handed over by the host.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SuggestRequest {
    /// `search_suggest_query/<query>`, optionally prefixed with
    /// `scheme://authority/`.
    pub path: String,
    #[serde(default)]
    pub selection: Option<String>,
    #[serde(default)]
    pub selection_args: Vec<String>,
    #[serde(default)]
    pub sort_order: Option<String>,
}

impl SuggestRequest {
    pub fn suggest(query: &str) -> Self {
        Self {
            path: format!("{SUGGEST_PATH}/{}", urlencoding::encode(query)),
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    Suggest(Option<String>),
    RefreshShortcut(Option<String>),
}

impl Route {
    pub fn parse(uri: &str) -> Result<Self, SuggestError> {
        let segments = path_segments(uri);
        let (head, tail) = match segments.as_slice() {
            [head] => (*head, None),
            [head, tail] => (*head, Some(decode_segment(tail)?)),
            _ => return Err(SuggestError::invalid(format!("Unknown URL {uri}"))),
        };

        match head {
            SUGGEST_PATH => Ok(Route::Suggest(tail)),
            SHORTCUT_PATH => Ok(Route::RefreshShortcut(tail)),
            _ => Err(SuggestError::invalid(format!("Unknown URL {uri}"))),
        }
    }
}

fn path_segments(uri: &str) -> Vec<&str> {
    let path = match uri.split_once("://") {
        Some((_, rest)) => rest.split_once('/').map_or("", |(_, path)| path),
        None => uri,
    };
    path.split('/').filter(|segment| !segment.is_empty()).collect()
}

fn decode_segment(segment: &str) -> Result<String, SuggestError> {
    urlencoding::decode(segment)
        .map(|decoded| decoded.into_owned())
        .map_err(|_| SuggestError::invalid(format!("malformed path segment {segment}")))
}

/// One suggestion encoded with the column names search hosts expect.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SuggestionRow {
    #[serde(rename = "_id")]
    pub id: u64,
    #[serde(rename = "suggest_text_1")]
    pub text_1: String,
    #[serde(rename = "suggest_text_2")]
    pub text_2: String,
    #[serde(rename = "suggest_intent_data")]
    pub intent_data: String,
    #[serde(rename = "suggest_icon_2")]
    pub icon_2: Option<String>,
    #[serde(rename = "_imageURL")]
    pub image_url: Option<String>,
}

impl From<&SuggestionCandidate> for SuggestionRow {
    fn from(candidate: &SuggestionCandidate) -> Self {
        let (icon_2, image_url) = match &candidate.visual {
            Visual::None => (None, None),
            Visual::Icon(icon) => (Some(icon.resource_name().to_string()), None),
            Visual::Image(url) => (None, Some(url.clone())),
        };
        Self {
            id: candidate.id,
            text_1: candidate.primary_text.clone(),
            text_2: candidate.secondary_text.clone(),
            intent_data: candidate.action_target.to_string(),
            icon_2,
            image_url,
        }
    }
}

pub fn to_rows(candidates: &[SuggestionCandidate]) -> Vec<SuggestionRow> {
    candidates.iter().map(SuggestionRow::from).collect()
}

/// Routes host requests to the aggregator. `None` rows means "no data".
#[derive(Clone)]
pub struct SuggestionDispatcher {
    aggregator: Arc<SuggestionAggregator>,
}

impl SuggestionDispatcher {
    pub fn new(aggregator: Arc<SuggestionAggregator>) -> Self {
        Self { aggregator }
    }

    pub fn aggregator(&self) -> Arc<SuggestionAggregator> {
        self.aggregator.clone()
    }

    pub async fn dispatch(
        &self,
        request: &SuggestRequest,
    ) -> Result<Option<Vec<SuggestionRow>>, SuggestError> {
        validate(request)?;
        match Route::parse(&request.path)? {
            Route::Suggest(query) => Ok(self.suggest(query.as_deref()).await),
            Route::RefreshShortcut(shortcut_id) => Ok(refresh_shortcut(shortcut_id.as_deref())),
        }
    }

    pub async fn suggest(&self, raw_query: Option<&str>) -> Option<Vec<SuggestionRow>> {
        self.aggregator
            .aggregate(raw_query)
            .await
            .map(|candidates| to_rows(&candidates))
    }
}

/// Shortcut ids are never published, so there is nothing to refresh.
pub fn refresh_shortcut(shortcut_id: Option<&str>) -> Option<Vec<SuggestionRow>> {
    debug!(target: "lastfm_suggest_core", shortcut_id, "shortcut refresh requested");
    None
}

fn validate(request: &SuggestRequest) -> Result<(), SuggestError> {
    if request
        .selection
        .as_deref()
        .is_some_and(|selection| !selection.is_empty())
    {
        return Err(SuggestError::invalid(format!(
            "selection not allowed for {}",
            request.path
        )));
    }
    if !request.selection_args.is_empty() {
        return Err(SuggestError::invalid(format!(
            "selectionArgs not allowed for {}",
            request.path
        )));
    }
    if request
        .sort_order
        .as_deref()
        .is_some_and(|order| !order.is_empty())
    {
        return Err(SuggestError::invalid(format!(
            "sortOrder not allowed for {}",
            request.path
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ActionTarget, Category, IconRef};

    #[test]
    fn parses_suggest_routes() {
        assert_eq!(
            Route::parse("search_suggest_query").expect("route"),
            Route::Suggest(None)
        );
        assert_eq!(
            Route::parse("content://lastfm/search_suggest_query/Daft%20Punk").expect("route"),
            Route::Suggest(Some("Daft Punk".to_string()))
        );
        assert_eq!(
            Route::parse("/search_suggest_shortcut/7").expect("route"),
            Route::RefreshShortcut(Some("7".to_string()))
        );
    }

    #[test]
    fn rejects_unknown_routes() {
        for uri in ["", "content://lastfm/", "search", "search_suggest_query/a/b"] {
            assert!(
                matches!(Route::parse(uri), Err(SuggestError::InvalidInput(_))),
                "{uri} should be rejected"
            );
        }
    }

    #[test]
    fn suggest_request_round_trips_through_route() {
        let request = SuggestRequest::suggest("AC/DC");
        assert_eq!(
            Route::parse(&request.path).expect("route"),
            Route::Suggest(Some("AC/DC".to_string()))
        );
    }

    #[test]
    fn selection_and_sort_are_rejected() {
        let mut request = SuggestRequest::suggest("x");
        request.selection = Some("name = ?".to_string());
        assert!(validate(&request).is_err());

        let mut request = SuggestRequest::suggest("x");
        request.selection_args = vec!["a".to_string()];
        assert!(validate(&request).is_err());

        let mut request = SuggestRequest::suggest("x");
        request.sort_order = Some("name".to_string());
        assert!(validate(&request).is_err());

        let mut request = SuggestRequest::suggest("x");
        request.selection = Some(String::new());
        request.sort_order = Some(String::new());
        assert!(validate(&request).is_ok());
    }

    #[test]
    fn rows_carry_icon_or_image() {
        let tag = SuggestionCandidate {
            id: 3,
            category: Category::Tag,
            primary_text: "jazz Tag Radio".to_string(),
            secondary_text: "Tag radio".to_string(),
            action_target: ActionTarget::tag_radio("app", "jazz"),
            visual: Visual::Icon(IconRef::Radio),
        };
        let row = SuggestionRow::from(&tag);
        assert_eq!(row.icon_2.as_deref(), Some("radio_icon"));
        assert_eq!(row.image_url, None);
        assert_eq!(row.intent_data, "app://globaltags/jazz");

        let json = serde_json::to_value(&row).expect("serialize row");
        assert_eq!(json["_id"], 3);
        assert_eq!(json["suggest_text_1"], "jazz Tag Radio");
        assert!(json["_imageURL"].is_null());
    }

    #[test]
    fn refresh_shortcut_has_no_data() {
        assert_eq!(refresh_shortcut(Some("12")), None);
    }
}
