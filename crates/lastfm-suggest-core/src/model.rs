use std::fmt;

use serde::{Deserialize, Serialize};

/// Search domain a suggestion came from. Declaration order is the placement
/// order in the merged list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Artist,
    Track,
    Tag,
    User,
}

impl Category {
    pub const ALL: [Category; 4] = [
        Category::Artist,
        Category::Track,
        Category::Tag,
        Category::User,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Category::Artist => "artist",
            Category::Track => "track",
            Category::Tag => "tag",
            Category::User => "user",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Bundled icons a host can resolve without a network fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum IconRef {
    Radio,
}

impl IconRef {
    pub fn resource_name(self) -> &'static str {
        match self {
            IconRef::Radio => "radio_icon",
        }
    }
}

/// Artwork shown next to a suggestion: a bundled icon or a remote image,
/// never both.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum Visual {
    None,
    Icon(IconRef),
    Image(String),
}

impl Visual {
    pub fn from_image(url: Option<&str>) -> Self {
        match url {
            Some(url) if !url.is_empty() => Visual::Image(url.to_string()),
            _ => Visual::None,
        }
    }
}

/// URI opened when a suggestion is activated.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct ActionTarget(String);

impl ActionTarget {
    pub(crate) fn new(uri: String) -> Self {
        Self(uri)
    }

    /// `{scheme}://globaltags/{tag}`, handled by the player rather than a browser.
    pub fn tag_radio(scheme: &str, tag: &str) -> Self {
        Self(format!("{scheme}://globaltags/{tag}"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for ActionTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SuggestionCandidate {
    /// Position in the aggregation run, `0..N`.
    pub id: u64,
    pub category: Category,
    pub primary_text: String,
    pub secondary_text: String,
    pub action_target: ActionTarget,
    pub visual: Visual,
}

impl SuggestionCandidate {
    pub fn icon(&self) -> Option<IconRef> {
        match self.visual {
            Visual::Icon(icon) => Some(icon),
            _ => None,
        }
    }

    pub fn image_url(&self) -> Option<&str> {
        match &self.visual {
            Visual::Image(url) => Some(url),
            _ => None,
        }
    }
}
