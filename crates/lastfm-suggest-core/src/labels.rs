use serde::{Deserialize, Serialize};

/// Fixed set of user-visible strings a suggestion run needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MessageId {
    ViewInfo,
    ViewProfile,
    TagRadio,
    /// Primary text of a tag suggestion; `{tag}` is replaced with the tag name.
    TagRadioStation,
}

const TAG_PLACEHOLDER: &str = "{tag}";

/// Localization seam. The core only ever looks strings up by [`MessageId`].
pub trait MessageCatalog: Send + Sync {
    fn message(&self, id: MessageId) -> String;

    fn tag_radio_station(&self, tag: &str) -> String {
        self.message(MessageId::TagRadioStation)
            .replace(TAG_PLACEHOLDER, tag)
    }
}

/// Partial label set read from configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LabelOverrides {
    pub view_info: Option<String>,
    pub view_profile: Option<String>,
    pub tag_radio: Option<String>,
    pub tag_radio_station: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Labels {
    view_info: String,
    view_profile: String,
    tag_radio: String,
    tag_radio_station: String,
}

impl Default for Labels {
    fn default() -> Self {
        Self {
            view_info: "View info".to_string(),
            view_profile: "View profile".to_string(),
            tag_radio: "Tag radio".to_string(),
            tag_radio_station: "{tag} Tag Radio".to_string(),
        }
    }
}

impl Labels {
    #[must_use]
    pub fn with_overrides(overrides: &LabelOverrides) -> Self {
        let defaults = Self::default();
        let pick = |value: &Option<String>, fallback: String| {
            value
                .clone()
                .filter(|text| !text.trim().is_empty())
                .unwrap_or(fallback)
        };
        Self {
            view_info: pick(&overrides.view_info, defaults.view_info),
            view_profile: pick(&overrides.view_profile, defaults.view_profile),
            tag_radio: pick(&overrides.tag_radio, defaults.tag_radio),
            tag_radio_station: pick(&overrides.tag_radio_station, defaults.tag_radio_station),
        }
    }
}

impl MessageCatalog for Labels {
    fn message(&self, id: MessageId) -> String {
        match id {
            MessageId::ViewInfo => self.view_info.clone(),
            MessageId::ViewProfile => self.view_profile.clone(),
            MessageId::TagRadio => self.tag_radio.clone(),
            MessageId::TagRadioStation => self.tag_radio_station.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn station_message_substitutes_tag() {
        let labels = Labels::default();
        assert_eq!(labels.tag_radio_station("shoegaze"), "shoegaze Tag Radio");
    }

    #[test]
    fn overrides_replace_only_given_labels() {
        let labels = Labels::with_overrides(&LabelOverrides {
            view_info: Some("Info anzeigen".to_string()),
            tag_radio_station: Some("Radio für Tag {tag}".to_string()),
            tag_radio: Some("  ".to_string()),
            ..LabelOverrides::default()
        });
        assert_eq!(labels.message(MessageId::ViewInfo), "Info anzeigen");
        assert_eq!(labels.message(MessageId::ViewProfile), "View profile");
        assert_eq!(labels.message(MessageId::TagRadio), "Tag radio");
        assert_eq!(labels.tag_radio_station("jazz"), "Radio für Tag jazz");
    }
}
