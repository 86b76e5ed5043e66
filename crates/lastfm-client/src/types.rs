use serde::{de::Error as _, Deserialize, Deserializer, Serialize};

/// Image attached to an artist, track or user record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Image {
    pub url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Artist {
    pub name: String,
    pub url: String,
    #[serde(default)]
    pub images: Vec<Image>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Track {
    pub name: String,
    /// Name of the performing artist.
    pub artist: String,
    pub url: String,
    #[serde(default)]
    pub images: Vec<Image>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    pub name: String,
    pub url: String,
    /// Number of times the tag has been applied across the catalog.
    pub count: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub name: String,
    pub url: String,
    #[serde(default)]
    pub images: Vec<Image>,
}

impl Artist {
    pub fn first_image(&self) -> Option<&str> {
        first_image(&self.images)
    }
}

impl Track {
    pub fn first_image(&self) -> Option<&str> {
        first_image(&self.images)
    }
}

impl User {
    pub fn first_image(&self) -> Option<&str> {
        first_image(&self.images)
    }
}

fn first_image(images: &[Image]) -> Option<&str> {
    images.first().map(|image| image.url.as_str())
}

// Wire format of the 2.0 web service (`format=json`).

#[derive(Debug, Deserialize)]
pub(crate) struct ArtistSearchEnvelope {
    pub results: ArtistSearchResults,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ArtistSearchResults {
    #[serde(default, deserialize_with = "present_or_default")]
    pub artistmatches: ArtistMatches,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct ArtistMatches {
    #[serde(default, deserialize_with = "one_or_many")]
    pub artist: Vec<RawArtist>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct TrackSearchEnvelope {
    pub results: TrackSearchResults,
}

#[derive(Debug, Deserialize)]
pub(crate) struct TrackSearchResults {
    #[serde(default, deserialize_with = "present_or_default")]
    pub trackmatches: TrackMatches,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct TrackMatches {
    #[serde(default, deserialize_with = "one_or_many")]
    pub track: Vec<RawTrack>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct TagSearchEnvelope {
    pub results: TagSearchResults,
}

#[derive(Debug, Deserialize)]
pub(crate) struct TagSearchResults {
    #[serde(default, deserialize_with = "present_or_default")]
    pub tagmatches: TagMatches,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct TagMatches {
    #[serde(default, deserialize_with = "one_or_many")]
    pub tag: Vec<RawTag>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct UserInfoEnvelope {
    pub user: RawUser,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RawImage {
    #[serde(rename = "#text", default)]
    pub text: String,
    #[serde(default)]
    pub size: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RawArtist {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub url: String,
    #[serde(default, deserialize_with = "one_or_many")]
    pub image: Vec<RawImage>,
}

/// `track.search` reports the artist as a bare string, other methods nest it.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum RawArtistRef {
    Name(String),
    Object {
        #[serde(default)]
        name: String,
    },
}

#[derive(Debug, Deserialize)]
pub(crate) struct RawTrack {
    #[serde(default)]
    pub name: String,
    pub artist: Option<RawArtistRef>,
    #[serde(default)]
    pub url: String,
    #[serde(default, deserialize_with = "one_or_many")]
    pub image: Vec<RawImage>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RawTag {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub url: String,
    #[serde(default, deserialize_with = "lenient_count")]
    pub count: u64,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RawUser {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub url: String,
    #[serde(default, deserialize_with = "one_or_many")]
    pub image: Vec<RawImage>,
}

fn convert_images(raw: Vec<RawImage>) -> Vec<Image> {
    raw.into_iter()
        .filter(|image| !image.text.trim().is_empty())
        .map(|image| Image {
            url: image.text,
            size: image.size.filter(|size| !size.is_empty()),
        })
        .collect()
}

impl From<RawArtist> for Artist {
    fn from(raw: RawArtist) -> Self {
        Self {
            name: raw.name,
            url: raw.url,
            images: convert_images(raw.image),
        }
    }
}

impl From<RawTrack> for Track {
    fn from(raw: RawTrack) -> Self {
        let artist = match raw.artist {
            Some(RawArtistRef::Name(name) | RawArtistRef::Object { name }) => name,
            None => String::new(),
        };
        Self {
            name: raw.name,
            artist,
            url: raw.url,
            images: convert_images(raw.image),
        }
    }
}

impl From<RawTag> for Tag {
    fn from(raw: RawTag) -> Self {
        Self {
            name: raw.name,
            url: raw.url,
            count: raw.count,
        }
    }
}

impl From<RawUser> for User {
    fn from(raw: RawUser) -> Self {
        Self {
            name: raw.name,
            url: raw.url,
            images: convert_images(raw.image),
        }
    }
}

/// Accepts either a JSON array or a single object (the service collapses
/// one-element lists). A blank string or `null` is an empty list; anything
/// else that fails to decode is an error.
fn one_or_many<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum OneOrMany<T> {
        Many(Vec<T>),
        One(T),
        Blank(String),
        Null(()),
    }

    match OneOrMany::<T>::deserialize(deserializer)? {
        OneOrMany::Many(items) => Ok(items),
        OneOrMany::One(item) => Ok(vec![item]),
        OneOrMany::Blank(text) if text.trim().is_empty() => Ok(Vec::new()),
        OneOrMany::Blank(text) => Err(D::Error::custom(format!(
            "expected a list or an object, found string {text:?}"
        ))),
        OneOrMany::Null(()) => Ok(Vec::new()),
    }
}

/// Empty match sections come back as a whitespace string instead of an object.
fn present_or_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Slot<T> {
        Present(T),
        Blank(String),
    }

    match Slot::<T>::deserialize(deserializer)? {
        Slot::Present(value) => Ok(value),
        Slot::Blank(text) if text.trim().is_empty() => Ok(T::default()),
        Slot::Blank(text) => Err(D::Error::custom(format!(
            "expected an object, found string {text:?}"
        ))),
    }
}

/// Counts are serialized as strings by the service.
fn lenient_count<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Count {
        Number(u64),
        Text(String),
    }

    match Count::deserialize(deserializer)? {
        Count::Number(value) => Ok(value),
        Count::Text(text) if text.trim().is_empty() => Ok(0),
        Count::Text(text) => text.trim().parse().map_err(D::Error::custom),
    }
}
