use std::collections::HashMap;
use url::Url;

/// The placeholder in a media template path that is replaced by the pretty name.
const PRETTY_NAME_PLACEHOLDER: &str = "<prettyName>";

/// A page of the gallery contents api.
#[derive(Debug, serde::Deserialize)]
pub struct GalleryContents {
    /// The raw results.
    ///
    /// Results are kept as raw json so that a single odd item cannot fail the whole page.
    #[serde(default)]
    pub results: Vec<serde_json::Value>,

    /// Whether there are more pages
    #[serde(rename = "hasMore", default)]
    pub has_more: bool,

    /// The offset of the next page
    #[serde(rename = "nextOffset")]
    pub next_offset: Option<u64>,

    /// Unknown K/Vs
    #[serde(flatten)]
    pub unknown: HashMap<String, serde_json::Value>,
}

impl GalleryContents {
    /// Turn every result into an image url, collecting the ones that could not be.
    pub fn resolve_image_urls(&self) -> (Vec<Url>, Vec<SkippedItem>) {
        let mut urls = Vec::with_capacity(self.results.len());
        let mut skipped = Vec::new();

        for result in self.results.iter() {
            match MediaItem::from_result(result).and_then(|item| item.image_url()) {
                Ok(url) => urls.push(url),
                Err(skipped_item) => skipped.push(skipped_item),
            }
        }

        (urls, skipped)
    }
}

/// Why a result did not produce an image url
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// The result is not shaped like a deviation
    Malformed,

    /// The result has no media object
    MissingMedia,

    /// The media object lacks a base uri, pretty name, token, or types
    MissingFields,

    /// No `fullview` media type with a template
    MissingFullview,

    /// The resolved string is not a url
    InvalidUrl,
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Malformed => "malformed result".fmt(f),
            Self::MissingMedia => "missing media".fmt(f),
            Self::MissingFields => "missing media fields".fmt(f),
            Self::MissingFullview => "missing fullview".fmt(f),
            Self::InvalidUrl => "invalid image url".fmt(f),
        }
    }
}

/// A gallery result that was skipped
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedItem {
    /// The deviation page url, if the result had one
    pub deviation_url: Option<String>,

    /// Why it was skipped
    pub reason: SkipReason,
}

impl std::fmt::Display for SkippedItem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.deviation_url.as_deref() {
            Some(url) => write!(f, "{url} ({})", self.reason),
            None => write!(f, "<unknown deviation> ({})", self.reason),
        }
    }
}

#[derive(Debug, serde::Deserialize)]
struct RawResult {
    media: Option<RawMedia>,
}

#[derive(Debug, serde::Deserialize)]
struct RawMedia {
    #[serde(rename = "baseUri")]
    base_uri: Option<String>,

    #[serde(rename = "prettyName")]
    pretty_name: Option<String>,

    #[serde(default)]
    token: Vec<String>,

    #[serde(default)]
    types: Vec<RawMediaType>,
}

#[derive(Debug, serde::Deserialize)]
struct RawMediaType {
    #[serde(rename = "t")]
    kind: Option<String>,

    #[serde(rename = "c")]
    content: Option<String>,
}

/// The media fields of a gallery result needed to build its image url.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaItem {
    /// The deviation page url
    pub deviation_url: Option<String>,

    /// The cdn base uri
    pub base_uri: String,

    /// The name substituted into the template
    pub pretty_name: String,

    /// The image token
    pub token: String,

    /// The `fullview` template path
    pub template_path: String,
}

impl MediaItem {
    /// Pull the media fields out of a raw gallery result.
    pub fn from_result(result: &serde_json::Value) -> Result<Self, SkippedItem> {
        let deviation_url = result
            .get("url")
            .and_then(|url| url.as_str())
            .map(String::from);
        let skipped = |reason| SkippedItem {
            deviation_url: deviation_url.clone(),
            reason,
        };

        let raw: RawResult = serde_json::from_value(result.clone())
            .map_err(|_| skipped(SkipReason::Malformed))?;
        let media = raw.media.ok_or_else(|| skipped(SkipReason::MissingMedia))?;

        let base_uri = media.base_uri.filter(|s| !s.is_empty());
        let pretty_name = media.pretty_name.filter(|s| !s.is_empty());
        let token = media.token.into_iter().next().filter(|s| !s.is_empty());
        let (base_uri, pretty_name, token) = match (base_uri, pretty_name, token) {
            (Some(base_uri), Some(pretty_name), Some(token)) if !media.types.is_empty() => {
                (base_uri, pretty_name, token)
            }
            _ => return Err(skipped(SkipReason::MissingFields)),
        };

        let template_path = media
            .types
            .into_iter()
            .find(|media_type| media_type.kind.as_deref() == Some("fullview"))
            .and_then(|media_type| media_type.content)
            .filter(|content| !content.is_empty())
            .ok_or_else(|| skipped(SkipReason::MissingFullview))?;

        Ok(Self {
            deviation_url,
            base_uri,
            pretty_name,
            token,
            template_path,
        })
    }

    /// Build the image url for this item.
    pub fn image_url(&self) -> Result<Url, SkippedItem> {
        let url = resolve_image_url(
            &self.base_uri,
            &self.template_path,
            &self.pretty_name,
            &self.token,
        );

        Url::parse(&url).map_err(|_| SkippedItem {
            deviation_url: self.deviation_url.clone(),
            reason: SkipReason::InvalidUrl,
        })
    }
}

/// Fill in a cdn template.
///
/// This is plain string building, the template path is appended to the base uri as-is.
pub fn resolve_image_url(
    base_uri: &str,
    template_path: &str,
    pretty_name: &str,
    token: &str,
) -> String {
    let path = template_path.replace(PRETTY_NAME_PLACEHOLDER, pretty_name);
    format!("{base_uri}{path}?token={token}")
}
