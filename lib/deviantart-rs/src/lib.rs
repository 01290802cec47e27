/// Client
pub mod client;
/// Gallery walking
pub mod gallery;
/// Site policy
pub mod policy;
/// Api Types
pub mod types;

pub use crate::{
    client::{
        cookie_jar::CookieMap,
        Client,
    },
    gallery::{
        GalleryBatch,
        GalleryCursor,
        GalleryWalk,
    },
    policy::SitePolicy,
    types::{
        DeviationPage,
        FromHtmlError,
        GalleryContents,
        GalleryPage,
        MediaItem,
        SkipReason,
        SkippedItem,
    },
};
pub use cookie_store::CookieStore;
pub use reqwest_cookie_store::CookieStoreMutex;

/// The user agent the web gallery expects to see.
pub const USER_AGENT_STR: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/135.0.0.0 Safari/537.36";

/// The number of items requested per gallery api call.
pub const MAX_GALLERY_ITEMS: u64 = 24;

/// The `da_minor_version` the gallery api is called with.
pub const DA_MINOR_VERSION: &str = "20230710";

/// Library Error
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Reqwest HTTP Error
    #[error(transparent)]
    Reqwest(#[from] reqwest::Error),

    /// The server replied with a non-success status
    #[error("invalid http status '{0}'")]
    InvalidStatus(reqwest::StatusCode),

    /// The server cleared the session's auth cookie
    #[error("the session has expired, log in again and refresh the cookie file")]
    SessionExpired,

    /// Invalid Url
    #[error(transparent)]
    Url(#[from] url::ParseError),

    /// The url is not a gallery url
    #[error("'{0}' is not a gallery url")]
    InvalidGalleryUrl(String),

    /// A page could not be scraped
    #[error("invalid page")]
    InvalidPage(#[from] FromHtmlError),

    /// A tokio task failed to join
    #[error(transparent)]
    TokioJoin(#[from] tokio::task::JoinError),

    /// Io Error
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Json failed to parse
    #[error(transparent)]
    Json(#[from] serde_json::Error),

    /// The cookie store failed to load or save
    #[error("cookie store error")]
    CookieStore(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl Error {
    /// Whether this error means the current run cannot continue.
    pub fn is_session_expired(&self) -> bool {
        matches!(self, Self::SessionExpired)
    }
}
