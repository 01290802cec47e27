/// The single deviation page
pub mod deviation_page;
/// Gallery api response types
pub mod gallery_contents;
/// The gallery page
pub mod gallery_page;

pub use self::{
    deviation_page::DeviationPage,
    gallery_contents::{
        resolve_image_url,
        GalleryContents,
        MediaItem,
        SkipReason,
        SkippedItem,
    },
    gallery_page::GalleryPage,
};

/// Error that may occur while scraping a page from [`Html`](scraper::Html).
#[derive(Debug, thiserror::Error)]
pub enum FromHtmlError {
    /// Missing the main image
    #[error("missing image")]
    MissingImage,

    /// Missing the csrf token script
    #[error("missing csrf token")]
    MissingCsrfToken,

    /// Missing the total image count element
    #[error("missing total image count")]
    MissingTotalImages,

    /// The total image count is not a number
    #[error("invalid total image count")]
    InvalidTotalImages(#[source] std::num::ParseIntError),
}
