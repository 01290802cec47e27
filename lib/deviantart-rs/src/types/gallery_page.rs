use super::FromHtmlError;
use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{
    Html,
    Selector,
};

static SCRIPT_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("script").expect("invalid SCRIPT_SELECTOR"));
static TOTAL_IMAGES_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("span._1Mrww").expect("invalid TOTAL_IMAGES_SELECTOR"));
static CSRF_TOKEN_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"window\.__CSRF_TOKEN__\s*=\s*'([^']+)'").expect("invalid CSRF_TOKEN_REGEX")
});

const CSRF_TOKEN_MARKER: &str = "window.__CSRF_TOKEN__";

/// A gallery page
#[derive(Debug)]
pub struct GalleryPage {
    /// The number of images in the gallery
    pub total_images: u64,

    /// The csrf token the gallery api wants
    pub csrf_token: String,
}

impl GalleryPage {
    /// Parse from html
    pub(crate) fn from_html(html: &Html) -> Result<Self, FromHtmlError> {
        let total_images = extract_total_images(html)?;
        let csrf_token = extract_csrf_token(html)?;

        Ok(Self {
            total_images,
            csrf_token,
        })
    }
}

/// Scan the inline scripts for the csrf token assignment.
pub(crate) fn extract_csrf_token(html: &Html) -> Result<String, FromHtmlError> {
    html.select(&SCRIPT_SELECTOR)
        .filter_map(|element| element.text().next())
        .filter(|text| text.contains(CSRF_TOKEN_MARKER))
        .find_map(|text| {
            let captures = CSRF_TOKEN_REGEX.captures(text)?;
            Some(captures.get(1)?.as_str().to_string())
        })
        .ok_or(FromHtmlError::MissingCsrfToken)
}

/// Read the total image count element.
pub(crate) fn extract_total_images(html: &Html) -> Result<u64, FromHtmlError> {
    let text = html
        .select(&TOTAL_IMAGES_SELECTOR)
        .next()
        .ok_or(FromHtmlError::MissingTotalImages)?
        .text()
        .collect::<String>();

    text.trim()
        .parse()
        .map_err(FromHtmlError::InvalidTotalImages)
}
