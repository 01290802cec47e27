use super::FromHtmlError;
use once_cell::sync::Lazy;
use scraper::{
    Html,
    Selector,
};

/// The main image on a deviation page has one of these classes.
static IMAGE_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("img.TZM0T, img._2NIJr").expect("invalid IMAGE_SELECTOR"));

/// A single deviation page
#[derive(Debug)]
pub struct DeviationPage {
    /// The `src` of the main image
    pub image_url: String,
}

impl DeviationPage {
    /// Parse from html
    pub(crate) fn from_html(html: &Html) -> Result<Self, FromHtmlError> {
        let image_url = html
            .select(&IMAGE_SELECTOR)
            .find_map(|element| element.value().attr("src"))
            .ok_or(FromHtmlError::MissingImage)?;

        Ok(Self {
            image_url: image_url.to_string(),
        })
    }
}
