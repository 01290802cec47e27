use url::Url;

/// The site-specific knobs of a [`Client`](crate::Client).
///
/// Everything that is specific to how DeviantArt behaves lives here,
/// so that a similar site can be targeted by swapping the policy.
#[derive(Debug, Clone)]
pub struct SitePolicy {
    /// The url cookies loaded from a cookie file are scoped to.
    pub cookie_url: Url,

    /// The gallery contents api endpoint.
    pub gallery_api_url: Url,

    /// A `Set-Cookie` fragment that means the server logged the session out.
    pub auth_cleared_marker: String,

    /// How many times a request is re-sent after the server rotates cookies.
    pub max_cookie_retries: u8,

    /// The number of items requested per gallery api call.
    pub gallery_page_size: u64,
}

impl SitePolicy {
    /// The policy for deviantart.com.
    pub fn deviantart() -> Self {
        Self {
            cookie_url: Url::parse("https://deviantart.com/")
                .expect("invalid deviantart cookie url"),
            gallery_api_url: Url::parse(
                "https://deviantart.com/_puppy/dashared/gallection/contents",
            )
            .expect("invalid deviantart gallery api url"),
            auth_cleared_marker: "auth=deleted".into(),
            max_cookie_retries: 1,
            gallery_page_size: crate::MAX_GALLERY_ITEMS,
        }
    }

    /// Make a policy for a site hosted at `base`, using the deviantart api paths.
    ///
    /// Mostly useful for pointing the client at a local server.
    pub fn with_base_url(base: &Url) -> Result<Self, url::ParseError> {
        Ok(Self {
            cookie_url: base.clone(),
            gallery_api_url: base.join("/_puppy/dashared/gallection/contents")?,
            ..Self::deviantart()
        })
    }

    /// Returns `true` if a `Set-Cookie` value means the auth cookie was cleared.
    pub fn is_auth_cleared(&self, set_cookie: &str) -> bool {
        set_cookie.contains(self.auth_cleared_marker.as_str())
    }
}

impl Default for SitePolicy {
    fn default() -> Self {
        Self::deviantart()
    }
}
