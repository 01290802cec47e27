/// Cookie file mapping
pub mod cookie_jar;

use crate::{
    gallery::{
        artist_from_url,
        folder_id_from_url,
        GalleryWalk,
    },
    CookieMap,
    DeviationPage,
    Error,
    GalleryContents,
    GalleryPage,
    SitePolicy,
    DA_MINOR_VERSION,
    USER_AGENT_STR,
};
use reqwest::header::SET_COOKIE;
use reqwest_cookie_store::CookieStoreMutex;
use scraper::Html;
use std::sync::Arc;
use tracing::{
    debug,
    error,
    info,
    warn,
};
use url::Url;

const NO_QUERY: &[(&str, &str)] = &[];

/// A DeviantArt Client
///
/// Requests share one cookie store, which is expected to hold a logged in session.
#[derive(Debug, Clone)]
pub struct Client {
    /// The inner http client.
    ///
    /// This probably shouldn't be used by you.
    pub client: reqwest::Client,

    /// The inner cookie store.
    ///
    /// This probably shouldn't be used by you.
    pub cookie_store: Arc<CookieStoreMutex>,

    policy: SitePolicy,
}

impl Client {
    /// Make a new [`Client`] with an empty cookie store.
    pub fn new() -> Result<Self, Error> {
        let cookie_store = Arc::new(CookieStoreMutex::new(Default::default()));
        Self::with_cookie_store(cookie_store, SitePolicy::deviantart(), USER_AGENT_STR)
    }

    /// Make a new [`Client`] from a cookie store, a site policy, and a user agent.
    pub fn with_cookie_store(
        cookie_store: Arc<CookieStoreMutex>,
        policy: SitePolicy,
        user_agent: &str,
    ) -> Result<Self, Error> {
        let mut headers = reqwest::header::HeaderMap::new();
        headers.insert(
            reqwest::header::ACCEPT_LANGUAGE,
            reqwest::header::HeaderValue::from_static("en-US,en;q=0.9"),
        );

        let client = reqwest::Client::builder()
            .user_agent(user_agent)
            .default_headers(headers)
            .cookie_provider(cookie_store.clone())
            .build()?;

        Ok(Self {
            client,
            cookie_store,
            policy,
        })
    }

    /// The site policy of this client
    pub fn policy(&self) -> &SitePolicy {
        &self.policy
    }

    /// Add the cookies of a cookie file to the session.
    pub fn load_cookies(&self, cookies: &CookieMap) -> Result<(), Error> {
        let mut cookie_store = self.cookie_store.lock().expect("cookie store poisoned");
        cookie_jar::insert_cookie_map(&mut cookie_store, cookies, &self.policy.cookie_url)
    }

    /// Get the current session cookies, in the cookie file format.
    pub fn cookies(&self) -> CookieMap {
        let cookie_store = self.cookie_store.lock().expect("cookie store poisoned");
        cookie_jar::to_cookie_map(&cookie_store, &self.policy.cookie_url)
    }

    /// Send a GET with the session and return the response.
    ///
    /// # Errors
    /// Returns [`Error::InvalidStatus`] if the server does not reply with a success status.
    /// Returns [`Error::SessionExpired`] if the server clears the auth cookie.
    ///
    /// If the server sets other cookies, the request is sent again with the updated jar,
    /// at most `max_cookie_retries` times.
    pub async fn get_response<Q>(&self, url: &str, query: &Q) -> Result<reqwest::Response, Error>
    where
        Q: serde::Serialize + ?Sized,
    {
        let mut retries = 0;
        loop {
            let response = self.client.get(url).query(query).send().await?;

            let status = response.status();
            if !status.is_success() {
                warn!("GET {} failed with status {status}", response.url());
                return Err(Error::InvalidStatus(status));
            }

            let (cookies_changed, auth_cleared) = {
                let mut set_cookie_values = response
                    .headers()
                    .get_all(SET_COOKIE)
                    .iter()
                    .filter_map(|value| value.to_str().ok())
                    .peekable();
                let cookies_changed = set_cookie_values.peek().is_some();
                let auth_cleared =
                    set_cookie_values.any(|value| self.policy.is_auth_cleared(value));
                (cookies_changed, auth_cleared)
            };

            if !cookies_changed {
                return Ok(response);
            }

            if auth_cleared {
                error!("session cookies have been deleted, log in again");
                return Err(Error::SessionExpired);
            }

            if retries >= self.policy.max_cookie_retries {
                warn!("session cookies changed again, keeping the response");
                return Ok(response);
            }

            retries += 1;
            info!("session cookies have changed, sending request again");
        }
    }

    /// Scrape a gallery page
    pub async fn get_gallery_page(&self, url: &Url) -> Result<GalleryPage, Error> {
        let text = self.get_response(url.as_str(), NO_QUERY).await?.text().await?;
        Ok(tokio::task::spawn_blocking(move || {
            let html = Html::parse_document(&text);
            GalleryPage::from_html(&html)
        })
        .await??)
    }

    /// Scrape a single deviation page
    pub async fn get_deviation_page(&self, url: &Url) -> Result<DeviationPage, Error> {
        let text = self.get_response(url.as_str(), NO_QUERY).await?.text().await?;
        Ok(tokio::task::spawn_blocking(move || {
            let html = Html::parse_document(&text);
            DeviationPage::from_html(&html)
        })
        .await??)
    }

    /// Get a page of gallery contents.
    ///
    /// Returns `None` if the api replied with no data.
    pub async fn get_gallery_contents(
        &self,
        username: &str,
        folder_id: &str,
        offset: u64,
        limit: u64,
        csrf_token: &str,
    ) -> Result<Option<GalleryContents>, Error> {
        let offset = offset.to_string();
        let limit = limit.to_string();
        let query = [
            ("username", username),
            ("type", "gallery"),
            ("order", "default"),
            ("offset", offset.as_str()),
            ("limit", limit.as_str()),
            ("folderid", folder_id),
            ("da_minor_version", DA_MINOR_VERSION),
            ("csrf_token", csrf_token),
        ];

        let value: serde_json::Value = self
            .get_response(self.policy.gallery_api_url.as_str(), &query)
            .await?
            .json()
            .await?;
        let is_empty = match &value {
            serde_json::Value::Null => true,
            serde_json::Value::Object(map) => map.is_empty(),
            _ => false,
        };
        if is_empty {
            return Ok(None);
        }

        let contents: GalleryContents = serde_json::from_value(value)?;
        debug!("got {} gallery results", contents.results.len());

        Ok(Some(contents))
    }

    /// Scrape a gallery page and start walking the gallery.
    ///
    /// # Errors
    /// Returns [`Error::InvalidGalleryUrl`] before sending anything if the url has no folder.
    pub async fn walk_gallery(&self, url: &Url) -> Result<GalleryWalk<'_>, Error> {
        let folder_id =
            folder_id_from_url(url).ok_or_else(|| Error::InvalidGalleryUrl(url.to_string()))?;
        let username = artist_from_url(url);

        let page = self.get_gallery_page(url).await?;
        info!("gallery has {} images", page.total_images);

        Ok(GalleryWalk::new(
            self,
            username,
            folder_id,
            page.csrf_token,
            page.total_images,
        ))
    }

    /// Send a GET for an image.
    ///
    /// Cdn responses are not checked for cookie changes.
    pub async fn get_image(&self, url: &Url) -> Result<reqwest::Response, Error> {
        let response = self.client.get(url.as_str()).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(Error::InvalidStatus(status));
        }
        Ok(response)
    }
}

#[cfg(test)]
pub(crate) mod test {
    use super::*;
    use wiremock::{
        matchers::{
            method,
            path,
        },
        Mock,
        MockServer,
        ResponseTemplate,
    };

    pub(crate) fn test_client(server: &MockServer) -> Client {
        let base = Url::parse(&server.uri()).expect("invalid server uri");
        let policy = SitePolicy::with_base_url(&base).expect("invalid policy");
        let cookie_store = Arc::new(CookieStoreMutex::new(Default::default()));
        Client::with_cookie_store(cookie_store, policy, USER_AGENT_STR)
            .expect("failed to build client")
    }

    #[tokio::test]
    async fn auth_cleared_is_session_expired() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/page"))
            .respond_with(ResponseTemplate::new(200).insert_header(
                "Set-Cookie",
                "auth=deleted; expires=Thu, 01-Jan-1970 00:00:01 GMT; path=/",
            ))
            .expect(1)
            .mount(&server)
            .await;

        let client = test_client(&server);
        let error = client
            .get_response(&format!("{}/page", server.uri()), NO_QUERY)
            .await
            .expect_err("accepted a logged out response");
        assert!(error.is_session_expired());
    }

    #[tokio::test]
    async fn cookie_refresh_is_retried_once() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/page"))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("Set-Cookie", "td=rotated; path=/")
                    .set_body_string("ok"),
            )
            .expect(2)
            .mount(&server)
            .await;

        let client = test_client(&server);
        let text = client
            .get_response(&format!("{}/page", server.uri()), NO_QUERY)
            .await
            .expect("failed to get page")
            .text()
            .await
            .expect("failed to read body");
        assert_eq!(text, "ok");
        assert_eq!(client.cookies().get("td").map(String::as_str), Some("rotated"));
    }

    #[tokio::test]
    async fn loaded_cookies_are_sent() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/page"))
            .and(wiremock::matchers::header("cookie", "auth=secret"))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        let client = test_client(&server);
        client
            .load_cookies(&CookieMap::from([("auth".to_string(), "secret".to_string())]))
            .expect("failed to load cookies");
        client
            .get_response(&format!("{}/page", server.uri()), NO_QUERY)
            .await
            .expect("cookies were not sent");
    }

    #[tokio::test]
    async fn rotated_cookie_replaces_loaded_cookie() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/someone/gallery/1"))
            .respond_with(
                ResponseTemplate::new(200).insert_header("Set-Cookie", "td=new; Path=/someone"),
            )
            .mount(&server)
            .await;

        let url = format!("{}/someone/gallery/1", server.uri());
        for _ in 0..16 {
            let client = test_client(&server);
            client
                .load_cookies(&CookieMap::from([("td".to_string(), "old".to_string())]))
                .expect("failed to load cookies");
            client
                .get_response(&url, NO_QUERY)
                .await
                .expect("failed to get page");

            assert_eq!(client.cookies().get("td").map(String::as_str), Some("new"));
        }
    }

    #[tokio::test]
    async fn bad_status_is_an_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/page"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let client = test_client(&server);
        let error = client
            .get_response(&format!("{}/page", server.uri()), NO_QUERY)
            .await
            .expect_err("accepted a 404");
        assert!(matches!(error, Error::InvalidStatus(status) if status.as_u16() == 404));
        assert!(!error.is_session_expired());
    }

    #[tokio::test]
    async fn deviation_page_image() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/someone/art/Thing-1"))
            .respond_with(ResponseTemplate::new(200).set_body_string(
                "<html><body><img class=\"_2NIJr\" src=\"https://images.example/thing.png\"></body></html>",
            ))
            .mount(&server)
            .await;

        let client = test_client(&server);
        let url = Url::parse(&format!("{}/someone/art/Thing-1", server.uri()))
            .expect("invalid url");
        let page = client
            .get_deviation_page(&url)
            .await
            .expect("failed to get deviation page");
        assert_eq!(page.image_url, "https://images.example/thing.png");
    }
}
