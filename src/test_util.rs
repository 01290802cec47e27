use deviantart::{
    Client,
    CookieStoreMutex,
    SitePolicy,
};
use std::sync::Arc;
use url::Url;
use wiremock::MockServer;

/// Make a client that sends everything to a mock server.
pub fn test_client(server: &MockServer) -> Client {
    let base = Url::parse(&server.uri()).expect("invalid server uri");
    let policy = SitePolicy::with_base_url(&base).expect("invalid policy");
    let cookie_store = Arc::new(CookieStoreMutex::new(Default::default()));
    Client::with_cookie_store(cookie_store, policy, deviantart::USER_AGENT_STR)
        .expect("failed to build client")
}

/// A gallery page for `total` images with a csrf token.
pub fn gallery_page_html(total: u64) -> String {
    format!(
        r#"<html><head><script>window.__CSRF_TOKEN__ = 'csrf123';</script></head>
<body><span class="_1Mrww">{total}</span></body></html>"#
    )
}

/// A gallery api result with a fullview image.
pub fn fullview_result(base_uri: &str, pretty_name: &str) -> serde_json::Value {
    serde_json::json!({
        "url": format!("https://www.deviantart.com/someone/art/{pretty_name}-1"),
        "media": {
            "baseUri": format!("{base_uri}/f/{pretty_name}"),
            "prettyName": pretty_name,
            "token": ["t0"],
            "types": [
                { "t": "preview", "c": "/v1/fit/w_300/<prettyName>-pre.jpg" },
                { "t": "fullview", "c": "/v1/fill/w_1024/<prettyName>-fullview.jpg" },
            ],
        },
    })
}
