use anyhow::Context;
use camino::Utf8Path;
use deviantart::{
    client::cookie_jar,
    CookieMap,
};
use tracing::warn;

/// Load the cookie file.
///
/// A missing or unreadable file is an empty map, so the caller can tell the user to log in.
pub async fn load(path: &Utf8Path) -> anyhow::Result<CookieMap> {
    let data = match tokio::fs::read(path).await {
        Ok(data) => data,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            warn!("cookie file '{path}' does not exist");
            return Ok(CookieMap::new());
        }
        Err(e) => {
            return Err(e).with_context(|| format!("failed to read cookie file '{path}'"));
        }
    };

    match cookie_jar::read_cookie_map(data.as_slice()) {
        Ok(cookies) => Ok(cookies),
        Err(e) => {
            warn!("invalid json in cookie file '{path}': {e}");
            Ok(CookieMap::new())
        }
    }
}

/// Overwrite the cookie file.
pub async fn save(path: &Utf8Path, cookies: &CookieMap) -> anyhow::Result<()> {
    let mut data = Vec::new();
    cookie_jar::write_cookie_map(cookies, &mut data).context("failed to serialize cookies")?;

    if let Some(parent) = path.parent().filter(|parent| !parent.as_str().is_empty()) {
        tokio::fs::create_dir_all(parent)
            .await
            .with_context(|| format!("failed to create '{parent}'"))?;
    }
    tokio::fs::write(path, data)
        .await
        .with_context(|| format!("failed to write cookie file '{path}'"))
}
