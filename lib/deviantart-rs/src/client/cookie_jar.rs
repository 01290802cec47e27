use crate::Error;
use cookie_store::{
    CookieDomain,
    CookieStore,
    RawCookie,
};
use std::collections::{
    btree_map::Entry,
    BTreeMap,
};
use url::Url;

/// A flat mapping of cookie names to values.
///
/// This is the format of the cookie file,
/// which is usually copied out of a logged in browser.
pub type CookieMap = BTreeMap<String, String>;

/// Read a [`CookieMap`] from a json object.
pub fn read_cookie_map<R>(reader: R) -> Result<CookieMap, Error>
where
    R: std::io::Read,
{
    Ok(serde_json::from_reader(reader)?)
}

/// Write a [`CookieMap`] as a pretty json object.
pub fn write_cookie_map<W>(cookies: &CookieMap, mut writer: W) -> Result<(), Error>
where
    W: std::io::Write,
{
    serde_json::to_writer_pretty(&mut writer, cookies)?;
    writer.write_all(b"\n")?;
    Ok(())
}

/// Insert every cookie of a [`CookieMap`] into a [`CookieStore`], scoped to the given url.
///
/// If the url has a domain, cookies are valid for that domain and its subdomains.
pub fn insert_cookie_map(
    cookie_store: &mut CookieStore,
    cookies: &CookieMap,
    url: &Url,
) -> Result<(), Error> {
    for (name, value) in cookies.iter() {
        let mut cookie = RawCookie::new(name.clone(), value.clone());
        cookie.set_path("/");
        if let Some(domain) = url.domain() {
            cookie.set_domain(domain.to_string());
        }

        cookie_store
            .insert_raw(&cookie, url)
            .map_err(|e| Error::CookieStore(e.into()))?;
    }

    Ok(())
}

/// The domain cookies inserted by [`insert_cookie_map`] are stored under.
fn loaded_domain(url: &Url) -> Option<CookieDomain> {
    match url.domain() {
        Some(domain) => Some(CookieDomain::Suffix(domain.to_string())),
        None => CookieDomain::host_only(url).ok(),
    }
}

/// Flatten the unexpired cookies of a [`CookieStore`] into a [`CookieMap`].
///
/// `url` is the url the cookie file was loaded for.
/// A server may set a cookie with the same name under another domain or path,
/// in which case the store holds both.
/// The server's copy is kept over the loaded one,
/// then the one with the longest path, so the result does not depend on iteration order.
pub fn to_cookie_map(cookie_store: &CookieStore, url: &Url) -> CookieMap {
    let loaded_domain = loaded_domain(url);

    let mut ranked = BTreeMap::new();
    for cookie in cookie_store.iter_unexpired() {
        let path: &str = &cookie.path;
        let is_loaded = path == "/" && Some(&cookie.domain) == loaded_domain.as_ref();
        let rank = (!is_loaded, path.len(), cookie.domain.clone());
        let value = cookie.value().to_string();

        match ranked.entry(cookie.name().to_string()) {
            Entry::Vacant(entry) => {
                entry.insert((rank, value));
            }
            Entry::Occupied(mut entry) => {
                if rank > entry.get().0 {
                    entry.insert((rank, value));
                }
            }
        }
    }

    ranked
        .into_iter()
        .map(|(name, (_rank, value))| (name, value))
        .collect()
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn round_trip_ignores_insertion_order() {
        let url = Url::parse("https://deviantart.com/").expect("invalid url");

        let mut forward = CookieStore::default();
        let mut backward = CookieStore::default();
        let pairs = [("auth", "a1"), ("auth_secure", "b2"), ("userinfo", "c3")];

        for (name, value) in pairs.iter() {
            let cookies = CookieMap::from([(name.to_string(), value.to_string())]);
            insert_cookie_map(&mut forward, &cookies, &url).expect("failed to insert");
        }
        for (name, value) in pairs.iter().rev() {
            let cookies = CookieMap::from([(name.to_string(), value.to_string())]);
            insert_cookie_map(&mut backward, &cookies, &url).expect("failed to insert");
        }

        let mut forward_file = Vec::new();
        write_cookie_map(&to_cookie_map(&forward, &url), &mut forward_file)
            .expect("failed to write");
        let mut backward_file = Vec::new();
        write_cookie_map(&to_cookie_map(&backward, &url), &mut backward_file)
            .expect("failed to write");
        assert_eq!(forward_file, backward_file);

        let reloaded = read_cookie_map(forward_file.as_slice()).expect("failed to read");
        let expected: CookieMap = pairs
            .iter()
            .map(|(name, value)| (name.to_string(), value.to_string()))
            .collect();
        assert_eq!(reloaded, expected);

        let mut reloaded_store = CookieStore::default();
        insert_cookie_map(&mut reloaded_store, &reloaded, &url).expect("failed to insert");
        assert_eq!(to_cookie_map(&reloaded_store, &url), expected);
    }

    #[test]
    fn cookies_match_subdomains() {
        let url = Url::parse("https://deviantart.com/").expect("invalid url");
        let mut cookie_store = CookieStore::default();
        let cookies = CookieMap::from([("auth".to_string(), "secret".to_string())]);
        insert_cookie_map(&mut cookie_store, &cookies, &url).expect("failed to insert");

        let www = Url::parse("https://www.deviantart.com/someone/gallery/all")
            .expect("invalid url");
        let sent: Vec<_> = cookie_store
            .get_request_values(&www)
            .map(|(name, value)| (name.to_string(), value.to_string()))
            .collect();
        assert_eq!(sent, vec![("auth".to_string(), "secret".to_string())]);
    }

    #[test]
    fn server_cookie_wins_over_loaded_cookie() {
        let url = Url::parse("https://deviantart.com/").expect("invalid url");
        let page = Url::parse("https://www.deviantart.com/someone/gallery/all")
            .expect("invalid url");
        let loaded = CookieMap::from([
            ("td".to_string(), "old".to_string()),
            ("auth".to_string(), "secret".to_string()),
        ]);

        // Each store hashes differently, so repeat to cover iteration orders.
        for _ in 0..32 {
            let mut cookie_store = CookieStore::default();
            insert_cookie_map(&mut cookie_store, &loaded, &url).expect("failed to insert");

            let rotated = RawCookie::parse("td=new; Path=/someone").expect("invalid cookie");
            cookie_store
                .insert_raw(&rotated, &page)
                .expect("failed to insert rotated cookie");

            let cookies = to_cookie_map(&cookie_store, &url);
            assert_eq!(cookies.get("td").map(String::as_str), Some("new"));
            assert_eq!(cookies.get("auth").map(String::as_str), Some("secret"));
        }
    }

    #[test]
    fn invalid_json_is_an_error() {
        let result = read_cookie_map("not json".as_bytes());
        assert!(matches!(result, Err(Error::Json(_))));
    }
}
