pub mod deviation;
pub mod gallery;

use url::Url;

/// The kind of page a url points to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target {
    /// A gallery folder, `/<artist>/gallery/<folder id>`
    Gallery,

    /// A single deviation, `/<artist>/art/<name>`
    Deviation,
}

impl Target {
    /// Guess what a url points to from its path.
    pub fn from_url(url: &Url) -> Option<Self> {
        let path = url.path();
        if path.contains("/art/") {
            Some(Self::Deviation)
        } else if path.contains("/gallery/") {
            Some(Self::Gallery)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn targets() {
        let target = |url: &str| Target::from_url(&Url::parse(url).expect("invalid url"));

        assert_eq!(
            target("https://www.deviantart.com/someone/gallery/12345/cats"),
            Some(Target::Gallery)
        );
        assert_eq!(
            target("https://www.deviantart.com/someone/art/Cat-98765"),
            Some(Target::Deviation)
        );
        assert_eq!(target("https://www.deviantart.com/someone"), None);
    }
}
