use crate::{
    report::DownloadReport,
    util::PartFile,
};
use anyhow::Context;
use deviantart::Client;
use std::path::{
    Path,
    PathBuf,
};
use tokio::io::AsyncWriteExt;
use tracing::{
    error,
    info,
};
use url::Url;

/// Get the file name of an image url, the last segment of its path.
pub fn file_name_from_url(url: &Url) -> Option<&str> {
    url.path_segments()?
        .last()
        .filter(|name| !name.is_empty() && *name != "." && *name != "..")
}

/// Writes images under `<download_dir>/<artist>/`.
#[derive(Debug, Clone)]
pub struct Downloader {
    download_dir: PathBuf,
}

impl Downloader {
    /// Make a new [`Downloader`].
    pub fn new<P>(download_dir: P) -> Self
    where
        P: Into<PathBuf>,
    {
        Self {
            download_dir: download_dir.into(),
        }
    }

    /// Create the folder for an artist if it does not exist.
    pub async fn create_artist_dir(&self, artist: &str) -> anyhow::Result<PathBuf> {
        let artist_dir = self.download_dir.join(artist);
        tokio::fs::create_dir_all(&artist_dir)
            .await
            .with_context(|| format!("failed to create '{}'", artist_dir.display()))?;
        Ok(artist_dir)
    }

    /// Download one image into a folder, returning the path it was saved to.
    pub async fn save_image(
        &self,
        client: &Client,
        url: &Url,
        artist_dir: &Path,
    ) -> anyhow::Result<PathBuf> {
        let file_name = file_name_from_url(url).context("image url has no file name")?;
        let path = artist_dir.join(file_name);

        let mut response = client
            .get_image(url)
            .await
            .context("failed to get image")?;

        let mut file = PartFile::create(&path)
            .await
            .with_context(|| format!("failed to create '{}'", path.display()))?;
        while let Some(chunk) = response.chunk().await.context("failed to get next chunk")? {
            file.write_all(&chunk)
                .await
                .with_context(|| format!("failed to write to '{}'", file.part_path().display()))?;
        }

        file.finish()
            .await
            .with_context(|| format!("failed to finish '{}'", path.display()))
    }

    /// Download every url in order, recording the results.
    ///
    /// A failed image is logged and skipped.
    pub async fn download_all(
        &self,
        client: &Client,
        urls: &[Url],
        artist_dir: &Path,
        report: &mut DownloadReport,
    ) {
        for url in urls {
            match self.save_image(client, url, artist_dir).await {
                Ok(path) => {
                    info!("saved '{}'", path.display());
                    report.downloaded += 1;
                }
                Err(e) => {
                    error!("failed to download '{url}': {e:?}");
                    report.failed_downloads.push(url.clone());
                }
            }
        }
    }
}
