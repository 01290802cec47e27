use crate::{
    download::Downloader,
    report::DownloadReport,
};
use anyhow::Context;
use deviantart::{
    gallery::artist_from_url,
    Client,
};
use tracing::info;
use url::Url;

/// Download the main image of a single deviation page.
#[tracing::instrument(skip(client, downloader, report), fields(url = %url))]
pub async fn run(
    client: &Client,
    downloader: &Downloader,
    url: &Url,
    report: &mut DownloadReport,
) -> anyhow::Result<()> {
    let page = client
        .get_deviation_page(url)
        .await
        .context("failed to load deviation page")?;
    let image_url = url
        .join(&page.image_url)
        .with_context(|| format!("invalid image url '{}'", page.image_url))?;
    info!("found image '{image_url}'");

    let artist_dir = downloader
        .create_artist_dir(&artist_from_url(url))
        .await?;
    downloader
        .download_all(client, &[image_url], &artist_dir, report)
        .await;

    Ok(())
}
