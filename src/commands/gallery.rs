use crate::{
    download::Downloader,
    report::DownloadReport,
};
use anyhow::Context;
use deviantart::Client;
use tracing::{
    error,
    info,
    warn,
};
use url::Url;

/// Download every image of a gallery folder.
///
/// Batches are downloaded as they are fetched.
/// A failed api call ends the walk but keeps what was downloaded,
/// while an expired session aborts the run.
#[tracing::instrument(skip(client, downloader, report), fields(url = %url))]
pub async fn run(
    client: &Client,
    downloader: &Downloader,
    url: &Url,
    report: &mut DownloadReport,
) -> anyhow::Result<()> {
    let mut walk = client
        .walk_gallery(url)
        .await
        .context("failed to load gallery page")?;

    let artist_dir = downloader.create_artist_dir(walk.username()).await?;
    info!(
        "downloading {} images from '{}'",
        walk.total_images(),
        walk.username()
    );

    loop {
        let batch = match walk.next_batch().await {
            Ok(Some(batch)) => batch,
            Ok(None) => break,
            Err(e) if e.is_session_expired() => {
                return Err(e).context("session expired while walking the gallery");
            }
            Err(e) => {
                error!("gallery walk ended early: {e}");
                break;
            }
        };

        for item in batch.skipped.iter() {
            warn!("skipping {item}");
        }
        report.skipped.extend(batch.skipped);

        downloader
            .download_all(client, &batch.urls, &artist_dir, report)
            .await;
    }

    Ok(())
}
