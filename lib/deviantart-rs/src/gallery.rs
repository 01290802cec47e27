use crate::{
    Client,
    Error,
    SkippedItem,
};
use tracing::{
    debug,
    info,
};
use url::Url;

const GALLERY_SEGMENT: &str = "/gallery/";
const UNKNOWN_ARTIST: &str = "unknown_artist";

/// Get the artist name from a deviantart url.
///
/// This is the first path segment, or `unknown_artist` if there is none.
pub fn artist_from_url(url: &Url) -> String {
    url.path_segments()
        .and_then(|mut segments| segments.find(|segment| !segment.is_empty()))
        .unwrap_or(UNKNOWN_ARTIST)
        .to_string()
}

/// Get the folder id from a gallery url, the path segment after `/gallery/`.
pub fn folder_id_from_url(url: &Url) -> Option<String> {
    let path = url.path();
    let start = path.find(GALLERY_SEGMENT)? + GALLERY_SEGMENT.len();
    let folder_id = path[start..].split('/').next()?;

    if folder_id.is_empty() {
        return None;
    }

    Some(folder_id.to_string())
}

/// The position of a [`GalleryWalk`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GalleryCursor {
    /// The offset of the next api call
    pub offset: u64,

    /// The gallery folder
    pub folder_id: String,

    /// Whether another api call should be made
    pub has_more: bool,
}

impl GalleryCursor {
    /// Make a cursor at the start of a folder
    pub fn new(folder_id: String) -> Self {
        Self {
            offset: 0,
            folder_id,
            has_more: true,
        }
    }

    /// Move past a page.
    ///
    /// The walk stops if the api has no more pages, or if the next offset would not advance.
    fn advance(&mut self, has_more: bool, next_offset: u64) {
        if has_more && next_offset > self.offset {
            self.offset = next_offset;
        } else {
            self.has_more = false;
        }
    }

    /// Stop the walk
    fn finish(&mut self) {
        self.has_more = false;
    }
}

/// The image urls resolved from one api call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GalleryBatch {
    /// The offset the batch was requested with
    pub offset: u64,

    /// Image urls, in gallery order
    pub urls: Vec<Url>,

    /// Results that did not produce a url
    pub skipped: Vec<SkippedItem>,
}

impl GalleryBatch {
    /// Append another batch to this one.
    pub fn extend(&mut self, other: GalleryBatch) {
        self.urls.extend(other.urls);
        self.skipped.extend(other.skipped);
    }
}

/// A walk over the pages of a gallery folder.
///
/// This is consumed as it goes and cannot be restarted.
#[derive(Debug)]
pub struct GalleryWalk<'a> {
    client: &'a Client,
    username: String,
    csrf_token: String,
    total_images: u64,
    limit: u64,
    cursor: GalleryCursor,
}

impl<'a> GalleryWalk<'a> {
    /// Start walking a folder of a user's gallery.
    pub fn new(
        client: &'a Client,
        username: String,
        folder_id: String,
        csrf_token: String,
        total_images: u64,
    ) -> Self {
        Self {
            client,
            username,
            csrf_token,
            total_images,
            limit: client.policy().gallery_page_size,
            cursor: GalleryCursor::new(folder_id),
        }
    }

    /// The gallery owner
    pub fn username(&self) -> &str {
        &self.username
    }

    /// The number of images the gallery page claims to have
    pub fn total_images(&self) -> u64 {
        self.total_images
    }

    /// The current position
    pub fn cursor(&self) -> &GalleryCursor {
        &self.cursor
    }

    /// Fetch the next batch.
    ///
    /// Returns `Ok(None)` once the walk is done.
    /// Any error also ends the walk.
    pub async fn next_batch(&mut self) -> Result<Option<GalleryBatch>, Error> {
        if !self.cursor.has_more {
            return Ok(None);
        }

        let offset = self.cursor.offset;
        let contents = match self
            .client
            .get_gallery_contents(
                &self.username,
                &self.cursor.folder_id,
                offset,
                self.limit,
                &self.csrf_token,
            )
            .await
        {
            Ok(Some(contents)) => contents,
            Ok(None) => {
                info!("no gallery results at offset {offset}");
                self.cursor.finish();
                return Ok(None);
            }
            Err(error) => {
                self.cursor.finish();
                return Err(error);
            }
        };

        let (urls, skipped) = contents.resolve_image_urls();
        debug!(
            "offset {offset}: {} urls, {} skipped",
            urls.len(),
            skipped.len()
        );

        let next_offset = contents
            .next_offset
            .unwrap_or_else(|| offset.saturating_add(self.limit));
        self.cursor.advance(contents.has_more, next_offset);

        Ok(Some(GalleryBatch {
            offset,
            urls,
            skipped,
        }))
    }

    /// Walk the rest of the gallery, merging every batch into one.
    pub async fn collect(mut self) -> Result<GalleryBatch, Error> {
        let mut all = GalleryBatch {
            offset: self.cursor.offset,
            ..Default::default()
        };

        while let Some(batch) = self.next_batch().await? {
            all.extend(batch);
        }

        Ok(all)
    }
}
