use deviantart::SkippedItem;
use std::fmt::Write;
use url::Url;

/// The outcome of a download run.
#[derive(Debug, Default)]
pub struct DownloadReport {
    /// The number of images written to disk
    pub downloaded: u64,

    /// Image urls that could not be downloaded or saved
    pub failed_downloads: Vec<Url>,

    /// Gallery results that never produced an image url
    pub skipped: Vec<SkippedItem>,
}

impl DownloadReport {
    /// Returns `true` if nothing failed or was skipped.
    pub fn is_clean(&self) -> bool {
        self.failed_downloads.is_empty() && self.skipped.is_empty()
    }

    /// The number of problems in this report
    pub fn error_count(&self) -> usize {
        self.failed_downloads.len() + self.skipped.len()
    }

    /// Render the end-of-run summary.
    pub fn summary(&self) -> String {
        let mut summary = String::new();

        // Writing to a `String` cannot fail.
        let _ = writeln!(summary, "Downloaded {} images", self.downloaded);
        if self.is_clean() {
            summary.push_str("All images downloaded successfully.\n");
            return summary;
        }

        summary.push_str("Errors occurred during download:\n");
        for item in self.skipped.iter() {
            let _ = writeln!(summary, "  skipped {item}");
        }
        for url in self.failed_downloads.iter() {
            let _ = writeln!(summary, "  failed {url}");
        }
        let _ = writeln!(summary, "Total errors: {}", self.error_count());

        summary
    }
}
