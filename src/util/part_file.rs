use std::{
    ops::{
        Deref,
        DerefMut,
    },
    path::{
        Path,
        PathBuf,
    },
};
use tokio::{
    fs::File,
    io::AsyncWriteExt,
};
use tracing::warn;

/// A `.part` file that is removed on drop unless it is renamed into place.
///
/// Data is written next to the destination and only moved there when complete,
/// so an existing file at the destination is always a finished download.
#[derive(Debug)]
pub struct PartFile {
    /// The file
    file: File,

    /// The temporary path
    part_path: PathBuf,

    /// The path the file is renamed to when done
    path: PathBuf,

    /// Whether dropping this should remove the file.
    should_remove: bool,
}

impl PartFile {
    /// Create a `.part` file for the given destination.
    pub async fn create<P>(path: P) -> std::io::Result<Self>
    where
        P: AsRef<Path>,
    {
        let path = path.as_ref().to_path_buf();
        let mut part_path = path.clone().into_os_string();
        part_path.push(".part");
        let part_path = PathBuf::from(part_path);

        let file = File::create(&part_path).await?;

        Ok(Self {
            file,
            part_path,
            path,
            should_remove: true,
        })
    }

    /// The temporary path being written to
    pub fn part_path(&self) -> &Path {
        &self.part_path
    }

    /// Sync the data and rename the file to its destination.
    ///
    /// On failure, the `.part` file is removed.
    pub async fn finish(mut self) -> std::io::Result<PathBuf> {
        self.file.flush().await?;
        self.file.sync_all().await?;
        tokio::fs::rename(&self.part_path, &self.path).await?;
        self.should_remove = false;

        Ok(std::mem::take(&mut self.path))
    }
}

impl Deref for PartFile {
    type Target = File;

    fn deref(&self) -> &Self::Target {
        &self.file
    }
}

impl DerefMut for PartFile {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.file
    }
}

impl Drop for PartFile {
    fn drop(&mut self) {
        if !self.should_remove {
            return;
        }

        let path = std::mem::take(&mut self.part_path);
        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                handle.spawn(async move {
                    if let Err(e) = tokio::fs::remove_file(&path).await {
                        warn!("failed to delete '{}': {e}", path.display());
                    }
                });
            }
            Err(_) => {
                if let Err(e) = std::fs::remove_file(&path) {
                    warn!("failed to delete '{}': {e}", path.display());
                }
            }
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[tokio::test]
    async fn finished_file_is_renamed() {
        let dir = tempfile::tempdir().expect("failed to create temp dir");
        let path = dir.path().join("image.png");

        let mut file = PartFile::create(&path)
            .await
            .expect("failed to create file");
        assert_eq!(file.part_path(), dir.path().join("image.png.part"));
        file.write_all(b"testing 1 2 3")
            .await
            .expect("failed to write data");

        let finished_path = file.finish().await.expect("failed to finish file");
        assert_eq!(finished_path, path);
        assert_eq!(
            tokio::fs::read(&path).await.expect("failed to read file"),
            b"testing 1 2 3"
        );
        assert!(!dir.path().join("image.png.part").exists());
    }

    #[test]
    fn dropped_file_is_removed() {
        let dir = tempfile::tempdir().expect("failed to create temp dir");
        let path = dir.path().join("image.png");

        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .expect("failed to build runtime");
        let file = runtime
            .block_on(PartFile::create(&path))
            .expect("failed to create file");
        let part_path = file.part_path().to_path_buf();
        assert!(part_path.exists());

        drop(file);
        assert!(!part_path.exists(), "part file was not removed");
        assert!(!path.exists());
    }
}
