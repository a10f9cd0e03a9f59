use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::error::ResolverError;

use super::DatasetFetcher;

/// Reads dataset files from a local directory tree.
#[derive(Debug, Clone)]
pub struct FsFetcher {
    root: PathBuf,
}

impl FsFetcher {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl DatasetFetcher for FsFetcher {
    async fn fetch_text(&self, path: &str) -> Result<String, ResolverError> {
        let full = self.root.join(path.trim_start_matches('/'));
        tokio::fs::read_to_string(&full)
            .await
            .map_err(|source| match source.kind() {
                ErrorKind::NotFound => ResolverError::NotFound {
                    path: path.to_owned(),
                },
                _ => ResolverError::Io {
                    path: full.display().to_string(),
                    source,
                },
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!(
            "bftmap-fs-{name}-{}",
            std::process::id()
        ));
        let _ = std::fs::remove_dir_all(&dir);
        std::fs::create_dir_all(dir.join("data/lightweight")).unwrap();
        dir
    }

    #[tokio::test]
    async fn reads_file_relative_to_root() {
        let dir = scratch_dir("read");
        std::fs::write(
            dir.join("data/lightweight/integrated_public.csv"),
            "name,lng,lat\n",
        )
        .unwrap();

        let fetcher = FsFetcher::new(&dir);
        let body = fetcher
            .fetch_text("data/lightweight/integrated_public.csv")
            .await
            .unwrap();
        assert_eq!(body, "name,lng,lat\n");

        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[tokio::test]
    async fn missing_file_maps_to_not_found() {
        let dir = scratch_dir("missing");
        let fetcher = FsFetcher::new(&dir);
        let err = fetcher.fetch_text("data/nope.csv").await.unwrap_err();
        assert!(
            matches!(err, ResolverError::NotFound { ref path } if path == "data/nope.csv"),
            "got {err:?}"
        );
        std::fs::remove_dir_all(&dir).unwrap();
    }
}
