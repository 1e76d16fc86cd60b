//! Where content comes from.
//!
//! The CMS export layout on disk:
//!
//! ```text
//! <root>/globals/homepage.json
//! <root>/<collection>/<slug>.json
//! <root>/users/<id>.json
//! ```

use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use folio_content::{Author, Collection, ContentError, Document, Homepage};
use serde::de::DeserializeOwned;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

impl From<SourceError> for ContentError {
    fn from(err: SourceError) -> Self {
        ContentError::upstream(err.to_string())
    }
}

/// Read access to CMS content, with relationships populated one level deep.
#[async_trait]
pub trait ContentSource: Send + Sync {
    async fn homepage(&self) -> Result<Option<Homepage>, SourceError>;

    async fn document(
        &self,
        collection: Collection,
        slug: &str,
    ) -> Result<Option<Document>, SourceError>;

    /// Looks up users by id; unknown ids are left out of the map.
    async fn authors(&self, ids: &[&str]) -> Result<HashMap<String, Author>, SourceError>;
}

/// Content exported to JSON files under one directory.
#[derive(Debug, Clone)]
pub struct FsContentSource {
    root: PathBuf,
}

impl FsContentSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    async fn read_json<T: DeserializeOwned>(&self, path: PathBuf) -> Result<Option<T>, SourceError> {
        let raw = match tokio::fs::read_to_string(&path).await {
            Ok(raw) => raw,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(source) => return Err(SourceError::Io { path, source }),
        };
        serde_json::from_str(&raw)
            .map(Some)
            .map_err(|source| SourceError::Parse { path, source })
    }
}

/// Slugs and ids become file names; anything that could leave the
/// collection directory is treated as missing.
fn is_safe_segment(segment: &str) -> bool {
    !segment.is_empty()
        && segment != "."
        && segment != ".."
        && !segment.contains(['/', '\\'])
}

#[async_trait]
impl ContentSource for FsContentSource {
    async fn homepage(&self) -> Result<Option<Homepage>, SourceError> {
        self.read_json(self.root.join("globals").join("homepage.json"))
            .await
    }

    async fn document(
        &self,
        collection: Collection,
        slug: &str,
    ) -> Result<Option<Document>, SourceError> {
        if !is_safe_segment(slug) {
            return Ok(None);
        }
        let path = self
            .root
            .join(collection.slug())
            .join(format!("{slug}.json"));
        self.read_json(path).await
    }

    async fn authors(&self, ids: &[&str]) -> Result<HashMap<String, Author>, SourceError> {
        let mut found = HashMap::new();
        for id in ids.iter().copied().filter(|id| is_safe_segment(id)) {
            let path = self.root.join("users").join(format!("{id}.json"));
            if let Some(mut author) = self.read_json::<Author>(path).await? {
                if author.id.is_empty() {
                    author.id = id.to_string();
                }
                found.insert(id.to_string(), author);
            }
        }
        Ok(found)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn fixture() -> tempfile::TempDir {
        let dir = tempfile::tempdir().expect("tempdir");
        fs::create_dir_all(dir.path().join("posts")).expect("posts dir");
        fs::create_dir_all(dir.path().join("users")).expect("users dir");
        fs::write(
            dir.path().join("posts").join("hello.json"),
            r#"{"slug":"hello","_status":"published","authors":["u1"]}"#,
        )
        .expect("post");
        fs::write(
            dir.path().join("users").join("u1.json"),
            r#"{"id":"u1","name":"Upasana"}"#,
        )
        .expect("user");
        fs::write(dir.path().join("posts").join("broken.json"), "{").expect("broken");
        dir
    }

    #[tokio::test]
    async fn reads_documents_and_authors() {
        let dir = fixture();
        let source = FsContentSource::new(dir.path());
        let doc = source
            .document(Collection::Posts, "hello")
            .await
            .expect("read")
            .expect("present");
        assert!(doc.is_published());

        let authors = source.authors(&["u1", "nobody"]).await.expect("authors");
        assert_eq!(authors.len(), 1);
        assert_eq!(authors["u1"].name.as_deref(), Some("Upasana"));
    }

    #[tokio::test]
    async fn missing_files_are_none() {
        let dir = fixture();
        let source = FsContentSource::new(dir.path());
        assert!(source.homepage().await.expect("read").is_none());
        assert!(
            source
                .document(Collection::Pages, "about")
                .await
                .expect("read")
                .is_none()
        );
        assert!(
            source
                .document(Collection::Posts, "..")
                .await
                .expect("read")
                .is_none()
        );
    }

    #[tokio::test]
    async fn malformed_json_is_upstream_failure() {
        let dir = fixture();
        let source = FsContentSource::new(dir.path());
        let err = source
            .document(Collection::Posts, "broken")
            .await
            .unwrap_err();
        assert!(matches!(err, SourceError::Parse { .. }));
        assert!(matches!(
            ContentError::from(err),
            ContentError::UpstreamFetchFailure(_)
        ));
    }
}
