//! Repository API
//!
//! Entry points callers use: look up the revision holding a blob at a path, and
//! check whether an object exists. The repository binds one set of history
//! collaborators together with the search settings.

use crate::config::SearchConfig;
use crate::error::{ApiError, ObjectError};
use crate::history::{EntryLocator, GitRepository, ObjectStore, RevisionSource, SnapshotResolver};
use crate::search::{SearchCoordinator, SearchOutcome};
use crate::types::{ContentHash, Entry, EntryPath};
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info};

/// A searchable repository.
pub struct Repository {
    coordinator: SearchCoordinator,
    objects: Arc<dyn ObjectStore>,
}

impl Repository {
    /// Open a git repository at `path`.
    pub async fn open(path: &Path, config: SearchConfig) -> Result<Self, ApiError> {
        config.validate().map_err(ApiError::ConfigError)?;
        let git = GitRepository::new(path).with_git_binary(config.git_binary.clone());
        if !git.is_repository().await {
            return Err(ApiError::NotARepository(path.to_path_buf()));
        }
        info!(repo = %path.display(), "opened repository");
        Ok(Self::from_backend(Arc::new(git), config))
    }

    /// Build a repository over any backend that provides every collaborator.
    pub fn from_backend<B>(backend: Arc<B>, config: SearchConfig) -> Self
    where
        B: RevisionSource + SnapshotResolver + EntryLocator + ObjectStore + 'static,
    {
        Self::from_parts(
            backend.clone(),
            backend.clone(),
            backend.clone(),
            backend,
            config,
        )
    }

    pub fn from_parts(
        source: Arc<dyn RevisionSource>,
        resolver: Arc<dyn SnapshotResolver>,
        locator: Arc<dyn EntryLocator>,
        objects: Arc<dyn ObjectStore>,
        config: SearchConfig,
    ) -> Self {
        Self {
            coordinator: SearchCoordinator::new(source, resolver, locator, config),
            objects,
        }
    }

    pub fn search_config(&self) -> &SearchConfig {
        self.coordinator.config()
    }

    /// Find the first listed revision holding the blob `hash` at `path`.
    ///
    /// Both arguments are parsed before any history is listed.
    pub async fn blob_in_path(&self, hash: &str, path: &str) -> Result<Entry, ApiError> {
        let hash = ContentHash::from_hex(hash).map_err(|e| match e {
            ObjectError::InvalidId(raw) => ApiError::InvalidHash(raw),
            other => ApiError::ObjectError(other),
        })?;
        let path = EntryPath::parse(path).map_err(|e| match e {
            ObjectError::InvalidPath(raw) => ApiError::InvalidPath(raw),
            other => ApiError::ObjectError(other),
        })?;

        debug!(hash = %hash, path = %path, "searching revisions for blob");
        let entry = self.find(hash, &path).await.into_result(hash, &path)?;
        Ok(entry)
    }

    /// Typed search returning the full outcome.
    pub async fn find(&self, hash: ContentHash, path: &EntryPath) -> SearchOutcome {
        self.coordinator.search(hash, path).await
    }

    /// True if the object named by `object` exists in the repository.
    pub async fn object_exists(&self, object: &str) -> bool {
        self.objects.object_exists(object.trim()).await
    }
}
