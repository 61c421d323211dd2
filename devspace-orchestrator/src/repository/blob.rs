//! Repository blob access
//!
//! Reads committed files out of bare git repositories laid out as
//! `{root}/{project.full_path}.git`.

use async_trait::async_trait;
use devspace_core::domain::project::Project;
use std::path::PathBuf;
use tokio::process::Command;

use super::store::StoreError;

#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Contents of `path` at `git_ref`, or `None` when it does not exist
    async fn read_blob(
        &self,
        project: &Project,
        git_ref: &str,
        path: &str,
    ) -> Result<Option<String>, StoreError>;
}

/// Shells out to `git cat-file`
pub struct GitBlobStore {
    repositories_root: PathBuf,
}

impl GitBlobStore {
    pub fn new(repositories_root: impl Into<PathBuf>) -> Self {
        Self {
            repositories_root: repositories_root.into(),
        }
    }

    fn git_dir(&self, project: &Project) -> PathBuf {
        self.repositories_root
            .join(format!("{}.git", project.full_path))
    }
}

#[async_trait]
impl BlobStore for GitBlobStore {
    async fn read_blob(
        &self,
        project: &Project,
        git_ref: &str,
        path: &str,
    ) -> Result<Option<String>, StoreError> {
        let git_dir = self.git_dir(project);
        let object = format!("{}:{}", git_ref, path);

        tracing::debug!("Reading blob {} from {}", object, git_dir.display());

        let output = Command::new("git")
            .arg("--git-dir")
            .arg(&git_dir)
            .args(["cat-file", "blob", &object])
            .output()
            .await
            .map_err(|e| StoreError::Repository(format!("failed to run git: {}", e)))?;

        if !output.status.success() {
            tracing::debug!(
                "git cat-file exited with {}: {}",
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            );
            return Ok(None);
        }

        String::from_utf8(output.stdout)
            .map(Some)
            .map_err(|_| StoreError::Repository(format!("blob {} is not valid UTF-8", object)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn project() -> Project {
        Project {
            id: 3,
            name: "Demo".to_string(),
            path: "demo".to_string(),
            full_path: "group/sub/demo".to_string(),
            organization_id: 1,
            namespace_id: 11,
            namespace_traversal_ids: vec![10, 11],
        }
    }

    #[test]
    fn test_git_dir_layout() {
        let store = GitBlobStore::new("/srv/repositories");
        assert_eq!(
            store.git_dir(&project()),
            PathBuf::from("/srv/repositories/group/sub/demo.git")
        );
    }

    #[tokio::test]
    async fn test_missing_repository_reads_as_absent() {
        let store = GitBlobStore::new("/nonexistent/devspace-test-root");
        match store.read_blob(&project(), "main", ".devfile.yaml").await {
            Ok(blob) => assert!(blob.is_none()),
            // git may be absent on the test host
            Err(StoreError::Repository(_)) => {}
            Err(other) => panic!("unexpected error: {}", other),
        }
    }
}
