use tracing::debug;

use super::context::{Identified, Loaded};
use super::error::CreateError;
use crate::repository::blob::BlobStore;

/// Reads the requested devfile, or takes the default template when no path
/// was given. The repository is never consulted for the default.
pub async fn load(
    blobs: &dyn BlobStore,
    default_devfile: &str,
    identified: Identified,
) -> Result<Loaded, CreateError> {
    let Some(path) = identified.params.devfile_path.clone() else {
        debug!(
            workspace = %identified.workspace_name,
            "No devfile path given, using default devfile"
        );
        return Ok(Loaded::new(identified, default_devfile.to_string()));
    };

    let git_ref = &identified.params.project_ref;
    let blob = blobs
        .read_blob(&identified.params.project, git_ref, &path)
        .await?;

    match blob {
        None => Err(CreateError::DevfileLoadFailed {
            details: format!(
                "Devfile path '{}' at ref '{}' does not exist in the project repository",
                path, git_ref
            ),
        }),
        Some(content) if content.is_empty() => Err(CreateError::DevfileLoadFailed {
            details: "Devfile could not be loaded from project".to_string(),
        }),
        Some(content) => Ok(Loaded::new(identified, content)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryBlobStore;
    use crate::service::create::test_support;

    fn identified(devfile_path: Option<&str>) -> Identified {
        let mut params = test_support::params();
        params.devfile_path = devfile_path.map(str::to_string);
        Identified {
            params,
            agent_config: test_support::agent_config(),
            workspace_name: "workspace-1-2-abc123".to_string(),
            workspace_namespace: "gl-rd-ns-1-2-abc123".to_string(),
        }
    }

    #[tokio::test]
    async fn test_default_devfile_reads_no_blobs() {
        let blobs = MemoryBlobStore::new();
        blobs.insert(3, "main", ".devfile.yaml", "should not be read");

        let loaded = load(&blobs, "default: true\n", identified(None))
            .await
            .unwrap();

        assert_eq!(loaded.devfile_yaml, "default: true\n");
        assert_eq!(blobs.read_count(), 0);
    }

    #[tokio::test]
    async fn test_explicit_path_is_read() {
        let blobs = MemoryBlobStore::new();
        blobs.insert(3, "main", ".devfile.yaml", "schemaVersion: 2.2.0\n");

        let loaded = load(&blobs, "default", identified(Some(".devfile.yaml")))
            .await
            .unwrap();

        assert_eq!(loaded.devfile_yaml, "schemaVersion: 2.2.0\n");
        assert_eq!(blobs.read_count(), 1);
    }

    #[tokio::test]
    async fn test_missing_path_does_not_fall_back() {
        let blobs = MemoryBlobStore::new();

        let err = load(&blobs, "default", identified(Some("missing.yaml")))
            .await
            .unwrap_err();

        assert_eq!(
            err.to_string(),
            "Devfile path 'missing.yaml' at ref 'main' does not exist in the project repository"
        );
    }

    #[tokio::test]
    async fn test_empty_blob() {
        let blobs = MemoryBlobStore::new();
        blobs.insert(3, "main", "empty.yaml", "");

        let err = load(&blobs, "default", identified(Some("empty.yaml")))
            .await
            .unwrap_err();

        assert_eq!(err.to_string(), "Devfile could not be loaded from project");
    }
}
