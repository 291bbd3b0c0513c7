//! Isolated per-execution workspace: a fresh directory keyed by
//! `execution_id`, destroyed on every exit path. Grounded on the original
//! `terraform-executor/app/utils/workspace.py`'s create/copy_files/cleanup
//! lifecycle, translated to `tokio::fs` and an explicit `destroy` the caller
//! invokes on every branch rather than relying solely on `Drop`.

use std::path::{Path, PathBuf};

use uuid::Uuid;

use crate::error::{ExecutorError, ExecutorResult};

pub struct Workspace {
    pub execution_id: Uuid,
    pub path: PathBuf,
}

impl Workspace {
    pub async fn create(base_dir: &Path, execution_id: Uuid) -> ExecutorResult<Self> {
        let path = base_dir.join(execution_id.to_string());
        tokio::fs::create_dir_all(&path).await?;
        Ok(Self { execution_id, path })
    }

    /// Writes each `(relative_path, contents)` pair under the workspace
    /// root, rejecting any path containing a parent-directory escape or an
    /// absolute path before anything is written.
    pub async fn copy_files(&self, files: &[(String, Vec<u8>)]) -> ExecutorResult<()> {
        for (rel_path, _) in files {
            reject_path_escape(rel_path)?;
        }

        for (rel_path, contents) in files {
            let dest = self.path.join(rel_path);
            if let Some(parent) = dest.parent() {
                tokio::fs::create_dir_all(parent).await?;
            }
            tokio::fs::write(&dest, contents).await?;
        }
        Ok(())
    }

    /// Total byte size of every regular file under the workspace, used to
    /// enforce the configured size ceiling before any subprocess runs.
    pub async fn total_size_bytes(&self) -> ExecutorResult<u64> {
        let mut total = 0u64;
        let mut stack = vec![self.path.clone()];
        while let Some(dir) = stack.pop() {
            let mut entries = tokio::fs::read_dir(&dir).await?;
            while let Some(entry) = entries.next_entry().await? {
                let metadata = entry.metadata().await?;
                if metadata.is_dir() {
                    stack.push(entry.path());
                } else {
                    total += metadata.len();
                }
            }
        }
        Ok(total)
    }

    pub fn tf_file_paths_sync(&self) -> ExecutorResult<Vec<PathBuf>> {
        let mut out = Vec::new();
        let mut stack = vec![self.path.clone()];
        while let Some(dir) = stack.pop() {
            for entry in std::fs::read_dir(&dir)? {
                let entry = entry?;
                let path = entry.path();
                if path.is_dir() {
                    stack.push(path);
                } else if path.extension().is_some_and(|ext| ext == "tf") {
                    out.push(path);
                }
            }
        }
        Ok(out)
    }

    /// Recursively removes the workspace directory. Idempotent: a
    /// double-destroy (e.g. both an explicit call and `Drop`) is not an
    /// error.
    pub async fn destroy(&self) {
        if let Err(err) = tokio::fs::remove_dir_all(&self.path).await {
            if err.kind() != std::io::ErrorKind::NotFound {
                tracing::warn!(execution_id = %self.execution_id, error = %err, "failed to remove workspace");
            }
        }
    }
}

fn reject_path_escape(rel_path: &str) -> ExecutorResult<()> {
    let path = Path::new(rel_path);
    if path.is_absolute() {
        return Err(ExecutorError::SecurityViolation(format!(
            "absolute path not allowed: {rel_path}"
        )));
    }
    if path
        .components()
        .any(|c| matches!(c, std::path::Component::ParentDir))
    {
        return Err(ExecutorError::SecurityViolation(format!(
            "path traversal not allowed: {rel_path}"
        )));
    }
    if rel_path.contains('\0') {
        return Err(ExecutorError::SecurityViolation(
            "null byte in path".to_string(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_parent_dir_escape() {
        assert!(reject_path_escape("../../etc/passwd").is_err());
    }

    #[test]
    fn rejects_absolute_path() {
        assert!(reject_path_escape("/etc/passwd").is_err());
    }

    #[test]
    fn accepts_plain_relative_path() {
        assert!(reject_path_escape("main.tf").is_ok());
        assert!(reject_path_escape("modules/vpc/main.tf").is_ok());
    }

    #[tokio::test]
    async fn create_copy_and_destroy_round_trip() {
        let base = std::env::temp_dir().join(format!("plan-executor-test-{}", Uuid::now_v7()));
        tokio::fs::create_dir_all(&base).await.unwrap();
        let workspace = Workspace::create(&base, Uuid::now_v7()).await.unwrap();
        workspace
            .copy_files(&[("main.tf".to_string(), b"resource \"aws_instance\" \"x\" {}".to_vec())])
            .await
            .unwrap();
        assert!(workspace.total_size_bytes().await.unwrap() > 0);
        workspace.destroy().await;
        assert!(!workspace.path.exists());
        tokio::fs::remove_dir_all(&base).await.ok();
    }
}
