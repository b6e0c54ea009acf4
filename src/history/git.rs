//! Git-backed history collaborators
//!
//! Every operation shells out to the `git` binary in the repository's work
//! tree. The revision listing streams `git rev-list` output straight into the
//! search pipe instead of collecting it first.

use crate::error::{ObjectError, SourceFailure};
use crate::history::{
    EntryLocator, ObjectStore, RevisionQuery, RevisionSink, RevisionSource, SnapshotResolver,
};
use crate::search::pipe::relay;
use crate::types::{ContentHash, Entry, EntryPath, ObjectType, RevisionId, Snapshot};
use async_trait::async_trait;
use std::io;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::io::AsyncReadExt;
use tokio::process::Command;
use tracing::{debug, trace, warn};

/// A git repository driven through the `git` command line.
#[derive(Debug, Clone)]
pub struct GitRepository {
    root: PathBuf,
    git_binary: String,
}

/// Captured result of a short git invocation.
struct GitOutput {
    code: Option<i32>,
    status: String,
    success: bool,
    stdout: Vec<u8>,
    stderr: String,
}

impl GitRepository {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            git_binary: "git".to_string(),
        }
    }

    /// Use a specific git executable instead of `git` from `PATH`.
    pub fn with_git_binary(mut self, git_binary: impl Into<String>) -> Self {
        self.git_binary = git_binary.into();
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Check that the root is inside a git work tree or is a bare repository.
    pub async fn is_repository(&self) -> bool {
        if self.root.join(".git").exists() {
            return true;
        }
        match self.run(&["rev-parse", "--git-dir"]).await {
            Ok(output) => output.success,
            Err(e) => {
                debug!(error = %e, "git rev-parse --git-dir failed");
                false
            }
        }
    }

    fn command(&self) -> Command {
        let mut command = Command::new(&self.git_binary);
        command
            .current_dir(&self.root)
            .stdin(Stdio::null())
            .kill_on_drop(true);
        command
    }

    fn describe(args: &[&str]) -> String {
        format!("git {}", args.join(" "))
    }

    async fn run(&self, args: &[&str]) -> Result<GitOutput, ObjectError> {
        debug!(command = %Self::describe(args), repo = %self.root.display(), "running git");
        let output = self.command().args(args).output().await?;
        Ok(GitOutput {
            code: output.status.code(),
            status: output.status.to_string(),
            success: output.status.success(),
            stdout: output.stdout,
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        })
    }

    fn listing_args(query: &RevisionQuery) -> Vec<String> {
        let mut args = vec!["rev-list".to_string(), "--all".to_string()];
        if let Some(path) = &query.pathspec {
            args.push("--".to_string());
            args.push(format!(":(top,literal){}", path));
        }
        args
    }
}

#[async_trait]
impl RevisionSource for GitRepository {
    async fn list_all_revisions(
        &self,
        query: &RevisionQuery,
        sink: &mut RevisionSink,
        diagnostics: &mut Vec<u8>,
    ) -> Result<(), SourceFailure> {
        let args = Self::listing_args(query);
        debug!(command = %format!("git {}", args.join(" ")), repo = %self.root.display(), "listing revisions");

        let mut child = self
            .command()
            .args(&args)
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(SourceFailure::Spawn)?;

        let mut stdout = child.stdout.take().ok_or_else(|| {
            SourceFailure::Io(io::Error::new(io::ErrorKind::Other, "stdout not captured"))
        })?;
        let mut stderr = child.stderr.take().ok_or_else(|| {
            SourceFailure::Io(io::Error::new(io::ErrorKind::Other, "stderr not captured"))
        })?;

        // The child must die as soon as relaying stops, otherwise it can sit
        // blocked on a full stdout while stderr is still being drained.
        let relayed = async {
            let result = relay(&mut stdout, sink).await;
            if result.is_err() {
                if let Err(e) = child.start_kill() {
                    trace!(error = %e, "rev-list already exited");
                }
            }
            result
        };
        let drained = stderr.read_to_end(diagnostics);
        let (relayed, drained) = tokio::join!(relayed, drained);

        let status = child.wait().await.map_err(SourceFailure::Io)?;

        match relayed {
            Ok(bytes) => trace!(bytes, "rev-list output relayed"),
            Err(SourceFailure::ReaderClosed) => {
                debug!("revision stream reader closed, stopped rev-list");
                return Err(SourceFailure::ReaderClosed);
            }
            Err(e) => return Err(e),
        }
        drained.map_err(SourceFailure::Io)?;

        if !status.success() {
            return Err(SourceFailure::Exited {
                status: status.to_string(),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl SnapshotResolver for GitRepository {
    async fn resolve_snapshot(&self, revision: &RevisionId) -> Result<Snapshot, ObjectError> {
        let treeish = format!("{}^{{tree}}", revision);
        let args = [
            "rev-parse",
            "--verify",
            "--quiet",
            "--end-of-options",
            treeish.as_str(),
        ];
        let output = self.run(&args).await?;

        if !output.success {
            if output.code == Some(1) && output.stderr.is_empty() {
                return Err(ObjectError::RevisionNotFound(revision.clone()));
            }
            return Err(ObjectError::CommandFailed {
                command: Self::describe(&args),
                status: output.status,
                stderr: output.stderr,
            });
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        let tree = ContentHash::from_hex(&stdout).map_err(|_| ObjectError::Malformed {
            command: Self::describe(&args),
            detail: format!("expected a tree id, got {:?}", stdout.trim()),
        })?;

        Ok(Snapshot {
            revision: revision.clone(),
            tree,
        })
    }
}

#[async_trait]
impl EntryLocator for GitRepository {
    async fn locate_entry(
        &self,
        snapshot: &Snapshot,
        path: &EntryPath,
    ) -> Result<Entry, ObjectError> {
        let tree = snapshot.tree.to_hex();
        // Names starting with ':' would otherwise be read as pathspec magic.
        let pathspec = format!(":(literal){}", path);
        let args = [
            "ls-tree",
            "-z",
            "--full-tree",
            tree.as_str(),
            "--",
            pathspec.as_str(),
        ];
        let output = self.run(&args).await?;
        if !output.success {
            return Err(ObjectError::CommandFailed {
                command: Self::describe(&args),
                status: output.status,
                stderr: output.stderr,
            });
        }

        for record in output.stdout.split(|b| *b == 0) {
            if record.is_empty() {
                continue;
            }
            let record = String::from_utf8_lossy(record);
            let parsed = parse_ls_tree_record(&record).ok_or_else(|| ObjectError::Malformed {
                command: Self::describe(&args),
                detail: format!("unexpected record {:?}", record),
            })?;
            if parsed.name != path.as_str() {
                continue;
            }
            return Ok(Entry {
                revision: snapshot.revision.clone(),
                path: path.clone(),
                mode: parsed.mode.to_string(),
                kind: parsed.kind.parse()?,
                hash: ContentHash::from_hex(parsed.object)?,
            });
        }

        Err(ObjectError::PathNotFound(path.clone()))
    }
}

#[async_trait]
impl ObjectStore for GitRepository {
    async fn object_exists(&self, object: &str) -> bool {
        debug!(object, "checking object existence");
        if object.is_empty() || object.starts_with('-') {
            return false;
        }
        match self.run(&["cat-file", "-e", object]).await {
            Ok(output) if output.success => true,
            Ok(output) => {
                debug!(object, status = %output.status, stderr = %output.stderr, "object not found");
                false
            }
            Err(e) => {
                warn!(object, error = %e, "object existence check failed");
                false
            }
        }
    }
}

struct LsTreeRecord<'a> {
    mode: &'a str,
    kind: &'a str,
    object: &'a str,
    name: &'a str,
}

/// Parse `<mode> SP <type> SP <object> TAB <name>`.
fn parse_ls_tree_record(record: &str) -> Option<LsTreeRecord<'_>> {
    let (meta, name) = record.split_once('\t')?;
    let mut fields = meta.split(' ');
    let mode = fields.next()?;
    let kind = fields.next()?;
    let object = fields.next()?;
    if fields.next().is_some() {
        return None;
    }
    Some(LsTreeRecord {
        mode,
        kind,
        object,
        name,
    })
}
