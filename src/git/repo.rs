use crate::error::{GconcError, Result};
use crate::model::Commit;
use crate::util::from_epoch;
use gix::object::tree::diff::ChangeDetached;
use gix::{discover, ObjectId, Repository};
use indicatif::{ProgressBar, ProgressStyle};
use similar::{ChangeTag, TextDiff};
use std::collections::{HashMap, HashSet, VecDeque};
use std::path::{Path, PathBuf};
use tracing::debug;

pub struct GitRepo {
    repo: Repository,
    path: PathBuf,
}

impl GitRepo {
    /// Open the repository containing `path`.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let repo = discover(path.as_ref())?;
        let path = repo.workdir().unwrap_or_else(|| repo.path()).to_path_buf();

        Ok(Self { repo, path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn tip(&self, branch: Option<&str>) -> Result<ObjectId> {
        match branch {
            Some(name) => {
                let id = self
                    .repo
                    .rev_parse_single(name)
                    .map_err(|e| GconcError::GitRepo(format!("Unknown branch '{name}': {e}")))?;
                let commit = id
                    .object()?
                    .try_into_commit()
                    .map_err(|_| GconcError::GitRepo(format!("Not a commit: {name}")))?;
                Ok(commit.id)
            }
            None => {
                let mut head = self.repo.head()?;
                Ok(head.peel_to_commit_in_place()?.id)
            }
        }
    }

    /// Every commit reachable from `branch` (HEAD when `None`), newest-first
    /// by committer time. Commits whose hash is in `known` are reused as-is.
    pub fn collect_commits(
        &self,
        branch: Option<&str>,
        known: &HashMap<String, Commit>,
        show_progress: bool,
    ) -> Result<Vec<Commit>> {
        let mut commits = Vec::new();
        let mut seen: HashSet<ObjectId> = HashSet::new();
        let mut stack: VecDeque<ObjectId> = VecDeque::from([self.tip(branch)?]);
        let mut reused = 0usize;

        let pb = if show_progress {
            ProgressBar::new_spinner()
        } else {
            ProgressBar::hidden()
        };
        pb.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.green} {msg} {pos}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        pb.set_message("Collecting commits...");

        while let Some(commit_id) = stack.pop_back() {
            if !seen.insert(commit_id) {
                continue;
            }

            let commit = self.repo.find_commit(commit_id)?;
            let parents: Vec<ObjectId> = commit.parent_ids().map(|id| id.into()).collect();

            match known.get(&commit_id.to_string()) {
                Some(existing) => {
                    commits.push(existing.clone());
                    reused += 1;
                }
                None => commits.push(self.read_commit(commit_id, parents.first().copied())?),
            }

            for pid in parents {
                stack.push_back(pid);
            }
            pb.inc(1);
        }

        pb.finish_and_clear();
        debug!(total = commits.len(), reused, "Walked history of {}", self.path.display());

        commits.sort_by(|a, b| b.committer_timestamp.cmp(&a.committer_timestamp));
        Ok(commits)
    }

    fn read_commit(&self, commit_id: ObjectId, first_parent: Option<ObjectId>) -> Result<Commit> {
        let commit = self.repo.find_commit(commit_id)?;
        let author = commit.author()?;
        let committer = commit.committer()?;

        let authored = author
            .time()
            .map_err(|e| GconcError::GitRepo(format!("Bad author time in {commit_id}: {e}")))?;
        let (lines_added, lines_deleted) = self.line_stats(commit_id, first_parent)?;

        Ok(Commit {
            hash: Some(commit_id.to_string()),
            author_name: author.name.to_string(),
            author_email: author.email.to_string(),
            author_timestamp: from_epoch(authored.seconds)?,
            committer_name: committer.name.to_string(),
            committer_email: committer.email.to_string(),
            committer_timestamp: from_epoch(commit.time()?.seconds)?,
            message: commit.message()?.title.to_string(),
            lines_added,
            lines_deleted,
        })
    }

    /// Lines added and deleted against the first parent (the empty tree for a
    /// root commit). Binary blobs count as zero lines.
    fn line_stats(&self, commit_id: ObjectId, parent_id: Option<ObjectId>) -> Result<(u64, u64)> {
        let commit_tree = self.repo.find_commit(commit_id)?.tree()?;
        let changes: Vec<ChangeDetached> = match parent_id {
            Some(parent_id) => {
                let parent_tree = self.repo.find_commit(parent_id)?.tree()?;
                self.repo.diff_tree_to_tree(Some(&parent_tree), Some(&commit_tree), None)?
            }
            None => self.repo.diff_tree_to_tree(None, Some(&commit_tree), None)?,
        };

        let (mut added, mut deleted) = (0u64, 0u64);
        for change in changes {
            let (a, d) = match change {
                ChangeDetached::Addition { id, .. } => (self.blob_lines(id), 0),
                ChangeDetached::Deletion { id, .. } => (0, self.blob_lines(id)),
                ChangeDetached::Modification { previous_id, id, .. } => self.blob_diff(previous_id, id),
                ChangeDetached::Rewrite { source_id, id, .. } => self.blob_diff(source_id, id),
            };
            added += a;
            deleted += d;
        }
        Ok((added, deleted))
    }

    fn blob_text(&self, id: ObjectId) -> Option<String> {
        let object = self.repo.find_object(id).ok()?;
        let data = object.data.as_slice();
        if data.iter().take(8192).any(|&b| b == 0) {
            return None;
        }
        Some(String::from_utf8_lossy(data).into_owned())
    }

    fn blob_lines(&self, id: ObjectId) -> u64 {
        self.blob_text(id).map(|t| t.lines().count() as u64).unwrap_or(0)
    }

    fn blob_diff(&self, old_id: ObjectId, new_id: ObjectId) -> (u64, u64) {
        match (self.blob_text(old_id), self.blob_text(new_id)) {
            (Some(old), Some(new)) => count_changed_lines(&old, &new),
            _ => (0, 0),
        }
    }
}

/// Inserted and deleted line counts of a line diff from `old` to `new`.
pub fn count_changed_lines(old: &str, new: &str) -> (u64, u64) {
    let diff = TextDiff::from_lines(old, new);
    let (mut added, mut deleted) = (0u64, 0u64);
    for change in diff.iter_all_changes() {
        match change.tag() {
            ChangeTag::Insert => added += 1,
            ChangeTag::Delete => deleted += 1,
            ChangeTag::Equal => {}
        }
    }
    (added, deleted)
}
