//! Working-tree migration between commits
//!
//! Moving the working tree from the `current` commit to a `target` commit:
//!
//! 1. Refuse if an untracked working file would be overwritten, either at a
//!    path `target` tracks or inside a directory standing where `target`
//!    tracks a file
//! 2. Plan deletions (tracked by `current` only) and writes (every path
//!    tracked by `target`), loading all target content up front
//! 3. Apply deletions, then writes, then clear the staging area
//!
//! Nothing on disk changes until the whole plan has been built. Deletions
//! prune the directories they empty, so a path can switch between a file and
//! a directory across commits.

use crate::areas::index::Index;
use crate::areas::repository::Repository;
use crate::artifacts::objects::commit::Commit;
use crate::errors::TwigError;
use bytes::Bytes;
use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

/// Type of file system action required for checkout
///
/// Actions are applied in declaration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ActionType {
    /// Delete a file `target` does not track
    Delete,
    /// Create or overwrite a file `target` tracks
    Write,
}

/// Planned actions grouped by type, with the content to write
pub type ActionsSet = BTreeMap<ActionType, Vec<(PathBuf, Option<Bytes>)>>;

pub struct Migration<'r> {
    repository: &'r Repository,
    current: &'r Commit,
    target: &'r Commit,
    actions: ActionsSet,
}

impl<'r> Migration<'r> {
    pub fn new(repository: &'r Repository, current: &'r Commit, target: &'r Commit) -> Self {
        let actions = BTreeMap::from([
            (ActionType::Delete, Vec::new()),
            (ActionType::Write, Vec::new()),
        ]);

        Migration {
            repository,
            current,
            target,
            actions,
        }
    }

    /// Fail if moving to `target` would clobber a file `current` does not track
    pub fn check_untracked(&self) -> anyhow::Result<()> {
        let workspace = self.repository.workspace();
        let mut in_the_way = BTreeSet::new();

        for path in self.target.tracking().keys() {
            if workspace.file_exists(path) && !self.current.tracks(path) {
                in_the_way.insert(path.clone());
            }

            // a directory where `target` wants a file
            for file in workspace.list_files_under(path)? {
                if !self.current.tracks(&file) {
                    in_the_way.insert(file);
                }
            }

            // a file where `target` wants a directory
            for ancestor in path.ancestors().skip(1) {
                if !ancestor.as_os_str().is_empty()
                    && workspace.file_exists(ancestor)
                    && !self.current.tracks(ancestor)
                {
                    in_the_way.insert(ancestor.to_path_buf());
                }
            }
        }

        if in_the_way.is_empty() {
            Ok(())
        } else {
            let in_the_way = in_the_way.into_iter().collect::<Vec<_>>();
            tracing::debug!(paths = ?in_the_way, "untracked files in the way");
            Err(TwigError::UntrackedConflict(in_the_way).into())
        }
    }

    /// Check, plan and apply the migration, then clear the staging area
    pub fn apply_changes(&mut self, index: &mut Index) -> anyhow::Result<()> {
        self.check_untracked()?;
        self.plan_changes()?;
        self.update_workspace()?;

        index.clear()
    }

    fn plan_changes(&mut self) -> anyhow::Result<()> {
        let database = self.repository.database();

        for path in self.current.tracking().keys() {
            if !self.target.tracks(path) {
                self.record(ActionType::Delete, path.clone(), None);
            }
        }

        for (path, oid) in self.target.tracking() {
            let content = database.load_blob(oid)?.into_content();
            self.record(ActionType::Write, path.clone(), Some(content));
        }

        Ok(())
    }

    fn record(&mut self, action: ActionType, path: PathBuf, content: Option<Bytes>) {
        self.actions.entry(action).or_default().push((path, content));
    }

    fn update_workspace(&self) -> anyhow::Result<()> {
        let workspace = self.repository.workspace();

        for (action, entries) in &self.actions {
            for (path, content) in entries {
                match (action, content) {
                    (ActionType::Delete, _) => workspace.remove_file(path)?,
                    (ActionType::Write, Some(content)) => workspace.write_file(path, content)?,
                    (ActionType::Write, None) => {
                        anyhow::bail!("no content planned for {}", path.display())
                    }
                }
            }
        }

        Ok(())
    }
}

/// Overwrite the working copy of `path` with its version in `commit`
pub fn restore_file(repository: &Repository, commit: &Commit, path: &Path) -> anyhow::Result<()> {
    let oid = commit
        .tracked_oid(path)
        .ok_or_else(|| TwigError::FileNotInCommit(path.to_path_buf()))?;
    let blob = repository.database().load_blob(oid)?;

    repository.workspace().write_file(path, blob.content())
}
