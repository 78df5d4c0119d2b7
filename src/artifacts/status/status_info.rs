use crate::areas::index::Index;
use crate::areas::repository::Repository;
use crate::artifacts::branch::branch_name::BranchName;
use crate::artifacts::objects::commit::Commit;
use crate::artifacts::objects::object::Object;
use crate::artifacts::objects::object_id::ObjectId;
use crate::artifacts::status::file_change::WorkspaceChangeType;
use derive_new::new;
use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

pub type ChangeSet = BTreeMap<PathBuf, WorkspaceChangeType>;
pub type FileSet = BTreeSet<PathBuf>;

/// Snapshot of the repository state shown by `status`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusInfo {
    pub(crate) current_branch: BranchName,
    pub(crate) branches: Vec<BranchName>,
    pub(crate) staged_files: FileSet,
    pub(crate) removed_files: FileSet,
    pub(crate) workspace_changeset: ChangeSet,
    pub(crate) untracked_files: FileSet,
}

#[derive(new)]
pub struct Status<'r> {
    repository: &'r Repository,
}

impl<'r> Status<'r> {
    pub fn initialize(&self, index: &Index) -> anyhow::Result<StatusInfo> {
        let refs = self.repository.refs();
        let head = self.repository.database().load_commit(&refs.head()?)?;

        let workspace_files = self
            .repository
            .workspace()
            .list_files()?
            .into_iter()
            .collect::<FileSet>();

        let workspace_changeset = self.detect_workspace_changes(&head, index, &workspace_files)?;
        let untracked_files = workspace_files
            .iter()
            .filter(|path| {
                index.is_staged_for_removal(path)
                    || (!index.is_staged_for_addition(path) && !head.tracks(path))
            })
            .cloned()
            .collect();

        Ok(StatusInfo {
            current_branch: refs.current_branch()?,
            branches: refs.list_branches()?,
            staged_files: index.additions().keys().cloned().collect(),
            removed_files: index.removals().clone(),
            workspace_changeset,
            untracked_files,
        })
    }

    fn detect_workspace_changes(
        &self,
        head: &Commit,
        index: &Index,
        workspace_files: &FileSet,
    ) -> anyhow::Result<ChangeSet> {
        let mut changeset = ChangeSet::new();

        for (path, staged_oid) in index.additions() {
            let change = if workspace_files.contains(path) {
                self.modified_against(path, staged_oid)?
            } else {
                Some(WorkspaceChangeType::Deleted)
            };
            if let Some(change) = change {
                changeset.insert(path.clone(), change);
            }
        }

        for (path, head_oid) in head.tracking() {
            if index.is_staged_for_addition(path) || index.is_staged_for_removal(path) {
                continue;
            }

            let change = if workspace_files.contains(path) {
                self.modified_against(path, head_oid)?
            } else {
                Some(WorkspaceChangeType::Deleted)
            };
            if let Some(change) = change {
                changeset.insert(path.clone(), change);
            }
        }

        Ok(changeset)
    }

    fn modified_against(
        &self,
        path: &Path,
        expected: &ObjectId,
    ) -> anyhow::Result<Option<WorkspaceChangeType>> {
        let blob = self.repository.workspace().parse_blob(path)?;

        if &blob.object_id()? == expected {
            Ok(None)
        } else {
            Ok(Some(WorkspaceChangeType::Modified))
        }
    }
}
