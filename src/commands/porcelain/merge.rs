use crate::areas::index::Index;
use crate::areas::repository::Repository;
use crate::artifacts::branch::branch_name::BranchName;
use crate::artifacts::checkout::migration::Migration;
use crate::artifacts::graph::commit_graph::CommitGraph;
use crate::artifacts::merge::conflict::conflict_file;
use crate::artifacts::merge::plan::MergePlan;
use crate::artifacts::objects::blob::Blob;
use crate::artifacts::objects::object_id::ObjectId;
use crate::errors::TwigError;
use anyhow::Context;
use bytes::Bytes;
use std::io::Write;

impl Repository {
    /// Merge branch `other` into the current branch
    ///
    /// Unless the merge is a fast-forward or `other` is already merged, a
    /// merge commit is recorded even when the plan leaves nothing staged.
    pub async fn merge(&mut self, other: &str) -> anyhow::Result<()> {
        let other_branch = BranchName::try_parse(other.to_string())
            .map_err(|_| TwigError::BranchNotFound(other.to_string()))?;
        let current_branch = self.refs().current_branch()?;

        if !self.refs().branch_exists(&other_branch) {
            return Err(TwigError::BranchNotFound(other.to_string()).into());
        }
        if other_branch == current_branch {
            return Err(TwigError::MergeWithSelf.into());
        }

        let index = self.index();
        let mut index = index.lock().await;
        index.rehydrate()?;

        if !index.is_empty() {
            return Err(TwigError::UncommittedChanges.into());
        }

        let head_oid = self.refs().head()?;
        let other_oid = self.refs().read_branch(&other_branch)?;
        let head = self.database().load_commit(&head_oid)?;
        let other_head = self.database().load_commit(&other_oid)?;

        Migration::new(self, &head, &other_head).check_untracked()?;

        let split_oid = {
            let database = self.database();
            let graph = CommitGraph::new(|oid| Ok(database.load_commit(oid)?.parents().to_vec()));
            graph
                .split_point(&head_oid, &other_oid)?
                .with_context(|| format!("{head_oid} and {other_oid} share no history"))?
        };

        if split_oid == head_oid {
            Migration::new(self, &head, &other_head).apply_changes(&mut index)?;
            index.write_updates()?;
            self.refs().update_head(&other_oid)?;

            writeln!(self.writer(), "Current branch fast-forwarded.")?;
            return Ok(());
        }
        if split_oid == other_oid {
            writeln!(
                self.writer(),
                "Given branch is an ancestor of the current branch."
            )?;
            return Ok(());
        }

        let split = self.database().load_commit(&split_oid)?;
        let plan = MergePlan::build(split.tracking(), head.tracking(), other_head.tracking());
        self.apply_merge_plan(&mut index, &plan)?;

        let message = format!("Merged {other_branch} into {current_branch}.");
        self.write_commit(&mut index, &message, Some(other_oid))?;
        index.write_updates()?;

        if plan.has_conflicts() {
            writeln!(self.writer(), "Encountered a merge conflict.")?;
        }

        Ok(())
    }

    fn apply_merge_plan(&self, index: &mut Index, plan: &MergePlan) -> anyhow::Result<()> {
        let database = self.database();
        let workspace = self.workspace();
        let load = |oid: Option<&ObjectId>| -> anyhow::Result<Option<Bytes>> {
            oid.map(|oid| database.load_blob(oid).map(Blob::into_content))
                .transpose()
        };

        // every blob is loaded before the working tree changes
        let taken = plan
            .take_from_other
            .iter()
            .map(|(path, oid)| Ok((path, database.load_blob(oid)?)))
            .collect::<anyhow::Result<Vec<_>>>()?;
        let conflicted = plan
            .conflicts
            .iter()
            .map(|(path, sides)| {
                let current = load(sides.current.as_ref())?;
                let other = load(sides.other.as_ref())?;
                Ok((
                    path,
                    Blob::new(conflict_file(current.as_deref(), other.as_deref())),
                ))
            })
            .collect::<anyhow::Result<Vec<_>>>()?;

        for path in &plan.removals {
            workspace.remove_file(path)?;
            index.stage_removal(path.clone());
        }
        for (path, blob) in taken.iter().chain(conflicted.iter()) {
            workspace.write_file(path, blob.content())?;
            index.add(path.to_path_buf(), blob)?;
        }

        Ok(())
    }
}
