use crate::areas::index::Index;
use crate::areas::repository::Repository;
use crate::artifacts::objects::commit::Commit;
use crate::artifacts::objects::object_id::ObjectId;
use crate::errors::TwigError;

impl Repository {
    pub async fn commit(&mut self, message: &str) -> anyhow::Result<()> {
        let index = self.index();
        let mut index = index.lock().await;

        // Load the index file from the disk
        index.rehydrate()?;

        if index.is_empty() {
            return Err(TwigError::NothingToCommit.into());
        }

        self.write_commit(&mut index, message, None)?;
        index.write_updates()?;

        Ok(())
    }

    /// The commit HEAD points at
    pub fn head_commit(&self) -> anyhow::Result<Commit> {
        self.database().load_commit(&self.refs().head()?)
    }

    /// Fold the staging area into a new commit on top of HEAD
    ///
    /// Persists every staged blob, stores the commit, advances the current
    /// branch and clears the staging area. `merge_parent` becomes the second
    /// parent of a merge commit.
    pub(crate) fn write_commit(
        &self,
        index: &mut Index,
        message: &str,
        merge_parent: Option<ObjectId>,
    ) -> anyhow::Result<ObjectId> {
        if message.is_empty() {
            return Err(TwigError::EmptyMessage.into());
        }

        let head_oid = self.refs().head()?;
        let head = self.database().load_commit(&head_oid)?;

        for oid in index.additions().values() {
            if !self.database().contains(oid) {
                self.database().put_blob(&index.staged_blob(oid)?)?;
            }
        }

        let parents = std::iter::once(head_oid).chain(merge_parent).collect();
        let commit = Commit::new(
            parents,
            Commit::timestamp_from_env(),
            message.to_string(),
            index.apply_to(head.tracking()),
        );

        // the ref only moves once the commit is stored
        let commit_oid = self.database().put_commit(&commit)?;
        self.refs().update_head(&commit_oid)?;
        index.clear()?;

        Ok(commit_oid)
    }
}
