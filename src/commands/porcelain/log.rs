use crate::areas::repository::Repository;
use crate::artifacts::graph::commit_graph::CommitGraph;
use crate::artifacts::objects::commit::Commit;
use crate::artifacts::objects::object_id::ObjectId;
use crate::errors::TwigError;
use std::io::Write;

impl Repository {
    /// History of HEAD along primary parents
    pub fn log(&self) -> anyhow::Result<()> {
        let database = self.database();
        let graph = CommitGraph::new(|oid| Ok(database.load_commit(oid)?.parents().to_vec()));

        for commit_oid in graph.first_parent_history(&self.refs().head()?) {
            let commit_oid = commit_oid?;
            let commit = database.load_commit(&commit_oid)?;

            self.show_commit(&commit_oid, &commit)?;
        }

        Ok(())
    }

    /// Every stored commit, in id order
    pub fn global_log(&self) -> anyhow::Result<()> {
        for commit_oid in self.database().list_commits()? {
            let commit = self.database().load_commit(&commit_oid)?;
            self.show_commit(&commit_oid, &commit)?;
        }

        Ok(())
    }

    /// Ids of every commit whose message is exactly `message`
    pub fn find(&self, message: &str) -> anyhow::Result<()> {
        let mut found = false;

        for commit_oid in self.database().list_commits()? {
            if self.database().load_commit(&commit_oid)?.message() == message {
                writeln!(self.writer(), "{commit_oid}")?;
                found = true;
            }
        }

        if !found {
            return Err(TwigError::NoCommitWithMessage.into());
        }

        Ok(())
    }

    fn show_commit(&self, commit_oid: &ObjectId, commit: &Commit) -> anyhow::Result<()> {
        let mut writer = self.writer();

        writeln!(writer, "===")?;
        writeln!(writer, "commit {commit_oid}")?;
        if let (Some(parent), Some(merge_parent)) = (commit.parent(), commit.merge_parent()) {
            writeln!(
                writer,
                "Merge: {} {}",
                parent.to_short_oid(),
                merge_parent.to_short_oid()
            )?;
        }
        writeln!(writer, "Date: {}", commit.readable_timestamp())?;
        writeln!(writer, "{}", commit.message())?;
        writeln!(writer)?;

        Ok(())
    }
}
