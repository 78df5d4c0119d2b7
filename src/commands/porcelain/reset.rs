use crate::areas::repository::Repository;

impl Repository {
    /// Check out every file of `commit` and point the current branch at it
    pub async fn reset(&mut self, commit: &str) -> anyhow::Result<()> {
        let target_oid = self.database().resolve_commit(commit)?;
        let target = self.database().load_commit(&target_oid)?;
        let current = self.head_commit()?;

        self.switch_to(&current, &target).await?;
        self.refs().update_head(&target_oid)?;

        Ok(())
    }
}
