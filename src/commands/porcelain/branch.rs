use crate::areas::repository::Repository;
use crate::artifacts::branch::branch_name::BranchName;
use crate::errors::TwigError;

impl Repository {
    /// Create `branch_name` at HEAD without switching to it
    pub fn branch(&mut self, branch_name: &str) -> anyhow::Result<()> {
        let branch_name = BranchName::try_parse(branch_name.to_string())?;
        let source_oid = self.refs().head()?;

        self.refs().create_branch(&branch_name, &source_oid)?;

        Ok(())
    }

    pub fn rm_branch(&mut self, branch_name: &str) -> anyhow::Result<()> {
        let branch_name = BranchName::try_parse(branch_name.to_string())
            .map_err(|_| TwigError::BranchNotFound(branch_name.to_string()))?;

        if !self.refs().branch_exists(&branch_name) {
            return Err(TwigError::BranchNotFound(branch_name.to_string()).into());
        }
        if self.refs().is_current_branch(&branch_name)? {
            return Err(TwigError::RemoveCurrentBranch.into());
        }

        self.refs().delete_branch(&branch_name)?;

        Ok(())
    }
}
