use crate::areas::repository::Repository;
use crate::artifacts::branch::branch_name::BranchName;
use crate::artifacts::objects::commit::Commit;
use crate::errors::TwigError;
use anyhow::Context;
use std::fs;
use std::io::Write;

impl Repository {
    pub async fn init(&mut self) -> anyhow::Result<()> {
        if self.is_initialized() {
            return Err(TwigError::AlreadyInitialized.into());
        }

        fs::create_dir_all(self.database().objects_path())
            .context("Failed to create .twig/objects directory")?;

        fs::create_dir_all(self.refs().heads_path())
            .context("Failed to create .twig/refs/heads directory")?;

        let index = self.index();
        let mut index = index.lock().await;

        fs::create_dir_all(index.staging_path())
            .context("Failed to create .twig/staging directory")?;

        let root_oid = self
            .database()
            .put_commit(&Commit::root())
            .context("Failed to store the initial commit")?;

        let default_branch = BranchName::default();
        self.refs().update_branch(&default_branch, &root_oid)?;
        self.refs()
            .set_current_branch(&default_branch)
            .context("Failed to create initial HEAD reference")?;

        index.clear()?;
        index.write_updates()?;

        writeln!(
            self.writer(),
            "Initialized empty twig repository in {}",
            self.twig_path().display()
        )?;

        Ok(())
    }
}
