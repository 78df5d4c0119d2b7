use crate::areas::repository::Repository;
use crate::artifacts::branch::branch_name::BranchName;
use crate::artifacts::checkout::migration::{Migration, restore_file};
use crate::artifacts::objects::commit::Commit;
use crate::errors::TwigError;

/// The three accepted shapes of `checkout`
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckoutTarget {
    /// `checkout -- <path>`: restore a file from HEAD
    HeadFile { path: String },
    /// `checkout <commit> -- <path>`: restore a file from a commit
    CommitFile { commit: String, path: String },
    /// `checkout <branch>`: switch branches
    Branch { name: String },
}

impl CheckoutTarget {
    pub fn try_parse(args: &[String]) -> anyhow::Result<Self> {
        match args {
            [separator, path] if separator == "--" => Ok(CheckoutTarget::HeadFile {
                path: path.clone(),
            }),
            [commit, separator, path] if separator == "--" => Ok(CheckoutTarget::CommitFile {
                commit: commit.clone(),
                path: path.clone(),
            }),
            [name] if name != "--" => Ok(CheckoutTarget::Branch { name: name.clone() }),
            _ => Err(TwigError::IncorrectOperands.into()),
        }
    }
}

impl Repository {
    pub async fn checkout(&mut self, target: &CheckoutTarget) -> anyhow::Result<()> {
        match target {
            CheckoutTarget::HeadFile { path } => {
                let path = self.workspace().normalize(path)?;
                restore_file(self, &self.head_commit()?, &path)
            }
            CheckoutTarget::CommitFile { commit, path } => {
                let commit_oid = self.database().resolve_commit(commit)?;
                let commit = self.database().load_commit(&commit_oid)?;
                let path = self.workspace().normalize(path)?;
                restore_file(self, &commit, &path)
            }
            CheckoutTarget::Branch { name } => self.switch_branch(name).await,
        }
    }

    async fn switch_branch(&mut self, name: &str) -> anyhow::Result<()> {
        let branch_name = BranchName::try_parse(name.to_string())
            .map_err(|_| TwigError::NoSuchBranch(name.to_string()))?;

        if self.refs().is_current_branch(&branch_name)? {
            return Err(TwigError::CheckoutCurrentBranch.into());
        }
        if !self.refs().branch_exists(&branch_name) {
            return Err(TwigError::NoSuchBranch(name.to_string()).into());
        }

        let current = self.head_commit()?;
        let target_oid = self.refs().read_branch(&branch_name)?;
        let target = self.database().load_commit(&target_oid)?;

        self.switch_to(&current, &target).await?;
        self.refs().set_current_branch(&branch_name)?;

        Ok(())
    }

    /// Move the working tree from `current` to `target` and clear the staging area
    pub(crate) async fn switch_to(&self, current: &Commit, target: &Commit) -> anyhow::Result<()> {
        let index = self.index();
        let mut index = index.lock().await;
        index.rehydrate()?;

        let mut migration = Migration::new(self, current, target);
        migration.apply_changes(&mut index)?;

        index.write_updates()
    }
}
