use crate::areas::repository::Repository;
use crate::errors::TwigError;

impl Repository {
    pub async fn rm(&mut self, path: &str) -> anyhow::Result<()> {
        let path = self.workspace().normalize(path)?;

        let index = self.index();
        let mut index = index.lock().await;
        index.rehydrate()?;

        let head = self.head_commit()?;
        let staged = index.is_staged_for_addition(&path);
        let tracked = head.tracks(&path);

        if !staged && !tracked && !index.is_staged_for_removal(&path) {
            return Err(TwigError::NoReasonToRemove(path).into());
        }

        if staged {
            index.unstage(&path)?;
        }
        if tracked {
            self.workspace().remove_file(&path)?;
            index.stage_removal(path);
        }

        index.write_updates()?;

        Ok(())
    }
}
