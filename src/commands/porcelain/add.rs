use crate::areas::repository::Repository;
use crate::artifacts::objects::object::Object;
use crate::errors::TwigError;

impl Repository {
    pub async fn add(&mut self, path: &str) -> anyhow::Result<()> {
        let path = self.workspace().normalize(path)?;
        if !self.workspace().file_exists(&path) {
            return Err(TwigError::FileDoesNotExist(path).into());
        }

        let index = self.index();
        let mut index = index.lock().await;

        // Load the index file from the disk
        index.rehydrate()?;

        let head = self.head_commit()?;
        let blob = self.workspace().parse_blob(&path)?;
        let blob_id = blob.object_id()?;

        if head.tracked_oid(&path) == Some(&blob_id) {
            // back to HEAD's version: drop whatever was staged for the path
            index.unstage(&path)?;
            index.cancel_removal(&path);
        } else if index.staged_oid(&path) != Some(&blob_id) {
            index.add(path.clone(), &blob)?;
            tracing::debug!(path = %path.display(), oid = %blob_id, "staged for addition");
        }

        if index.is_changed() {
            index.write_updates()?;
        }

        Ok(())
    }
}
