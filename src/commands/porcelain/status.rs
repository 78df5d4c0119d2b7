use crate::areas::repository::Repository;
use crate::artifacts::status::status_info::{Status, StatusInfo};
use colored::Colorize;
use std::io::Write;

impl Repository {
    pub async fn status(&mut self) -> anyhow::Result<()> {
        let index = self.index();
        let mut index = index.lock().await;
        index.rehydrate()?;

        let status = Status::new(self).initialize(&index)?;

        self.print_branches(&status)?;
        self.print_section(
            "Staged Files",
            status.staged_files.iter().map(|path| path.display().to_string()),
        )?;
        self.print_section(
            "Removed Files",
            status.removed_files.iter().map(|path| path.display().to_string()),
        )?;
        self.print_section(
            "Modifications Not Staged For Commit",
            status
                .workspace_changeset
                .iter()
                .map(|(path, change)| format!("{} {}", path.display(), change)),
        )?;
        self.print_section(
            "Untracked Files",
            status.untracked_files.iter().map(|path| path.display().to_string()),
        )?;

        Ok(())
    }

    fn print_branches(&self, status: &StatusInfo) -> anyhow::Result<()> {
        self.print_section(
            "Branches",
            status.branches.iter().map(|branch| {
                if branch == &status.current_branch {
                    format!("{}{}", "*".green(), branch.as_ref().green())
                } else {
                    branch.to_string()
                }
            }),
        )
    }

    fn print_section(
        &self,
        title: &str,
        lines: impl Iterator<Item = String>,
    ) -> anyhow::Result<()> {
        let mut writer = self.writer();

        writeln!(writer, "=== {title} ===")?;
        for line in lines {
            writeln!(writer, "{line}")?;
        }
        writeln!(writer)?;

        Ok(())
    }
}
