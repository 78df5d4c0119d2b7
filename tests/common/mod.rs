#![allow(dead_code)]

use assert_cmd::Command;
use assert_fs::TempDir;
use rstest::fixture;
use std::path::Path;

/// Timestamp pinned on every commit made through [`twig_commit`]
pub const COMMIT_DATE: &str = "2023-01-01 12:00:00 +0000";

/// `COMMIT_DATE` as printed by `log`
pub const LOG_DATE: &str = "Sun Jan 01 12:00:00 2023 +0000";

pub const UNTRACKED_IN_THE_WAY: &str =
    "There is an untracked file in the way; delete it, or add and commit it first.\n";

#[fixture]
pub fn repository_dir() -> TempDir {
    TempDir::new().expect("Failed to create temp dir")
}

#[fixture]
pub fn init_repository_dir(repository_dir: TempDir) -> TempDir {
    run_twig_command(repository_dir.path(), &["init"])
        .assert()
        .success();

    repository_dir
}

pub fn run_twig_command(dir: &Path, args: &[&str]) -> Command {
    let mut cmd = Command::cargo_bin("twig").expect("Failed to find twig binary");
    cmd.envs(vec![("NO_PAGER", "1"), ("TWIG_COMMIT_DATE", COMMIT_DATE)]);
    cmd.env_remove("TWIG_LOG");
    cmd.current_dir(dir);
    for arg in args {
        cmd.arg(arg);
    }
    cmd
}

pub fn twig_commit(dir: &Path, message: &str) -> Command {
    run_twig_command(dir, &["commit", message])
}

pub fn write_file(dir: &Path, name: &str, content: &str) {
    let path = dir.join(name);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .unwrap_or_else(|e| panic!("Failed to create directory {:?}: {}", parent, e));
    }

    std::fs::write(&path, content)
        .unwrap_or_else(|e| panic!("Failed to write file {:?}: {}", path, e));
}

pub fn read_file(dir: &Path, name: &str) -> String {
    let path = dir.join(name);
    std::fs::read_to_string(&path)
        .unwrap_or_else(|e| panic!("Failed to read file {:?}: {}", path, e))
}

/// Write `files`, stage each of them and commit
pub fn commit_files(dir: &Path, files: &[(&str, &str)], message: &str) {
    for (name, content) in files {
        write_file(dir, name, content);
        run_twig_command(dir, &["add", name]).assert().success();
    }

    twig_commit(dir, message).assert().success();
}

/// Commit id a branch points at
pub fn branch_commit_id(dir: &Path, branch: &str) -> String {
    let path = dir.join(".twig").join("refs").join("heads").join(branch);
    std::fs::read_to_string(&path)
        .unwrap_or_else(|e| panic!("Failed to read ref {:?}: {}", path, e))
        .trim()
        .to_string()
}

/// Commit id the current branch points at
pub fn head_commit_id(dir: &Path) -> String {
    let head = std::fs::read_to_string(dir.join(".twig").join("HEAD")).expect("Failed to read HEAD");
    let branch = head
        .trim()
        .strip_prefix("ref: refs/heads/")
        .expect("HEAD is not a branch reference");

    branch_commit_id(dir, branch)
}

/// Ids printed by `find <message>`
pub fn find_commits(dir: &Path, message: &str) -> Vec<String> {
    let output = run_twig_command(dir, &["find", message])
        .output()
        .expect("Failed to run find");

    String::from_utf8(output.stdout)
        .expect("find printed invalid UTF-8")
        .lines()
        .map(str::to_string)
        .collect()
}

pub fn count_objects(dir: &Path) -> usize {
    walkdir::WalkDir::new(dir.join(".twig").join("objects"))
        .into_iter()
        .filter_map(Result::ok)
        .filter(|entry| entry.file_type().is_file())
        .count()
}
