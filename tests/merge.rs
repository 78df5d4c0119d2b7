use assert_fs::TempDir;
use common::{
    UNTRACKED_IN_THE_WAY, branch_commit_id, commit_files, init_repository_dir, read_file,
    run_twig_command, write_file,
};
use predicates::prelude::*;
use pretty_assertions::assert_eq;
use rstest::rstest;
use std::path::Path;

mod common;

/// Commit `files` on a fresh `other` branch, then return to master
fn commit_on_other(dir: &Path, files: &[(&str, &str)], message: &str) {
    run_twig_command(dir, &["checkout", "other"]).assert().success();
    commit_files(dir, files, message);
    run_twig_command(dir, &["checkout", "master"]).assert().success();
}

#[rstest]
fn merging_a_descendant_fast_forwards(init_repository_dir: TempDir) {
    let dir = init_repository_dir.path();
    commit_files(dir, &[("a.txt", "a")], "A");
    run_twig_command(dir, &["branch", "other"]).assert().success();
    commit_on_other(dir, &[("b.txt", "b")], "B");

    run_twig_command(dir, &["merge", "other"])
        .assert()
        .success()
        .stdout("Current branch fast-forwarded.\n");

    assert_eq!(branch_commit_id(dir, "master"), branch_commit_id(dir, "other"));
    assert_eq!(read_file(dir, "b.txt"), "b");
    assert!(common::find_commits(dir, "Merged other into master.").is_empty());
}

#[rstest]
fn merging_an_ancestor_changes_nothing(init_repository_dir: TempDir) {
    let dir = init_repository_dir.path();
    commit_files(dir, &[("a.txt", "a")], "A");
    run_twig_command(dir, &["branch", "other"]).assert().success();
    commit_files(dir, &[("b.txt", "b")], "B");
    let head = common::head_commit_id(dir);

    run_twig_command(dir, &["merge", "other"])
        .assert()
        .success()
        .stdout("Given branch is an ancestor of the current branch.\n");

    assert_eq!(common::head_commit_id(dir), head);
}

#[rstest]
fn concurrent_edits_produce_a_conflict_file(
    init_repository_dir: TempDir,
) -> Result<(), Box<dyn std::error::Error>> {
    let dir = init_repository_dir.path();
    commit_files(dir, &[("f.txt", "base\n")], "base");
    run_twig_command(dir, &["branch", "other"]).assert().success();
    commit_files(dir, &[("f.txt", "left\n")], "left");
    let master_head = common::head_commit_id(dir);
    commit_on_other(dir, &[("f.txt", "right\n")], "right");
    let other_head = branch_commit_id(dir, "other");

    run_twig_command(dir, &["merge", "other"])
        .assert()
        .success()
        .stdout("Encountered a merge conflict.\n");

    assert_eq!(
        read_file(dir, "f.txt"),
        "<<<<<<< HEAD\nleft\n=======\nright\n>>>>>>>\n"
    );

    let merge = common::head_commit_id(dir);
    let log = String::from_utf8(run_twig_command(dir, &["log"]).output()?.stdout)?;
    assert!(log.starts_with(&format!(
        "===\ncommit {merge}\nMerge: {} {}\nDate: {}\nMerged other into master.\n\n",
        &master_head[..7],
        &other_head[..7],
        common::LOG_DATE
    )));
    // log follows the primary parent only
    assert!(!log.contains("\nright\n"));

    Ok(())
}

#[rstest]
fn deletion_against_a_conflicting_edit_keeps_the_edit_in_markers(init_repository_dir: TempDir) {
    let dir = init_repository_dir.path();
    commit_files(dir, &[("f.txt", "base\n"), ("keep.txt", "k")], "base");
    run_twig_command(dir, &["branch", "other"]).assert().success();
    commit_files(dir, &[("f.txt", "edited\n")], "edit");
    run_twig_command(dir, &["checkout", "other"]).assert().success();
    run_twig_command(dir, &["rm", "f.txt"]).assert().success();
    common::twig_commit(dir, "delete").assert().success();
    run_twig_command(dir, &["checkout", "master"]).assert().success();

    run_twig_command(dir, &["merge", "other"])
        .assert()
        .success()
        .stdout("Encountered a merge conflict.\n");

    assert_eq!(read_file(dir, "f.txt"), "<<<<<<< HEAD\nedited\n=======\n>>>>>>>\n");
}

#[rstest]
fn clean_merge_combines_both_sides(init_repository_dir: TempDir) {
    let dir = init_repository_dir.path();
    commit_files(
        dir,
        &[("g.txt", "g"), ("h.txt", "h"), ("m.txt", "m")],
        "base",
    );
    run_twig_command(dir, &["branch", "other"]).assert().success();
    commit_files(dir, &[("h.txt", "h on master")], "master edit");

    run_twig_command(dir, &["checkout", "other"]).assert().success();
    run_twig_command(dir, &["rm", "g.txt"]).assert().success();
    commit_files(dir, &[("m.txt", "m on other"), ("n.txt", "new")], "other edit");
    run_twig_command(dir, &["checkout", "master"]).assert().success();

    run_twig_command(dir, &["merge", "other"])
        .assert()
        .success()
        .stdout("");

    assert!(!dir.join("g.txt").exists());
    assert_eq!(read_file(dir, "h.txt"), "h on master");
    assert_eq!(read_file(dir, "m.txt"), "m on other");
    assert_eq!(read_file(dir, "n.txt"), "new");

    assert_eq!(common::find_commits(dir, "Merged other into master.").len(), 1);
    run_twig_command(dir, &["checkout", "--", "g.txt"])
        .assert()
        .failure()
        .stderr("File does not exist in that commit.\n");
    run_twig_command(dir, &["status"])
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "=== Staged Files ===\n\n=== Removed Files ===\n\n",
        ));
}

#[rstest]
fn repeated_merges_use_the_latest_split_point(init_repository_dir: TempDir) {
    let dir = init_repository_dir.path();
    commit_files(dir, &[("base.txt", "base")], "base");
    run_twig_command(dir, &["branch", "other"]).assert().success();
    commit_files(dir, &[("m1.txt", "m1")], "m1");
    commit_on_other(dir, &[("o1.txt", "o1")], "o1");

    run_twig_command(dir, &["merge", "other"]).assert().success();
    run_twig_command(dir, &["checkout", "other"]).assert().success();
    commit_files(dir, &[("o2.txt", "o2")], "o2");
    run_twig_command(dir, &["checkout", "master"]).assert().success();
    commit_files(dir, &[("m2.txt", "m2")], "m2");

    run_twig_command(dir, &["merge", "other"])
        .assert()
        .success()
        .stdout("");

    for name in ["base.txt", "m1.txt", "m2.txt", "o1.txt", "o2.txt"] {
        assert!(dir.join(name).is_file(), "{name} is missing after the merge");
    }
}

#[rstest]
fn merging_an_unknown_branch_fails(init_repository_dir: TempDir) {
    run_twig_command(init_repository_dir.path(), &["merge", "ghost"])
        .assert()
        .failure()
        .code(1)
        .stderr("A branch with that name does not exist.\n");
}

#[rstest]
fn merging_the_current_branch_fails(init_repository_dir: TempDir) {
    run_twig_command(init_repository_dir.path(), &["merge", "master"])
        .assert()
        .failure()
        .code(1)
        .stderr("Cannot merge a branch with itself.\n");
}

#[rstest]
fn merging_with_staged_changes_fails(init_repository_dir: TempDir) {
    let dir = init_repository_dir.path();
    run_twig_command(dir, &["branch", "other"]).assert().success();
    write_file(dir, "a.txt", "a");
    run_twig_command(dir, &["add", "a.txt"]).assert().success();

    run_twig_command(dir, &["merge", "other"])
        .assert()
        .failure()
        .code(1)
        .stderr("You have uncommitted changes.\n");
}

#[rstest]
fn untracked_file_in_the_way_blocks_merge(init_repository_dir: TempDir) {
    let dir = init_repository_dir.path();
    commit_files(dir, &[("a.txt", "a")], "A");
    run_twig_command(dir, &["branch", "other"]).assert().success();
    commit_files(dir, &[("b.txt", "b")], "B");
    commit_on_other(dir, &[("n.txt", "theirs")], "N");
    write_file(dir, "n.txt", "mine");
    let head = common::head_commit_id(dir);

    run_twig_command(dir, &["merge", "other"])
        .assert()
        .failure()
        .code(1)
        .stderr(UNTRACKED_IN_THE_WAY);

    assert_eq!(read_file(dir, "n.txt"), "mine");
    assert_eq!(common::head_commit_id(dir), head);
}

#[rstest]
fn merge_replaces_a_file_with_a_directory(init_repository_dir: TempDir) {
    let dir = init_repository_dir.path();
    commit_files(dir, &[("a", "file")], "file");
    run_twig_command(dir, &["branch", "other"]).assert().success();
    commit_files(dir, &[("m.txt", "m")], "master work");

    run_twig_command(dir, &["checkout", "other"]).assert().success();
    run_twig_command(dir, &["rm", "a"]).assert().success();
    commit_files(dir, &[("a/b", "nested")], "directory");
    run_twig_command(dir, &["checkout", "master"]).assert().success();

    run_twig_command(dir, &["merge", "other"])
        .assert()
        .success()
        .stdout("");

    assert_eq!(read_file(dir, "a/b"), "nested");
    assert_eq!(read_file(dir, "m.txt"), "m");
}
