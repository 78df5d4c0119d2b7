use assert_fs::TempDir;
use common::{LOG_DATE, commit_files, find_commits, init_repository_dir, run_twig_command};
use predicates::prelude::*;
use pretty_assertions::assert_eq;
use rstest::rstest;

mod common;

#[rstest]
fn log_follows_the_current_branch_from_head(
    init_repository_dir: TempDir,
) -> Result<(), Box<dyn std::error::Error>> {
    let dir = init_repository_dir.path();
    let root = common::head_commit_id(dir);
    commit_files(dir, &[("a.txt", "a")], "first");
    let first = common::head_commit_id(dir);
    commit_files(dir, &[("b.txt", "b")], "second");
    let second = common::head_commit_id(dir);

    let output = run_twig_command(dir, &["log"]).output()?;

    assert_eq!(
        String::from_utf8(output.stdout)?,
        format!(
            "===\ncommit {second}\nDate: {LOG_DATE}\nsecond\n\n\
             ===\ncommit {first}\nDate: {LOG_DATE}\nfirst\n\n\
             ===\ncommit {root}\nDate: Thu Jan 01 00:00:00 1970 +0000\ninitial commit\n\n"
        )
    );

    Ok(())
}

#[rstest]
fn global_log_shows_commits_of_every_branch(init_repository_dir: TempDir) {
    let dir = init_repository_dir.path();
    commit_files(dir, &[("a.txt", "a")], "on master");
    run_twig_command(dir, &["branch", "side"]).assert().success();
    run_twig_command(dir, &["checkout", "side"]).assert().success();
    commit_files(dir, &[("b.txt", "b")], "on side");
    let side = common::head_commit_id(dir);
    run_twig_command(dir, &["checkout", "master"]).assert().success();

    run_twig_command(dir, &["log"])
        .assert()
        .success()
        .stdout(predicate::str::contains("on side").not());

    run_twig_command(dir, &["global-log"])
        .assert()
        .success()
        .stdout(predicate::str::contains(format!("commit {side}\n")))
        .stdout(predicate::str::contains("on master\n"))
        .stdout(predicate::str::contains("initial commit\n"));
}

#[rstest]
fn find_prints_every_commit_with_the_message(init_repository_dir: TempDir) {
    let dir = init_repository_dir.path();
    commit_files(dir, &[("a.txt", "a")], "same message");
    let first = common::head_commit_id(dir);
    commit_files(dir, &[("b.txt", "b")], "same message");
    let second = common::head_commit_id(dir);

    let mut expected = vec![first, second];
    expected.sort();

    assert_eq!(find_commits(dir, "same message"), expected);
}

#[rstest]
fn find_without_a_match_fails(init_repository_dir: TempDir) {
    run_twig_command(init_repository_dir.path(), &["find", "nope"])
        .assert()
        .failure()
        .code(1)
        .stderr("Found no commit with that message.\n");
}
