use assert_fs::TempDir;
use common::{
    commit_files, init_repository_dir, read_file, run_twig_command, twig_commit, write_file,
};
use pretty_assertions::assert_eq;
use rstest::rstest;

mod common;

fn staged_section(dir: &std::path::Path) -> Result<String, Box<dyn std::error::Error>> {
    let output = run_twig_command(dir, &["status"]).output()?;
    let stdout = String::from_utf8(output.stdout)?;

    let section = stdout
        .split("\n\n")
        .find(|section| section.starts_with("=== Staged Files ==="))
        .ok_or("status printed no staged section")?;

    Ok(section.to_string())
}

#[rstest]
fn adding_a_missing_file_fails(init_repository_dir: TempDir) {
    run_twig_command(init_repository_dir.path(), &["add", "missing.txt"])
        .assert()
        .failure()
        .code(1)
        .stderr("File does not exist.\n");
}

#[rstest]
fn committing_without_staged_changes_fails(init_repository_dir: TempDir) {
    twig_commit(init_repository_dir.path(), "nothing")
        .assert()
        .failure()
        .code(1)
        .stderr("No changes added to the commit.\n");
}

#[rstest]
fn committing_with_an_empty_message_fails(init_repository_dir: TempDir) {
    let dir = init_repository_dir.path();
    write_file(dir, "a.txt", "a");
    run_twig_command(dir, &["add", "a.txt"]).assert().success();

    twig_commit(dir, "")
        .assert()
        .failure()
        .code(1)
        .stderr("Please enter a commit message.\n");
}

#[rstest]
fn adding_twice_stages_the_file_once(
    init_repository_dir: TempDir,
) -> Result<(), Box<dyn std::error::Error>> {
    let dir = init_repository_dir.path();
    write_file(dir, "a.txt", "a");

    run_twig_command(dir, &["add", "a.txt"]).assert().success();
    run_twig_command(dir, &["add", "a.txt"]).assert().success();

    assert_eq!(staged_section(dir)?, "=== Staged Files ===\na.txt");

    Ok(())
}

#[rstest]
fn adding_the_committed_version_unstages_the_file(init_repository_dir: TempDir) {
    let dir = init_repository_dir.path();
    commit_files(dir, &[("a.txt", "v1")], "first");

    write_file(dir, "a.txt", "v2");
    run_twig_command(dir, &["add", "a.txt"]).assert().success();
    write_file(dir, "a.txt", "v1");
    run_twig_command(dir, &["add", "a.txt"]).assert().success();

    twig_commit(dir, "second")
        .assert()
        .failure()
        .stderr("No changes added to the commit.\n");
}

#[rstest]
fn adding_after_rm_cancels_the_removal(init_repository_dir: TempDir) {
    let dir = init_repository_dir.path();
    commit_files(dir, &[("a.txt", "v1")], "first");

    run_twig_command(dir, &["rm", "a.txt"]).assert().success();
    assert!(!dir.join("a.txt").exists());

    write_file(dir, "a.txt", "v1");
    run_twig_command(dir, &["add", "a.txt"]).assert().success();

    twig_commit(dir, "second")
        .assert()
        .failure()
        .stderr("No changes added to the commit.\n");
}

#[rstest]
fn rm_of_a_staged_file_only_unstages_it(
    init_repository_dir: TempDir,
) -> Result<(), Box<dyn std::error::Error>> {
    let dir = init_repository_dir.path();
    write_file(dir, "a.txt", "a");
    run_twig_command(dir, &["add", "a.txt"]).assert().success();

    run_twig_command(dir, &["rm", "a.txt"]).assert().success();

    assert_eq!(read_file(dir, "a.txt"), "a");
    assert_eq!(staged_section(dir)?, "=== Staged Files ===");

    Ok(())
}

#[rstest]
fn rm_of_an_unknown_file_fails(init_repository_dir: TempDir) {
    let dir = init_repository_dir.path();
    write_file(dir, "a.txt", "a");

    run_twig_command(dir, &["rm", "a.txt"])
        .assert()
        .failure()
        .code(1)
        .stderr("No reason to remove the file.\n");
}

#[rstest]
fn rm_of_a_tracked_file_removes_it_from_the_next_commit(init_repository_dir: TempDir) {
    let dir = init_repository_dir.path();
    commit_files(dir, &[("a.txt", "a"), ("b.txt", "b")], "first");

    run_twig_command(dir, &["rm", "a.txt"]).assert().success();
    assert!(!dir.join("a.txt").exists());
    twig_commit(dir, "drop a").assert().success();

    run_twig_command(dir, &["checkout", "--", "a.txt"])
        .assert()
        .failure()
        .stderr("File does not exist in that commit.\n");
    run_twig_command(dir, &["checkout", "--", "b.txt"])
        .assert()
        .success();
}

#[rstest]
fn identical_contents_share_one_blob(init_repository_dir: TempDir) {
    let dir = init_repository_dir.path();
    // root commit
    assert_eq!(common::count_objects(dir), 1);

    commit_files(dir, &[("a.txt", "same"), ("nested/b.txt", "same")], "twins");

    // one blob and the new commit
    assert_eq!(common::count_objects(dir), 3);
}

#[rstest]
fn commit_advances_the_current_branch(init_repository_dir: TempDir) {
    let dir = init_repository_dir.path();
    let root = common::head_commit_id(dir);

    commit_files(dir, &[("a.txt", "a")], "first");

    let head = common::head_commit_id(dir);
    assert_ne!(head, root);
    assert_eq!(common::find_commits(dir, "first"), vec![head]);
}

#[rstest]
#[case("../outside.txt")]
#[case(".twig/HEAD")]
fn paths_outside_the_working_tree_are_rejected(init_repository_dir: TempDir, #[case] path: &str) {
    run_twig_command(init_repository_dir.path(), &["add", path])
        .assert()
        .failure()
        .code(1)
        .stderr(format!("Invalid path: {path}\n"));
}
