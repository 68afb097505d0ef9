//! End-to-end backups of real git repositories

use crate::helpers::*;
use anyhow::Result;

#[test]
fn test_backup_writes_every_changed_file() -> Result<()> {
  let repo = TestRepo::new()?;
  repo.write("README.md", "first\n")?;
  repo.write("src/lib.rs", "pub fn a() {}\n")?;
  let c1 = repo.commit_on("2023-01-10", "Initial")?;
  repo.write("src/lib.rs", "pub fn b() {}\n")?;
  let c2 = repo.commit_on("2023-02-10", "Change lib")?;

  let output = repo.backup_with(&[])?;
  assert!(output.status.success(), "{}", stderr(&output));

  assert_eq!(repo.read_snapshot(&c1, "README.md")?, "first\n");
  assert_eq!(repo.read_snapshot(&c1, "src/lib.rs")?, "pub fn a() {}\n");
  assert_eq!(repo.read_snapshot(&c2, "src/lib.rs")?, "pub fn b() {}\n");
  assert!(!repo.snapshot(&c2, "README.md").exists());
  assert!(stderr(&output).contains("Backup completed successfully."));

  Ok(())
}

#[test]
fn test_date_window_selects_inclusive_range() -> Result<()> {
  let repo = TestRepo::new()?;
  let mut shas = Vec::new();
  for (month, date) in ["2023-01-01", "2023-02-01", "2023-03-01", "2023-04-01", "2023-05-01"]
    .iter()
    .enumerate()
  {
    repo.write("log.txt", &format!("month {}\n", month + 1))?;
    shas.push(repo.commit_on(date, &format!("Month {}", month + 1))?);
  }

  let output = repo.backup_with(&["--start-date", "01-02-2023", "--end-date", "01-04-2023"])?;
  assert!(output.status.success(), "{}", stderr(&output));

  assert!(!repo.backup.join(&shas[0]).exists());
  assert_eq!(repo.read_snapshot(&shas[1], "log.txt")?, "month 2\n");
  assert_eq!(repo.read_snapshot(&shas[2], "log.txt")?, "month 3\n");
  assert_eq!(repo.read_snapshot(&shas[3], "log.txt")?, "month 4\n");
  assert!(!repo.backup.join(&shas[4]).exists());

  Ok(())
}

#[test]
fn test_deleted_file_is_skipped_without_failure() -> Result<()> {
  let repo = TestRepo::new()?;
  repo.write("keep.txt", "keep\n")?;
  repo.write("gone.txt", "soon gone\n")?;
  repo.commit_on("2023-01-10", "Add files")?;
  repo.remove("gone.txt")?;
  let c2 = repo.commit_on("2023-01-11", "Remove file")?;

  let output = repo.backup_with(&[])?;
  let err = stderr(&output);
  assert!(output.status.success(), "{}", err);

  assert!(!repo.snapshot(&c2, "gone.txt").exists());
  assert!(err.contains(&format!("The file gone.txt was deleted in commit {}", c2)));

  Ok(())
}

#[test]
fn test_rerun_produces_identical_tree() -> Result<()> {
  let repo = TestRepo::new()?;
  repo.write("a.txt", "a\n")?;
  repo.write("nested/deep/b.txt", "b\n")?;
  repo.commit_on("2023-01-10", "One")?;
  repo.write("a.txt", "a2\n")?;
  repo.commit_on("2023-01-11", "Two")?;

  let first = repo.backup_with(&[])?;
  assert!(first.status.success(), "{}", stderr(&first));
  let before = repo.backup_tree()?;

  let second = repo.backup_with(&[])?;
  assert!(second.status.success(), "{}", stderr(&second));
  assert_eq!(before, repo.backup_tree()?);
  assert_eq!(before.len(), 3);

  Ok(())
}

#[test]
fn test_json_report() -> Result<()> {
  let repo = TestRepo::new()?;
  repo.write("a.txt", "a\n")?;
  repo.commit_on("2023-01-10", "One")?;

  let output = repo.backup_with(&["--json"])?;
  assert!(output.status.success(), "{}", stderr(&output));

  let report: serde_json::Value = serde_json::from_slice(&output.stdout)?;
  assert_eq!(report["success"], true);
  assert_eq!(report["failures"].as_array().map(Vec::len), Some(0));
  assert_eq!(report["commits_selected"], 1);
  assert_eq!(report["files_written"], 1);

  Ok(())
}

#[test]
fn test_bounded_and_unbounded_in_flight_agree() -> Result<()> {
  let repo = TestRepo::new()?;
  for i in 0..5 {
    for f in 0..4 {
      repo.write(&format!("dir{}/file{}.txt", f, f), &format!("{}-{}\n", i, f))?;
    }
    repo.commit_on(&format!("2023-03-{:02}", i + 1), &format!("Commit {}", i))?;
  }

  let output = repo.backup_with(&["--max-in-flight", "1", "--diff-workers", "1"])?;
  assert!(output.status.success(), "{}", stderr(&output));
  let serial = repo.backup_tree()?;

  std::fs::remove_dir_all(&repo.backup)?;
  std::fs::create_dir_all(&repo.backup)?;
  let output = repo.backup_with(&["--max-in-flight", "0"])?;
  assert!(output.status.success(), "{}", stderr(&output));

  assert_eq!(serial, repo.backup_tree()?);
  assert_eq!(serial.len(), 20);

  Ok(())
}

#[test]
fn test_explicit_branch() -> Result<()> {
  let repo = TestRepo::new()?;
  repo.write("a.txt", "main\n")?;
  repo.commit_on("2023-01-10", "Main")?;
  git(&repo.path, &["checkout", "-q", "-b", "feature"])?;
  repo.write("feature.txt", "feature\n")?;
  let feature = repo.commit_on("2023-01-11", "Feature")?;
  git(&repo.path, &["checkout", "-q", "main"])?;

  let output = repo.backup_with(&["--branch", "main"])?;
  assert!(output.status.success(), "{}", stderr(&output));
  assert!(!repo.backup.join(&feature).exists());

  let output = repo.backup_with(&["--branch", "feature"])?;
  assert!(output.status.success(), "{}", stderr(&output));
  assert_eq!(repo.read_snapshot(&feature, "feature.txt")?, "feature\n");

  Ok(())
}

#[test]
fn test_file_replaced_by_directory_is_a_deletion() -> Result<()> {
  let repo = TestRepo::new()?;
  repo.write("a", "plain file\n")?;
  let c1 = repo.commit_on("2023-01-10", "Add a")?;
  repo.remove("a")?;
  repo.write("a/b.txt", "nested\n")?;
  let c2 = repo.commit_on("2023-01-11", "Turn a into a directory")?;

  let output = repo.backup_with(&["--json"])?;
  assert!(output.status.success(), "{}", stderr(&output));

  let report: serde_json::Value = serde_json::from_slice(&output.stdout)?;
  assert_eq!(report["failures"].as_array().map(Vec::len), Some(0));
  assert_eq!(report["deletions_skipped"], 1);
  assert_eq!(report["files_written"], 2);
  assert_eq!(repo.read_snapshot(&c1, "a")?, "plain file\n");
  assert_eq!(repo.read_snapshot(&c2, "a/b.txt")?, "nested\n");

  Ok(())
}

#[test]
fn test_present_but_unreadable_entry_is_one_failure() -> Result<()> {
  let repo = TestRepo::new()?;
  repo.write("x.txt", "x\n")?;
  let c1 = repo.commit_on("2023-01-10", "One")?;
  let cacheinfo = format!("160000,{},sub", c1);
  git(&repo.path, &["update-index", "--add", "--cacheinfo", &cacheinfo])?;
  let c2 = repo.commit_index_on("2023-01-11", "Add gitlink")?;

  let output = repo.backup_with(&["--json"])?;
  assert_eq!(output.status.code(), Some(4), "{}", stderr(&output));

  let report: serde_json::Value = serde_json::from_slice(&output.stdout)?;
  let failures = report["failures"].as_array().cloned().unwrap_or_default();
  assert_eq!(failures.len(), 1);
  assert_eq!(failures[0]["commit"], c2.as_str());
  assert_eq!(failures[0]["file"], "sub");
  assert_eq!(report["deletions_skipped"], 0);
  assert!(!repo.snapshot(&c2, "sub").exists());
  assert_eq!(repo.read_snapshot(&c1, "x.txt")?, "x\n");

  Ok(())
}

#[test]
fn test_deleted_file_named_like_pathspec_magic() -> Result<()> {
  let repo = TestRepo::new()?;
  repo.write(":foo", "colon\n")?;
  repo.write("foo", "plain\n")?;
  let c1 = repo.commit_on("2023-01-10", "Add both")?;
  repo.remove(":foo")?;
  let c2 = repo.commit_on("2023-01-11", "Drop :foo")?;

  let output = repo.backup_with(&[])?;
  assert!(output.status.success(), "{}", stderr(&output));

  assert_eq!(repo.read_snapshot(&c1, ":foo")?, "colon\n");
  assert!(!repo.snapshot(&c2, ":foo").exists());
  assert!(!repo.snapshot(&c2, "foo").exists());

  Ok(())
}

#[test]
fn test_merge_backs_up_only_resolved_paths() -> Result<()> {
  let repo = TestRepo::new()?;
  repo.write("c.txt", "base\n")?;
  repo.commit_on("2023-01-10", "Base")?;

  git(&repo.path, &["checkout", "-q", "-b", "feature"])?;
  repo.write("c.txt", "feature\n")?;
  repo.write("x.txt", "x\n")?;
  repo.commit_on("2023-01-11", "Feature side")?;

  git(&repo.path, &["checkout", "-q", "main"])?;
  repo.write("c.txt", "main\n")?;
  repo.write("y.txt", "y\n")?;
  repo.commit_on("2023-01-12", "Main side")?;

  repo.merge_no_commit("feature")?;
  repo.write("c.txt", "resolved\n")?;
  let merge = repo.commit_on("2023-01-13", "Merge feature")?;

  let output = repo.backup_with(&[])?;
  assert!(output.status.success(), "{}", stderr(&output));

  assert_eq!(repo.read_snapshot(&merge, "c.txt")?, "resolved\n");
  assert!(!repo.snapshot(&merge, "x.txt").exists());
  assert!(!repo.snapshot(&merge, "y.txt").exists());

  Ok(())
}
