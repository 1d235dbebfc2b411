use std::{
  cell::RefCell,
  fs,
  path::{
    Path,
    PathBuf,
  },
  process::Command,
};

use eyre::{
  Result,
  eyre,
};

use crate::{
  CommandOutput,
  CommandRunner,
  SystemRunner,
  git,
};

#[derive(Default)]
struct RecordingRunner {
  calls:   RefCell<Vec<(PathBuf, String, Vec<String>)>>,
  fail_on: Option<&'static str>,
}

impl CommandRunner for RecordingRunner {
  fn run(&self, cwd: &Path, program: &str, args: &[&str]) -> Result<CommandOutput> {
    self.calls.borrow_mut().push((
      cwd.to_path_buf(),
      program.to_string(),
      args.iter().map(|arg| arg.to_string()).collect(),
    ));
    if args.first() == self.fail_on.as_ref() {
      return Err(eyre!("{program} {args:?} refused"));
    }
    Ok(CommandOutput::default())
  }
}

#[test]
fn add_then_commit() {
  let runner = RecordingRunner::default();
  git::add_and_commit(
    &runner,
    Path::new("/journal"),
    Path::new("/journal/2024-01 January/2024-01-02-03:04.md"),
    "new entry",
  )
  .unwrap();

  let calls = runner.calls.borrow();
  assert_eq!(calls.len(), 2);
  assert_eq!(calls[0].0, PathBuf::from("/journal"));
  assert_eq!(calls[0].1, "git");
  assert_eq!(calls[0].2, vec![
    "add",
    "/journal/2024-01 January/2024-01-02-03:04.md"
  ]);
  assert_eq!(calls[1].2, vec!["commit", "-m", "new entry"]);
}

#[test]
fn failed_add_skips_commit() {
  let runner = RecordingRunner {
    fail_on: Some("add"),
    ..RecordingRunner::default()
  };
  let err = git::add_and_commit(&runner, Path::new("/r"), Path::new("/r/f.md"), "msg").unwrap_err();
  assert!(format!("{err:#}").contains("refused"));
  assert_eq!(runner.calls.borrow().len(), 1);
}

fn exec_git_cmd(args: &str, git_dir: &Path) {
  let res = Command::new("git")
    .arg("-C")
    .arg(git_dir)
    .args(args.split_whitespace())
    .env_remove("GIT_DIR")
    .env("GIT_TERMINAL_PROMPT", "false")
    .env("GIT_CONFIG_COUNT", "1")
    .env("GIT_CONFIG_KEY_0", "init.defaultBranch")
    .env("GIT_CONFIG_VALUE_0", "main")
    .output()
    .unwrap_or_else(|_| panic!("`git {args}` failed"));
  if !res.status.success() {
    eprintln!("{}", String::from_utf8_lossy(&res.stderr));
    panic!("`git {args}` failed (see output above)")
  }
}

#[test]
fn commits_in_a_real_repository() {
  if !trimmer_stdx::env::binary_exists("git") {
    return;
  }

  let temp = tempfile::tempdir().unwrap();
  exec_git_cmd("init", temp.path());
  exec_git_cmd("config user.email journal@example.com", temp.path());
  exec_git_cmd("config user.name journal", temp.path());
  exec_git_cmd("config commit.gpgsign false", temp.path());

  let file = temp.path().join("entry.md");
  fs::write(&file, "# Journal\n\n").unwrap();

  git::add_and_commit(&SystemRunner, temp.path(), &file, "journal entry").unwrap();

  let log = SystemRunner
    .run(temp.path(), "git", &["log", "--format=%s"])
    .unwrap();
  assert_eq!(log.stdout.trim(), "journal entry");
}
