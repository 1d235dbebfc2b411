//! `trimmer_vcs` runs version control commands for trimmer. Only `git` is
//! supported, and only the add+commit flow used when a journal entry is
//! created.
//!
//! Every external program goes through a [`CommandRunner`] so callers can
//! swap in a fake one in tests.

use std::{
  path::Path,
  process::Command,
};

use eyre::{
  Result,
  WrapErr,
  eyre,
};

pub mod git;

/// Captured output of a finished command.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
  pub stdout: String,
  pub stderr: String,
}

pub trait CommandRunner {
  /// Run `program` with `args` in `cwd`. A non-zero exit status is an error.
  fn run(&self, cwd: &Path, program: &str, args: &[&str]) -> Result<CommandOutput>;
}

/// Runs commands as child processes of the current one.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemRunner;

impl CommandRunner for SystemRunner {
  fn run(&self, cwd: &Path, program: &str, args: &[&str]) -> Result<CommandOutput> {
    let binary = trimmer_stdx::env::which(program)?;
    let output = Command::new(&binary)
      .current_dir(cwd)
      .args(args)
      .env_remove("GIT_DIR")
      .env_remove("GIT_WORK_TREE")
      .output()
      .wrap_err_with(|| format!("failed to run {program} in {}", cwd.display()))?;

    let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
    let stderr = String::from_utf8_lossy(&output.stderr).into_owned();
    if output.status.success() {
      Ok(CommandOutput { stdout, stderr })
    } else {
      Err(eyre!("{program} {args:?} failed: {}", stderr.trim()))
    }
  }
}

/// Fire-and-forget `git add` + `git commit` of `file`. Failures are logged
/// and dropped; a missing repository must never break the caller.
pub fn commit_file(runner: &dyn CommandRunner, repo: &Path, file: &Path, message: &str) -> bool {
  match git::add_and_commit(runner, repo, file, message) {
    Ok(()) => true,
    Err(err) => {
      log::debug!("{err:#?}");
      log::debug!("failed to commit {} in {}", file.display(), repo.display());
      false
    },
  }
}
