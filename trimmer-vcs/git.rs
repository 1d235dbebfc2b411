use std::path::Path;

use eyre::{
  Result,
  WrapErr,
};

use crate::CommandRunner;

#[cfg(test)]
mod test;

fn run_git(runner: &dyn CommandRunner, cwd: &Path, args: &[&str]) -> Result<()> {
  runner
    .run(cwd, "git", args)
    .wrap_err_with(|| format!("git {args:?} failed in {}", cwd.display()))?;
  Ok(())
}

/// Stage `file` and commit it in the repository at `repo`.
pub fn add_and_commit(
  runner: &dyn CommandRunner,
  repo: &Path,
  file: &Path,
  message: &str,
) -> Result<()> {
  let file = file.to_string_lossy();
  run_git(runner, repo, &["add", file.as_ref()])?;
  run_git(runner, repo, &["commit", "-m", message])
}
