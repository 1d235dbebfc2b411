//! Path helpers: home directory lookup and `~`/`$VAR` expansion.

use std::path::{
  Path,
  PathBuf,
};

use eyre::{
  Result,
  WrapErr,
};

use crate::env;

pub fn home_dir() -> Result<PathBuf> {
  etcetera::home_dir().wrap_err("failed to locate the home directory")
}

/// Replace a leading `~` with `home`. `~user` forms are left alone.
pub fn expand_tilde_with(path: &Path, home: &Path) -> PathBuf {
  match path.strip_prefix("~") {
    Ok(rest) => home.join(rest),
    Err(_) => path.to_path_buf(),
  }
}

pub fn expand_tilde(path: &Path) -> Result<PathBuf> {
  if !path.starts_with("~") {
    return Ok(path.to_path_buf());
  }
  Ok(expand_tilde_with(path, &home_dir()?))
}

/// Expand environment variables, then a leading `~`.
pub fn expand(path: &str) -> Result<PathBuf> {
  let expanded = env::expand(path);
  expand_tilde(Path::new(expanded.as_ref()))
    .wrap_err_with(|| format!("failed to expand path '{path}'"))
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn tilde_is_replaced() {
    let home = Path::new("/home/me");
    assert_eq!(
      expand_tilde_with(Path::new("~/notes/journal"), home),
      PathBuf::from("/home/me/notes/journal")
    );
    assert_eq!(expand_tilde_with(Path::new("~"), home), PathBuf::from("/home/me"));
  }

  #[test]
  fn other_paths_are_untouched() {
    let home = Path::new("/home/me");
    assert_eq!(
      expand_tilde_with(Path::new("/var/~/x"), home),
      PathBuf::from("/var/~/x")
    );
    assert_eq!(
      expand_tilde_with(Path::new("~other/x"), home),
      PathBuf::from("~other/x")
    );
    assert_eq!(
      expand_tilde(Path::new("relative/dir")).unwrap(),
      PathBuf::from("relative/dir")
    );
  }

  #[test]
  fn absolute_path_survives_expand() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("journal");
    let raw = path.to_str().unwrap();
    assert_eq!(expand(raw).unwrap(), path);
  }
}
