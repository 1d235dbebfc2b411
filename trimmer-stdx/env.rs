//! Functions for working with the host environment.

use std::{
  borrow::Cow,
  ffi::OsStr,
  path::PathBuf,
};

use eyre::{
  Result,
  WrapErr,
};
use once_cell::sync::Lazy;
use regex::{
  Captures,
  Regex,
};

/// Checks if a binary with the given name exists.
pub fn binary_exists<T: AsRef<OsStr>>(binary_name: T) -> bool {
  which::which(binary_name).is_ok()
}

/// Attempts to find a binary of the given name. See [which](https://linux.die.net/man/1/which).
pub fn which<T: AsRef<OsStr>>(binary_name: T) -> Result<PathBuf> {
  let binary_name = binary_name.as_ref();
  which::which(binary_name)
    .wrap_err_with(|| format!("command '{}' not found", binary_name.to_string_lossy()))
}

/// Regex for the supported variable syntax. Groups: 1 braced name, 2 default,
/// 3 bare name.
fn var_expansion_regex() -> &'static Regex {
  static REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\$\{([A-Za-z_][A-Za-z0-9_]*)(?::-([^}]*))?\}|\$([A-Za-z_][A-Za-z0-9_]*)")
      .expect("env var expansion regex should compile")
  });

  &REGEX
}

fn expand_impl(src: &str, resolve: impl Fn(&str) -> Option<String>) -> Cow<'_, str> {
  var_expansion_regex().replace_all(src, |caps: &Captures| {
    if let Some(name) = caps.get(1) {
      let default = caps.get(2).map_or("", |m| m.as_str());
      return match resolve(name.as_str()) {
        // `${VAR:-default}` also falls back when VAR is empty
        Some(value) if !value.is_empty() || caps.get(2).is_none() => value,
        _ => default.to_string(),
      };
    }

    caps
      .get(3)
      .and_then(|name| resolve(name.as_str()))
      .unwrap_or_default()
  })
}

/// Performs substitution of environment variables. Supports `$VAR`, `${VAR}`
/// and `${VAR:-default}`. Unset variables expand to nothing.
pub fn expand(src: &str) -> Cow<'_, str> {
  expand_impl(src, |var| std::env::var(var).ok())
}
