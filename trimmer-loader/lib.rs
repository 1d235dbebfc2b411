pub mod config;

use std::path::{
  Path,
  PathBuf,
};

use etcetera::base_strategy::{
  BaseStrategy,
  choose_base_strategy,
};
use eyre::{
  Result,
  WrapErr,
};
use trimmer_stdx::path;

/// Environment variable that overrides the config directory.
pub const CONFIG_DIR_ENV: &str = "TRIMMER_CONFIG_DIR";

pub fn config_dir() -> Result<PathBuf> {
  if let Ok(dir) = std::env::var(CONFIG_DIR_ENV) {
    return path::expand_tilde(Path::new(&dir));
  }
  let strategy = choose_base_strategy().wrap_err("unable to find the config directory")?;
  let mut path = strategy.config_dir();
  path.push("trimmer");
  Ok(path)
}

pub fn default_config_file() -> Result<PathBuf> {
  Ok(config_dir()?.join("config.toml"))
}

/// Merge two TOML documents, merging values from `right` onto `left`
///
/// `merge_depth` sets the nesting depth up to which tables are merged instead
/// of overridden. Arrays are always replaced by `right`.
///
/// `crate::merge_toml_values(a, b, 4)` combines, for example:
///
/// a:
/// ```toml
/// [trim]
/// default-to-all = true
/// [trim.messages.collapse_lines]
/// changed = "collapsed"
/// ```
/// b:
/// ```toml
/// [trim.messages.collapse_lines]
/// unchanged = "nothing"
/// ```
///
/// into:
/// ```toml
/// [trim]
/// default-to-all = true
/// [trim.messages.collapse_lines]
/// changed = "collapsed"
/// unchanged = "nothing"
/// ```
pub fn merge_toml_values(left: toml::Value, right: toml::Value, merge_depth: usize) -> toml::Value {
  use toml::Value;

  match (left, right) {
    (Value::Table(mut left_map), Value::Table(right_map)) if merge_depth > 0 => {
      for (rname, rvalue) in right_map {
        let merged = match left_map.remove(&rname) {
          Some(lvalue) => merge_toml_values(lvalue, rvalue, merge_depth - 1),
          None => rvalue,
        };
        left_map.insert(rname, merged);
      }
      Value::Table(left_map)
    },
    // Catch everything else we didn't handle, and use the right value
    (_, value) => value,
  }
}
