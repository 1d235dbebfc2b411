use std::{
  collections::HashMap,
  path::{
    Path,
    PathBuf,
  },
};

use eyre::{
  Context,
  Result,
  bail,
};
use serde::Deserialize;
use trimmer_lib::{
  command::{
    MessageOverride,
    TrimOptions,
  },
  trim::Rule,
};

/// Depth up to which the user file is merged into the defaults. Deep enough
/// to merge a single field of `[trim.messages.<command>]`.
const MERGE_DEPTH: usize = 4;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JournalConfig {
  /// Fully expanded journal directory.
  pub dir:    PathBuf,
  pub commit: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
  pub trim:    TrimOptions,
  pub journal: JournalConfig,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
struct RawConfig {
  trim:    RawTrim,
  journal: RawJournal,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
struct RawTrim {
  default_to_all: bool,
  #[serde(default)]
  messages:       HashMap<String, MessageOverride>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawJournal {
  dir:    String,
  commit: bool,
}

/// Default built-in config.toml.
pub fn default_config() -> Result<toml::Value> {
  toml::from_str(include_str!("config.toml")).context("failed to parse built-in config.toml")
}

/// The defaults with the user file at `path` merged on top. A missing file
/// is not an error.
pub fn user_config(path: &Path) -> Result<toml::Value> {
  let default = default_config()?;

  let contents = match std::fs::read_to_string(path) {
    Ok(contents) => contents,
    Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
      log::debug!("no config file at {}, using defaults", path.display());
      return Ok(default);
    },
    Err(err) => {
      return Err(err).with_context(|| format!("failed to read {}", path.display()));
    },
  };

  let user: toml::Value =
    toml::from_str(&contents).with_context(|| format!("failed to parse {}", path.display()))?;
  log::debug!("loaded config from {}", path.display());
  Ok(crate::merge_toml_values(default, user, MERGE_DEPTH))
}

impl Config {
  /// Load the config file at `path`, or the default location.
  pub fn load(path: Option<&Path>) -> Result<Self> {
    let path = match path {
      Some(path) => path.to_path_buf(),
      None => crate::default_config_file()?,
    };
    Self::from_value(user_config(&path)?)
  }

  /// Validate an already merged config document.
  pub fn from_value(value: toml::Value) -> Result<Self> {
    let raw: RawConfig = value.try_into().context("invalid config")?;

    let mut messages = HashMap::with_capacity(raw.trim.messages.len());
    for (name, texts) in raw.trim.messages {
      let Ok(rule) = name.parse::<Rule>() else {
        bail!("unknown command `{name}` in [trim.messages]");
      };
      messages.insert(rule, texts);
    }

    let dir = trimmer_stdx::path::expand(&raw.journal.dir)
      .context("failed to resolve the journal directory")?;

    Ok(Self {
      trim:    TrimOptions {
        default_to_all: raw.trim.default_to_all,
        messages,
      },
      journal: JournalConfig {
        dir,
        commit: raw.journal.commit,
      },
    })
  }
}
