//! Journal entries: one markdown file per entry, grouped in month folders.
//!
//! ```text
//! <dir>/2024-03 March/2024-03-09-14:05.md
//! ```
//!
//! A new entry starts with a `# Journal : 2024-03-09 14:05` header followed by
//! an empty line and is opened as a [`Document`] with the cursor at the end.

use std::{
  fs,
  path::{
    Path,
    PathBuf,
  },
};

use chrono::NaiveDateTime;
use eyre::{
  Result,
  WrapErr,
};
use ropey::Rope;
use trimmer_lib::{
  document::Document,
  selection::Selection,
};
use trimmer_vcs::CommandRunner;

const MONTH_DIR_FORMAT: &str = "%Y-%m %B";
const FILE_NAME_FORMAT: &str = "%Y-%m-%d-%H:%M.md";
const HEADER_FORMAT: &str = "# Journal : %Y-%m-%d %H:%M";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JournalOptions {
  /// Journal root, already expanded.
  pub dir:    PathBuf,
  /// Commit every new entry with git.
  pub commit: bool,
}

#[derive(Debug)]
pub struct JournalEntry {
  pub path:      PathBuf,
  pub document:  Document,
  /// Whether the entry was committed. Always false when committing is off.
  pub committed: bool,
}

pub fn month_dir(dir: &Path, now: &NaiveDateTime) -> PathBuf {
  dir.join(now.format(MONTH_DIR_FORMAT).to_string())
}

pub fn entry_path(dir: &Path, now: &NaiveDateTime) -> PathBuf {
  month_dir(dir, now).join(now.format(FILE_NAME_FORMAT).to_string())
}

pub fn header(now: &NaiveDateTime) -> String {
  format!("{}\n\n", now.format(HEADER_FORMAT))
}

/// Create the entry for `now`, overwriting an entry from the same minute.
pub fn create_entry(
  options: &JournalOptions,
  now: &NaiveDateTime,
  runner: &dyn CommandRunner,
) -> Result<JournalEntry> {
  let month = month_dir(&options.dir, now);
  fs::create_dir_all(&month)
    .wrap_err_with(|| format!("failed to create journal directory {}", month.display()))?;

  let path = entry_path(&options.dir, now);
  let contents = header(now);
  fs::write(&path, &contents)
    .wrap_err_with(|| format!("failed to write journal entry {}", path.display()))?;
  tracing::info!(path = %path.display(), "created journal entry");

  let committed = options.commit && {
    let message = format!("Journal entry {}", now.format("%Y-%m-%d %H:%M"));
    trimmer_vcs::commit_file(runner, &options.dir, &path, &message)
  };

  let text = Rope::from(contents.as_str());
  let end = text.len_chars();
  let mut document = Document::with_path(&path, text);
  document.set_selection(Selection::point(end))?;

  Ok(JournalEntry {
    path,
    document,
    committed,
  })
}
