//! Document state: text, selection and per-document settings.
//!
//! The document is the host side of every command. It owns the [`Rope`], the
//! current [`Selection`] and a few flags, and changes only through
//! [`Document::apply_transaction`], which keeps the selection mapped onto the
//! edited text.
//!
//! # Example
//!
//! ```
//! use ropey::Rope;
//! use trimmer_lib::{
//!   document::Document,
//!   transaction::Transaction,
//! };
//!
//! let mut doc = Document::new(Rope::from("hello"));
//!
//! let tx = Transaction::change(doc.text(), vec![(5, 5, Some(" world".into()))]).unwrap();
//! doc.apply_transaction(&tx).unwrap();
//! assert_eq!(doc.text().to_string(), "hello world");
//! assert!(doc.flags().modified);
//! ```

use std::{
  borrow::Cow,
  path::{
    Path,
    PathBuf,
  },
};

use ropey::Rope;
use thiserror::Error;

use crate::{
  Tendril,
  selection::{
    Range,
    Selection,
    SelectionError,
  },
  transaction::{
    Transaction,
    TransactionError,
  },
};

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct DocumentFlags {
  pub readonly: bool,
  pub modified: bool,
}

/// Settings a command may read or flip on a single document.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct DocumentSettings {
  pub word_wrap: bool,
}

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum DocumentError {
  #[error("document is readonly")]
  Readonly,
  #[error(transparent)]
  Transaction(#[from] TransactionError),
  #[error(transparent)]
  Selection(#[from] SelectionError),
}

pub type Result<T> = std::result::Result<T, DocumentError>;

#[derive(Debug, Clone)]
pub struct Document {
  path:         Option<PathBuf>,
  display_name: Tendril,
  text:         Rope,
  selection:    Selection,
  settings:     DocumentSettings,
  version:      u64,
  flags:        DocumentFlags,
}

impl Document {
  pub fn new(text: Rope) -> Self {
    Self {
      path: None,
      display_name: Tendril::new(),
      text,
      selection: Selection::point(0),
      settings: DocumentSettings::default(),
      version: 0,
      flags: DocumentFlags::default(),
    }
  }

  /// A document backed by `path`. The caller has already read `text` from it.
  pub fn with_path(path: impl Into<PathBuf>, text: Rope) -> Self {
    let path = path.into();
    let mut doc = Self::new(text);
    if let Some(name) = path.file_name() {
      doc.display_name = name.to_string_lossy().as_ref().into();
    }
    doc.path = Some(path);
    doc
  }

  pub fn path(&self) -> Option<&Path> {
    self.path.as_deref()
  }

  pub fn display_name(&self) -> Cow<'_, str> {
    if self.display_name.is_empty() {
      Cow::Borrowed("<untitled>")
    } else {
      Cow::Borrowed(self.display_name.as_str())
    }
  }

  pub fn text(&self) -> &Rope {
    &self.text
  }

  pub fn selection(&self) -> &Selection {
    &self.selection
  }

  /// Replace the selection. Every range must fit in the current text.
  pub fn set_selection(&mut self, selection: Selection) -> Result<()> {
    selection.ensure_within(self.text.len_chars())?;
    self.selection = selection;
    Ok(())
  }

  pub fn settings(&self) -> DocumentSettings {
    self.settings
  }

  pub fn settings_mut(&mut self) -> &mut DocumentSettings {
    &mut self.settings
  }

  pub fn version(&self) -> u64 {
    self.version
  }

  pub fn flags(&self) -> DocumentFlags {
    self.flags
  }

  pub fn set_readonly(&mut self, readonly: bool) {
    self.flags.readonly = readonly;
  }

  pub fn mark_saved(&mut self) {
    self.flags.modified = false;
  }

  /// Apply `transaction` to the text and map the selection through it. The
  /// text is left untouched if the transaction does not fit it.
  pub fn apply_transaction(&mut self, transaction: &Transaction) -> Result<()> {
    if self.flags.readonly {
      return Err(DocumentError::Readonly);
    }

    let text = transaction.apply_to(&self.text)?;
    let selection = self.selection.clone().map(transaction.changes())?;
    selection.ensure_within(text.len_chars())?;

    self.text = text;
    self.selection = selection;

    if !transaction.changes().is_empty() {
      self.flags.modified = true;
      self.version = self.version.saturating_add(1);
    }

    Ok(())
  }

  pub fn replace_range(&mut self, range: Range, text: impl Into<Tendril>) -> Result<()> {
    let tx = Transaction::change(&self.text, vec![(
      range.from(),
      range.to(),
      Some(text.into()),
    )])?;
    self.apply_transaction(&tx)
  }
}
