//! Running a [`Rule`] against a [`Document`].
//!
//! A command invocation is split in two steps:
//!
//! 1. [`plan`] reads a snapshot of the document, collects the spans the rule
//!    targets and turns every changed span into one change of a single
//!    [`Transaction`]. All offsets are computed against the snapshot.
//! 2. [`execute`] applies that transaction (if any), which also maps the
//!    selection onto the new text, and publishes exactly one status message.
//!
//! Rules never fail. The only errors come from the document model and mean
//! the document refused the edit (for instance because it is readonly).

use std::collections::HashMap;

use serde::Deserialize;
use thiserror::Error;

use crate::{
  Tendril,
  document::{
    Document,
    DocumentError,
  },
  messages::MessageCenter,
  transaction::{
    Change,
    Transaction,
    TransactionError,
  },
  trim::{
    self,
    Rule,
    Target,
  },
};

/// Source attached to every status message.
pub const MESSAGE_SOURCE: &str = "trimmer";

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum CommandError {
  #[error(transparent)]
  Transaction(#[from] TransactionError),
  #[error(transparent)]
  Document(#[from] DocumentError),
}

pub type Result<T> = std::result::Result<T, CommandError>;

/// A run of document text, in char offsets, with its content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextSpan {
  pub start: usize,
  pub end:   usize,
  pub text:  String,
}

impl TextSpan {
  pub fn len(&self) -> usize {
    self.end - self.start
  }

  pub fn is_empty(&self) -> bool {
    self.start == self.end
  }
}

/// Disjoint spans in document order.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SelectionSet {
  spans: Vec<TextSpan>,
}

impl SelectionSet {
  pub fn spans(&self) -> &[TextSpan] {
    &self.spans
  }

  pub fn len(&self) -> usize {
    self.spans.len()
  }

  pub fn is_empty(&self) -> bool {
    self.spans.is_empty()
  }

  pub fn iter(&self) -> std::slice::Iter<'_, TextSpan> {
    self.spans.iter()
  }
}

impl<'a> IntoIterator for &'a SelectionSet {
  type Item = &'a TextSpan;
  type IntoIter = std::slice::Iter<'a, TextSpan>;

  fn into_iter(self) -> Self::IntoIter {
    self.spans.iter()
  }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatusOutcome {
  Changed(String),
  Unchanged(String),
}

impl StatusOutcome {
  pub fn message(&self) -> &str {
    match self {
      StatusOutcome::Changed(message) | StatusOutcome::Unchanged(message) => message,
    }
  }

  pub fn is_changed(&self) -> bool {
    matches!(self, StatusOutcome::Changed(_))
  }
}

/// The two status lines of a rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusMessages {
  pub changed:   String,
  pub unchanged: String,
}

impl StatusMessages {
  pub fn defaults(rule: Rule) -> Self {
    let (changed, unchanged) = match rule {
      Rule::TrimTrailingWhitespace => {
        (
          "Trimmer: trailing whitespace removed.",
          "Trimmer: no trailing whitespace found.",
        )
      },
      Rule::DeleteEmptyLines => {
        (
          "Trimmer: empty lines deleted.",
          "Trimmer: no empty lines to delete.",
        )
      },
      Rule::RemoveBlankSpaces => {
        (
          "Trimmer: blanks spaces removed.",
          "Trimmer: blanks spaces removed.",
        )
      },
      Rule::TrimLeadingWhitespace => {
        (
          "Trimmer: leading whitespace removed.",
          "Trimmer: leading whitespace removed.",
        )
      },
      Rule::TrimLeadingTrailingWhitespace => {
        (
          "Trimmer: leading and trailing whitespace removed.",
          "Trimmer: leading and trailing whitespace removed.",
        )
      },
      Rule::CollapseLines => ("Trimmer: lines collapsed.", "Trimmer: no lines to collapse."),
      Rule::CollapseSpaces => ("Trimmer: spaces collapsed.", "Trimmer: no spaces to collapse."),
      Rule::NormalizeSpaces => {
        (
          "Trimmer: spaces normalized.",
          "Trimmer: no spaces to normalize.",
        )
      },
      Rule::TokenizeString => ("Trimmer: string tokenized.", "Trimmer: nothing to tokenize."),
      Rule::TrimEdges => ("Trimmer: file edges trimmed.", "Trimmer: file edges trimmed."),
      Rule::DeleteEmptyTags => {
        (
          "Trimmer: empty tags deleted.",
          "Trimmer: no empty tags to delete.",
        )
      },
      Rule::ReplaceSmartCharacters => {
        (
          "Trimmer: smart characters replaced.",
          "Trimmer: no smart characters to replace.",
        )
      },
    };

    Self {
      changed:   changed.to_string(),
      unchanged: unchanged.to_string(),
    }
  }
}

/// User overrides for a rule's status lines. Missing fields keep the default.
#[derive(Debug, Default, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MessageOverride {
  pub changed:   Option<String>,
  pub unchanged: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrimOptions {
  /// Treat the whole document as selected when nothing is.
  pub default_to_all: bool,
  pub messages:       HashMap<Rule, MessageOverride>,
}

impl Default for TrimOptions {
  fn default() -> Self {
    Self {
      default_to_all: true,
      messages:       HashMap::new(),
    }
  }
}

impl TrimOptions {
  pub fn messages_for(&self, rule: Rule) -> StatusMessages {
    let mut messages = StatusMessages::defaults(rule);
    if let Some(custom) = self.messages.get(&rule) {
      if let Some(changed) = &custom.changed {
        messages.changed.clone_from(changed);
      }
      if let Some(unchanged) = &custom.unchanged {
        messages.unchanged.clone_from(unchanged);
      }
    }
    messages
  }
}

/// Everything an invocation will do, computed without touching the document.
#[derive(Debug, Clone)]
pub struct Plan {
  pub rule:        Rule,
  pub spans:       SelectionSet,
  /// `None` when no span changed.
  pub transaction: Option<Transaction>,
}

impl Plan {
  pub fn is_changed(&self) -> bool {
    self.transaction.is_some()
  }
}

/// The spans a selection-scoped rule reads: every non-empty range of the
/// document's selection, or the whole document when there is none and
/// `default_to_all` is set.
pub fn selections(doc: &Document, default_to_all: bool) -> SelectionSet {
  let text = doc.text();
  let mut spans: Vec<TextSpan> = doc
    .selection()
    .non_empty()
    .map(|range| {
      TextSpan {
        start: range.from(),
        end:   range.to(),
        text:  range.fragment(text.slice(..)).into_owned(),
      }
    })
    .collect();

  if spans.is_empty() && default_to_all {
    spans.push(whole_document(doc));
  }

  SelectionSet { spans }
}

fn whole_document(doc: &Document) -> TextSpan {
  TextSpan {
    start: 0,
    end:   doc.text().len_chars(),
    text:  doc.text().to_string(),
  }
}

pub fn plan(rule: Rule, doc: &Document, default_to_all: bool) -> Result<Plan> {
  let text = doc.text();

  let (spans, transaction) = match rule.target() {
    Target::Selections | Target::Document => {
      let spans = match rule.target() {
        Target::Selections => selections(doc, default_to_all),
        _ if text.len_chars() == 0 => SelectionSet::default(),
        _ => {
          SelectionSet {
            spans: vec![whole_document(doc)],
          }
        },
      };

      let changes: Vec<Change> = spans
        .iter()
        .filter(|span| !span.is_empty())
        .filter_map(|span| {
          let output = rule.transform(&span.text);
          output
            .changed
            .then(|| (span.start, span.end, Some(Tendril::from(output.text.as_ref()))))
        })
        .collect();

      let transaction = if changes.is_empty() {
        None
      } else {
        Some(Transaction::change(text, changes)?)
      };
      (spans, transaction)
    },
    Target::DocumentMatches => {
      if text.len_chars() == 0 {
        (SelectionSet::default(), None)
      } else {
        let span = whole_document(doc);
        let deletions: Vec<(usize, usize)> = trim::trailing_whitespace(&span.text)
          .map(|range| (text.byte_to_char(range.start), text.byte_to_char(range.end)))
          .collect();

        let transaction = if deletions.is_empty() {
          None
        } else {
          Some(Transaction::delete(text, deletions)?)
        };
        (SelectionSet { spans: vec![span] }, transaction)
      }
    },
  };

  Ok(Plan {
    rule,
    spans,
    transaction,
  })
}

/// Run `rule` on `doc` and report the result in `messages`.
///
/// Exactly one message is published per call: the rule's changed or
/// unchanged line, or the error if the document refused the edit.
pub fn execute(
  rule: Rule,
  doc: &mut Document,
  messages: &mut MessageCenter,
  options: &TrimOptions,
) -> Result<StatusOutcome> {
  match run(rule, doc, options) {
    Ok(outcome) => {
      messages.info(Some(MESSAGE_SOURCE.to_string()), outcome.message());
      Ok(outcome)
    },
    Err(err) => {
      tracing::warn!(command = rule.name(), %err, "command failed");
      messages.error(Some(MESSAGE_SOURCE.to_string()), err.to_string());
      Err(err)
    },
  }
}

fn run(rule: Rule, doc: &mut Document, options: &TrimOptions) -> Result<StatusOutcome> {
  let plan = plan(rule, doc, options.default_to_all)?;
  let texts = options.messages_for(rule);

  tracing::debug!(
    command = rule.name(),
    spans = plan.spans.len(),
    changed = plan.is_changed(),
    "planned command"
  );

  match &plan.transaction {
    Some(transaction) => {
      doc.apply_transaction(transaction)?;
      Ok(StatusOutcome::Changed(texts.changed))
    },
    None => Ok(StatusOutcome::Unchanged(texts.unchanged)),
  }
}

/// Flip the document's word wrap setting and return the new value.
pub fn toggle_word_wrap(doc: &mut Document) -> bool {
  let settings = doc.settings_mut();
  settings.word_wrap = !settings.word_wrap;
  tracing::debug!(word_wrap = settings.word_wrap, "toggled word wrap");
  settings.word_wrap
}
