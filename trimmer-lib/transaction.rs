//! Batched edits against a document snapshot.
//!
//! A command never mutates the buffer while it is still reading it. It
//! collects `(from, to, replacement)` [`Change`]s against the unmodified text,
//! and [`Transaction::change`] checks them into a [`ChangeSet`]: the sorted
//! edits plus the length of the snapshot they were computed on. Applying the
//! set rebuilds the text in a single pass, and [`ChangeSet::map_pos`] carries
//! cursors and selection bounds over to the new text.
//!
//! ```
//! use ropey::Rope;
//! use trimmer_lib::transaction::Transaction;
//!
//! let doc = Rope::from("a  \nb\t\n");
//! let tx = Transaction::delete(&doc, vec![(1, 3), (5, 6)]).unwrap();
//!
//! assert_eq!(tx.apply_to(&doc).unwrap(), "a\nb\n");
//! ```
//!
//! Edits keep their own boundaries even when they touch, so two adjacent
//! spans that were both rewritten still map to two adjacent ranges.

use ropey::{
  Rope,
  RopeBuilder,
};
use thiserror::Error;

use crate::Tendril;

pub type Result<T> = std::result::Result<T, TransactionError>;

/// (from, to) replacement. `None` deletes the range.
pub type Change = (usize, usize, Option<Tendril>);
pub type Deletion = (usize, usize);

#[derive(Debug, Error, PartialEq, Eq)]
#[non_exhaustive]
pub enum TransactionError {
  #[error("changeset length mismatch: expected {expected}, got {actual}")]
  LengthMismatch { expected: usize, actual: usize },
  #[error("invalid change range: start {from} is after end {to}")]
  InvalidRange { from: usize, to: usize },
  #[error("change range {from}..{to} is out of bounds for document length {len}")]
  RangeOutOfBounds {
    from: usize,
    to:   usize,
    len:  usize,
  },
  #[error("change range {from}..{to} overlaps previous end {prev_end}")]
  OverlappingRange {
    prev_end: usize,
    from:     usize,
    to:       usize,
  },
  #[error("position {pos} is out of bounds for changeset length {len}")]
  PositionOutOfBounds { pos: usize, len: usize },
}

/// Which side of an edit a position lands on when it falls inside it.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Assoc {
  /// Start of the replacement.
  Before,
  /// End of the replacement.
  After,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Edit {
  from:  usize,
  to:    usize,
  /// Empty for a deletion.
  text:  Tendril,
  chars: usize,
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ChangeSet {
  edits:     Vec<Edit>,
  /// Length of the snapshot. Applying to any other length is refused.
  len:       usize,
  len_after: usize,
}

impl ChangeSet {
  fn from_changes<I>(len: usize, changes: I) -> Result<Self>
  where
    I: IntoIterator<Item = Change>,
  {
    let mut edits = Vec::new();
    let mut len_after = len;
    let mut last = 0;

    for (from, to, text) in changes {
      validate_change_bounds(from, to, len)?;
      if from < last {
        return Err(TransactionError::OverlappingRange {
          prev_end: last,
          from,
          to,
        });
      }
      last = to;

      let text = text.unwrap_or_default();
      if from == to && text.is_empty() {
        continue;
      }
      let chars = text.chars().count();
      len_after = len_after + chars - (to - from);
      edits.push(Edit {
        from,
        to,
        text,
        chars,
      });
    }

    Ok(Self {
      edits,
      len,
      len_after,
    })
  }

  /// Length of the snapshot the changes were made against.
  pub fn len(&self) -> usize {
    self.len
  }

  /// Length of the text once the changes are applied.
  pub fn len_after(&self) -> usize {
    self.len_after
  }

  pub fn is_empty(&self) -> bool {
    self.edits.is_empty()
  }

  /// Build the edited text. `text` must be the snapshot the set was made for.
  pub fn apply_to(&self, text: &Rope) -> Result<Rope> {
    if text.len_chars() != self.len {
      return Err(TransactionError::LengthMismatch {
        expected: self.len,
        actual:   text.len_chars(),
      });
    }
    if self.is_empty() {
      return Ok(text.clone());
    }

    let mut builder = RopeBuilder::new();
    let mut pos = 0;
    for edit in &self.edits {
      append_slice(&mut builder, text, pos, edit.from);
      builder.append(edit.text.as_str());
      pos = edit.to;
    }
    append_slice(&mut builder, text, pos, self.len);

    Ok(builder.finish())
  }

  /// Map a position in the snapshot to the same position in the edited text.
  ///
  /// A position inside a deleted or replaced range, or exactly at an
  /// insertion, lands on the start of the new text or, with [`Assoc::After`],
  /// on its end.
  pub fn map_pos(&self, pos: usize, assoc: Assoc) -> Result<usize> {
    if pos > self.len {
      return Err(TransactionError::PositionOutOfBounds { pos, len: self.len });
    }

    let mut removed = 0;
    let mut inserted = 0;
    for edit in &self.edits {
      if pos < edit.from {
        break;
      }
      if pos < edit.to || pos == edit.from {
        let start = edit.from + inserted - removed;
        return Ok(match assoc {
          Assoc::Before => start,
          Assoc::After => start + edit.chars,
        });
      }
      removed += edit.to - edit.from;
      inserted += edit.chars;
    }

    Ok(pos + inserted - removed)
  }

  /// The edits as `(from, to, replacement)` in snapshot offsets.
  pub fn changes_iter(&self) -> impl Iterator<Item = Change> + '_ {
    self.edits.iter().map(|edit| {
      let text = (!edit.text.is_empty()).then(|| edit.text.clone());
      (edit.from, edit.to, text)
    })
  }
}

fn append_slice(builder: &mut RopeBuilder, text: &Rope, from: usize, to: usize) {
  if from >= to {
    return;
  }
  for chunk in text.slice(from..to).chunks() {
    builder.append(chunk);
  }
}

fn validate_change_bounds(from: usize, to: usize, len: usize) -> Result<()> {
  if from > to {
    return Err(TransactionError::InvalidRange { from, to });
  }
  if to > len {
    return Err(TransactionError::RangeOutOfBounds { from, to, len });
  }
  Ok(())
}

/// One atomic edit of a document, built against a snapshot of its text.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Transaction {
  changes: ChangeSet,
}

impl Transaction {
  /// Changes must be sorted and must not overlap. Empty insertions are
  /// dropped.
  pub fn change<I>(doc: &Rope, changes: I) -> Result<Self>
  where
    I: IntoIterator<Item = Change>,
  {
    let changes = ChangeSet::from_changes(doc.len_chars(), changes)?;
    Ok(Self { changes })
  }

  /// Deletions may come in any order; overlapping or touching ones are
  /// merged.
  pub fn delete<I>(doc: &Rope, deletions: I) -> Result<Self>
  where
    I: IntoIterator<Item = Deletion>,
  {
    let len = doc.len_chars();

    let mut deletions: Vec<_> = deletions.into_iter().collect();
    deletions.sort_unstable();

    let mut merged: Vec<Deletion> = Vec::with_capacity(deletions.len());
    for (from, to) in deletions {
      validate_change_bounds(from, to, len)?;
      match merged.last_mut() {
        Some((_, last_end)) if from <= *last_end => *last_end = (*last_end).max(to),
        _ => merged.push((from, to)),
      }
    }

    Self::change(doc, merged.into_iter().map(|(from, to)| (from, to, None)))
  }

  pub fn changes(&self) -> &ChangeSet {
    &self.changes
  }

  pub fn apply_to(&self, doc: &Rope) -> Result<Rope> {
    self.changes.apply_to(doc)
  }

  pub fn changes_iter(&self) -> impl Iterator<Item = Change> + '_ {
    self.changes.changes_iter()
  }
}

#[cfg(test)]
mod test {
  use super::*;

  #[test]
  fn change_replaces_and_deletes_in_one_pass() {
    let doc = Rope::from("hello world");
    let tx = Transaction::change(&doc, vec![
      (0, 5, Some("howdy".into())),
      (5, 6, None),
    ])
    .unwrap();

    assert_eq!(tx.apply_to(&doc).unwrap(), "howdyworld");
    assert_eq!(tx.changes().len(), 11);
    assert_eq!(tx.changes().len_after(), 10);
  }

  #[test]
  fn change_rejects_overlap() {
    let doc = Rope::from("hello world");
    let err = Transaction::change(&doc, vec![(0, 5, None), (3, 7, None)]).unwrap_err();
    assert_eq!(err, TransactionError::OverlappingRange {
      prev_end: 5,
      from:     3,
      to:       7,
    });
  }

  #[test]
  fn change_rejects_bad_ranges() {
    let doc = Rope::from("abc");
    let err = Transaction::change(&doc, vec![(2, 9, None)]).unwrap_err();
    assert_eq!(err, TransactionError::RangeOutOfBounds {
      from: 2,
      to:   9,
      len:  3,
    });

    let err = Transaction::delete(&doc, vec![(2, 1)]).unwrap_err();
    assert_eq!(err, TransactionError::InvalidRange { from: 2, to: 1 });
  }

  #[test]
  fn delete_merges_overlapping_ranges() {
    let doc = Rope::from("0123456789");
    let tx = Transaction::delete(&doc, vec![(6, 8), (1, 3), (2, 4)]).unwrap();
    assert_eq!(tx.changes_iter().collect::<Vec<_>>(), vec![
      (1, 4, None),
      (6, 8, None)
    ]);
    assert_eq!(tx.apply_to(&doc).unwrap(), "04589");
  }

  #[test]
  fn apply_counts_chars() {
    let doc = Rope::from("世界 hello  world");
    let tx = Transaction::change(&doc, vec![
      (0, 2, Some("earth".into())),
      (9, 10, None),
    ])
    .unwrap();

    assert_eq!(tx.apply_to(&doc).unwrap(), "earth hello world");
  }

  #[test]
  fn apply_rejects_wrong_length() {
    let doc = Rope::from("abc");
    let tx = Transaction::delete(&doc, vec![(0, 1)]).unwrap();
    assert_eq!(
      tx.apply_to(&Rope::from("abcd")),
      Err(TransactionError::LengthMismatch {
        expected: 3,
        actual:   4,
      })
    );
  }

  #[test]
  fn no_op_changes_are_dropped() {
    let doc = Rope::from("abc");
    let tx = Transaction::change(&doc, vec![(1, 1, None), (2, 2, Some("".into()))]).unwrap();
    assert!(tx.changes().is_empty());
    assert_eq!(tx.apply_to(&doc).unwrap(), doc);

    let tx = Transaction::change(&doc, std::iter::empty()).unwrap();
    assert!(tx.changes().is_empty());
  }

  #[test]
  fn map_pos_over_insert() {
    let doc = Rope::from("abcdefgh");
    let tx = Transaction::change(&doc, vec![(4, 4, Some("!!".into()))]).unwrap();
    let cs = tx.changes();

    assert_eq!(cs.map_pos(4, Assoc::Before).unwrap(), 4);
    assert_eq!(cs.map_pos(4, Assoc::After).unwrap(), 6);
    assert_eq!(cs.map_pos(5, Assoc::Before).unwrap(), 7);
    assert_eq!(cs.map_pos(8, Assoc::Before).unwrap(), 10);
  }

  #[test]
  fn map_pos_over_delete() {
    let doc = Rope::from("0123456789ab");
    let tx = Transaction::delete(&doc, vec![(4, 8)]).unwrap();
    let cs = tx.changes();

    assert_eq!(cs.map_pos(0, Assoc::Before).unwrap(), 0);
    assert_eq!(cs.map_pos(4, Assoc::Before).unwrap(), 4);
    assert_eq!(cs.map_pos(5, Assoc::After).unwrap(), 4);
    assert_eq!(cs.map_pos(8, Assoc::Before).unwrap(), 4);
    assert_eq!(cs.map_pos(10, Assoc::Before).unwrap(), 6);
  }

  #[test]
  fn map_pos_over_replacement() {
    let doc = Rope::from("ab   cd");
    let tx = Transaction::change(&doc, vec![(2, 5, Some("x".into()))]).unwrap();
    let cs = tx.changes();

    assert_eq!(cs.map_pos(2, Assoc::Before).unwrap(), 2);
    assert_eq!(cs.map_pos(3, Assoc::After).unwrap(), 3);
    assert_eq!(cs.map_pos(5, Assoc::Before).unwrap(), 3);
    assert_eq!(
      cs.map_pos(8, Assoc::Before),
      Err(TransactionError::PositionOutOfBounds { pos: 8, len: 7 })
    );
  }

  #[test]
  fn touching_edits_stay_apart() {
    let doc = Rope::from("a  bc  d");
    let tx = Transaction::change(&doc, vec![
      (0, 4, Some("a b".into())),
      (4, 8, Some("c d".into())),
    ])
    .unwrap();
    let cs = tx.changes();

    assert_eq!(tx.changes_iter().count(), 2);
    assert_eq!(cs.map_pos(4, Assoc::Before).unwrap(), 3);
    assert_eq!(cs.map_pos(8, Assoc::Before).unwrap(), 6);
    assert_eq!(tx.apply_to(&doc).unwrap(), "a bc d");
  }
}
