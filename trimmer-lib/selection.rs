//! Cursor positions and multi-range selections.
//!
//! A [`Range`] has two positions: `anchor` and `head`. When `anchor == head`
//! the range is a cursor and selects nothing.
//!
//! ```text
//! anchor=2, head=7: "he[llo w]orld"  (forward selection)
//! anchor=7, head=2: "he]llo w[orld"  (backward selection)
//! anchor=5, head=5: "hello|world"    (point/cursor)
//! ```
//!
//! A [`Selection`] holds one or more ranges. Ranges are kept normalized:
//!
//! - Sorted by position
//! - No overlapping ranges (overlaps are merged)
//! - Always at least one range
//!
//! Commands read the non-empty ranges as disjoint text spans, which is why
//! the normalization matters: two spans can never cover the same character.
//!
//! # Error Handling
//!
//! Operations return [`Result<T, SelectionError>`]:
//!
//! - **EmptySelection** - Selection must have at least one range
//! - **PrimaryOutOfBounds** - Primary index doesn't point at a range
//! - **RangeOutOfBounds** - A range extends past the end of the text

use std::borrow::Cow;

use ropey::RopeSlice;
use smallvec::{
  SmallVec,
  smallvec,
};
use thiserror::Error;

use crate::transaction::{
  Assoc,
  ChangeSet,
  TransactionError,
};

pub type Result<T> = std::result::Result<T, SelectionError>;

#[derive(Debug, Error, PartialEq, Eq)]
#[non_exhaustive]
pub enum SelectionError {
  #[error("selection must contain at least one range")]
  EmptySelection,
  #[error("primary index {index} out of bounds for selection of length {len}")]
  PrimaryOutOfBounds { index: usize, len: usize },
  #[error("range {from}..{to} is out of bounds for text length {len}")]
  RangeOutOfBounds {
    from: usize,
    to:   usize,
    len:  usize,
  },
  #[error(transparent)]
  Transaction(#[from] TransactionError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Range {
  pub anchor: usize,
  pub head:   usize,
}

impl Range {
  pub fn new(anchor: usize, head: usize) -> Self {
    Self { anchor, head }
  }

  #[inline]
  pub fn point(head: usize) -> Self {
    Self::new(head, head)
  }

  /// Start of the range
  #[inline]
  #[must_use]
  pub fn from(&self) -> usize {
    std::cmp::min(self.anchor, self.head)
  }

  /// End of the range
  #[inline]
  #[must_use]
  pub fn to(&self) -> usize {
    std::cmp::max(self.anchor, self.head)
  }

  /// When the head and anchor are in the same position, we have no range.
  #[inline]
  #[must_use]
  pub fn is_empty(&self) -> bool {
    self.anchor == self.head
  }

  /// Check if two `Ranges` overlap
  pub fn overlaps(&self, other: &Self) -> bool {
    self.from() == other.from() || (self.to() > other.from() && other.to() > self.from())
  }

  /// Merge two ranges into one covering both, keeping the direction of
  /// `self`.
  pub fn merge(&self, other: Self) -> Self {
    let from = self.from().min(other.from());
    let to = self.to().max(other.to());
    if self.anchor > self.head {
      Self::new(to, from)
    } else {
      Self::new(from, to)
    }
  }

  /// Map a range through a set of changes.
  ///
  /// Both ends of a non-empty range stick in front of inserted text so that a
  /// range that was replaced wholesale ends up covering the replacement.
  pub fn map(self, changes: &ChangeSet) -> Result<Self> {
    if changes.is_empty() {
      return Ok(self);
    }

    if self.is_empty() {
      let pos = changes.map_pos(self.head, Assoc::After)?;
      return Ok(Self::point(pos));
    }

    let from = changes.map_pos(self.from(), Assoc::Before)?;
    let to = changes.map_pos(self.to(), Assoc::Before)?.max(from);
    if self.anchor > self.head {
      Ok(Self::new(to, from))
    } else {
      Ok(Self::new(from, to))
    }
  }

  /// The text covered by the range.
  #[inline]
  pub fn fragment<'a, 'b: 'a>(&'a self, text: RopeSlice<'b>) -> Cow<'b, str> {
    self.slice(text).into()
  }

  #[inline]
  pub fn slice<'a, 'b: 'a>(&'a self, text: RopeSlice<'b>) -> RopeSlice<'b> {
    text.slice(self.from()..self.to())
  }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection {
  ranges:        SmallVec<[Range; 1]>,
  primary_index: usize,
}

impl Selection {
  /// Create a selection from `ranges`, sorting and merging them. The first
  /// range given is the primary one.
  pub fn new(ranges: SmallVec<[Range; 1]>) -> Result<Self> {
    Self::with_primary(ranges, 0)
  }

  pub fn with_primary(ranges: SmallVec<[Range; 1]>, primary_index: usize) -> Result<Self> {
    if ranges.is_empty() {
      return Err(SelectionError::EmptySelection);
    }
    if primary_index >= ranges.len() {
      return Err(SelectionError::PrimaryOutOfBounds {
        index: primary_index,
        len:   ranges.len(),
      });
    }

    Ok(
      Self {
        ranges,
        primary_index,
      }
      .normalize(),
    )
  }

  /// A single cursor at `pos`.
  pub fn point(pos: usize) -> Self {
    Self {
      ranges:        smallvec![Range::point(pos)],
      primary_index: 0,
    }
  }

  /// A single range.
  pub fn single(anchor: usize, head: usize) -> Self {
    Self {
      ranges:        smallvec![Range::new(anchor, head)],
      primary_index: 0,
    }
  }

  pub fn ranges(&self) -> &[Range] {
    &self.ranges
  }

  pub fn primary(&self) -> Range {
    self.ranges[self.primary_index]
  }

  /// Ranges that actually select text.
  pub fn non_empty(&self) -> impl Iterator<Item = &Range> {
    self.ranges.iter().filter(|range| !range.is_empty())
  }

  /// Make sure every range fits in a text of `len` chars.
  pub fn ensure_within(&self, len: usize) -> Result<()> {
    match self.ranges.iter().find(|range| range.to() > len) {
      Some(range) => {
        Err(SelectionError::RangeOutOfBounds {
          from: range.from(),
          to: range.to(),
          len,
        })
      },
      None => Ok(()),
    }
  }

  /// Map every range through a set of changes.
  pub fn map(self, changes: &ChangeSet) -> Result<Self> {
    if changes.is_empty() {
      return Ok(self);
    }

    let ranges = self
      .ranges
      .iter()
      .map(|range| range.map(changes))
      .collect::<Result<SmallVec<_>>>()?;

    Ok(
      Self {
        ranges,
        primary_index: self.primary_index,
      }
      .normalize(),
    )
  }

  /// Sort ranges and merge the overlapping ones, tracking the primary range.
  fn normalize(mut self) -> Self {
    if self.ranges.len() < 2 {
      return self;
    }

    let primary = self.ranges[self.primary_index];
    self.ranges.sort_unstable_by_key(|range| range.from());
    self.primary_index = self
      .ranges
      .iter()
      .position(|&range| range == primary)
      .unwrap_or(0);

    let mut merged: SmallVec<[Range; 1]> = SmallVec::with_capacity(self.ranges.len());
    let mut primary_index = 0;
    for (idx, range) in self.ranges.iter().copied().enumerate() {
      match merged.last_mut() {
        Some(last) if last.overlaps(&range) => {
          *last = last.merge(range);
        },
        _ => merged.push(range),
      }
      if idx == self.primary_index {
        primary_index = merged.len() - 1;
      }
    }

    self.ranges = merged;
    self.primary_index = primary_index;
    self
  }
}
