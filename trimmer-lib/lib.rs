//! Editor-side core of trimmer.
//!
//! Holds the document model ([`document`], [`selection`], [`transaction`]),
//! the status line ([`messages`]) and the text normalization commands
//! ([`trim`], [`smart_chars`], [`command`]). Nothing in here touches the
//! filesystem or the process environment.

use smartstring::{
  LazyCompact,
  SmartString,
};

pub mod command;
pub mod document;
pub mod messages;
pub mod selection;
pub mod smart_chars;
pub mod transaction;
pub mod trim;

pub type Tendril = SmartString<LazyCompact>;
