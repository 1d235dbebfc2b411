//! Status messages reported back to the host.
//!
//! Every command invocation publishes exactly one message. The newest one is
//! the active status line; older ones stay around in a bounded log.

use std::collections::VecDeque;

pub const DEFAULT_HISTORY_LIMIT: usize = 64;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageLevel {
  Info,
  Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
  /// Counts up from 1 over the lifetime of the center.
  pub id:     u64,
  pub level:  MessageLevel,
  pub source: Option<String>,
  pub text:   String,
}

#[derive(Debug, Clone)]
pub struct MessageCenter {
  log:       VecDeque<Message>,
  limit:     usize,
  published: u64,
}

impl Default for MessageCenter {
  fn default() -> Self {
    Self::with_limit(DEFAULT_HISTORY_LIMIT)
  }
}

impl MessageCenter {
  /// Keep at most `limit` messages. The active one always counts, so the
  /// limit is at least 1.
  pub fn with_limit(limit: usize) -> Self {
    Self {
      log:       VecDeque::new(),
      limit:     limit.max(1),
      published: 0,
    }
  }

  /// The latest message, if anything was published yet.
  pub fn active(&self) -> Option<&Message> {
    self.log.back()
  }

  pub fn history_len(&self) -> usize {
    self.log.len()
  }

  /// Oldest first.
  pub fn history(&self) -> impl Iterator<Item = &Message> {
    self.log.iter()
  }

  pub fn publish(
    &mut self,
    level: MessageLevel,
    source: Option<String>,
    text: impl Into<String>,
  ) -> &Message {
    self.published = self.published.saturating_add(1);
    if self.log.len() == self.limit {
      self.log.pop_front();
    }
    self.log.push_back(Message {
      id: self.published,
      level,
      source,
      text: text.into(),
    });
    &self.log[self.log.len() - 1]
  }

  pub fn info(&mut self, source: Option<String>, text: impl Into<String>) -> &Message {
    self.publish(MessageLevel::Info, source, text)
  }

  pub fn error(&mut self, source: Option<String>, text: impl Into<String>) -> &Message {
    self.publish(MessageLevel::Error, source, text)
  }
}
