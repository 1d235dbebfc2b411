//! The catalog of text normalization rules.
//!
//! Every [`Rule`] is a pure `&str -> String` function built on a regular
//! expression (or, for [`Rule::ReplaceSmartCharacters`], on the
//! [`smart_chars`](crate::smart_chars) table). Rules know nothing about
//! documents or selections; [`command`](crate::command) decides which text
//! a rule sees and writes the result back.
//!
//! ```
//! use trimmer_lib::trim::Rule;
//!
//! assert_eq!(Rule::CollapseSpaces.apply("a    b"), "a b");
//! assert!(!Rule::DeleteEmptyTags.transform("<b>bold</b>").changed);
//! ```

use std::{
  borrow::Cow,
  fmt,
  ops,
  str::FromStr,
};

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{
  Deserialize,
  Serialize,
};
use thiserror::Error;

use crate::smart_chars;

static TRAILING_WHITESPACE: Lazy<Regex> =
  Lazy::new(|| Regex::new(r"(?mR)[\t ]+$").expect("trailing whitespace regex should compile"));
static EMPTY_LINE: Lazy<Regex> =
  Lazy::new(|| Regex::new(r"(?mR)^[ \t]*$\r?\n").expect("empty line regex should compile"));
static BLANK: Lazy<Regex> =
  Lazy::new(|| Regex::new(r"[ \t\r\n\v\f]").expect("blank regex should compile"));
static LEADING_WHITESPACE: Lazy<Regex> =
  Lazy::new(|| Regex::new(r"(?mR)^[ \t]+").expect("leading whitespace regex should compile"));
static LEADING_TRAILING_WHITESPACE: Lazy<Regex> = Lazy::new(|| {
  Regex::new(r"(?mR)^[ \t]+|[\t ]+$").expect("leading/trailing whitespace regex should compile")
});
static BLANK_LINES: Lazy<Regex> =
  Lazy::new(|| Regex::new(r"\s*(\r?\n)\s*\r?\n+").expect("blank lines regex should compile"));
static REPEATED_SPACES: Lazy<Regex> =
  Lazy::new(|| Regex::new(r"  +").expect("repeated spaces regex should compile"));
static WHITESPACE_RUN: Lazy<Regex> =
  Lazy::new(|| Regex::new(r"\s+").expect("whitespace run regex should compile"));
static TOKEN_SPACES: Lazy<Regex> =
  Lazy::new(|| Regex::new(r"(?mR)^ +| {2,}| +$").expect("token spaces regex should compile"));
static EDGES: Lazy<Regex> =
  Lazy::new(|| Regex::new(r"\A\s+|\s+\z").expect("edges regex should compile"));
// The regex crate has no backreferences, so the closing name is captured
// separately and compared after the match.
static EMPTY_TAG: Lazy<Regex> = Lazy::new(|| {
  Regex::new(r"(?i)<([a-z][a-z0-9]*)\b[^>]*>\s*</([a-z][a-z0-9]*)>")
    .expect("empty tag regex should compile")
});

/// Which part of the document a rule reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Target {
  /// Every non-empty selection, or the whole document when there is none and
  /// the caller asks for it.
  Selections,
  /// The whole document as a single span. Skipped on an empty document.
  Document,
  /// The whole document, with each match deleted on its own so that text
  /// between matches is left untouched.
  DocumentMatches,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Rule {
  TrimTrailingWhitespace,
  DeleteEmptyLines,
  RemoveBlankSpaces,
  TrimLeadingWhitespace,
  TrimLeadingTrailingWhitespace,
  CollapseLines,
  CollapseSpaces,
  NormalizeSpaces,
  TokenizeString,
  TrimEdges,
  DeleteEmptyTags,
  ReplaceSmartCharacters,
}

/// Output of a rule together with whether it differs from the input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transformed<'a> {
  pub text:    Cow<'a, str>,
  pub changed: bool,
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown command `{0}`")]
pub struct UnknownRule(pub String);

impl Rule {
  pub const ALL: [Rule; 12] = [
    Rule::TrimTrailingWhitespace,
    Rule::DeleteEmptyLines,
    Rule::RemoveBlankSpaces,
    Rule::TrimLeadingWhitespace,
    Rule::TrimLeadingTrailingWhitespace,
    Rule::CollapseLines,
    Rule::CollapseSpaces,
    Rule::NormalizeSpaces,
    Rule::TokenizeString,
    Rule::TrimEdges,
    Rule::DeleteEmptyTags,
    Rule::ReplaceSmartCharacters,
  ];

  /// Command name, as used on the command line and in `config.toml`.
  pub const fn name(self) -> &'static str {
    match self {
      Rule::TrimTrailingWhitespace => "trim_trailing_whitespace",
      Rule::DeleteEmptyLines => "delete_empty_lines",
      Rule::RemoveBlankSpaces => "remove_blank_spaces",
      Rule::TrimLeadingWhitespace => "trim_leading_whitespace",
      Rule::TrimLeadingTrailingWhitespace => "trim_leading_trailing_whitespace",
      Rule::CollapseLines => "collapse_lines",
      Rule::CollapseSpaces => "collapse_spaces",
      Rule::NormalizeSpaces => "normalize_spaces",
      Rule::TokenizeString => "tokenize_string",
      Rule::TrimEdges => "trim_edges",
      Rule::DeleteEmptyTags => "delete_empty_tags",
      Rule::ReplaceSmartCharacters => "replace_smart_characters",
    }
  }

  pub const fn doc(self) -> &'static str {
    match self {
      Rule::TrimTrailingWhitespace => "Remove spaces and tabs at the end of every line",
      Rule::DeleteEmptyLines => "Delete lines that are empty or hold only spaces and tabs",
      Rule::RemoveBlankSpaces => "Remove every space, tab and line break",
      Rule::TrimLeadingWhitespace => "Remove spaces and tabs at the start of every line",
      Rule::TrimLeadingTrailingWhitespace => {
        "Remove spaces and tabs at both ends of every line"
      },
      Rule::CollapseLines => "Collapse runs of blank lines into a single blank line",
      Rule::CollapseSpaces => "Collapse runs of spaces into a single space",
      Rule::NormalizeSpaces => {
        "Strip surrounding whitespace and reduce inner whitespace runs to one character"
      },
      Rule::TokenizeString => "Remove leading, trailing and repeated spaces",
      Rule::TrimEdges => "Remove whitespace at the start and end of the document",
      Rule::DeleteEmptyTags => "Delete markup tags with nothing but whitespace inside",
      Rule::ReplaceSmartCharacters => "Replace typographic characters with ASCII",
    }
  }

  pub const fn target(self) -> Target {
    match self {
      Rule::TrimTrailingWhitespace => Target::DocumentMatches,
      Rule::TrimEdges => Target::Document,
      _ => Target::Selections,
    }
  }

  /// Run the rule over `text`. Borrows when nothing matched.
  pub fn apply(self, text: &str) -> Cow<'_, str> {
    match self {
      Rule::TrimTrailingWhitespace => TRAILING_WHITESPACE.replace_all(text, ""),
      Rule::DeleteEmptyLines => EMPTY_LINE.replace_all(text, ""),
      Rule::RemoveBlankSpaces => BLANK.replace_all(text, ""),
      Rule::TrimLeadingWhitespace => LEADING_WHITESPACE.replace_all(text, ""),
      Rule::TrimLeadingTrailingWhitespace => LEADING_TRAILING_WHITESPACE.replace_all(text, ""),
      Rule::CollapseLines => BLANK_LINES.replace_all(text, "${1}${1}"),
      Rule::CollapseSpaces => REPEATED_SPACES.replace_all(text, " "),
      Rule::NormalizeSpaces => normalize_spaces(text),
      Rule::TokenizeString => TOKEN_SPACES.replace_all(text, ""),
      Rule::TrimEdges => EDGES.replace_all(text, ""),
      Rule::DeleteEmptyTags => delete_empty_tags(text),
      Rule::ReplaceSmartCharacters => smart_chars::replace(text),
    }
  }

  /// Like [`Rule::apply`], also reporting whether the output differs. A rule
  /// can match and still produce its input (collapsing a single blank line),
  /// which does not count as a change.
  pub fn transform(self, text: &str) -> Transformed<'_> {
    let output = self.apply(text);
    let changed = output != text;
    Transformed {
      text: output,
      changed,
    }
  }
}

impl fmt::Display for Rule {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.name())
  }
}

impl FromStr for Rule {
  type Err = UnknownRule;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    Rule::ALL
      .into_iter()
      .find(|rule| rule.name() == s)
      .ok_or_else(|| UnknownRule(s.to_string()))
  }
}

/// Byte ranges of the spaces and tabs ending each line of `text`.
pub fn trailing_whitespace(text: &str) -> impl Iterator<Item = ops::Range<usize>> + '_ {
  TRAILING_WHITESPACE.find_iter(text).map(|m| m.range())
}

/// Drop whitespace at both ends of `text` and shrink every inner whitespace
/// run down to its last character.
fn normalize_spaces(text: &str) -> Cow<'_, str> {
  let mut runs = WHITESPACE_RUN.find_iter(text).peekable();
  if runs.peek().is_none() {
    return Cow::Borrowed(text);
  }

  let mut out = String::with_capacity(text.len());
  let mut last = 0;
  for run in runs {
    out.push_str(&text[last..run.start()]);
    last = run.end();
    if run.start() == 0 || run.end() == text.len() {
      continue;
    }
    if let Some(ch) = run.as_str().chars().next_back() {
      out.push(ch);
    }
  }
  out.push_str(&text[last..]);
  Cow::Owned(out)
}

/// Single left to right pass: a tag that only becomes empty after its
/// children are removed is kept.
fn delete_empty_tags(text: &str) -> Cow<'_, str> {
  let mut out = String::new();
  let mut last = 0;
  let mut pos = 0;

  while let Some(caps) = EMPTY_TAG.captures_at(text, pos) {
    let (Some(whole), Some(open), Some(close)) = (caps.get(0), caps.get(1), caps.get(2)) else {
      break;
    };

    if open.as_str().eq_ignore_ascii_case(close.as_str()) {
      out.push_str(&text[last..whole.start()]);
      last = whole.end();
      pos = whole.end();
    } else {
      // Retry from the next char: a later `<` inside this match may still
      // open a balanced pair.
      pos = whole.start() + 1;
    }

    if pos >= text.len() {
      break;
    }
  }

  if last == 0 {
    return Cow::Borrowed(text);
  }
  out.push_str(&text[last..]);
  Cow::Owned(out)
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn trailing_whitespace_is_removed_per_line() {
    assert_eq!(Rule::TrimTrailingWhitespace.apply("a  \nb\t\n"), "a\nb\n");
    assert_eq!(Rule::TrimTrailingWhitespace.apply("a \t"), "a");
    assert_eq!(
      trailing_whitespace("a  \nb\t\nc").collect::<Vec<_>>(),
      vec![1..3, 5..6]
    );
  }

  #[test]
  fn empty_lines() {
    assert_eq!(Rule::DeleteEmptyLines.apply("a\n\n  \t\nb\n"), "a\nb\n");
    assert!(!Rule::DeleteEmptyLines.transform("a\nb").changed);
  }

  #[test]
  fn blank_characters() {
    assert_eq!(
      Rule::RemoveBlankSpaces.apply("a b\tc\r\nd\u{0B}e\u{0C}f"),
      "abcdef"
    );
  }

  #[test]
  fn leading_and_trailing() {
    assert_eq!(Rule::TrimLeadingWhitespace.apply("  a\n\tb \n"), "a\nb \n");
    assert_eq!(
      Rule::TrimLeadingTrailingWhitespace.apply("  \t  hello  \t "),
      "hello"
    );
    assert_eq!(
      Rule::TrimLeadingTrailingWhitespace.apply(" a \n b "),
      "a\nb"
    );
  }

  #[test]
  fn crlf_line_endings() {
    assert_eq!(
      Rule::TrimTrailingWhitespace.apply("a  \r\nb\t\r\n"),
      "a\r\nb\r\n"
    );
    assert_eq!(
      trailing_whitespace("a  \r\nb\t\r\n").collect::<Vec<_>>(),
      vec![1..3, 6..7]
    );
    assert_eq!(Rule::DeleteEmptyLines.apply("a\r\n  \r\nb"), "a\r\nb");
    assert_eq!(Rule::DeleteEmptyLines.apply("a\r\n\r\nb"), "a\r\nb");
    assert_eq!(
      Rule::TrimLeadingTrailingWhitespace.apply(" a \r\n b "),
      "a\r\nb"
    );
    assert_eq!(Rule::TrimLeadingWhitespace.apply("a\r\n  b"), "a\r\nb");
    assert_eq!(Rule::TokenizeString.apply(" a \r\n b "), "a\r\nb");
  }

  #[test]
  fn collapse_lines_keeps_one_blank_line() {
    assert_eq!(Rule::CollapseLines.apply("line1\n\n\nline2"), "line1\n\nline2");
    assert_eq!(Rule::CollapseLines.apply("a\n  \n\t\n\nb"), "a\n\nb");
  }

  #[test]
  fn collapse_lines_single_blank_line_is_unchanged() {
    let out = Rule::CollapseLines.transform("a\n\nb");
    assert_eq!(out.text, "a\n\nb");
    assert!(!out.changed);
  }

  #[test]
  fn collapse_spaces() {
    assert_eq!(Rule::CollapseSpaces.apply("a    b"), "a b");
    assert_eq!(Rule::CollapseSpaces.apply("a\t\tb"), "a\t\tb");
    assert!(!Rule::CollapseSpaces.transform("a b c").changed);
  }

  #[test]
  fn normalize_spaces() {
    assert_eq!(Rule::NormalizeSpaces.apply("  a   b \t c  "), "a b c");
    assert_eq!(Rule::NormalizeSpaces.apply("a \nb"), "a\nb");
    assert_eq!(Rule::NormalizeSpaces.apply("   "), "");
    assert!(!Rule::NormalizeSpaces.transform("a b").changed);
  }

  #[test]
  fn tokenize() {
    assert_eq!(Rule::TokenizeString.apply("  foo bar  "), "foo bar");
    assert_eq!(Rule::TokenizeString.apply("foo  bar"), "foobar");
    assert_eq!(Rule::TokenizeString.apply(" a\n b "), "a\nb");
  }

  #[test]
  fn trim_edges() {
    assert_eq!(Rule::TrimEdges.apply("\n\n  body\n text \n\n"), "body\n text");
    assert_eq!(Rule::TrimEdges.apply(""), "");
    assert_eq!(Rule::TrimEdges.apply(" \n "), "");
  }

  #[test]
  fn empty_tags() {
    assert_eq!(Rule::DeleteEmptyTags.apply("<div>   </div>"), "");
    assert_eq!(Rule::DeleteEmptyTags.apply("<div>content</div>"), "<div>content</div>");
    assert_eq!(
      Rule::DeleteEmptyTags.apply("a<p class=\"x\">\n</P>b"),
      "ab"
    );
  }

  #[test]
  fn empty_tags_single_pass() {
    assert_eq!(Rule::DeleteEmptyTags.apply("<div><p></p></div>"), "<div></div>");
  }

  #[test]
  fn empty_tags_need_matching_names() {
    assert_eq!(Rule::DeleteEmptyTags.apply("<a></b>"), "<a></b>");
    assert_eq!(Rule::DeleteEmptyTags.apply("<ab></a>"), "<ab></a>");
    assert_eq!(Rule::DeleteEmptyTags.apply("<1></1>"), "<1></1>");
    assert_eq!(Rule::DeleteEmptyTags.apply("<a></b><i> </i>"), "<a></b>");
  }

  #[test]
  fn smart_characters() {
    assert_eq!(
      Rule::ReplaceSmartCharacters.apply("\u{201C}quoted\u{201D} and \u{2026} more\u{2014}text"),
      "\"quoted\" and ... more---text"
    );
  }

  #[test]
  fn names_round_trip() {
    for rule in Rule::ALL {
      assert_eq!(rule.name().parse::<Rule>(), Ok(rule));
      assert_eq!(rule.to_string(), rule.name());
    }
    assert_eq!(
      "trim".parse::<Rule>(),
      Err(UnknownRule("trim".to_string()))
    );
  }

  #[test]
  fn targets() {
    assert_eq!(Rule::TrimTrailingWhitespace.target(), Target::DocumentMatches);
    assert_eq!(Rule::TrimEdges.target(), Target::Document);
    assert_eq!(Rule::CollapseLines.target(), Target::Selections);
  }

  quickcheck::quickcheck! {
      fn trailing_whitespace_is_idempotent(text: String) -> bool {
          let once = Rule::TrimTrailingWhitespace.apply(&text).into_owned();
          !Rule::TrimTrailingWhitespace.transform(&once).changed
      }

      fn trailing_whitespace_never_ends_a_line_with_blanks(text: String) -> bool {
          let out = Rule::TrimTrailingWhitespace.apply(&text);
          out.split('\n').all(|line| !line.ends_with([' ', '\t']))
      }

      fn removing_blanks_leaves_no_blanks(text: String) -> bool {
          let out = Rule::RemoveBlankSpaces.apply(&text);
          !out.contains([' ', '\t', '\r', '\n', '\u{0B}', '\u{0C}'])
      }

      fn smart_chars_leave_none_behind(text: String) -> bool {
          let out = Rule::ReplaceSmartCharacters.apply(&text);
          !out.chars().any(smart_chars::is_smart_char)
      }
  }
}
