//! Typographic ("smart") characters and their plain ASCII spellings.

use std::borrow::Cow;

/// One step of the replacement chain: every char in `from` becomes `to`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Substitution {
  pub from: &'static [char],
  pub to:   &'static str,
}

/// Applied in order. Each step scans the output of the previous one.
pub const SUBSTITUTIONS: [Substitution; 13] = [
  Substitution {
    from: &['\u{2019}', '\u{2018}', '\u{201A}'],
    to:   "'",
  },
  Substitution {
    from: &['\u{201C}', '\u{201D}'],
    to:   "\"",
  },
  Substitution {
    from: &['\u{201E}'],
    to:   "\"",
  },
  Substitution {
    from: &['\u{2026}'],
    to:   "...",
  },
  Substitution {
    from: &['\u{2014}'],
    to:   "---",
  },
  Substitution {
    from: &['\u{2013}'],
    to:   "--",
  },
  Substitution {
    from: &['\u{2022}'],
    to:   "*",
  },
  Substitution {
    from: &['\u{00B7}'],
    to:   "-",
  },
  // em space
  Substitution {
    from: &['\u{2003}'],
    to:   "   ",
  },
  // en space
  Substitution {
    from: &['\u{2002}'],
    to:   "  ",
  },
  // no-break, thin and hair spaces
  Substitution {
    from: &['\u{00A0}', '\u{2009}', '\u{200A}'],
    to:   " ",
  },
  Substitution {
    from: &['\u{00AB}'],
    to:   "<<",
  },
  Substitution {
    from: &['\u{00BB}'],
    to:   ">>",
  },
];

pub fn is_smart_char(ch: char) -> bool {
  SUBSTITUTIONS.iter().any(|sub| sub.from.contains(&ch))
}

/// Replace every smart character in `text`. Borrows when there is nothing to
/// replace.
pub fn replace(text: &str) -> Cow<'_, str> {
  let mut text = Cow::Borrowed(text);
  for sub in &SUBSTITUTIONS {
    if text.contains(sub.from) {
      text = Cow::Owned(text.replace(sub.from, sub.to));
    }
  }
  text
}
