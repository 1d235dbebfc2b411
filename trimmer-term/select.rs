use eyre::Result;
use smallvec::SmallVec;
use trimmer_lib::selection::{
  Range,
  Selection,
};

/// Parse `FROM..TO` char offsets.
pub fn parse_range(s: &str) -> std::result::Result<Range, String> {
  let (from, to) = s
    .split_once("..")
    .ok_or_else(|| format!("expected FROM..TO, got `{s}`"))?;
  let from = from
    .trim()
    .parse::<usize>()
    .map_err(|err| format!("invalid start `{from}`: {err}"))?;
  let to = to
    .trim()
    .parse::<usize>()
    .map_err(|err| format!("invalid end `{to}`: {err}"))?;
  Ok(Range::new(from, to))
}

/// Build a selection from the ranges given on the command line. The last
/// range is the primary one.
pub fn selection(ranges: Vec<Range>) -> Result<Option<Selection>> {
  if ranges.is_empty() {
    return Ok(None);
  }
  let primary = ranges.len() - 1;
  let ranges: SmallVec<[Range; 1]> = ranges.into_iter().collect();
  Ok(Some(Selection::with_primary(ranges, primary)?))
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn parses_ranges() {
    assert_eq!(parse_range("2..7"), Ok(Range::new(2, 7)));
    assert_eq!(parse_range(" 7 .. 2 "), Ok(Range::new(7, 2)));
    assert!(parse_range("7").is_err());
    assert!(parse_range("a..2").is_err());
    assert!(parse_range("1..-2").is_err());
  }

  #[test]
  fn builds_selection() {
    assert_eq!(selection(Vec::new()).unwrap(), None);

    let selection = selection(vec![Range::new(5, 9), Range::new(0, 2)])
      .unwrap()
      .unwrap();
    assert_eq!(selection.ranges(), &[Range::new(0, 2), Range::new(5, 9)]);
    assert_eq!(selection.primary(), Range::new(0, 2));
  }
}
