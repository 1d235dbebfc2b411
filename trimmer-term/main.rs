//! Command line host for the trimmer commands.
//!
//! Reads a file (or stdin) into a document, runs one command against it and
//! writes the result to stdout or back to the file. The status line goes to
//! stderr.

mod select;

use std::{
  io::{
    self,
    Write,
  },
  path::PathBuf,
};

use clap::{
  Parser,
  Subcommand,
};
use eyre::{
  Result,
  bail,
};
use trimmer_lib::{
  command,
  messages::MessageCenter,
  selection::{
    Range,
    Selection,
  },
  trim::Rule,
};
use trimmer_loader::config::Config;
use trimmer_runtime::{
  file,
  journal::{
    self,
    JournalOptions,
  },
};
use trimmer_vcs::SystemRunner;

#[derive(Debug, Parser)]
#[command(name = "trimmer")]
#[command(about = "Whitespace and text normalization commands")]
struct Cli {
  /// Path to config.toml (defaults to the user config directory)
  #[arg(long, global = true)]
  config: Option<PathBuf>,

  #[command(subcommand)]
  command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
  /// Run a command on a file or on stdin
  Run {
    /// Command name, see `trimmer list`
    command: Rule,

    /// File to read (stdin when omitted)
    file: Option<PathBuf>,

    /// Select the chars FROM..TO (repeatable)
    #[arg(long = "select", value_name = "FROM..TO", value_parser = select::parse_range)]
    selections: Vec<Range>,

    /// Do nothing when there is no selection instead of using the whole file
    #[arg(long)]
    no_default_to_all: bool,

    /// Write the result back to FILE instead of stdout
    #[arg(long, requires = "file")]
    in_place: bool,
  },
  /// List every command
  List,
  /// Create a journal entry for the current minute and print its path
  Journal {
    /// Do not commit the entry even if the config asks for it
    #[arg(long)]
    no_commit: bool,
  },
}

fn main() -> Result<()> {
  env_logger::init();
  let cli = Cli::parse();

  match cli.command {
    Commands::Run {
      command,
      file,
      selections,
      no_default_to_all,
      in_place,
    } => {
      let config = Config::load(cli.config.as_deref())?;
      let mut options = config.trim;
      if no_default_to_all {
        options.default_to_all = false;
      }
      run(command, file, selections, &options, in_place)
    },
    Commands::List => {
      let mut stdout = io::stdout().lock();
      for rule in Rule::ALL {
        writeln!(stdout, "{:<34}{}", rule.name(), rule.doc())?;
      }
      Ok(())
    },
    Commands::Journal { no_commit } => {
      let config = Config::load(cli.config.as_deref())?;
      let options = JournalOptions {
        dir:    config.journal.dir,
        commit: config.journal.commit && !no_commit,
      };
      let now = chrono::Local::now().naive_local();
      let entry = journal::create_entry(&options, &now, &SystemRunner)?;
      println!("{}", entry.path.display());
      Ok(())
    },
  }
}

fn run(
  rule: Rule,
  path: Option<PathBuf>,
  selections: Vec<Range>,
  options: &command::TrimOptions,
  in_place: bool,
) -> Result<()> {
  let mut doc = match &path {
    Some(path) => file::open(path)?,
    None => file::read(io::stdin().lock())?,
  };

  if let Some(selection) = select::selection(selections)? {
    doc.set_selection(selection)?;
  }

  let mut messages = MessageCenter::default();
  let outcome = command::execute(rule, &mut doc, &mut messages, options);
  if let Some(message) = messages.active() {
    eprintln!("{}", message.text);
  }
  let outcome = outcome?;
  log::debug!("{} changed: {}", rule, outcome.is_changed());

  if in_place {
    if doc.path().is_none() {
      bail!("--in-place needs a file");
    }
    if outcome.is_changed() {
      file::save(&mut doc)?;
    }
    return Ok(());
  }

  let mut stdout = io::stdout().lock();
  file::write(&doc, &mut stdout)?;
  stdout.flush()?;
  Ok(())
}

#[cfg(test)]
mod tests {
  use clap::CommandFactory;

  use super::*;

  #[test]
  fn cli_is_consistent() {
    Cli::command().debug_assert();
  }

  #[test]
  fn parses_run() {
    let cli = Cli::try_parse_from([
      "trimmer",
      "run",
      "collapse_spaces",
      "notes.txt",
      "--select",
      "0..4",
      "--select",
      "10..12",
      "--in-place",
    ])
    .unwrap();

    let Commands::Run {
      command,
      file,
      selections,
      in_place,
      no_default_to_all,
    } = cli.command
    else {
      panic!("expected run");
    };
    assert_eq!(command, Rule::CollapseSpaces);
    assert_eq!(file, Some(PathBuf::from("notes.txt")));
    assert_eq!(selections, vec![Range::new(0, 4), Range::new(10, 12)]);
    assert!(in_place);
    assert!(!no_default_to_all);
  }

  #[test]
  fn rejects_unknown_command() {
    assert!(Cli::try_parse_from(["trimmer", "run", "trim_everything"]).is_err());
  }

  #[test]
  fn in_place_needs_a_file() {
    assert!(Cli::try_parse_from(["trimmer", "run", "trim_edges", "--in-place"]).is_err());
  }

  #[test]
  fn parses_journal() {
    let cli = Cli::try_parse_from(["trimmer", "journal", "--no-commit", "--config", "c.toml"]).unwrap();
    assert_eq!(cli.config, Some(PathBuf::from("c.toml")));
    assert!(matches!(cli.command, Commands::Journal { no_commit: true }));
  }
}
