//! Reading documents from disk and writing them back.

use std::{
  fs::File,
  io::{
    BufReader,
    BufWriter,
    Read,
    Write,
  },
  path::Path,
};

use eyre::{
  Result,
  WrapErr,
  eyre,
};
use ropey::Rope;
use trimmer_lib::document::Document;

/// Open the file at `path` as a document.
pub fn open(path: &Path) -> Result<Document> {
  let file = File::open(path).wrap_err_with(|| format!("failed to open {}", path.display()))?;
  let text = Rope::from_reader(BufReader::new(file))
    .wrap_err_with(|| format!("failed to read {}", path.display()))?;
  tracing::debug!(path = %path.display(), chars = text.len_chars(), "opened document");
  Ok(Document::with_path(path, text))
}

/// Read a whole document from `reader`, for hosts that edit a stream.
pub fn read(reader: impl Read) -> Result<Document> {
  let text = Rope::from_reader(reader).wrap_err("failed to read document")?;
  Ok(Document::new(text))
}

/// Write the text of `doc` to `writer`.
pub fn write(doc: &Document, writer: impl Write) -> Result<()> {
  doc
    .text()
    .write_to(writer)
    .wrap_err_with(|| format!("failed to write {}", doc.display_name()))
}

/// Write `doc` back to its own file and clear the modified flag.
pub fn save(doc: &mut Document) -> Result<()> {
  let path = doc
    .path()
    .ok_or_else(|| eyre!("{} has no file to save to", doc.display_name()))?
    .to_path_buf();

  let file = File::create(&path).wrap_err_with(|| format!("failed to create {}", path.display()))?;
  let mut writer = BufWriter::new(file);
  write(doc, &mut writer)?;
  writer
    .flush()
    .wrap_err_with(|| format!("failed to flush {}", path.display()))?;

  doc.mark_saved();
  tracing::debug!(path = %path.display(), "saved document");
  Ok(())
}
