//! Side-effectful collaborators of the trimmer commands: file-backed
//! documents and the journal entry creator.

pub mod file;
pub mod journal;
