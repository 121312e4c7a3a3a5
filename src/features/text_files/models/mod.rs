mod text_file;

pub use text_file::{NewTextFile, TextFile, TextFileChanges};
