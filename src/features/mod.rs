pub mod text_files;
