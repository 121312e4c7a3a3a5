mod text_file_handler;

pub use text_file_handler::{
    delete_file, edit_file_form, list_files, show_file, update_file, upload_file,
};
