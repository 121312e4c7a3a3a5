mod text_file_dto;

pub use text_file_dto::{
    first_validation_message, CreateTextFileDto, TextFileView, UpdateTextFileDto,
};
