pub mod upload_decoder;

pub use upload_decoder::{base_name, decode, describe_extensions, is_allowed_extension};
