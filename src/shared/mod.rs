pub mod flash;
pub mod templates;
pub mod test_helpers;
